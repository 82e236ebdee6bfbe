use std::future::Future;

use super::{seed, TestResult};
use crate::WorldState;

pub(super) async fn run_kv_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::new(
        "kv",
        "get_absent_key_returns_none",
        get_absent_key_returns_none(factory).await,
    ));
    results.push(TestResult::new(
        "kv",
        "put_then_get_returns_value",
        put_then_get_returns_value(factory).await,
    ));
    results.push(TestResult::new(
        "kv",
        "put_overwrites_previous_value",
        put_overwrites_previous_value(factory).await,
    ));
    results.push(TestResult::new(
        "kv",
        "delete_removes_key",
        delete_removes_key(factory).await,
    ));
    results.push(TestResult::new(
        "kv",
        "delete_absent_key_succeeds",
        delete_absent_key_succeeds(factory).await,
    ));
    results.push(TestResult::new(
        "kv",
        "values_are_byte_exact",
        values_are_byte_exact(factory).await,
    ));
    results.push(TestResult::new(
        "kv",
        "keys_are_independent",
        keys_are_independent(factory).await,
    ));

    results
}

// ── Test implementations ──────────────────────────────────────────────────────

async fn get_absent_key_returns_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.get("engine-999").await {
        Ok(None) => Ok(()),
        other => Err(format!("expected Ok(None), got {:?}", other)),
    }
}

async fn put_then_get_returns_value<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &[("engine1", "{\"ID\":\"engine1\"}")]).await?;
    let got = s.get("engine1").await.map_err(|e| e.to_string())?;
    if got.as_deref() != Some(b"{\"ID\":\"engine1\"}".as_slice()) {
        return Err(format!("unexpected value {:?}", got));
    }
    Ok(())
}

async fn put_overwrites_previous_value<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &[("engine1", "first"), ("engine1", "second")]).await?;
    let got = s.get("engine1").await.map_err(|e| e.to_string())?;
    if got.as_deref() != Some(b"second".as_slice()) {
        return Err(format!("expected \"second\", got {:?}", got));
    }
    Ok(())
}

async fn delete_removes_key<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &[("engine1", "v")]).await?;
    s.delete("engine1").await.map_err(|e| e.to_string())?;
    match s.get("engine1").await {
        Ok(None) => Ok(()),
        other => Err(format!("expected Ok(None) after delete, got {:?}", other)),
    }
}

async fn delete_absent_key_succeeds<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.delete("never-written")
        .await
        .map_err(|e| format!("delete of absent key failed: {e}"))
}

/// Values must come back exactly as written, including non-UTF-8 bytes.
async fn values_are_byte_exact<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let value = vec![0x00, 0xff, b' ', b'\n', 0x80];
    s.put("raw", value.clone()).await.map_err(|e| e.to_string())?;
    let got = s.get("raw").await.map_err(|e| e.to_string())?;
    if got != Some(value) {
        return Err(format!("value not preserved: {:?}", got));
    }
    Ok(())
}

async fn keys_are_independent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &[("engine1", "one"), ("engine2", "two")]).await?;
    s.delete("engine1").await.map_err(|e| e.to_string())?;
    let got = s.get("engine2").await.map_err(|e| e.to_string())?;
    if got.as_deref() != Some(b"two".as_slice()) {
        return Err(format!("engine2 disturbed by delete of engine1: {:?}", got));
    }
    Ok(())
}
