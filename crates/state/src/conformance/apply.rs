use std::future::Future;

use super::{scan_keys, seed, TestResult};
use crate::{WorldState, WriteSet};

pub(super) async fn run_apply_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::new(
        "apply",
        "apply_empty_write_set_is_noop",
        apply_empty_write_set_is_noop(factory).await,
    ));
    results.push(TestResult::new(
        "apply",
        "apply_writes_every_put",
        apply_writes_every_put(factory).await,
    ));
    results.push(TestResult::new(
        "apply",
        "apply_replays_in_order",
        apply_replays_in_order(factory).await,
    ));
    results.push(TestResult::new(
        "apply",
        "apply_deletes_existing_keys",
        apply_deletes_existing_keys(factory).await,
    ));

    results
}

// ── Test implementations ──────────────────────────────────────────────────────

async fn apply_empty_write_set_is_noop<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &[("a", "1")]).await?;
    s.apply(WriteSet::new()).await.map_err(|e| e.to_string())?;
    let keys = scan_keys(&s, "", "").await?;
    if keys != vec!["a"] {
        return Err(format!("expected [a], got {:?}", keys));
    }
    Ok(())
}

async fn apply_writes_every_put<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut ws = WriteSet::new();
    ws.put("engine1", b"one".to_vec());
    ws.put("engine2", b"two".to_vec());
    s.apply(ws).await.map_err(|e| e.to_string())?;

    for (key, want) in [("engine1", b"one".as_slice()), ("engine2", b"two".as_slice())] {
        let got = s.get(key).await.map_err(|e| e.to_string())?;
        if got.as_deref() != Some(want) {
            return Err(format!("{key}: expected {:?}, got {:?}", want, got));
        }
    }
    Ok(())
}

/// Later writes to the same key win; a put followed by a delete leaves
/// the key absent.
async fn apply_replays_in_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut ws = WriteSet::new();
    ws.put("a", b"first".to_vec());
    ws.put("a", b"second".to_vec());
    ws.put("b", b"short-lived".to_vec());
    ws.delete("b");
    s.apply(ws).await.map_err(|e| e.to_string())?;

    let a = s.get("a").await.map_err(|e| e.to_string())?;
    if a.as_deref() != Some(b"second".as_slice()) {
        return Err(format!("expected a = \"second\", got {:?}", a));
    }
    let b = s.get("b").await.map_err(|e| e.to_string())?;
    if b.is_some() {
        return Err(format!("expected b absent, got {:?}", b));
    }
    Ok(())
}

async fn apply_deletes_existing_keys<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &[("a", "1"), ("b", "2")]).await?;
    let mut ws = WriteSet::new();
    ws.delete("a");
    s.apply(ws).await.map_err(|e| e.to_string())?;
    let keys = scan_keys(&s, "", "").await?;
    if keys != vec!["b"] {
        return Err(format!("expected [b], got {:?}", keys));
    }
    Ok(())
}
