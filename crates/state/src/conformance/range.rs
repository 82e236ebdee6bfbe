use std::future::Future;

use super::{scan_keys, seed, TestResult};
use crate::{StateError, StateIterator, WorldState};

pub(super) async fn run_range_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::new(
        "range",
        "empty_store_scans_nothing",
        empty_store_scans_nothing(factory).await,
    ));
    results.push(TestResult::new(
        "range",
        "unbounded_scan_visits_all_keys_in_order",
        unbounded_scan_visits_all_keys_in_order(factory).await,
    ));
    results.push(TestResult::new(
        "range",
        "start_bound_is_inclusive",
        start_bound_is_inclusive(factory).await,
    ));
    results.push(TestResult::new(
        "range",
        "end_bound_is_exclusive",
        end_bound_is_exclusive(factory).await,
    ));
    results.push(TestResult::new(
        "range",
        "scan_excludes_deleted_keys",
        scan_excludes_deleted_keys(factory).await,
    ));
    results.push(TestResult::new(
        "range",
        "scan_yields_stored_values",
        scan_yields_stored_values(factory).await,
    ));
    results.push(TestResult::new(
        "range",
        "next_after_close_is_rejected",
        next_after_close_is_rejected(factory).await,
    ));
    results.push(TestResult::new(
        "range",
        "double_close_is_noop",
        double_close_is_noop(factory).await,
    ));
    results.push(TestResult::new(
        "range",
        "store_usable_after_early_close",
        store_usable_after_early_close(factory).await,
    ));
    results.push(TestResult::new(
        "range",
        "store_usable_after_iterator_drop",
        store_usable_after_iterator_drop(factory).await,
    ));

    results
}

// ── Test implementations ──────────────────────────────────────────────────────

async fn empty_store_scans_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let keys = scan_keys(&s, "", "").await?;
    if !keys.is_empty() {
        return Err(format!("expected no keys, got {:?}", keys));
    }
    Ok(())
}

/// Keys come back in ascending byte order regardless of insertion order.
async fn unbounded_scan_visits_all_keys_in_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(
        &s,
        &[
            ("engine2", "b"),
            ("Engine9", "c"),
            ("engine10", "d"),
            ("engine1", "a"),
        ],
    )
    .await?;
    let keys = scan_keys(&s, "", "").await?;
    let expected = vec!["Engine9", "engine1", "engine10", "engine2"];
    if keys != expected {
        return Err(format!("expected {:?}, got {:?}", expected, keys));
    }
    Ok(())
}

async fn start_bound_is_inclusive<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &[("a", "1"), ("b", "2"), ("c", "3")]).await?;
    let keys = scan_keys(&s, "b", "").await?;
    if keys != vec!["b", "c"] {
        return Err(format!("expected [b, c], got {:?}", keys));
    }
    Ok(())
}

async fn end_bound_is_exclusive<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &[("a", "1"), ("b", "2"), ("c", "3")]).await?;
    let keys = scan_keys(&s, "a", "c").await?;
    if keys != vec!["a", "b"] {
        return Err(format!("expected [a, b], got {:?}", keys));
    }
    Ok(())
}

async fn scan_excludes_deleted_keys<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &[("a", "1"), ("b", "2"), ("c", "3")]).await?;
    s.delete("b").await.map_err(|e| e.to_string())?;
    let keys = scan_keys(&s, "", "").await?;
    if keys != vec!["a", "c"] {
        return Err(format!("expected [a, c], got {:?}", keys));
    }
    Ok(())
}

async fn scan_yields_stored_values<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &[("a", "alpha"), ("b", "beta")]).await?;
    let mut iter = s.range_scan("", "").await.map_err(|e| e.to_string())?;
    let mut pairs = Vec::new();
    let drained = loop {
        match iter.next().await {
            Ok(Some(kv)) => pairs.push((kv.key, kv.value)),
            Ok(None) => break Ok(()),
            Err(e) => break Err(e.to_string()),
        }
    };
    iter.close().await.map_err(|e| e.to_string())?;
    drained?;
    let expected = vec![
        ("a".to_string(), b"alpha".to_vec()),
        ("b".to_string(), b"beta".to_vec()),
    ];
    if pairs != expected {
        return Err(format!("expected {:?}, got {:?}", expected, pairs));
    }
    Ok(())
}

async fn next_after_close_is_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &[("a", "1")]).await?;
    let mut iter = s.range_scan("", "").await.map_err(|e| e.to_string())?;
    iter.close().await.map_err(|e| e.to_string())?;
    match iter.next().await {
        Err(StateError::IteratorClosed) => Ok(()),
        other => Err(format!("expected IteratorClosed, got {:?}", other)),
    }
}

async fn double_close_is_noop<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut iter = s.range_scan("", "").await.map_err(|e| e.to_string())?;
    iter.close().await.map_err(|e| format!("first close: {e}"))?;
    iter.close().await.map_err(|e| format!("second close: {e}"))
}

/// Closing an iterator before it is exhausted must not wedge the store.
async fn store_usable_after_early_close<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &[("a", "1"), ("b", "2"), ("c", "3")]).await?;
    let mut iter = s.range_scan("", "").await.map_err(|e| e.to_string())?;
    iter.next().await.map_err(|e| e.to_string())?;
    iter.close().await.map_err(|e| e.to_string())?;

    seed(&s, &[("d", "4")]).await?;
    let keys = scan_keys(&s, "", "").await?;
    if keys != vec!["a", "b", "c", "d"] {
        return Err(format!("expected [a, b, c, d], got {:?}", keys));
    }
    Ok(())
}

async fn store_usable_after_iterator_drop<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &[("a", "1")]).await?;
    {
        let mut iter = s.range_scan("", "").await.map_err(|e| e.to_string())?;
        iter.next().await.map_err(|e| e.to_string())?;
    }
    seed(&s, &[("b", "2")]).await?;
    let keys = scan_keys(&s, "", "").await?;
    if keys != vec!["a", "b"] {
        return Err(format!("expected [a, b], got {:?}", keys));
    }
    Ok(())
}
