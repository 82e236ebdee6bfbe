//! Iterator release accounting for the in-memory backend.

use std::sync::Arc;

use enginelife_state::{MemoryWorldState, StateIterator, TxWorldState, WorldState};

async fn seeded() -> MemoryWorldState {
    let s = MemoryWorldState::new();
    for key in ["a", "b", "c"] {
        s.put(key, key.as_bytes().to_vec()).await.unwrap();
    }
    s
}

#[tokio::test]
async fn exhausted_then_closed_iterator_is_released() {
    let s = seeded().await;
    let mut iter = s.range_scan("", "").await.unwrap();
    assert_eq!(s.open_iterators(), 1);
    while iter.next().await.unwrap().is_some() {}
    iter.close().await.unwrap();
    assert_eq!(s.open_iterators(), 0);
}

#[tokio::test]
async fn early_close_releases_iterator() {
    let s = seeded().await;
    let mut iter = s.range_scan("", "").await.unwrap();
    iter.next().await.unwrap();
    iter.close().await.unwrap();
    iter.close().await.unwrap();
    assert_eq!(s.open_iterators(), 0);
}

#[tokio::test]
async fn dropped_iterator_is_released() {
    let s = seeded().await;
    {
        let _iter = s.range_scan("a", "c").await.unwrap();
        assert_eq!(s.open_iterators(), 1);
    }
    assert_eq!(s.open_iterators(), 0);
}

#[tokio::test]
async fn scan_does_not_observe_later_writes() {
    let s = seeded().await;
    let mut iter = s.range_scan("", "").await.unwrap();
    s.put("d", b"d".to_vec()).await.unwrap();

    let mut keys = Vec::new();
    while let Some(kv) = iter.next().await.unwrap() {
        keys.push(kv.key);
    }
    iter.close().await.unwrap();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn overlay_scan_releases_base_iterator() {
    let s = Arc::new(seeded().await);
    let tx = TxWorldState::new(Arc::clone(&s));
    tx.put("bb", b"bb".to_vec()).await.unwrap();

    let mut iter = tx.range_scan("", "").await.unwrap();
    assert_eq!(s.open_iterators(), 0);

    let mut keys = Vec::new();
    while let Some(kv) = iter.next().await.unwrap() {
        keys.push(kv.key);
    }
    iter.close().await.unwrap();
    assert_eq!(keys, vec!["a", "b", "bb", "c"]);
}
