use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::StateError;
use crate::traits::{KeyValue, StateIterator, WorldState};
use crate::write_set::{Write, WriteSet};

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, Vec<u8>>,
    open_iterators: usize,
}

/// An in-process world state backed by a `BTreeMap`.
///
/// Cloning the handle shares the underlying map. Every trait method takes
/// the lock for its own duration only; `apply` holds it across the whole
/// write set so a batch lands atomically.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorldState {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryWorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `entries`.
    pub fn from_entries(entries: BTreeMap<String, Vec<u8>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries,
                open_iterators: 0,
            })),
        }
    }

    /// A point-in-time copy of every entry.
    pub fn snapshot(&self) -> Result<BTreeMap<String, Vec<u8>>, StateError> {
        Ok(self.lock()?.entries.clone())
    }

    /// Copy the current contents into an independent store.
    pub fn detached(&self) -> Result<Self, StateError> {
        Ok(Self::from_entries(self.snapshot()?))
    }

    pub fn len(&self) -> Result<usize, StateError> {
        Ok(self.lock()?.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, StateError> {
        Ok(self.lock()?.entries.is_empty())
    }

    /// Number of range iterators opened and not yet released.
    pub fn open_iterators(&self) -> usize {
        match self.inner.lock() {
            Ok(inner) => inner.open_iterators,
            Err(poisoned) => poisoned.into_inner().open_iterators,
        }
    }

    /// Apply `writes` and return the resulting contents, under one lock.
    pub(crate) fn apply_and_snapshot(
        &self,
        writes: WriteSet,
    ) -> Result<BTreeMap<String, Vec<u8>>, StateError> {
        let mut inner = self.lock()?;
        apply_to(&mut inner.entries, writes);
        Ok(inner.entries.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StateError> {
        self.inner
            .lock()
            .map_err(|_| StateError::Unavailable("memory world state lock poisoned".into()))
    }
}

#[async_trait]
impl WorldState for MemoryWorldState {
    type Iter = MemoryIterator;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StateError> {
        self.lock()?.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StateError> {
        self.lock()?.entries.remove(key);
        Ok(())
    }

    async fn range_scan(&self, start: &str, end: &str) -> Result<MemoryIterator, StateError> {
        let mut inner = self.lock()?;
        let entries = if !start.is_empty() && !end.is_empty() && start >= end {
            VecDeque::new()
        } else {
            let lower = if start.is_empty() {
                Bound::Unbounded
            } else {
                Bound::Included(start)
            };
            let upper = if end.is_empty() {
                Bound::Unbounded
            } else {
                Bound::Excluded(end)
            };
            inner
                .entries
                .range::<str, _>((lower, upper))
                .map(|(k, v)| KeyValue {
                    key: k.clone(),
                    value: v.clone(),
                })
                .collect()
        };
        inner.open_iterators += 1;
        Ok(MemoryIterator {
            entries,
            owner: Some(Arc::clone(&self.inner)),
        })
    }

    async fn apply(&self, write_set: WriteSet) -> Result<(), StateError> {
        apply_to(&mut self.lock()?.entries, write_set);
        Ok(())
    }
}

fn apply_to(entries: &mut BTreeMap<String, Vec<u8>>, write_set: WriteSet) {
    for write in write_set {
        match write {
            Write::Put { key, value } => {
                entries.insert(key, value);
            }
            Write::Delete { key } => {
                entries.remove(&key);
            }
        }
    }
}

/// Range iterator over a [`MemoryWorldState`].
///
/// Entries are captured when the scan opens; later writes are not observed.
#[derive(Debug)]
pub struct MemoryIterator {
    entries: VecDeque<KeyValue>,
    owner: Option<Arc<Mutex<Inner>>>,
}

impl MemoryIterator {
    fn release(&mut self) {
        if let Some(owner) = self.owner.take() {
            let mut inner = match owner.lock() {
                Ok(inner) => inner,
                Err(poisoned) => poisoned.into_inner(),
            };
            inner.open_iterators = inner.open_iterators.saturating_sub(1);
        }
        self.entries.clear();
    }
}

#[async_trait]
impl StateIterator for MemoryIterator {
    async fn next(&mut self) -> Result<Option<KeyValue>, StateError> {
        if self.owner.is_none() {
            return Err(StateError::IteratorClosed);
        }
        Ok(self.entries.pop_front())
    }

    async fn close(&mut self) -> Result<(), StateError> {
        self.release();
        Ok(())
    }
}

impl Drop for MemoryIterator {
    fn drop(&mut self) {
        if self.owner.is_some() {
            tracing::warn!("range iterator dropped without close");
            self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inverted_range_is_empty() {
        let s = MemoryWorldState::new();
        s.put("a", b"1".to_vec()).await.unwrap();
        s.put("b", b"2".to_vec()).await.unwrap();

        let mut it = s.range_scan("b", "a").await.unwrap();
        assert_eq!(it.next().await.unwrap(), None);
        it.close().await.unwrap();
        assert_eq!(s.open_iterators(), 0);
    }

    #[tokio::test]
    async fn detached_copy_is_independent() {
        let s = MemoryWorldState::new();
        s.put("a", b"1".to_vec()).await.unwrap();

        let copy = s.detached().unwrap();
        copy.put("b", b"2".to_vec()).await.unwrap();

        assert_eq!(s.len().unwrap(), 1);
        assert_eq!(copy.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let s = MemoryWorldState::new();
        let handle = s.clone();
        handle.put("a", b"1".to_vec()).await.unwrap();
        assert_eq!(s.get("a").await.unwrap(), Some(b"1".to_vec()));
    }
}
