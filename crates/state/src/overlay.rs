use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::StateError;
use crate::traits::{in_range, KeyValue, StateIterator, WorldState};
use crate::write_set::{Write, WriteSet};

/// A transaction's view of a base world state.
///
/// Reads see the transaction's own pending writes first, then fall through
/// to the base store. Writes are buffered in a [`WriteSet`] and never reach
/// the base; the host decides whether to apply or discard them once the
/// transaction finishes.
#[derive(Debug)]
pub struct TxWorldState<S> {
    base: Arc<S>,
    pending: Mutex<WriteSet>,
}

impl<S: WorldState> TxWorldState<S> {
    pub fn new(base: Arc<S>) -> Self {
        Self {
            base,
            pending: Mutex::new(WriteSet::new()),
        }
    }

    /// Finish the transaction and hand back its buffered writes.
    pub fn into_write_set(self) -> WriteSet {
        match self.pending.into_inner() {
            Ok(ws) => ws,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn pending(&self) -> Result<MutexGuard<'_, WriteSet>, StateError> {
        self.pending
            .lock()
            .map_err(|_| StateError::Unavailable("transaction write set lock poisoned".into()))
    }

    async fn drain_base(
        &self,
        start: &str,
        end: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, StateError> {
        let mut iter = self.base.range_scan(start, end).await?;
        let mut entries = BTreeMap::new();
        let drained = loop {
            match iter.next().await {
                Ok(Some(kv)) => {
                    entries.insert(kv.key, kv.value);
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        let closed = iter.close().await;
        drained?;
        closed?;
        Ok(entries)
    }
}

#[async_trait]
impl<S: WorldState> WorldState for TxWorldState<S> {
    type Iter = OverlayIterator;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StateError> {
        let buffered = self.pending()?.latest(key).cloned();
        match buffered {
            Some(Write::Put { value, .. }) => Ok(Some(value)),
            Some(Write::Delete { .. }) => Ok(None),
            None => self.base.get(key).await,
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StateError> {
        self.pending()?.put(key, value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StateError> {
        self.pending()?.delete(key);
        Ok(())
    }

    async fn range_scan(&self, start: &str, end: &str) -> Result<OverlayIterator, StateError> {
        let mut entries = self.drain_base(start, end).await?;
        for write in self.pending()?.iter() {
            if !in_range(write.key(), start, end) {
                continue;
            }
            match write {
                Write::Put { key, value } => {
                    entries.insert(key.clone(), value.clone());
                }
                Write::Delete { key } => {
                    entries.remove(key);
                }
            }
        }
        Ok(OverlayIterator {
            entries: entries
                .into_iter()
                .map(|(key, value)| KeyValue { key, value })
                .collect(),
            closed: false,
        })
    }

    async fn apply(&self, write_set: WriteSet) -> Result<(), StateError> {
        let mut pending = self.pending()?;
        for write in write_set {
            match write {
                Write::Put { key, value } => pending.put(key, value),
                Write::Delete { key } => pending.delete(key),
            }
        }
        Ok(())
    }
}

/// Range iterator over a [`TxWorldState`]: the base scan merged with the
/// transaction's pending writes.
#[derive(Debug)]
pub struct OverlayIterator {
    entries: VecDeque<KeyValue>,
    closed: bool,
}

#[async_trait]
impl StateIterator for OverlayIterator {
    async fn next(&mut self) -> Result<Option<KeyValue>, StateError> {
        if self.closed {
            return Err(StateError::IteratorClosed);
        }
        Ok(self.entries.pop_front())
    }

    async fn close(&mut self) -> Result<(), StateError> {
        self.closed = true;
        self.entries.clear();
        Ok(())
    }
}
