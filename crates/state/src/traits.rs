use async_trait::async_trait;

use crate::error::StateError;
use crate::write_set::{Write, WriteSet};

/// One entry yielded by a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// The key-value world state the ledger contract runs against.
///
/// A `WorldState` is provided by the host runtime. The contract only needs
/// point reads, point writes, point deletes, and ordered range scans; any
/// concurrency control (serialized execution, MVCC conflict checks) belongs
/// to the host and is invisible at this boundary.
///
/// ## Range scans
///
/// `range_scan(start, end)` iterates keys in `[start, end)` in ascending
/// byte order. An empty `start` begins at the lowest key and an empty `end`
/// runs to the highest, so `range_scan("", "")` visits the whole keyspace.
///
/// The returned iterator holds backend resources until it is released.
/// Callers must call [`StateIterator::close`] on every exit path; dropping
/// an unclosed iterator also releases it, but backends may log the leak.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so a single store can be
/// shared across async tasks.
#[async_trait]
pub trait WorldState: Send + Sync + 'static {
    /// Iterator type returned by [`WorldState::range_scan`].
    type Iter: StateIterator;

    /// Read the value stored under `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StateError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StateError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StateError>;

    /// Open an ordered iterator over `[start, end)`.
    async fn range_scan(&self, start: &str, end: &str) -> Result<Self::Iter, StateError>;

    /// Apply a transaction's write set in order.
    ///
    /// The default replays each write individually. Backends that can apply
    /// a batch atomically should override this.
    async fn apply(&self, write_set: WriteSet) -> Result<(), StateError> {
        for write in write_set {
            match write {
                Write::Put { key, value } => self.put(&key, value).await?,
                Write::Delete { key } => self.delete(&key).await?,
            }
        }
        Ok(())
    }
}

/// A cursor over the entries of a range scan.
#[async_trait]
pub trait StateIterator: Send {
    /// Advance to the next entry, or `None` once the range is exhausted.
    ///
    /// Returns `Err(StateError::IteratorClosed)` after [`close`](Self::close).
    async fn next(&mut self) -> Result<Option<KeyValue>, StateError>;

    /// Release the iterator. Closing twice is a no-op.
    async fn close(&mut self) -> Result<(), StateError>;
}

/// True if `key` falls inside the half-open scan range `[start, end)`,
/// treating empty bounds as unbounded.
pub fn in_range(key: &str, start: &str, end: &str) -> bool {
    (start.is_empty() || key >= start) && (end.is_empty() || key < end)
}
