//! State transitions for engine records.
//!
//! Every operation borrows the world state for one transaction, re-reads
//! whatever it needs, and performs at most one write or delete per record
//! it touches. Nothing is cached between calls, and nothing here reads the
//! clock or a random source: the same arguments against the same prior
//! state always produce the same writes and the same return value.

use enginelife_state::{StateError, StateIterator, WorldState};
use tracing::{debug, info, warn};

use crate::canonical::to_canonical_vec;
use crate::error::ContractError;
use crate::record::{EngineAttributes, EngineRecord, ListEntry};
use crate::seed::bootstrap_engines;

/// The engine lifecycle contract, bound to one transaction's world state.
#[derive(Debug)]
pub struct EngineLifecycle<'a, S> {
    state: &'a S,
}

impl<'a, S: WorldState> EngineLifecycle<'a, S> {
    pub fn new(state: &'a S) -> Self {
        Self { state }
    }

    /// Seed the bootstrap records. Re-running overwrites them with the same
    /// values.
    pub async fn init(&self) -> Result<(), ContractError> {
        for record in bootstrap_engines() {
            let bytes = to_canonical_vec(&record)?;
            self.state.put(&record.id, bytes).await?;
            info!(engine = %record.id, "seeded engine");
        }
        Ok(())
    }

    /// Create a new record with an empty service history.
    ///
    /// Returns the canonical bytes written. Fails with
    /// [`ContractError::AlreadyExists`] if `id` is present.
    pub async fn create(
        &self,
        id: &str,
        attrs: EngineAttributes,
    ) -> Result<Vec<u8>, ContractError> {
        if self.exists(id).await? {
            return Err(ContractError::AlreadyExists { id: id.to_string() });
        }
        let record = EngineRecord::new(id, attrs);
        let bytes = to_canonical_vec(&record)?;
        self.state.put(id, bytes.clone()).await?;
        info!(engine = id, owner = %record.owner, "engine created");
        Ok(bytes)
    }

    /// The stored bytes for `id`, exactly as written.
    pub async fn read(&self, id: &str) -> Result<Vec<u8>, ContractError> {
        debug!(engine = id, "reading engine");
        match self.state.get(id).await? {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(ContractError::NotFound { id: id.to_string() }),
        }
    }

    /// Replace make, model, age, condition, and owner. The service history
    /// is carried over from the stored record.
    pub async fn update(
        &self,
        id: &str,
        attrs: EngineAttributes,
    ) -> Result<Vec<u8>, ContractError> {
        let mut record = self.load(id).await?;
        record.replace_attributes(attrs);
        let bytes = self.store(&record).await?;
        info!(engine = id, "engine updated");
        Ok(bytes)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ContractError> {
        if !self.exists(id).await? {
            return Err(ContractError::NotFound { id: id.to_string() });
        }
        self.state.delete(id).await?;
        info!(engine = id, "engine deleted");
        Ok(())
    }

    /// True iff a non-empty value is stored under `id`.
    ///
    /// Only a failing store can make this return an error.
    pub async fn exists(&self, id: &str) -> Result<bool, StateError> {
        Ok(self
            .state
            .get(id)
            .await?
            .is_some_and(|bytes| !bytes.is_empty()))
    }

    /// Hand the engine to `new_owner`, returning the previous owner.
    pub async fn transfer_owner(
        &self,
        id: &str,
        new_owner: &str,
    ) -> Result<String, ContractError> {
        let mut record = self.load(id).await?;
        let old_owner = std::mem::replace(&mut record.owner, new_owner.to_string());
        self.store(&record).await?;
        info!(engine = id, from = %old_owner, to = new_owner, "ownership transferred");
        Ok(old_owner)
    }

    /// Append `details` to the service history, returning the updated record.
    pub async fn add_service_record(
        &self,
        id: &str,
        details: &str,
    ) -> Result<Vec<u8>, ContractError> {
        let mut record = self.load(id).await?;
        record.services.push(details.to_string());
        let bytes = self.store(&record).await?;
        info!(engine = id, services = record.services.len(), "service record added");
        Ok(bytes)
    }

    /// Every entry in the world state, in scan order.
    ///
    /// Entries that fail to decode are returned as [`ListEntry::Raw`]. The
    /// scan iterator is closed on every path, including when the store
    /// fails mid-scan.
    pub async fn list_all(&self) -> Result<Vec<ListEntry>, ContractError> {
        let mut iter = self.state.range_scan("", "").await?;
        let mut entries = Vec::new();
        let scanned = loop {
            match iter.next().await {
                Ok(Some(kv)) => entries.push(decode_entry(&kv.key, kv.value)),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        let closed = iter.close().await;
        scanned?;
        closed?;
        debug!(entries = entries.len(), "listed engines");
        Ok(entries)
    }

    /// [`list_all`](Self::list_all) encoded as a canonical JSON array.
    pub async fn list_all_encoded(&self) -> Result<Vec<u8>, ContractError> {
        let entries = self.list_all().await?;
        Ok(to_canonical_vec(&entries)?)
    }

    async fn load(&self, id: &str) -> Result<EngineRecord, ContractError> {
        let bytes = self.read(id).await?;
        serde_json::from_slice(&bytes).map_err(|source| ContractError::Decode {
            id: id.to_string(),
            source,
        })
    }

    async fn store(&self, record: &EngineRecord) -> Result<Vec<u8>, ContractError> {
        let bytes = to_canonical_vec(record)?;
        self.state.put(&record.id, bytes.clone()).await?;
        Ok(bytes)
    }
}

fn decode_entry(key: &str, value: Vec<u8>) -> ListEntry {
    match serde_json::from_slice::<EngineRecord>(&value) {
        Ok(record) => ListEntry::Record(record),
        Err(e) => {
            warn!(key = %key, error = %e, "undecodable world state entry, returning raw value");
            let raw = match String::from_utf8(value) {
                Ok(s) => s,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            };
            ListEntry::Raw(raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_entry_falls_back_to_raw_text() {
        assert_eq!(
            decode_entry("k", b"plain text".to_vec()),
            ListEntry::Raw("plain text".into())
        );
    }

    #[test]
    fn decode_entry_renders_invalid_utf8_lossily() {
        match decode_entry("k", vec![b'a', 0xff]) {
            ListEntry::Raw(s) => assert_eq!(s, "a\u{fffd}"),
            other => panic!("expected raw entry, got {other:?}"),
        }
    }
}
