use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::StateError;
use crate::memory::{MemoryIterator, MemoryWorldState};
use crate::traits::WorldState;
use crate::write_set::WriteSet;

/// A world state persisted as a single JSON document on disk.
///
/// The document maps each key to its base64-encoded value. Contents are
/// held in memory and the file is rewritten (temp file + rename) after
/// every mutation, so a crash leaves either the old or the new document.
///
/// Clones share one writer lock, held from the in-memory update through the
/// rename, so the last rename always carries every acknowledged write.
#[derive(Debug, Clone)]
pub struct FileWorldState {
    path: PathBuf,
    memory: MemoryWorldState,
    writer: Arc<Mutex<()>>,
}

impl FileWorldState {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StateError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => decode_document(&path, &text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(unavailable(&path, e)),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened world state file");
        Ok(Self {
            path,
            memory: MemoryWorldState::from_entries(entries),
            writer: Arc::default(),
        })
    }

    /// Start an empty store at `path` without reading it. Any existing
    /// document is replaced on the first write.
    pub fn fresh(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            memory: MemoryWorldState::new(),
            writer: Arc::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// An in-memory copy of the current contents; writes to it never
    /// reach the file.
    pub fn detached(&self) -> Result<MemoryWorldState, StateError> {
        self.memory.detached()
    }

    pub fn is_empty(&self) -> Result<bool, StateError> {
        self.memory.is_empty()
    }

    /// Apply `write_set` in memory and rewrite the file, holding the writer
    /// lock across both.
    fn commit(&self, write_set: WriteSet) -> Result<(), StateError> {
        let _writer = self
            .writer
            .lock()
            .map_err(|_| StateError::Unavailable("world state writer lock poisoned".into()))?;
        let entries = self.memory.apply_and_snapshot(write_set)?;
        self.persist(&entries)
    }

    fn persist(&self, entries: &BTreeMap<String, Vec<u8>>) -> Result<(), StateError> {
        let document: BTreeMap<&str, String> = entries
            .iter()
            .map(|(k, v)| (k.as_str(), BASE64.encode(v)))
            .collect();
        let mut bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| StateError::Backend(format!("encoding world state: {e}")))?;
        bytes.push(b'\n');

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| unavailable(dir, e))?;
        tmp.write_all(&bytes).map_err(|e| unavailable(dir, e))?;
        tmp.persist(&self.path)
            .map_err(|e| unavailable(&self.path, e.error))?;
        Ok(())
    }
}

fn decode_document(path: &Path, text: &str) -> Result<BTreeMap<String, Vec<u8>>, StateError> {
    let document: BTreeMap<String, String> =
        serde_json::from_str(text).map_err(|e| StateError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    document
        .into_iter()
        .map(|(key, encoded)| {
            BASE64
                .decode(encoded.as_bytes())
                .map(|value| (key.clone(), value))
                .map_err(|e| StateError::Corrupt {
                    path: path.to_path_buf(),
                    reason: format!("value for key {key:?}: {e}"),
                })
        })
        .collect()
}

fn unavailable(path: &Path, e: io::Error) -> StateError {
    StateError::Unavailable(format!("{}: {e}", path.display()))
}

#[async_trait]
impl WorldState for FileWorldState {
    type Iter = MemoryIterator;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StateError> {
        self.memory.get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StateError> {
        let mut write_set = WriteSet::new();
        write_set.put(key, value);
        self.commit(write_set)
    }

    async fn delete(&self, key: &str) -> Result<(), StateError> {
        let mut write_set = WriteSet::new();
        write_set.delete(key);
        self.commit(write_set)
    }

    async fn range_scan(&self, start: &str, end: &str) -> Result<MemoryIterator, StateError> {
        self.memory.range_scan(start, end).await
    }

    async fn apply(&self, write_set: WriteSet) -> Result<(), StateError> {
        self.commit(write_set)
    }
}
