use sha2::{Digest, Sha256};

/// A single buffered mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

impl Write {
    pub fn key(&self) -> &str {
        match self {
            Write::Put { key, .. } | Write::Delete { key } => key,
        }
    }
}

/// The ordered writes produced by one transaction.
///
/// Two executions of the same transition against the same prior state must
/// produce equal write sets; [`WriteSet::digest`] is the value replicas
/// compare to check that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSet {
    writes: Vec<Write>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.writes.push(Write::Put {
            key: key.into(),
            value,
        });
    }

    pub fn delete(&mut self, key: impl Into<String>) {
        self.writes.push(Write::Delete { key: key.into() });
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Write> {
        self.writes.iter()
    }

    /// The latest pending write for `key`, if any.
    pub fn latest(&self, key: &str) -> Option<&Write> {
        self.writes.iter().rev().find(|w| w.key() == key)
    }

    /// Lowercase hex SHA-256 over every write in order.
    ///
    /// Each write is encoded as a tag byte (`P` or `D`) followed by
    /// big-endian u64 length-prefixed key and value bytes, so no two
    /// distinct write sets share an encoding.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for write in &self.writes {
            match write {
                Write::Put { key, value } => {
                    hasher.update(b"P");
                    hasher.update((key.len() as u64).to_be_bytes());
                    hasher.update(key.as_bytes());
                    hasher.update((value.len() as u64).to_be_bytes());
                    hasher.update(value);
                }
                Write::Delete { key } => {
                    hasher.update(b"D");
                    hasher.update((key.len() as u64).to_be_bytes());
                    hasher.update(key.as_bytes());
                }
            }
        }
        format!("{:x}", hasher.finalize())
    }
}

impl IntoIterator for WriteSet {
    type Item = Write;
    type IntoIter = std::vec::IntoIter<Write>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

impl<'a> IntoIterator for &'a WriteSet {
    type Item = &'a Write;
    type IntoIter = std::slice::Iter<'a, Write>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.iter()
    }
}
