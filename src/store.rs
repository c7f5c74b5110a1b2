//! Key-value store boundary for compressed chunks.
//!
//! The distributed store itself lives outside this crate; [`KeyValueStore`]
//! is the seam it plugs into. A stored [`Value`] pairs the chunk's wire bytes
//! with its encoding tag and decodes them at most once, so every reader that
//! fetches the same value shares one [`Chunk`] instance (and therefore one
//! binding).
//!
//! [`MemoryStore`] is a concurrent in-process implementation backed by a
//! [`DashMap`].

use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use dashmap::DashMap;
use tracing::trace;

use crate::chunk::{Chunk, Encoding};
use crate::error::FvecError;
use crate::key::Key;

/// A stored chunk: encoding tag plus wire bytes, with a decode cache.
#[derive(Debug)]
pub struct Value {
    encoding: Encoding,
    bytes: Bytes,
    decoded: OnceLock<Arc<Chunk>>,
}

impl Value {
    /// Wrap raw wire bytes of the given encoding.
    pub fn new(encoding: Encoding, bytes: impl Into<Bytes>) -> Self {
        Value {
            encoding,
            bytes: bytes.into(),
            decoded: OnceLock::new(),
        }
    }

    /// Wrap a freshly compressed chunk; the chunk itself becomes the cached
    /// decoded form.
    pub fn from_chunk(chunk: Chunk) -> Self {
        let value = Value::new(chunk.encoding(), chunk.write());
        let _ = value.decoded.set(Arc::new(chunk));
        value
    }

    /// The encoding tag.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The wire bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// The decoded chunk, decoding on first access.
    pub fn chunk(&self) -> Result<Arc<Chunk>, FvecError> {
        if let Some(chunk) = self.decoded.get() {
            return Ok(Arc::clone(chunk));
        }
        let chunk = Arc::new(Chunk::read(self.encoding, self.bytes.clone())?);
        // A racing decoder may have won; everyone keeps the first instance.
        Ok(Arc::clone(self.decoded.get_or_init(|| chunk)))
    }
}

/// Get/put access to the store that holds chunks.
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value under `key`, if any.
    fn get(&self, key: &Key) -> Option<Arc<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: Key, value: Value);

    /// Remove the value under `key`.
    fn remove(&self, key: &Key) -> Option<Arc<Value>>;
}

/// Concurrent in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: DashMap<Key, Arc<Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &Key) -> Option<Arc<Value>> {
        self.values.get(key).map(|v| Arc::clone(v.value()))
    }

    fn put(&self, key: Key, value: Value) {
        trace!(%key, encoding = %value.encoding(), bytes = value.bytes().len(), "put");
        self.values.insert(key, Arc::new(value));
    }

    fn remove(&self, key: &Key) -> Option<Arc<Value>> {
        self.values.remove(key).map(|(_, v)| v)
    }
}
