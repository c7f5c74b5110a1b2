//! Store keys for vectors and their data chunks.
//!
//! ## Key Layout
//!
//! - Kind tag (1 byte): [`KeyKind::Vec`] or [`KeyKind::DataChunk`]
//! - Home hint (1 byte): 0 for vector keys, 0xFF ("not homed") for chunk keys
//! - Chunk index (4 bytes, i32 LE): 0 for vector keys
//! - Name (remaining bytes): shared verbatim by a vector and all of its chunks
//!
//! A chunk key is a pure function of the vector key and the chunk index, so a
//! reader can locate any chunk without consulting an index structure.

use std::fmt;

use bytes::Bytes;

use crate::error::FvecError;

/// Size of the fixed key prefix before the name bytes.
pub const KEY_PREFIX_LEN: usize = 6;

/// Home hint written into chunk keys: no preferred node.
pub const NOT_HOMED: u8 = 0xFF;

const VEC_TAG: u8 = 14;
const DATA_CHUNK_TAG: u8 = 15;

/// The kind of object a key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// A distributed vector.
    Vec,
    /// One compressed chunk of a vector.
    DataChunk,
}

impl KeyKind {
    fn to_byte(self) -> u8 {
        match self {
            KeyKind::Vec => VEC_TAG,
            KeyKind::DataChunk => DATA_CHUNK_TAG,
        }
    }

    fn from_byte(b: u8) -> Option<Self> {
        match b {
            VEC_TAG => Some(KeyKind::Vec),
            DATA_CHUNK_TAG => Some(KeyKind::DataChunk),
            _ => None,
        }
    }
}

/// An opaque, structured store key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Key {
    bits: Bytes,
}

impl Key {
    /// Build a vector key for a user-visible name.
    pub fn vec(name: &str) -> Self {
        let mut bits = Vec::with_capacity(KEY_PREFIX_LEN + name.len());
        bits.push(KeyKind::Vec.to_byte());
        bits.push(0);
        bits.extend_from_slice(&0i32.to_le_bytes());
        bits.extend_from_slice(name.as_bytes());
        Key { bits: bits.into() }
    }

    /// Parse a key from raw bytes, validating the prefix.
    pub fn from_bytes(bits: impl Into<Bytes>) -> Result<Self, FvecError> {
        let bits = bits.into();
        if bits.len() < KEY_PREFIX_LEN {
            return Err(FvecError::InvalidKey(format!(
                "key too short: {} bytes",
                bits.len()
            )));
        }
        if KeyKind::from_byte(bits[0]).is_none() {
            return Err(FvecError::InvalidKey(format!("unknown kind tag {}", bits[0])));
        }
        Ok(Key { bits })
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// The kind tag of this key.
    pub fn kind(&self) -> KeyKind {
        // Validated on construction.
        KeyKind::from_byte(self.bits[0]).unwrap_or(KeyKind::Vec)
    }

    /// The home hint byte.
    pub fn home(&self) -> u8 {
        self.bits[1]
    }

    /// The 4-byte integer field: the chunk index for chunk keys.
    pub fn chunk_index(&self) -> i32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bits[2..KEY_PREFIX_LEN]);
        i32::from_le_bytes(raw)
    }

    /// The name bytes shared between a vector and its chunks.
    pub fn name(&self) -> &[u8] {
        &self.bits[KEY_PREFIX_LEN..]
    }

    /// Derive the data-chunk key for chunk `cidx` of this vector key.
    ///
    /// The kind is retagged, the home hint cleared and the chunk index
    /// written; every other byte is inherited unchanged.
    pub fn chunk_key(&self, cidx: u32) -> Key {
        let mut bits = self.bits.to_vec();
        bits[0] = KeyKind::DataChunk.to_byte();
        bits[1] = NOT_HOMED;
        bits[2..KEY_PREFIX_LEN].copy_from_slice(&(cidx as i32).to_le_bytes());
        Key { bits: bits.into() }
    }

    /// [`Key::chunk_key`] for a `usize` index, rejecting indices that do not
    /// fit the 4-byte field.
    pub fn try_chunk_key(&self, cidx: usize) -> Result<Key, FvecError> {
        let cidx32 = u32::try_from(cidx).map_err(|_| FvecError::OutOfRange {
            index: cidx as u64,
            len: u64::from(u32::MAX) + 1,
        })?;
        Ok(self.chunk_key(cidx32))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = String::from_utf8_lossy(self.name());
        match self.kind() {
            KeyKind::Vec => write!(f, "vec:{}", name),
            KeyKind::DataChunk => write!(f, "chunk:{}#{}", name, self.chunk_index()),
        }
    }
}
