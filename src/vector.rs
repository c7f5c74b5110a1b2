//! Distributed vector metadata and row-to-chunk addressing.
//!
//! A [`Vector`] never holds row data. It owns the partition of its rows into
//! chunks and a few scalar aggregates, and turns a row index into a chunk
//! index, a chunk index into a store [`Key`], and a fetched chunk into one
//! bound to this vector.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::chunk::Chunk;
use crate::error::FvecError;
use crate::key::{Key, KeyKind};
use crate::store::{KeyValueStore, Value};

/// How a vector's rows are partitioned into chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkLayout {
    /// Element-start-per-chunk table: `n_chunks + 1` non-decreasing entries,
    /// starting at 0 and ending at the row count.
    Variable(Vec<u64>),
    /// Fixed-size chunks of `chunk_rows` rows; the last one may be shorter.
    Uniform {
        /// Total row count.
        len: u64,
        /// Rows per chunk.
        chunk_rows: u64,
    },
}

impl ChunkLayout {
    fn validate(&self) -> Result<(), FvecError> {
        match self {
            ChunkLayout::Variable(espc) => {
                if espc.first() != Some(&0) {
                    return Err(FvecError::InvalidLayout(
                        "espc must start with 0".to_string(),
                    ));
                }
                if let Some(w) = espc.windows(2).find(|w| w[0] > w[1]) {
                    return Err(FvecError::InvalidLayout(format!(
                        "espc decreases from {} to {}",
                        w[0], w[1]
                    )));
                }
                Ok(())
            }
            ChunkLayout::Uniform { chunk_rows, .. } => {
                if *chunk_rows == 0 {
                    return Err(FvecError::InvalidLayout(
                        "uniform chunk size must be positive".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Total number of rows.
    pub fn len(&self) -> u64 {
        match self {
            ChunkLayout::Variable(espc) => espc.last().copied().unwrap_or(0),
            ChunkLayout::Uniform { len, .. } => *len,
        }
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of chunks.
    pub fn n_chunks(&self) -> usize {
        match self {
            ChunkLayout::Variable(espc) => espc.len().saturating_sub(1),
            ChunkLayout::Uniform { len, chunk_rows } => match chunk_rows {
                0 => 0,
                rows => len.div_ceil(*rows) as usize,
            },
        }
    }

    /// The chunk holding row `i`.
    pub fn elem2chunk_idx(&self, i: u64) -> Result<usize, FvecError> {
        let len = self.len();
        if i >= len {
            return Err(FvecError::OutOfRange { index: i, len });
        }
        Ok(match self {
            // Last chunk whose start is <= i; skips empty chunks.
            ChunkLayout::Variable(espc) => espc.partition_point(|&s| s <= i).saturating_sub(1),
            ChunkLayout::Uniform { chunk_rows, .. } => {
                i.checked_div(*chunk_rows).unwrap_or(0) as usize
            }
        })
    }

    /// First row of chunk `cidx`; `cidx == n_chunks()` yields the row count.
    pub fn chunk2start_elem(&self, cidx: usize) -> Result<u64, FvecError> {
        let n = self.n_chunks();
        if cidx > n {
            return Err(FvecError::OutOfRange {
                index: cidx as u64,
                len: n as u64 + 1,
            });
        }
        Ok(match self {
            ChunkLayout::Variable(espc) => espc.get(cidx).copied().unwrap_or(0),
            ChunkLayout::Uniform { len, chunk_rows } => (cidx as u64 * chunk_rows).min(*len),
        })
    }

    /// Row count of chunk `cidx`.
    pub fn chunk_len(&self, cidx: usize) -> Result<u64, FvecError> {
        if cidx >= self.n_chunks() {
            return Err(FvecError::OutOfRange {
                index: cidx as u64,
                len: self.n_chunks() as u64,
            });
        }
        Ok(self.chunk2start_elem(cidx + 1)? - self.chunk2start_elem(cidx)?)
    }
}

/// A distributed column: chunk layout plus scalar aggregates.
#[derive(Debug, Clone)]
pub struct Vector {
    key: Key,
    layout: ChunkLayout,
    min: f64,
    max: f64,
    sum: f64,
}

impl Vector {
    /// Create a vector over a variable-size chunk table.
    pub fn new(key: Key, espc: Vec<u64>, min: f64, max: f64, sum: f64) -> Result<Self, FvecError> {
        Self::with_layout(key, ChunkLayout::Variable(espc), min, max, sum)
    }

    /// Create a vector with fixed-size chunks.
    pub fn uniform(
        key: Key,
        len: u64,
        chunk_rows: u64,
        min: f64,
        max: f64,
        sum: f64,
    ) -> Result<Self, FvecError> {
        Self::with_layout(key, ChunkLayout::Uniform { len, chunk_rows }, min, max, sum)
    }

    /// Create a vector with an explicit layout. Pass NaN for an unknown `min`.
    pub fn with_layout(
        key: Key,
        layout: ChunkLayout,
        min: f64,
        max: f64,
        sum: f64,
    ) -> Result<Self, FvecError> {
        if key.kind() != KeyKind::Vec {
            return Err(FvecError::InvalidKey(format!("{} is not a vector key", key)));
        }
        layout.validate()?;
        Ok(Vector {
            key,
            layout,
            min,
            max,
            sum,
        })
    }

    /// The vector key.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The chunk layout.
    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    /// Smallest value, NaN if unknown.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest value.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Sum of all values.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Number of rows.
    pub fn len(&self) -> u64 {
        self.layout.len()
    }

    /// Whether the vector has no rows.
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Number of chunks.
    pub fn n_chunks(&self) -> usize {
        self.layout.n_chunks()
    }

    /// The chunk holding row `i`, in `O(log n_chunks)`.
    pub fn elem2chunk_idx(&self, i: u64) -> Result<usize, FvecError> {
        self.layout.elem2chunk_idx(i)
    }

    /// First row of chunk `cidx`.
    pub fn chunk2start_elem(&self, cidx: usize) -> Result<u64, FvecError> {
        self.layout.chunk2start_elem(cidx)
    }

    /// Store key of chunk `cidx`; indices beyond `u32` are out of range.
    pub fn chunk_key(&self, cidx: usize) -> Result<Key, FvecError> {
        self.key.try_chunk_key(cidx)
    }

    /// Fetch the stored value of chunk `cidx`.
    pub fn chunk_idx<S>(&self, store: &S, cidx: usize) -> Result<Arc<Value>, FvecError>
    where
        S: KeyValueStore + ?Sized,
    {
        let key = self.chunk_key(cidx)?;
        match store.get(&key) {
            Some(value) => Ok(value),
            None => {
                debug!(vec = %self.key, cidx, "chunk missing from store");
                Err(FvecError::MissingChunk(key))
            }
        }
    }

    /// Fetch chunk `cidx` and bind it to this vector.
    ///
    /// Repeated and concurrent calls return the same bound instance.
    pub fn elem2bv<S>(&self, store: &S, cidx: usize) -> Result<Arc<Chunk>, FvecError>
    where
        S: KeyValueStore + ?Sized,
    {
        let expected = self.layout.chunk_len(cidx)?;
        let start = self.chunk2start_elem(cidx)?;
        let chunk = self.chunk_idx(store, cidx)?.chunk()?;
        if chunk.len() as u64 != expected {
            return Err(FvecError::InvalidLayout(format!(
                "chunk {} of {} holds {} rows, layout says {}",
                cidx,
                self.key,
                chunk.len(),
                expected
            )));
        }
        if !chunk.is_bound() {
            trace!(vec = %self.key, cidx, start, "binding chunk");
        }
        chunk.bind(start, &self.key)?;
        Ok(chunk)
    }

    /// The chunk following `chunk`, or `None` after the last one.
    pub fn next_bv<S>(&self, store: &S, chunk: &Chunk) -> Result<Option<Arc<Chunk>>, FvecError>
    where
        S: KeyValueStore + ?Sized,
    {
        let start = chunk.start().ok_or(FvecError::Unbound)?;
        if chunk.vec_key() != Some(&self.key) {
            return Err(FvecError::InvalidLayout(format!(
                "chunk is not bound to {}",
                self.key
            )));
        }
        let next = start + chunk.len() as u64;
        if next >= self.len() {
            return Ok(None);
        }
        let cidx = self.elem2chunk_idx(next)?;
        self.elem2bv(store, cidx).map(Some)
    }

    /// Iterate over every chunk in row order, each bound to this vector.
    pub fn chunks<'a, S>(&'a self, store: &'a S) -> Chunks<'a, S>
    where
        S: KeyValueStore + ?Sized,
    {
        Chunks {
            vec: self,
            store,
            current: None,
            done: false,
        }
    }

    /// Row `i` as an integer; `None` when missing.
    pub fn get<S>(&self, store: &S, i: u64) -> Result<Option<i64>, FvecError>
    where
        S: KeyValueStore + ?Sized,
    {
        self.elem2bv(store, self.elem2chunk_idx(i)?)?.at(i)
    }

    /// Row `i` as a double; NaN when missing.
    pub fn getd<S>(&self, store: &S, i: u64) -> Result<f64, FvecError>
    where
        S: KeyValueStore + ?Sized,
    {
        self.elem2bv(store, self.elem2chunk_idx(i)?)?.atd(i)
    }

    /// Whether row `i` is missing.
    pub fn is_na<S>(&self, store: &S, i: u64) -> Result<bool, FvecError>
    where
        S: KeyValueStore + ?Sized,
    {
        self.elem2bv(store, self.elem2chunk_idx(i)?)?.is_na_at(i)
    }
}

impl fmt::Display for Vector {
    /// `[len]`, or `[len,min/mean/max]` when `min` is known.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min.is_nan() {
            write!(f, "[{}]", self.len())
        } else {
            write!(
                f,
                "[{},{}/{}/{}]",
                self.len(),
                self.min,
                self.sum / self.len() as f64,
                self.max
            )
        }
    }
}

/// Sequential scan over the bound chunks of a vector.
pub struct Chunks<'a, S: ?Sized> {
    vec: &'a Vector,
    store: &'a S,
    current: Option<Arc<Chunk>>,
    done: bool,
}

impl<'a, S> Iterator for Chunks<'a, S>
where
    S: KeyValueStore + ?Sized,
{
    type Item = Result<Arc<Chunk>, FvecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = match &self.current {
            None if self.vec.is_empty() => Ok(None),
            None => self
                .vec
                .elem2chunk_idx(0)
                .and_then(|cidx| self.vec.elem2bv(self.store, cidx))
                .map(Some),
            Some(chunk) => self.vec.next_bv(self.store, chunk),
        };
        match next {
            Ok(Some(chunk)) => {
                self.current = Some(Arc::clone(&chunk));
                Some(Ok(chunk))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
