//! Builder that assembles a [`Vector`] from independently filled chunks.
//!
//! Producers ask for a [`NewChunk`] per chunk index, fill it, and hand it back
//! through [`AppendableVector::close_chunk`], which compresses it into the
//! store. The row count of every chunk is only known once it closes, so the
//! layout table is assembled in [`AppendableVector::close`].

use tracing::debug;

use crate::error::FvecError;
use crate::key::{Key, KeyKind};
use crate::new_chunk::NewChunk;
use crate::store::{KeyValueStore, Value};
use crate::vector::Vector;

/// A vector under construction.
#[derive(Debug, Clone)]
pub struct AppendableVector {
    key: Key,
    rows: Vec<Option<u64>>,
    min: f64,
    max: f64,
    sum: f64,
}

impl AppendableVector {
    /// Start building the vector named by `key`.
    pub fn new(key: Key) -> Result<Self, FvecError> {
        if key.kind() != KeyKind::Vec {
            return Err(FvecError::InvalidKey(format!("{} is not a vector key", key)));
        }
        Ok(AppendableVector {
            key,
            rows: Vec::new(),
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
        })
    }

    /// The key the finished vector will carry.
    pub fn key(&self) -> &Key {
        &self.key
    }

    fn check_open(&self, cidx: usize) -> Result<Key, FvecError> {
        let key = self.key.try_chunk_key(cidx)?;
        if let Some(Some(_)) = self.rows.get(cidx) {
            return Err(FvecError::InvalidLayout(format!(
                "chunk {} of {} already closed",
                cidx, self.key
            )));
        }
        Ok(key)
    }

    /// An empty builder for chunk `cidx`, which must not be closed yet.
    ///
    /// Its global start is unknown until every earlier chunk has closed, so
    /// the builder counts rows from 0.
    pub fn new_chunk(&self, cidx: usize) -> Result<NewChunk, FvecError> {
        self.check_open(cidx)?;
        Ok(NewChunk::new(0))
    }

    /// Compress `chunk` and store it as chunk `cidx`.
    ///
    /// Chunks may close in any order, but each index only once.
    pub fn close_chunk<S>(
        &mut self,
        store: &S,
        cidx: usize,
        chunk: NewChunk,
    ) -> Result<(), FvecError>
    where
        S: KeyValueStore + ?Sized,
    {
        let key = self.check_open(cidx)?;
        if self.rows.len() <= cidx {
            self.rows.resize(cidx + 1, None);
        }
        let stats = chunk.stats();
        self.rows[cidx] = Some(stats.rows as u64);
        self.min = self.min.min(stats.min);
        self.max = self.max.max(stats.max);
        self.sum += stats.sum;

        let compressed = chunk.compress();
        debug!(
            vec = %self.key,
            cidx,
            rows = stats.rows,
            encoding = %compressed.encoding(),
            "chunk closed"
        );
        store.put(key, Value::from_chunk(compressed));
        Ok(())
    }

    /// Finish the vector. Every chunk index below the highest closed one must
    /// have been closed.
    pub fn close(self) -> Result<Vector, FvecError> {
        let mut espc = Vec::with_capacity(self.rows.len() + 1);
        espc.push(0u64);
        let mut total = 0u64;
        for (cidx, rows) in self.rows.iter().enumerate() {
            let rows = rows.ok_or_else(|| {
                FvecError::InvalidLayout(format!("chunk {} of {} never closed", cidx, self.key))
            })?;
            total += rows;
            espc.push(total);
        }
        // No values at all: aggregates are unknown.
        let (min, max) = if self.min > self.max {
            (f64::NAN, f64::NAN)
        } else {
            (self.min, self.max)
        };
        Vector::new(self.key, espc, min, max, self.sum)
    }
}
