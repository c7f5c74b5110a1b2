//! # fvec-rs
//!
//! Compressed chunk storage for distributed columnar vectors.
//!
//! A [`Vector`] is a logically contiguous column of numbers split into
//! chunks. Each chunk is stored on its own under a [`Key`] derived from the
//! vector key, and is encoded with the narrowest fixed-width representation
//! that holds every value of that chunk.
//!
//! ## Overview
//!
//! Rows are written as decimals (`mantissa * 10^exponent`) into a
//! [`NewChunk`]. Compressing it picks an [`Encoding`]:
//!
//! | Encoding | Bytes/row | Holds |
//! |----------|-----------|-------|
//! | C1   | 1 | integers in `0..=254` |
//! | C1S  | 1 | decimals spanning fewer than 255 steps of a shared scale |
//! | C2   | 2 | integers in `-32767..=32767` |
//! | C2S  | 2 | decimals spanning fewer than 65535 steps of a shared scale |
//! | C4   | 4 | 32-bit integers |
//! | C4F  | 4 | values exact to single precision |
//! | C8D  | 8 | anything else |
//!
//! Every encoding has a missing-value code, so NA rows never widen a chunk.
//! Decoding the integer and scaled encodings reproduces the written decimal
//! exactly.
//!
//! ## Quick Start
//!
//! ```rust
//! use fvec_rs::{AppendableVector, Key, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let mut av = AppendableVector::new(Key::vec("prices")).unwrap();
//!
//! let mut chunk = av.new_chunk(0).unwrap();
//! chunk.append(1999, -2); // 19.99
//! chunk.append(2450, -2); // 24.50
//! chunk.append_na();
//! av.close_chunk(&store, 0, chunk).unwrap();
//!
//! let vec = av.close().unwrap();
//! assert_eq!(vec.getd(&store, 1).unwrap(), 24.5);
//! assert!(vec.is_na(&store, 2).unwrap());
//! ```
//!
//! ## Addressing
//!
//! A vector keeps a table of chunk start rows, so finding the chunk of a row
//! is a binary search and finding the store key of a chunk is a pure function
//! of the vector key. Chunks decoded from the store are bound to their vector
//! on first access; concurrent readers share one bound instance.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod appendable;
mod chunk;
mod error;
mod key;
mod new_chunk;
pub mod precision;
mod store;
mod task;
mod vector;

pub use appendable::AppendableVector;
pub use chunk::{Chunk, ChunkWriter, Encoding, C1_NA, C2_NA, C4_NA, SCALED_HEADER_LEN};
pub use error::FvecError;
pub use key::{Key, KeyKind, KEY_PREFIX_LEN, NOT_HOMED};
pub use new_chunk::{ChunkStats, NewChunk};
pub use store::{KeyValueStore, MemoryStore, Value};
pub use task::{run_local, MapReduce};
pub use vector::{ChunkLayout, Chunks, Vector};

/// Convenience type alias for Results with FvecError.
pub type Result<T> = std::result::Result<T, FvecError>;
