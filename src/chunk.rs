//! Immutable fixed-width chunk decoders.
//!
//! A [`Chunk`] is one compressed block of consecutive rows of a vector. The
//! encoding is a closed family of seven fixed-width layouts, each reserving one
//! code point for NA:
//!
//! | Encoding | Width | Header | Value | NA |
//! |---|---|---|---|---|
//! | C1  | 1 | -            | `u8`                  | `0xFF` |
//! | C1S | 1 | scale + bias | `(u8 + bias) * scale` | `0xFF` |
//! | C2  | 2 | -            | `i16`                 | `i16::MIN` |
//! | C2S | 2 | scale + bias | `(i16 + bias) * scale`| `i16::MIN` |
//! | C4  | 4 | -            | `i32`                 | `i32::MIN` |
//! | C4F | 4 | -            | `f32`                 | NaN |
//! | C8D | 8 | -            | `f64`                 | NaN |
//!
//! ## Wire Format
//!
//! - Scale (8 bytes, f64 LE), scaled encodings only
//! - Bias (4 bytes, i32 LE), scaled encodings only
//! - Payload: `len` packed little-endian elements
//!
//! The row count is derived from the payload size. The global row offset and
//! the owning vector are not part of the bytes; a decoded chunk starts unbound
//! and is attached to its vector by [`Chunk::bind`].

use std::fmt;
use std::sync::OnceLock;

use bytes::Bytes;

use crate::error::FvecError;
use crate::key::Key;
use crate::precision::{pow10i, scale_exponent, scale_f64};

/// Header size of the scaled encodings: f64 scale followed by i32 bias.
pub const SCALED_HEADER_LEN: usize = 8 + 4;

/// NA code for byte encodings.
pub const C1_NA: u8 = 0xFF;

/// NA code for short encodings.
pub const C2_NA: i16 = i16::MIN;

/// NA code for the int encoding.
pub const C4_NA: i32 = i32::MIN;

/// The fixed-width layout of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Raw unsigned bytes.
    C1,
    /// Scaled and biased bytes.
    C1S,
    /// Raw signed shorts.
    C2,
    /// Scaled and biased shorts.
    C2S,
    /// Raw signed ints.
    C4,
    /// Per-row single-precision floats (lossy).
    C4F,
    /// Per-row double-precision floats.
    C8D,
}

impl Encoding {
    /// Every encoding, narrowest first.
    pub const ALL: [Encoding; 7] = [
        Encoding::C1,
        Encoding::C1S,
        Encoding::C2,
        Encoding::C2S,
        Encoding::C4,
        Encoding::C4F,
        Encoding::C8D,
    ];

    /// Bytes per row.
    pub fn width(self) -> usize {
        match self {
            Encoding::C1 | Encoding::C1S => 1,
            Encoding::C2 | Encoding::C2S => 2,
            Encoding::C4 | Encoding::C4F => 4,
            Encoding::C8D => 8,
        }
    }

    /// Whether the layout carries a scale/bias header.
    pub fn is_scaled(self) -> bool {
        matches!(self, Encoding::C1S | Encoding::C2S)
    }

    /// Header bytes preceding the payload.
    pub fn header_len(self) -> usize {
        if self.is_scaled() {
            SCALED_HEADER_LEN
        } else {
            0
        }
    }

    /// Whether the layout stores floating-point rows, so that decoded values
    /// are only guaranteed within the float's precision.
    pub fn is_lossy(self) -> bool {
        matches!(self, Encoding::C4F | Encoding::C8D)
    }

    /// Single-byte tag used by stores to remember the layout of a value.
    pub fn to_byte(self) -> u8 {
        match self {
            Encoding::C1 => 1,
            Encoding::C1S => 2,
            Encoding::C2 => 3,
            Encoding::C2S => 4,
            Encoding::C4 => 5,
            Encoding::C4F => 6,
            Encoding::C8D => 7,
        }
    }

    /// Inverse of [`Encoding::to_byte`].
    pub fn from_byte(b: u8) -> Option<Self> {
        Encoding::ALL.into_iter().find(|e| e.to_byte() == b)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::C1 => "C1",
            Encoding::C1S => "C1S",
            Encoding::C2 => "C2",
            Encoding::C2S => "C2S",
            Encoding::C4 => "C4",
            Encoding::C4F => "C4F",
            Encoding::C8D => "C8D",
        };
        f.write_str(name)
    }
}

/// Row-append seam shared by the builder and the frozen chunks.
///
/// Only a [`NewChunk`](crate::NewChunk) accepts rows; a compressed
/// [`Chunk`] rejects every append with [`FvecError::ReadOnlyChunk`].
pub trait ChunkWriter {
    /// Append the value `mantissa * 10^exponent`.
    fn append(&mut self, mantissa: i64, exponent: i32) -> Result<(), FvecError>;

    /// Append a missing value.
    fn append_na(&mut self) -> Result<(), FvecError>;
}

/// Context attached to a chunk once it is fetched for a particular vector.
#[derive(Debug, Clone, PartialEq)]
struct ChunkBinding {
    start: u64,
    vec: Key,
}

/// An immutable, self-describing block of fixed-width encoded rows.
#[derive(Debug, Clone)]
pub struct Chunk {
    encoding: Encoding,
    mem: Bytes,
    len: usize,
    scale: f64,
    bias: i32,
    /// `log10(scale)` when the scale is an exact power of ten.
    scale_exp: Option<i32>,
    binding: OnceLock<ChunkBinding>,
}

impl Chunk {
    /// Wrap an already laid-out buffer. `mem` must hold the header (if any)
    /// followed by a whole number of elements.
    pub(crate) fn from_parts(encoding: Encoding, mem: Bytes, scale: f64, bias: i32) -> Self {
        let len = (mem.len() - encoding.header_len()) / encoding.width();
        Chunk {
            encoding,
            mem,
            len,
            scale,
            bias,
            scale_exp: scale_exponent(scale),
            binding: OnceLock::new(),
        }
    }

    /// Decode a chunk from its wire bytes.
    ///
    /// The result is unbound: [`Chunk::start`] is `None` until [`Chunk::bind`].
    pub fn read(encoding: Encoding, mem: impl Into<Bytes>) -> Result<Self, FvecError> {
        let mem = mem.into();
        let header = encoding.header_len();
        if mem.len() < header {
            return Err(FvecError::InvalidData(format!(
                "{} header needs {} bytes, got {}",
                encoding,
                header,
                mem.len()
            )));
        }
        if (mem.len() - header) % encoding.width() != 0 {
            return Err(FvecError::InvalidData(format!(
                "{} payload of {} bytes is not a multiple of {}",
                encoding,
                mem.len() - header,
                encoding.width()
            )));
        }

        let (scale, bias) = if encoding.is_scaled() {
            let scale = f64::from_le_bytes(le_array(&mem[0..8]));
            let bias = i32::from_le_bytes(le_array(&mem[8..12]));
            if !scale.is_finite() || scale == 0.0 {
                return Err(FvecError::InvalidData(format!("invalid scale {}", scale)));
            }
            (scale, bias)
        } else {
            (1.0, 0)
        };

        Ok(Self::from_parts(encoding, mem, scale, bias))
    }

    /// The wire form of this chunk: header followed by payload.
    pub fn write(&self) -> Bytes {
        self.mem.clone()
    }

    /// The layout of this chunk.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the chunk holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the encoded buffer in bytes.
    pub fn mem_size(&self) -> usize {
        self.mem.len()
    }

    /// Decode scale, for scaled encodings.
    pub fn scale(&self) -> Option<f64> {
        self.encoding.is_scaled().then_some(self.scale)
    }

    /// Decode bias, for scaled encodings.
    pub fn bias(&self) -> Option<i32> {
        self.encoding.is_scaled().then_some(self.bias)
    }

    #[inline]
    fn payload(&self) -> &[u8] {
        &self.mem[self.encoding.header_len()..]
    }

    /// Whether row `i` (chunk-local) is missing.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn is_na(&self, i: usize) -> bool {
        let p = self.payload();
        match self.encoding {
            Encoding::C1 | Encoding::C1S => p[i] == C1_NA,
            Encoding::C2 | Encoding::C2S => read_i16(p, i) == C2_NA,
            Encoding::C4 => read_i32(p, i) == C4_NA,
            Encoding::C4F => read_f32(p, i).is_nan(),
            Encoding::C8D => read_f64(p, i).is_nan(),
        }
    }

    /// Row `i` (chunk-local) as a double; NaN when missing.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn getd(&self, i: usize) -> f64 {
        let p = self.payload();
        match self.encoding {
            Encoding::C1 => match p[i] {
                C1_NA => f64::NAN,
                b => f64::from(b),
            },
            Encoding::C1S => match p[i] {
                C1_NA => f64::NAN,
                b => self.unscale(i64::from(b)),
            },
            Encoding::C2 => match read_i16(p, i) {
                C2_NA => f64::NAN,
                v => f64::from(v),
            },
            Encoding::C2S => match read_i16(p, i) {
                C2_NA => f64::NAN,
                v => self.unscale(i64::from(v)),
            },
            Encoding::C4 => match read_i32(p, i) {
                C4_NA => f64::NAN,
                v => f64::from(v),
            },
            Encoding::C4F => f64::from(read_f32(p, i)),
            Encoding::C8D => read_f64(p, i),
        }
    }

    /// Row `i` (chunk-local) as an integer; `None` when missing.
    ///
    /// Fractional values are truncated toward zero.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn get(&self, i: usize) -> Option<i64> {
        let p = self.payload();
        match self.encoding {
            Encoding::C1 => match p[i] {
                C1_NA => None,
                b => Some(i64::from(b)),
            },
            Encoding::C1S => match p[i] {
                C1_NA => None,
                b => Some(self.unscale_int(i64::from(b))),
            },
            Encoding::C2 => match read_i16(p, i) {
                C2_NA => None,
                v => Some(i64::from(v)),
            },
            Encoding::C2S => match read_i16(p, i) {
                C2_NA => None,
                v => Some(self.unscale_int(i64::from(v))),
            },
            Encoding::C4 => match read_i32(p, i) {
                C4_NA => None,
                v => Some(i64::from(v)),
            },
            Encoding::C4F | Encoding::C8D => {
                let d = self.getd(i);
                (!d.is_nan()).then_some(d as i64)
            }
        }
    }

    #[inline]
    fn unscale(&self, stored: i64) -> f64 {
        let v = (stored + i64::from(self.bias)) as f64;
        match self.scale_exp {
            Some(exp) => scale_f64(v, exp),
            None => v * self.scale,
        }
    }

    fn unscale_int(&self, stored: i64) -> i64 {
        let base = stored + i64::from(self.bias);
        match self.scale_exp {
            Some(exp) if exp >= 0 => pow10i(exp as u32)
                .and_then(|p| base.checked_mul(p))
                .unwrap_or_else(|| self.unscale(stored) as i64),
            _ => self.unscale(stored) as i64,
        }
    }

    /// Decode every row in order as doubles.
    pub fn iter_f64(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).map(move |i| self.getd(i))
    }

    /// Attach the transient context of the vector this chunk was fetched for.
    ///
    /// Idempotent: binding again with the same context succeeds, and racing
    /// binders all observe the first binding. Binding to a different context
    /// fails with [`FvecError::InvalidLayout`].
    pub fn bind(&self, start: u64, vec: &Key) -> Result<(), FvecError> {
        let bound = self.binding.get_or_init(|| ChunkBinding {
            start,
            vec: vec.clone(),
        });
        if bound.start != start || bound.vec != *vec {
            return Err(FvecError::InvalidLayout(format!(
                "chunk already bound to {} at row {}, not {} at row {}",
                bound.vec, bound.start, vec, start
            )));
        }
        Ok(())
    }

    /// Global row offset of the first row, once bound.
    pub fn start(&self) -> Option<u64> {
        self.binding.get().map(|b| b.start)
    }

    /// Key of the owning vector, once bound.
    pub fn vec_key(&self) -> Option<&Key> {
        self.binding.get().map(|b| &b.vec)
    }

    /// Whether the chunk has been attached to a vector.
    pub fn is_bound(&self) -> bool {
        self.binding.get().is_some()
    }

    fn local_index(&self, row: u64) -> Result<usize, FvecError> {
        let start = self.start().ok_or(FvecError::Unbound)?;
        let end = start + self.len as u64;
        if row < start || row >= end {
            return Err(FvecError::OutOfRange {
                index: row,
                len: end,
            });
        }
        Ok((row - start) as usize)
    }

    /// Global row `row` as an integer; requires a bound chunk.
    pub fn at(&self, row: u64) -> Result<Option<i64>, FvecError> {
        Ok(self.get(self.local_index(row)?))
    }

    /// Global row `row` as a double; requires a bound chunk.
    pub fn atd(&self, row: u64) -> Result<f64, FvecError> {
        Ok(self.getd(self.local_index(row)?))
    }

    /// Whether global row `row` is missing; requires a bound chunk.
    pub fn is_na_at(&self, row: u64) -> Result<bool, FvecError> {
        Ok(self.is_na(self.local_index(row)?))
    }
}

impl ChunkWriter for Chunk {
    fn append(&mut self, _mantissa: i64, _exponent: i32) -> Result<(), FvecError> {
        Err(FvecError::ReadOnlyChunk)
    }

    fn append_na(&mut self) -> Result<(), FvecError> {
        Err(FvecError::ReadOnlyChunk)
    }
}

#[inline]
fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut raw = [0u8; N];
    raw.copy_from_slice(bytes);
    raw
}

#[inline]
fn read_i16(p: &[u8], i: usize) -> i16 {
    i16::from_le_bytes(le_array(&p[i * 2..i * 2 + 2]))
}

#[inline]
fn read_i32(p: &[u8], i: usize) -> i32 {
    i32::from_le_bytes(le_array(&p[i * 4..i * 4 + 4]))
}

#[inline]
fn read_f32(p: &[u8], i: usize) -> f32 {
    f32::from_le_bytes(le_array(&p[i * 4..i * 4 + 4]))
}

#[inline]
fn read_f64(p: &[u8], i: usize) -> f64 {
    f64::from_le_bytes(le_array(&p[i * 8..i * 8 + 8]))
}
