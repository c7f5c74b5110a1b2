//! Mutable chunk builder and the adaptive compressor.
//!
//! A [`NewChunk`] accumulates one chunk's worth of raw `(mantissa, exponent)`
//! rows and is then consumed by [`NewChunk::compress`], which picks the
//! narrowest [`Encoding`] that reproduces every row.
//!
//! ## Selection Ladder
//!
//! Candidates are tried narrowest first; the first that fits wins:
//!
//! 1. `C1`: integer column within `[0, 254]`
//! 2. `C1S`: shared power-of-ten scale with a span below 255
//! 3. `C2`: integer column within `[-32767, 32767]`
//! 4. `C2S`: shared scale with a span below 65535
//! 5. `C4`: integer column within `[-(2^31 - 1), 2^31 - 1]`
//! 6. `C4F`: every value survives single precision within tolerance (lossy)
//! 7. `C8D`: always applicable
//!
//! The shared scale is `10^xmin`, where `xmin` is the smallest exponent left
//! after moving trailing zeros of each mantissa into its exponent. That is the
//! coarsest scale at which every value is an integer.

use bytes::{BufMut, BytesMut};
use tracing::{debug, trace};

use crate::chunk::{Chunk, ChunkWriter, Encoding, C1_NA, C2_NA, C4_NA, SCALED_HEADER_LEN};
use crate::error::FvecError;
use crate::precision::{
    canonical, decimal_to_f64, f64_to_decimal, is_na, pow10, rescale, FloatBound,
    MAX_EXACT_POW10, NA_EXPONENT, NA_MANTISSA,
};

/// Span limit of the scaled byte encoding; 0xFF is reserved for NA.
const C1S_SPAN: i64 = C1_NA as i64;

/// Span limit of the scaled short encoding; `i16::MIN` is reserved for NA.
const C2S_SPAN: i64 = u16::MAX as i64;

/// Offset added to the minimum so scaled shorts start at `-32767`.
const C2S_OFFSET: i64 = i16::MAX as i64;

/// Single-writer, append-only accumulator for one chunk of rows.
#[derive(Debug, Clone)]
pub struct NewChunk {
    start: u64,
    mantissas: Vec<i64>,
    exponents: Vec<i32>,
    bound: FloatBound,
}

/// Scalar aggregates over the rows of a builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkStats {
    /// Rows appended, NA included.
    pub rows: usize,
    /// Missing rows.
    pub na_count: usize,
    /// Smallest value; `+inf` if every row is NA.
    pub min: f64,
    /// Largest value; `-inf` if every row is NA.
    pub max: f64,
    /// Sum of non-NA values.
    pub sum: f64,
}

/// Result of the single pass over the rows that drives encoding selection.
#[derive(Debug, Clone, Copy)]
struct Scan {
    values: usize,
    xmin: i32,
    lemin: i64,
    lemax: i64,
    overflow: bool,
    floats_ok: bool,
}

impl Scan {
    /// Integer min/max when every value is integral and fits `i64`.
    fn int_range(&self) -> Option<(i64, i64)> {
        if self.overflow || self.xmin < 0 {
            return None;
        }
        Some((
            rescale(self.lemin, self.xmin, 0)?,
            rescale(self.lemax, self.xmin, 0)?,
        ))
    }

    /// Span at the shared scale, if a shared scale is usable for decoding.
    fn scaled_span(&self) -> Option<i64> {
        if self.overflow || !(-MAX_EXACT_POW10..=MAX_EXACT_POW10).contains(&self.xmin) {
            return None;
        }
        self.lemax.checked_sub(self.lemin)
    }
}

impl NewChunk {
    /// Create an empty builder whose first row is global row `start`.
    pub fn new(start: u64) -> Self {
        Self::with_capacity(start, 0)
    }

    /// Create an empty builder with room for `rows` rows.
    pub fn with_capacity(start: u64, rows: usize) -> Self {
        NewChunk {
            start,
            mantissas: Vec::with_capacity(rows),
            exponents: Vec::with_capacity(rows),
            bound: FloatBound::default(),
        }
    }

    /// Build from parallel mantissa and exponent arrays.
    pub fn from_parts(
        start: u64,
        mantissas: Vec<i64>,
        exponents: Vec<i32>,
    ) -> Result<Self, FvecError> {
        if mantissas.len() != exponents.len() {
            return Err(FvecError::MalformedInput(format!(
                "{} mantissas but {} exponents",
                mantissas.len(),
                exponents.len()
            )));
        }
        Ok(NewChunk {
            start,
            mantissas,
            exponents,
            bound: FloatBound::default(),
        })
    }

    /// Replace the tolerance used to accept single-precision storage.
    pub fn with_float_bound(mut self, bound: FloatBound) -> Self {
        self.bound = bound;
        self
    }

    /// Global row of the first row in this builder.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Rows appended so far.
    pub fn len(&self) -> usize {
        self.mantissas.len()
    }

    /// Whether no rows have been appended.
    pub fn is_empty(&self) -> bool {
        self.mantissas.is_empty()
    }

    /// Append the value `mantissa * 10^exponent`.
    pub fn append(&mut self, mantissa: i64, exponent: i32) {
        self.mantissas.push(mantissa);
        self.exponents.push(exponent);
    }

    /// Append a missing value.
    pub fn append_na(&mut self) {
        self.append(NA_MANTISSA, NA_EXPONENT);
    }

    /// Append global row `row`, which must be the next row of this builder.
    pub fn append_at(&mut self, row: u64, mantissa: i64, exponent: i32) -> Result<(), FvecError> {
        let expected = self.start + self.len() as u64;
        if row != expected {
            return Err(FvecError::OutOfOrderAppend { expected, got: row });
        }
        self.append(mantissa, exponent);
        Ok(())
    }

    /// Append a double as its shortest round-tripping decimal; NaN is NA.
    pub fn append_f64(&mut self, value: f64) -> Result<(), FvecError> {
        if value.is_nan() {
            self.append_na();
            return Ok(());
        }
        let (mantissa, exponent) = f64_to_decimal(value).ok_or_else(|| {
            FvecError::MalformedInput(format!("{} has no decimal representation", value))
        })?;
        self.append(mantissa, exponent);
        Ok(())
    }

    /// Whether row `i` is missing.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn is_na(&self, i: usize) -> bool {
        is_na(self.mantissas[i], self.exponents[i])
    }

    /// Row `i` as a double; NaN when missing.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn value(&self, i: usize) -> f64 {
        decimal_to_f64(self.mantissas[i], self.exponents[i])
    }

    /// Min, max and sum over the non-missing rows.
    pub fn stats(&self) -> ChunkStats {
        let mut stats = ChunkStats {
            rows: self.len(),
            na_count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
        };
        for i in 0..self.len() {
            if self.is_na(i) {
                stats.na_count += 1;
                continue;
            }
            let d = self.value(i);
            stats.min = stats.min.min(d);
            stats.max = stats.max.max(d);
            stats.sum += d;
        }
        stats
    }

    fn rows(&self) -> impl Iterator<Item = Option<(i64, i32)>> + '_ {
        self.mantissas
            .iter()
            .zip(self.exponents.iter())
            .map(|(&m, &e)| (!is_na(m, e)).then(|| canonical(m, e)))
    }

    fn scan(&self) -> Scan {
        let mut scan = Scan {
            values: 0,
            xmin: 0,
            lemin: 0,
            lemax: 0,
            overflow: false,
            floats_ok: true,
        };

        for (l, x) in self.rows().flatten() {
            if scan.floats_ok && !self.bound.fits_f32(l, x) {
                scan.floats_ok = false;
            }
            scan.values += 1;
            if scan.values == 1 {
                scan.xmin = x;
                scan.lemin = l;
                scan.lemax = l;
                continue;
            }

            // Track the extremes at the smallest exponent seen so far.
            if x < scan.xmin {
                if !scan.overflow {
                    match (
                        rescale(scan.lemin, scan.xmin, x),
                        rescale(scan.lemax, scan.xmin, x),
                    ) {
                        (Some(lo), Some(hi)) => {
                            scan.lemin = lo;
                            scan.lemax = hi;
                        }
                        _ => scan.overflow = true,
                    }
                }
                scan.xmin = x;
            }
            if scan.overflow {
                continue;
            }
            match rescale(l, x, scan.xmin) {
                Some(le) => {
                    scan.lemin = scan.lemin.min(le);
                    scan.lemax = scan.lemax.max(le);
                }
                None => scan.overflow = true,
            }
        }
        scan
    }

    /// Freeze the accumulated rows into the narrowest fitting encoding.
    ///
    /// Integer-domain encodings (C1, C1S, C2, C2S, C4) decode every row to
    /// the double nearest its decimal value. C4F is lossy within the float
    /// bound, and C8D within double precision; choosing either is reported as
    /// a debug event.
    pub fn compress(self) -> Chunk {
        let scan = self.scan();
        let chunk = self.select(&scan);

        if chunk.encoding().is_lossy() {
            debug!(
                encoding = %chunk.encoding(),
                rows = chunk.len(),
                start = self.start,
                xmin = scan.xmin,
                overflow = scan.overflow,
                "precision loss: no integer encoding fits, stored as floating point"
            );
        }
        trace!(
            encoding = %chunk.encoding(),
            rows = chunk.len(),
            bytes = chunk.mem_size(),
            "compressed chunk"
        );
        chunk
    }

    fn select(&self, scan: &Scan) -> Chunk {
        if scan.values == 0 {
            return self.encode_all_na();
        }

        let ints = scan.int_range();
        let span = scan.scaled_span();

        if let Some((lo, hi)) = ints {
            if lo >= 0 && hi < i64::from(C1_NA) {
                if let Some(chunk) = self.encode_raw(Encoding::C1) {
                    return chunk;
                }
            }
        }
        if span.is_some_and(|s| s < C1S_SPAN) {
            if let Some(chunk) = self.encode_scaled(Encoding::C1S, scan.lemin, scan.xmin) {
                return chunk;
            }
        }
        if let Some((lo, hi)) = ints {
            if lo > i64::from(C2_NA) && hi <= i64::from(i16::MAX) {
                if let Some(chunk) = self.encode_raw(Encoding::C2) {
                    return chunk;
                }
            }
        }
        if span.is_some_and(|s| s < C2S_SPAN) {
            let bias = scan.lemin + C2S_OFFSET;
            if let Some(chunk) = self.encode_scaled(Encoding::C2S, bias, scan.xmin) {
                return chunk;
            }
        }
        if let Some((lo, hi)) = ints {
            if lo > i64::from(C4_NA) && hi <= i64::from(i32::MAX) {
                if let Some(chunk) = self.encode_raw(Encoding::C4) {
                    return chunk;
                }
            }
        }
        if scan.floats_ok {
            return self.encode_float(Encoding::C4F);
        }
        self.encode_float(Encoding::C8D)
    }

    fn encode_all_na(&self) -> Chunk {
        let mut mem = BytesMut::zeroed(self.len());
        mem.fill(C1_NA);
        Chunk::from_parts(Encoding::C1, mem.freeze(), 1.0, 0)
    }

    /// Lay out integer rows unscaled; `None` if a row does not fit.
    fn encode_raw(&self, encoding: Encoding) -> Option<Chunk> {
        let mut mem = BytesMut::with_capacity(self.len() * encoding.width());
        for row in self.rows() {
            let value = match row {
                Some((l, x)) => Some(rescale(l, x, 0)?),
                None => None,
            };
            match encoding {
                Encoding::C1 => mem.put_u8(match value {
                    Some(v) => u8::try_from(v).ok().filter(|&b| b != C1_NA)?,
                    None => C1_NA,
                }),
                Encoding::C2 => mem.put_i16_le(match value {
                    Some(v) => i16::try_from(v).ok().filter(|&s| s != C2_NA)?,
                    None => C2_NA,
                }),
                Encoding::C4 => mem.put_i32_le(match value {
                    Some(v) => i32::try_from(v).ok().filter(|&w| w != C4_NA)?,
                    None => C4_NA,
                }),
                _ => return None,
            }
        }
        Some(Chunk::from_parts(encoding, mem.freeze(), 1.0, 0))
    }

    /// Lay out rows as `value / 10^xmin - bias`; `None` if a row does not fit.
    fn encode_scaled(&self, encoding: Encoding, bias: i64, xmin: i32) -> Option<Chunk> {
        let bias = i32::try_from(bias).ok()?;
        let scale = pow10(xmin);
        let mut mem =
            BytesMut::with_capacity(SCALED_HEADER_LEN + self.len() * encoding.width());
        mem.put_f64_le(scale);
        mem.put_i32_le(bias);
        for row in self.rows() {
            let stored = match row {
                Some((l, x)) => Some(rescale(l, x, xmin)?.checked_sub(i64::from(bias))?),
                None => None,
            };
            match encoding {
                Encoding::C1S => mem.put_u8(match stored {
                    Some(v) => u8::try_from(v).ok().filter(|&b| b != C1_NA)?,
                    None => C1_NA,
                }),
                Encoding::C2S => mem.put_i16_le(match stored {
                    Some(v) => i16::try_from(v).ok().filter(|&s| s != C2_NA)?,
                    None => C2_NA,
                }),
                _ => return None,
            }
        }
        Some(Chunk::from_parts(encoding, mem.freeze(), scale, bias))
    }

    fn encode_float(&self, encoding: Encoding) -> Chunk {
        let mut mem = BytesMut::with_capacity(self.len() * encoding.width());
        for i in 0..self.len() {
            let d = self.value(i);
            match encoding {
                Encoding::C4F => mem.put_f32_le(d as f32),
                _ => mem.put_f64_le(d),
            }
        }
        Chunk::from_parts(encoding, mem.freeze(), 1.0, 0)
    }
}

impl ChunkWriter for NewChunk {
    fn append(&mut self, mantissa: i64, exponent: i32) -> Result<(), FvecError> {
        NewChunk::append(self, mantissa, exponent);
        Ok(())
    }

    fn append_na(&mut self) -> Result<(), FvecError> {
        NewChunk::append_na(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision::FLOAT_TOLERANCE;

    fn build(ls: &[i64], xs: &[i32]) -> NewChunk {
        NewChunk::from_parts(0, ls.to_vec(), xs.to_vec()).unwrap()
    }

    /// Compress, check the chosen layout, and check every row decodes back.
    fn check(ls: &[i64], xs: &[i32], expected: Encoding) -> Chunk {
        let chunk = build(ls, xs).compress();
        assert_eq!(chunk.encoding(), expected, "ls={:?} xs={:?}", ls, xs);
        assert_eq!(chunk.len(), ls.len());
        for i in 0..ls.len() {
            let want = decimal_to_f64(ls[i], xs[i]);
            let got = chunk.getd(i);
            if want.is_nan() {
                assert!(chunk.is_na(i), "row {} should be NA", i);
            } else if expected == Encoding::C4F {
                assert!(
                    (got - want).abs() <= FLOAT_TOLERANCE * want.abs(),
                    "row {}: want={}, got={}",
                    i,
                    want,
                    got
                );
            } else {
                assert_eq!(got, want, "row {}", i);
            }
        }
        chunk
    }

    #[test]
    fn test_plain_bytes() {
        let chunk = check(&[122, 3, 44], &[0, 0, 0], Encoding::C1);
        assert_eq!(chunk.get(0), Some(122));
        assert_eq!(chunk.mem_size(), 3);
    }

    #[test]
    fn test_scaled_bytes_fraction() {
        let chunk = check(&[122, -3, 44], &[-1, 0, -1], Encoding::C1S);
        assert_eq!(chunk.getd(0), 12.2);
        assert_eq!(chunk.getd(1), -3.0);
        assert_eq!(chunk.getd(2), 4.4);
        assert_eq!(chunk.scale(), Some(0.1));
        assert_eq!(chunk.bias(), Some(-30));
    }

    #[test]
    fn test_scaled_bytes_positive_scale() {
        let chunk = check(&[1000, 200, 30], &[0, 1, 2], Encoding::C1S);
        assert_eq!(chunk.get(1), Some(2000));
        assert_eq!(chunk.scale(), Some(1000.0));
        assert_eq!(chunk.bias(), Some(1));
    }

    #[test]
    fn test_plain_shorts() {
        let chunk = check(
            &[1000, 200, 32767, -32767, 32],
            &[0, 1, 0, 0, 3],
            Encoding::C2,
        );
        let decoded: Vec<i64> = (0..chunk.len()).filter_map(|i| chunk.get(i)).collect();
        assert_eq!(decoded, vec![1000, 2000, 32767, -32767, 32000]);
    }

    #[test]
    fn test_biased_bytes() {
        let chunk = check(&[50100, 50101, 50123, 49999], &[0, 0, 0, 0], Encoding::C1S);
        assert_eq!(chunk.bias(), Some(49999));
    }

    #[test]
    fn test_biased_shorts() {
        check(&[51000, 50101, 50123, 49999], &[0, 0, 0, 0], Encoding::C2S);
        check(
            &[501000, 501001, 50123, 49999],
            &[-1, -1, 0, 0],
            Encoding::C2S,
        );
    }

    #[test]
    fn test_plain_ints() {
        check(&[123456, 2345678, 34567890], &[0, 0, 0], Encoding::C4);
    }

    #[test]
    fn test_floats() {
        let chunk = check(&[1234, 2345, 314], &[-1, -5, -2], Encoding::C4F);
        assert!(chunk.encoding().is_lossy());
    }

    #[test]
    fn test_doubles() {
        let chunk = check(&[1234, 2345678, 31415], &[40, 10, -40], Encoding::C8D);
        assert_eq!(chunk.getd(0), 1234.0 * 10f64.powi(40));
    }

    #[test]
    fn test_all_na() {
        let mut nc = NewChunk::new(0);
        for _ in 0..5 {
            nc.append_na();
        }
        let chunk = nc.compress();
        assert_eq!(chunk.encoding(), Encoding::C1);
        assert_eq!(chunk.len(), 5);
        assert!((0..5).all(|i| chunk.is_na(i)));
    }

    #[test]
    fn test_empty_builder() {
        let chunk = NewChunk::new(0).compress();
        assert_eq!(chunk.encoding(), Encoding::C1);
        assert!(chunk.is_empty());
    }

    #[test]
    fn test_na_reserved_in_every_layout() {
        let na_m = NA_MANTISSA;
        let na_x = NA_EXPONENT;
        check(&[1, na_m, 254], &[0, na_x, 0], Encoding::C1);
        check(&[255, na_m], &[0, na_x], Encoding::C1S);
        check(&[-5, na_m, 300], &[0, na_x, 0], Encoding::C2);
        check(&[40000, na_m, 100], &[0, na_x, 0], Encoding::C2S);
        check(&[1_000_000, na_m, -7], &[0, na_x, 0], Encoding::C4);
        check(&[1234, na_m, 314], &[-1, na_x, -5], Encoding::C4F);
        check(&[1234, na_m], &[40, na_x], Encoding::C8D);
    }

    #[test]
    fn test_zero_variance() {
        let chunk = check(&[5, 5, 5], &[-1, -1, -1], Encoding::C1S);
        assert_eq!(chunk.bias(), Some(5));
        check(&[7, 7], &[0, 0], Encoding::C1);
        check(&[0, 0], &[-3, 4], Encoding::C1);
    }

    #[test]
    fn test_byte_boundaries() {
        check(&[0, 254], &[0, 0], Encoding::C1);
        // 255 is the NA code, so the raw byte layout is out.
        check(&[1, 255], &[0, 0], Encoding::C1S);
        // 256 distinct codes plus NA do not fit a byte.
        check(&[0, 255], &[0, 0], Encoding::C2);
        check(&[-1, 253], &[0, 0], Encoding::C1S);
    }

    #[test]
    fn test_short_boundaries() {
        check(&[-32767, 32767], &[0, 0], Encoding::C2);
        check(&[-32768, 0], &[0, 0], Encoding::C2S);
        check(&[0, 65534], &[0, 0], Encoding::C2S);
        check(&[0, 65535], &[0, 0], Encoding::C4);
    }

    #[test]
    fn test_int_boundaries() {
        check(&[-2147483647, 2147483647], &[0, 0], Encoding::C4);
        // i32::MIN is the NA code, so these drop to single precision.
        check(&[-2147483648, 0], &[0, 0], Encoding::C4F);
        check(&[2147483648, 0], &[0, 0], Encoding::C4F);
    }

    #[test]
    fn test_scaled_prefers_coarsest_exponent() {
        let chunk = check(&[100, 300, 200], &[0, 0, 0], Encoding::C1S);
        // 100, 300, 200 share 10^2 and are stored as 0, 2, 1 over bias 1.
        assert_eq!(chunk.scale(), Some(100.0));
        assert_eq!(chunk.bias(), Some(1));
    }

    #[test]
    fn test_large_integers_use_single_precision() {
        check(&[123_456_789_012, 5], &[0, 0], Encoding::C4F);
        check(&[i64::MAX, i64::MIN], &[0, 0], Encoding::C4F);
    }

    #[test]
    fn test_wide_mantissa_within_tolerance_is_float() {
        // 123456.789 and 1e-9 round through f32 well inside the bound.
        let nc = NewChunk::from_parts(0, vec![123_456_789, 1], vec![-3, -9]).unwrap();
        let chunk = nc.compress();
        assert_eq!(chunk.encoding(), Encoding::C4F);
        assert!((chunk.getd(0) - 123_456.789).abs() <= FLOAT_TOLERANCE * 123_456.789);
        assert!((chunk.getd(1) - 1e-9).abs() <= FLOAT_TOLERANCE * 1e-9);
    }

    #[test]
    fn test_huge_exponent_integers_use_floats() {
        check(&[1, 2], &[30, 30], Encoding::C4F);
    }

    #[test]
    fn test_extreme_exponent_spread() {
        check(&[1, 1], &[18, -18], Encoding::C4F);
        check(&[123_456_789, 1], &[18, -18], Encoding::C4F);
        // 1e-44 is subnormal in f32.
        check(&[1, 1], &[38, -44], Encoding::C8D);
    }

    #[test]
    fn test_append_at_order() {
        let mut nc = NewChunk::new(100);
        nc.append_at(100, 1, 0).unwrap();
        nc.append_at(101, 2, 0).unwrap();
        assert_eq!(
            nc.append_at(103, 3, 0),
            Err(FvecError::OutOfOrderAppend {
                expected: 102,
                got: 103
            })
        );
        assert_eq!(
            nc.append_at(100, 3, 0),
            Err(FvecError::OutOfOrderAppend {
                expected: 102,
                got: 100
            })
        );
        assert_eq!(nc.len(), 2);
    }

    #[test]
    fn test_from_parts_mismatch() {
        let result = NewChunk::from_parts(0, vec![1, 2, 3], vec![0, 0]);
        assert!(matches!(result, Err(FvecError::MalformedInput(_))));
    }

    #[test]
    fn test_append_f64() {
        let mut nc = NewChunk::new(0);
        for v in [12.2, -3.0, 4.4, f64::NAN] {
            nc.append_f64(v).unwrap();
        }
        assert!(matches!(
            nc.append_f64(f64::INFINITY),
            Err(FvecError::MalformedInput(_))
        ));
        let chunk = nc.compress();
        assert_eq!(chunk.encoding(), Encoding::C1S);
        assert_eq!(chunk.getd(0), 12.2);
        assert_eq!(chunk.getd(2), 4.4);
        assert!(chunk.is_na(3));
    }

    #[test]
    fn test_stats() {
        let mut nc = NewChunk::new(0);
        nc.append(15, -1);
        nc.append_na();
        nc.append(-2, 0);
        nc.append(10, 0);
        let stats = nc.stats();
        assert_eq!(stats.rows, 4);
        assert_eq!(stats.na_count, 1);
        assert_eq!(stats.min, -2.0);
        assert_eq!(stats.max, 10.0);
        assert!((stats.sum - 9.5).abs() < 1e-12);
    }

    #[test]
    fn test_writer_seam() {
        fn fill<W: ChunkWriter>(w: &mut W) -> Result<(), FvecError> {
            w.append(1, 0)?;
            w.append_na()?;
            w.append(3, 0)
        }

        let mut nc = NewChunk::new(0);
        fill(&mut nc).unwrap();
        let mut chunk = nc.compress();
        assert_eq!(chunk.len(), 3);
        assert!(chunk.is_na(1));
        assert_eq!(fill(&mut chunk), Err(FvecError::ReadOnlyChunk));
    }

    #[test]
    fn test_custom_float_bound() {
        // Zero tolerance rejects any float rounding.
        let nc = build(&[1234, 2345, 314], &[-1, -5, -2]).with_float_bound(FloatBound::new(0.0));
        assert_eq!(nc.compress().encoding(), Encoding::C8D);
    }
}
