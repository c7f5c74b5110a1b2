//! Decimal arithmetic helpers shared by the compressor and the decoders.
//!
//! Values arrive as `(mantissa, exponent)` pairs meaning `mantissa * 10^exponent`.
//! This module holds the power-of-ten tables, the canonical decimal form used to
//! pick a shared scale, the NA sentinel, and the tolerance bound that decides
//! whether single precision is good enough for a chunk.

/// Mantissa half of the reserved NA pair.
pub const NA_MANTISSA: i64 = i64::MAX;

/// Exponent half of the reserved NA pair.
pub const NA_EXPONENT: i32 = i32::MIN;

/// Relative error accepted when a chunk falls back to single precision.
pub const FLOAT_TOLERANCE: f64 = 1e-6;

/// Largest `|exponent|` for which `10^exponent` is exactly representable
/// (or, for negative exponents, divides exactly) as an `f64`.
pub const MAX_EXACT_POW10: i32 = 22;

/// Exact `f64` powers of ten, `10^0` through `10^22`.
pub const POW10_F64: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// `i64` powers of ten, `10^0` through `10^18`.
pub const POW10_I64: [i64; 19] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
];

/// Returns true if `(mantissa, exponent)` is the NA sentinel.
#[inline]
pub fn is_na(mantissa: i64, exponent: i32) -> bool {
    mantissa == NA_MANTISSA && exponent == NA_EXPONENT
}

/// `10^exp` as an `i64`, or `None` if it overflows.
#[inline]
pub fn pow10i(exp: u32) -> Option<i64> {
    POW10_I64.get(exp as usize).copied()
}

/// `10^exp` as an `f64`.
///
/// Within `[-22, 22]` the result is the double nearest to the true power.
pub fn pow10(exp: i32) -> f64 {
    if (0..=MAX_EXACT_POW10).contains(&exp) {
        POW10_F64[exp as usize]
    } else if (-MAX_EXACT_POW10..0).contains(&exp) {
        1.0 / POW10_F64[(-exp) as usize]
    } else {
        10f64.powi(exp)
    }
}

/// Scale an integer by `10^exp` as a double.
///
/// For `|exp| <= 22` this is a single correctly rounded multiply or divide,
/// so it returns the double nearest to the exact decimal whenever `value` is
/// itself exactly representable.
#[inline]
pub fn scale_f64(value: f64, exp: i32) -> f64 {
    if (0..=MAX_EXACT_POW10).contains(&exp) {
        value * POW10_F64[exp as usize]
    } else if (-MAX_EXACT_POW10..0).contains(&exp) {
        value / POW10_F64[(-exp) as usize]
    } else {
        value * 10f64.powi(exp)
    }
}

/// The double value of `mantissa * 10^exponent`; NaN for the NA pair.
pub fn decimal_to_f64(mantissa: i64, exponent: i32) -> f64 {
    if is_na(mantissa, exponent) {
        return f64::NAN;
    }
    scale_f64(mantissa as f64, exponent)
}

/// Canonical form of a decimal: trailing zeros of the mantissa moved into the
/// exponent, and zero normalised to exponent 0.
pub fn canonical(mut mantissa: i64, mut exponent: i32) -> (i64, i32) {
    if mantissa == 0 {
        return (0, 0);
    }
    while mantissa % 10 == 0 {
        mantissa /= 10;
        exponent = exponent.saturating_add(1);
    }
    (mantissa, exponent)
}

/// Rescale a canonical decimal to a smaller exponent `target`.
///
/// Returns `None` on `i64` overflow or if `target > exponent`.
pub fn rescale(mantissa: i64, exponent: i32, target: i32) -> Option<i64> {
    let shift = u32::try_from(i64::from(exponent) - i64::from(target)).ok()?;
    mantissa.checked_mul(pow10i(shift)?)
}

/// Recover the exponent `e` of a scale that was produced by [`pow10`], if it
/// lies within the exact window.
pub fn scale_exponent(scale: f64) -> Option<i32> {
    (-MAX_EXACT_POW10..=MAX_EXACT_POW10).find(|&e| pow10(e).to_bits() == scale.to_bits())
}

/// Shortest decimal `(mantissa, exponent)` that round-trips to `value`.
///
/// Returns `None` for NaN and infinities.
pub fn f64_to_decimal(value: f64) -> Option<(i64, i32)> {
    if !value.is_finite() {
        return None;
    }
    if value == 0.0 {
        return Some((0, 0));
    }
    // `{:e}` prints the shortest representation that round-trips.
    let repr = format!("{:e}", value);
    let (digits, exp) = repr.split_once('e')?;
    let exp: i32 = exp.parse().ok()?;
    let (negative, digits) = match digits.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, digits),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let mut mantissa: i64 = 0;
    for b in int_part.bytes().chain(frac_part.bytes()) {
        mantissa = mantissa
            .checked_mul(10)?
            .checked_add(i64::from(b.checked_sub(b'0')?))?;
    }
    if negative {
        mantissa = -mantissa;
    }
    Some(canonical(mantissa, exp - frac_part.len() as i32))
}

/// Relative error bound used to accept a lossy single-precision encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatBound {
    tolerance: f64,
}

impl Default for FloatBound {
    fn default() -> Self {
        Self::new(FLOAT_TOLERANCE)
    }
}

impl FloatBound {
    /// Create a bound accepting relative errors up to `tolerance`.
    pub fn new(tolerance: f64) -> Self {
        FloatBound { tolerance }
    }

    /// The accepted relative error.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Check if `approx` is within the relative tolerance of `orig`.
    #[inline]
    pub fn is_bounded(&self, orig: f64, approx: f64) -> bool {
        (orig - approx).abs() <= self.tolerance * orig.abs()
    }

    /// Check whether a decimal survives a trip through `f32`: the rounded
    /// float must stay finite and within the relative tolerance.
    pub fn fits_f32(&self, mantissa: i64, exponent: i32) -> bool {
        let orig = decimal_to_f64(mantissa, exponent);
        let approx = orig as f32;
        approx.is_finite() && self.is_bounded(orig, f64::from(approx))
    }
}
