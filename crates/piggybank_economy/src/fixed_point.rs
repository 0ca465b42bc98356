//! # Fixed-Point Arithmetic
//!
//! **No floating point in money math that must be reproducible.**
//!
//! Interest rates arrive from configuration as `f64`, but every calculation
//! whose result is credited to a ledger runs through this module so that
//! `1000 × 1.06^30` produces the same floor on every platform.
//!
//! Internally a [`FixedPoint`] stores value × 1,000,000 as a `u64`
//! (6 decimal places), with `u128` intermediates for products.

use std::fmt;

use crate::error::{EconomyError, EconomyResult};

/// Number of decimal places.
const DECIMAL_PLACES: u32 = 6;

/// The multiplier for 6 decimal places.
const MULTIPLIER: u64 = 10u64.pow(DECIMAL_PLACES);

/// Fixed-point decimal number with 6 decimal places.
///
/// # Range
///
/// - Minimum: 0.000000
/// - Maximum: 18,446,744,073,709.551615
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct FixedPoint(u64);

impl FixedPoint {
    /// Zero value.
    pub const ZERO: Self = Self(0);

    /// One unit (1.000000).
    pub const ONE: Self = Self(MULTIPLIER);

    /// Creates a fixed-point number from a whole number.
    #[inline]
    #[must_use]
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole * MULTIPLIER)
    }

    /// Creates a fixed-point number from parts.
    ///
    /// `decimal` is interpreted in millionths and taken modulo 10^6.
    #[inline]
    #[must_use]
    pub const fn from_parts(whole: u64, decimal: u32) -> Self {
        Self(whole * MULTIPLIER + (decimal as u64 % MULTIPLIER))
    }

    /// Converts a configured rate (e.g. `0.06`) to fixed-point.
    ///
    /// Negative or non-finite inputs clamp to zero; rates are never
    /// negative in this economy.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_rate(rate: f64) -> Self {
        if !rate.is_finite() || rate <= 0.0 {
            return Self::ZERO;
        }
        #[allow(clippy::cast_precision_loss)]
        Self((rate * MULTIPLIER as f64).round() as u64)
    }

    /// Returns the raw internal value (millionths).
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns the whole number part.
    #[inline]
    #[must_use]
    pub const fn whole(self) -> u64 {
        self.0 / MULTIPLIER
    }

    /// Returns the decimal part (0-999999).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn decimal(self) -> u32 {
        (self.0 % MULTIPLIER) as u32
    }

    /// Returns true if this value is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `floor(n × self)` for an integer point amount.
    ///
    /// This is the daily-interest formula: `floor(score × rate)`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn mul_floor(self, n: u64) -> u64 {
        ((n as u128 * self.0 as u128) / MULTIPLIER as u128) as u64
    }
}

impl fmt::Debug for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedPoint({}.{:06})", self.whole(), self.decimal())
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.whole(), self.decimal())
    }
}

/// `floor(principal × (1+rate)^days)`, the maturity total of a deposit.
///
/// The compounding runs iteratively in `u128` with renormalization after
/// each multiply, so the result is identical on every platform. The
/// per-step truncation is below 10^-6 of the running value and never moves
/// the final floor for realistic principals.
///
/// # Errors
///
/// Returns [`EconomyError::ArithmeticOverflow`] if the accumulated value
/// exceeds the `u128` intermediate range.
pub fn compound_total(principal: u64, rate: FixedPoint, days: u32) -> EconomyResult<u64> {
    let factor = u128::from(MULTIPLIER) + u128::from(rate.raw());
    let mut acc = u128::from(principal) * u128::from(MULTIPLIER);
    for _ in 0..days {
        acc = acc
            .checked_mul(factor)
            .ok_or(EconomyError::ArithmeticOverflow)?
            / u128::from(MULTIPLIER);
    }
    let total = acc / u128::from(MULTIPLIER);
    u64::try_from(total).map_err(|_| EconomyError::ArithmeticOverflow)
}

/// `floor(total − principal)`: the interest paid out at maturity.
///
/// # Errors
///
/// Propagates overflow from [`compound_total`].
pub fn compound_profit(principal: u64, rate: FixedPoint, days: u32) -> EconomyResult<u64> {
    Ok(compound_total(principal, rate, days)?.saturating_sub(principal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let value = FixedPoint::from_parts(3, 141_592);
        assert_eq!(value.whole(), 3);
        assert_eq!(value.decimal(), 141_592);
    }

    #[test]
    fn test_from_rate_rounds_to_micros() {
        assert_eq!(FixedPoint::from_rate(0.06).raw(), 60_000);
        assert_eq!(FixedPoint::from_rate(0.0216).raw(), 21_600);
        assert_eq!(FixedPoint::from_rate(-1.0), FixedPoint::ZERO);
        assert_eq!(FixedPoint::from_rate(f64::NAN), FixedPoint::ZERO);
    }

    #[test]
    fn test_mul_floor_matches_interest_formula() {
        // floor(500 * 0.02) = 10
        assert_eq!(FixedPoint::from_rate(0.02).mul_floor(500), 10);
        // floor(49 * 0.02) = 0
        assert_eq!(FixedPoint::from_rate(0.02).mul_floor(49), 0);
    }

    #[test]
    fn test_compound_reference_case() {
        // 1000 * 1.06^30 = 5743.491...
        let rate = FixedPoint::from_rate(0.06);
        assert_eq!(compound_total(1000, rate, 30).unwrap(), 5743);
        assert_eq!(compound_profit(1000, rate, 30).unwrap(), 4743);
    }

    #[test]
    fn test_compound_zero_days_is_identity() {
        let rate = FixedPoint::from_rate(0.06);
        assert_eq!(compound_total(1000, rate, 0).unwrap(), 1000);
        assert_eq!(compound_profit(1000, rate, 0).unwrap(), 0);
    }

    #[test]
    fn test_compound_zero_rate_is_identity() {
        assert_eq!(compound_total(777, FixedPoint::ZERO, 365).unwrap(), 777);
    }

    #[test]
    fn test_compound_overflow_is_reported() {
        let rate = FixedPoint::from_whole(1_000_000);
        assert!(matches!(
            compound_total(u64::MAX, rate, 64),
            Err(EconomyError::ArithmeticOverflow)
        ));
    }

    #[test]
    fn test_display() {
        let value = FixedPoint::from_parts(42, 123_456);
        assert_eq!(format!("{value}"), "42.123456");
    }
}
