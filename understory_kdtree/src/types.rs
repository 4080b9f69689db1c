// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinate scalars and point helpers.

use core::cmp::Ordering;
use core::fmt::Debug;

use crate::error::KdTreeError;

/// Numeric coordinate abstraction for k-d tree points.
///
/// Squared distances are summed in a widened accumulator type
/// (f32→f64, f64→f64, i32→u128, i64→[`WideSum`]). Integer accumulators are
/// exact over the full coordinate range, so distance comparisons never lose
/// order to overflow or saturation.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Widened accumulator type for squared distances.
    type Acc: Copy + PartialOrd + Debug;

    /// Zero value for the accumulator.
    fn acc_zero() -> Self::Acc;

    /// Squared difference `(a - b)^2` in the accumulator type.
    fn sq_diff(a: Self, b: Self) -> Self::Acc;

    /// Add two accumulator values.
    fn acc_add(a: Self::Acc, b: Self::Acc) -> Self::Acc;

    /// Convert an accumulator value to `f64` (for reporting distances).
    fn acc_to_f64(v: Self::Acc) -> f64;
}

impl Scalar for f32 {
    type Acc = f64;

    #[inline]
    fn acc_zero() -> Self::Acc {
        0.0
    }

    #[inline]
    fn sq_diff(a: Self, b: Self) -> Self::Acc {
        let d = f64::from(a) - f64::from(b);
        d * d
    }

    #[inline]
    fn acc_add(a: Self::Acc, b: Self::Acc) -> Self::Acc {
        a + b
    }

    #[inline]
    fn acc_to_f64(v: Self::Acc) -> f64 {
        v
    }
}

impl Scalar for f64 {
    type Acc = Self;

    #[inline]
    fn acc_zero() -> Self::Acc {
        0.0
    }

    #[inline]
    fn sq_diff(a: Self, b: Self) -> Self::Acc {
        debug_assert!(!a.is_nan() && !b.is_nan(), "NaN coordinate");
        let d = a - b;
        d * d
    }

    #[inline]
    fn acc_add(a: Self::Acc, b: Self::Acc) -> Self::Acc {
        a + b
    }

    #[inline]
    fn acc_to_f64(v: Self::Acc) -> f64 {
        v
    }
}

impl Scalar for i32 {
    type Acc = u128;

    #[inline]
    fn acc_zero() -> Self::Acc {
        0
    }

    #[inline]
    fn sq_diff(a: Self, b: Self) -> Self::Acc {
        // |a - b| < 2^32, so the square fits in 64 bits and a u128 sum
        // cannot overflow for any realistic dimension.
        let d = u128::from(a.abs_diff(b));
        d * d
    }

    #[inline]
    fn acc_add(a: Self::Acc, b: Self::Acc) -> Self::Acc {
        a.saturating_add(b)
    }

    #[inline]
    fn acc_to_f64(v: Self::Acc) -> f64 {
        v as f64
    }
}

impl Scalar for i64 {
    type Acc = WideSum;

    #[inline]
    fn acc_zero() -> Self::Acc {
        WideSum::ZERO
    }

    #[inline]
    fn sq_diff(a: Self, b: Self) -> Self::Acc {
        // |a - b| < 2^64, so the square fits in the low word.
        let d = u128::from(a.abs_diff(b));
        WideSum::from_parts(0, d * d)
    }

    #[inline]
    fn acc_add(a: Self::Acc, b: Self::Acc) -> Self::Acc {
        a + b
    }

    #[inline]
    fn acc_to_f64(v: Self::Acc) -> f64 {
        v.to_f64()
    }
}

/// Exact 256-bit unsigned sum of squared `i64` differences.
///
/// A single `i64` axis can contribute up to `(2^64 - 1)^2`, which already
/// fills a `u128`; summing several axes needs the extra high word. Ordering
/// compares the high word first, so it matches the numeric order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WideSum {
    hi: u128,
    lo: u128,
}

impl WideSum {
    /// Zero.
    pub const ZERO: Self = Self { hi: 0, lo: 0 };

    /// Value `hi * 2^128 + lo`.
    pub const fn from_parts(hi: u128, lo: u128) -> Self {
        Self { hi, lo }
    }

    /// High and low 128-bit words.
    pub const fn to_parts(self) -> (u128, u128) {
        (self.hi, self.lo)
    }

    /// Nearest `f64` to the exact value.
    pub fn to_f64(self) -> f64 {
        // `u128::MAX as f64` rounds up to exactly 2^128.
        self.hi as f64 * u128::MAX as f64 + self.lo as f64
    }
}

impl From<u128> for WideSum {
    fn from(lo: u128) -> Self {
        Self { hi: 0, lo }
    }
}

impl core::ops::Add for WideSum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let (lo, carry) = self.lo.overflowing_add(rhs.lo);
        Self {
            hi: self.hi.saturating_add(rhs.hi).saturating_add(u128::from(carry)),
            lo,
        }
    }
}

/// Helper alias for the widened accumulator type associated with a scalar `T`.
pub type ScalarAcc<T> = <T as Scalar>::Acc;

/// Squared Euclidean distance between two points.
///
/// Fails with [`KdTreeError::DimensionMismatch`] if the points differ in length.
pub fn distance_squared<T: Scalar>(a: &[T], b: &[T]) -> Result<T::Acc, KdTreeError> {
    check_dim(a.len(), b.len())?;
    Ok(dist2(a, b))
}

/// Euclidean distance between two points, `sqrt(sum((a_i - b_i)^2))`.
///
/// Fails with [`KdTreeError::DimensionMismatch`] if the points differ in length.
///
/// ```rust
/// use understory_kdtree::distance;
///
/// assert_eq!(distance(&[0.0, 0.0], &[3.0, 4.0]), Ok(5.0));
/// assert!(distance(&[0, 0], &[1, 2, 3]).is_err());
/// ```
pub fn distance<T: Scalar>(a: &[T], b: &[T]) -> Result<f64, KdTreeError> {
    distance_squared(a, b).map(|d2| sqrt(T::acc_to_f64(d2)))
}

/// Whether `low[i] <= point[i] <= high[i]` holds on every axis.
///
/// Fails with [`KdTreeError::DimensionMismatch`] if `low` or `high` differ in
/// length from `point`.
pub fn in_range<T: Scalar>(point: &[T], low: &[T], high: &[T]) -> Result<bool, KdTreeError> {
    check_dim(point.len(), low.len())?;
    check_dim(point.len(), high.len())?;
    Ok(in_box(point, low, high))
}

#[inline]
pub(crate) fn check_dim(expected: usize, found: usize) -> Result<(), KdTreeError> {
    if expected == found {
        Ok(())
    } else {
        Err(KdTreeError::DimensionMismatch { expected, found })
    }
}

/// Squared distance; callers guarantee equal lengths.
pub(crate) fn dist2<T: Scalar>(a: &[T], b: &[T]) -> T::Acc {
    a.iter()
        .zip(b)
        .fold(T::acc_zero(), |acc, (&x, &y)| T::acc_add(acc, T::sq_diff(x, y)))
}

/// Box test; callers guarantee equal lengths.
pub(crate) fn in_box<T: PartialOrd>(point: &[T], low: &[T], high: &[T]) -> bool {
    point
        .iter()
        .zip(low.iter().zip(high))
        .all(|(p, (lo, hi))| le(lo, p) && le(p, hi))
}

/// Ordering for sorts. Only a total order on the inputs is supported: NaN
/// coordinates are rejected in debug builds before any sort runs.
pub(crate) fn cmp_t<T: PartialOrd>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}

#[cfg(feature = "std")]
#[inline]
pub(crate) fn sqrt(v: f64) -> f64 {
    v.sqrt()
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
#[inline]
pub(crate) fn sqrt(v: f64) -> f64 {
    libm::sqrt(v)
}
