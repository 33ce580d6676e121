//! The two coefficient domains a [`crate::cdb::FixedInequality`] can
//! be instantiated over (§2: "FixedIneq<small>" / "FixedIneq<big>"),
//! and their signed scratch counterparts used by
//! [`crate::cdb::FatInequality`] (§4.4).
//!
//! `Coeff` is the unsigned, attached-constraint domain; its associated
//! `Signed` type is the domain `FatInequality` does cancel-add
//! arithmetic in. The pair is implemented twice: `u32`/`i64` for the
//! "small" representation, and `num_bigint::BigUint`/`num_bigint::BigInt`
//! for the "big" one.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::fmt::{Debug, Display};

/// An unsigned coefficient/degree domain usable by a frozen,
/// attached constraint.
pub trait Coeff: Clone + Eq + Ord + Debug + Display + Send + Sync + 'static {
    /// the signed scratch domain `FatInequality` uses for this
    /// coefficient type.
    type Signed: FatCoeff<Unsigned = Self>;

    fn zero() -> Self;
    fn one() -> Self;
    fn is_zero(&self) -> bool;
    /// `self + other`, or `None` on overflow of a bounded
    /// representation (always `Some` for the arbitrary-precision one).
    fn checked_add(&self, other: &Self) -> Option<Self>;
    /// clip `self` to at most `cap` (saturation, §GLOSSARY).
    fn clamp_to(&self, cap: &Self) -> Self;
    /// `self - other`; callers must ensure `self >= other` (slack and
    /// weakening-cost arithmetic only ever subtracts a smaller or
    /// equal quantity, §4.2, §4.9).
    fn sub(&self, other: &Self) -> Self;
    fn to_signed(&self) -> Self::Signed;
    /// convert a small non-negative constant (e.g. `1` for a clause's
    /// unit coefficient) into this domain.
    fn from_u64(x: u64) -> Self;
    fn to_u64_saturating(&self) -> u64;
}

/// A signed coefficient domain used by the `FatInequality` scratch
/// buffer while accumulating cancel-add arithmetic (§4.4).
pub trait FatCoeff: Clone + Eq + Ord + Debug + Send + Sync + 'static {
    type Unsigned: Coeff<Signed = Self>;

    fn zero() -> Self;
    fn is_zero(&self) -> bool;
    fn is_negative(&self) -> bool;
    /// the magnitude, which always fits the unsigned domain.
    fn magnitude(&self) -> Self::Unsigned;
    fn add(&self, other: &Self) -> Self;
    fn sub(&self, other: &Self) -> Self;
    fn neg(&self) -> Self;
    /// `self * k` for a non-negative small multiplier (§4.4
    /// `multiply(k)`, `k >= 1`).
    fn mul_u64(&self, k: u64) -> Self;
    /// build a signed value from a magnitude and a sign (`true` =
    /// negative), as done when loading a term's coefficient under a
    /// negative literal.
    fn from_unsigned(mag: &Self::Unsigned, negative: bool) -> Self;
    /// fallibly narrow back to the unsigned domain; fails (returns
    /// `None`) if negative or, for a bounded representation, too
    /// large.
    fn try_into_unsigned(&self) -> Option<Self::Unsigned>;
}

// ---- small (32-bit) representation --------------------------------

impl Coeff for u32 {
    type Signed = i64;

    fn zero() -> Self {
        0
    }
    fn one() -> Self {
        1
    }
    fn is_zero(&self) -> bool {
        *self == 0
    }
    fn checked_add(&self, other: &Self) -> Option<Self> {
        u32::checked_add(*self, *other)
    }
    fn clamp_to(&self, cap: &Self) -> Self {
        (*self).min(*cap)
    }
    fn sub(&self, other: &Self) -> Self {
        self - other
    }
    fn to_signed(&self) -> i64 {
        *self as i64
    }
    fn from_u64(x: u64) -> Self {
        x as u32
    }
    fn to_u64_saturating(&self) -> u64 {
        *self as u64
    }
}

impl FatCoeff for i64 {
    type Unsigned = u32;

    fn zero() -> Self {
        0
    }
    fn is_zero(&self) -> bool {
        *self == 0
    }
    fn is_negative(&self) -> bool {
        *self < 0
    }
    fn magnitude(&self) -> u32 {
        self.unsigned_abs() as u32
    }
    fn add(&self, other: &Self) -> Self {
        self + other
    }
    fn sub(&self, other: &Self) -> Self {
        self - other
    }
    fn neg(&self) -> Self {
        -self
    }
    fn mul_u64(&self, k: u64) -> Self {
        self * k as i64
    }
    fn from_unsigned(mag: &u32, negative: bool) -> Self {
        if negative {
            -(*mag as i64)
        } else {
            *mag as i64
        }
    }
    fn try_into_unsigned(&self) -> Option<u32> {
        if *self < 0 {
            None
        } else {
            u32::try_from(*self).ok()
        }
    }
}

// ---- big (arbitrary precision) representation ----------------------

impl Coeff for BigUint {
    type Signed = BigInt;

    fn zero() -> Self {
        Zero::zero()
    }
    fn one() -> Self {
        One::one()
    }
    fn is_zero(&self) -> bool {
        Zero::is_zero(self)
    }
    fn checked_add(&self, other: &Self) -> Option<Self> {
        Some(self + other)
    }
    fn clamp_to(&self, cap: &Self) -> Self {
        if self > cap {
            cap.clone()
        } else {
            self.clone()
        }
    }
    fn sub(&self, other: &Self) -> Self {
        self - other
    }
    fn to_signed(&self) -> BigInt {
        BigInt::from(self.clone())
    }
    fn from_u64(x: u64) -> Self {
        BigUint::from(x)
    }
    fn to_u64_saturating(&self) -> u64 {
        self.to_u64().unwrap_or(u64::MAX)
    }
}

impl FatCoeff for BigInt {
    type Unsigned = BigUint;

    fn zero() -> Self {
        Zero::zero()
    }
    fn is_zero(&self) -> bool {
        Zero::is_zero(self)
    }
    fn is_negative(&self) -> bool {
        Signed::is_negative(self)
    }
    fn magnitude(&self) -> BigUint {
        self.abs().to_biguint().expect("abs() is non-negative")
    }
    fn add(&self, other: &Self) -> Self {
        self + other
    }
    fn sub(&self, other: &Self) -> Self {
        self - other
    }
    fn neg(&self) -> Self {
        -self
    }
    fn mul_u64(&self, k: u64) -> Self {
        self * BigInt::from(k)
    }
    fn from_unsigned(mag: &BigUint, negative: bool) -> Self {
        let v = BigInt::from(mag.clone());
        if negative {
            -v
        } else {
            v
        }
    }
    fn try_into_unsigned(&self) -> Option<BigUint> {
        self.to_biguint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_round_trips_through_signed() {
        let c: u32 = 7;
        let s = c.to_signed();
        assert_eq!(s.try_into_unsigned(), Some(7));
        let neg = i64::from_unsigned(&5u32, true);
        assert_eq!(neg, -5);
        assert!(neg.try_into_unsigned().is_none());
    }

    #[test]
    fn big_round_trips_through_signed() {
        let c = BigUint::from(123_456_789u64);
        let s = c.to_signed();
        assert_eq!(s.try_into_unsigned().as_ref(), Some(&c));
    }
}
