//! Goldilocks prime field, power-of-two NTTs, and the decimal element codec.
//!
//! - `Fp64<P>`: prime field modulo a 64-bit prime `P` (const generic).
//! - Goldilocks helpers: 64-bit field `p = 2^64 - 2^32 + 1`, primitive 2^k roots.
//! - Modules: `domain`, `ntt`, `coset` for power-of-two NTTs and LDEs, and
//!   `codec` for the canonical decimal-string encoding used at every
//!   serialization boundary (`"0"`, `"1"`, … `"18446744069414584320"`).

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown
)]

pub mod codec;
pub mod coset;
pub mod domain;
pub mod ntt; // in-place NTT/INTT and (eval <-> coeff) helpers

pub use codec::ParseFieldError;
pub use domain::{pow2_domain, Pow2Domain};

use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// 64-bit prime field element (const generic modulus).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fp64<const P: u64>(
    /// Canonical representative modulo `P`. Public for convenience.
    pub u64,
);

impl<const P: u64> Fp64<P> {
    /// Field modulus.
    pub const MODULUS: u64 = P;

    /// Zero.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// One.
    #[inline]
    #[must_use]
    pub const fn one() -> Self {
        Self(1 % P)
    }

    /// Add two raw residues modulo `P` without overflow (via u128).
    #[inline]
    #[must_use]
    pub const fn add_raw(a: u64, b: u64) -> u64 {
        let s = (a as u128) + (b as u128);
        let s = if s >= (P as u128) { s - (P as u128) } else { s };
        s as u64
    }

    /// Subtract two raw residues modulo `P` without overflow (via u128).
    #[inline]
    #[must_use]
    pub const fn sub_raw(a: u64, b: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            ((a as u128) + (P as u128) - (b as u128)) as u64
        }
    }

    /// Multiply two raw residues modulo `P` using a 128-bit intermediate.
    #[inline]
    #[must_use]
    pub const fn mul_raw(a: u64, b: u64) -> u64 {
        let prod = (a as u128) * (b as u128);
        (prod % (P as u128)) as u64
    }

    /// Exponentiation by squaring.
    #[inline]
    #[must_use]
    pub fn pow(self, mut e: u64) -> Self {
        let mut base = self;
        let mut acc = Self::one();
        while e > 0 {
            if e & 1 == 1 {
                acc *= base;
            }
            base *= base;
            e >>= 1;
        }
        acc
    }

    /// Multiplicative inverse (P assumed prime). The inverse of zero is zero.
    #[inline]
    #[must_use]
    pub fn inv(self) -> Self {
        self.pow(P - 2)
    }

    /// From `u64` reduced mod `P`.
    #[inline]
    #[must_use]
    pub const fn from_u64(x: u64) -> Self {
        Self(x % P)
    }

    /// From `u64` only if it is already a canonical residue (`x < P`).
    #[inline]
    #[must_use]
    pub const fn from_canonical_u64(x: u64) -> Option<Self> {
        if x < P {
            Some(Self(x))
        } else {
            None
        }
    }

    /// Canonical representative in `[0, P)`.
    #[inline]
    #[must_use]
    pub const fn as_canonical_u64(self) -> u64 {
        self.0
    }

    /// Into little-endian 8 bytes (canonical for this field).
    #[inline]
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// From little-endian 8 bytes, reducing mod `P`.
    #[inline]
    #[must_use]
    pub const fn from_le_bytes(le: [u8; 8]) -> Self {
        Self::from_u64(u64::from_le_bytes(le))
    }

    /// Additive inverse.
    #[inline]
    #[must_use]
    pub const fn neg(self) -> Self {
        if self.0 == 0 {
            self
        } else {
            Self(P - self.0)
        }
    }

    /// Whether this is the zero element.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl<const P: u64> Default for Fp64<P> {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl<const P: u64> Add for Fp64<P> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(Self::add_raw(self.0, rhs.0))
    }
}
impl<const P: u64> Sub for Fp64<P> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(Self::sub_raw(self.0, rhs.0))
    }
}
impl<const P: u64> Mul for Fp64<P> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(Self::mul_raw(self.0, rhs.0))
    }
}
impl<const P: u64> AddAssign for Fp64<P> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl<const P: u64> SubAssign for Fp64<P> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl<const P: u64> MulAssign for Fp64<P> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}
impl<const P: u64> Neg for Fp64<P> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::neg(self)
    }
}

/* ---------------- Goldilocks helpers ---------------- */

/// Goldilocks prime `p = 2^64 - 2^32 + 1`.
pub const GOLDILOCKS: u64 = 0xffff_ffff_0000_0001;

/// Goldilocks field element type.
pub type Goldilocks = Fp64<GOLDILOCKS>;

/// Two-adicity of the Goldilocks multiplicative group.
pub const GOLDILOCKS_TWO_ADICITY: u32 = 32;

/// Return a primitive `2^k` root of unity in Goldilocks.
/// (Uses `g=7`; Goldilocks has 2-adicity 32.)
///
/// # Panics
/// Panics if `k > 32`.
#[must_use]
pub fn goldilocks_primitive_root_2exp(k: u32) -> Goldilocks {
    assert!(
        k <= GOLDILOCKS_TWO_ADICITY,
        "k too large for Goldilocks 2-adicity"
    );
    let g = Goldilocks::from_u64(7);
    let exp = (GOLDILOCKS - 1) >> k;
    g.pow(exp)
}

/// Invert every element with a single field inversion (Montgomery's trick).
///
/// Zero entries map to zero, matching [`Fp64::inv`].
#[must_use]
pub fn batch_inverse<const P: u64>(values: &[Fp64<P>]) -> Vec<Fp64<P>> {
    let mut prefix = Vec::with_capacity(values.len());
    let mut acc = Fp64::<P>::one();
    for &v in values {
        prefix.push(acc);
        if !v.is_zero() {
            acc *= v;
        }
    }
    let mut inv_acc = acc.inv();
    let mut out = vec![Fp64::<P>::zero(); values.len()];
    for (i, &v) in values.iter().enumerate().rev() {
        if v.is_zero() {
            continue;
        }
        out[i] = inv_acc * prefix[i];
        inv_acc *= v;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_inverse_matches_single_inverse() {
        let xs: Vec<Goldilocks> = [5u64, 0, 1, GOLDILOCKS - 1, 977]
            .iter()
            .map(|&v| Goldilocks::from_u64(v))
            .collect();
        let inv = batch_inverse(&xs);
        for (x, y) in xs.iter().zip(&inv) {
            assert_eq!(x.inv(), *y);
        }
    }

    #[test]
    fn goldi_roots_pow2() {
        for k in 1..=8 {
            let w = goldilocks_primitive_root_2exp(k);
            let n = 1u64 << k;
            assert_eq!(w.pow(n).0, 1);
            assert_ne!(w.pow(n / 2).0, 1, "root of order 2^{k} must be primitive");
        }
    }

    #[test]
    fn inverse_and_negation() {
        let x = Goldilocks::from_u64(123_456_789);
        assert_eq!(x * x.inv(), Goldilocks::one());
        assert_eq!(x + (-x), Goldilocks::zero());
        assert_eq!(-Goldilocks::zero(), Goldilocks::zero());
    }

    #[test]
    fn canonical_constructor_rejects_modulus() {
        assert!(Goldilocks::from_canonical_u64(GOLDILOCKS).is_none());
        assert!(Goldilocks::from_canonical_u64(u64::MAX).is_none());
        assert_eq!(
            Goldilocks::from_canonical_u64(GOLDILOCKS - 1).map(Goldilocks::as_canonical_u64),
            Some(GOLDILOCKS - 1)
        );
    }

    #[test]
    fn wraparound_arithmetic() {
        let max = Goldilocks::from_u64(GOLDILOCKS - 1);
        assert_eq!(max + Goldilocks::one(), Goldilocks::zero());
        assert_eq!(Goldilocks::zero() - Goldilocks::one(), max);
        assert_eq!(max * max, Goldilocks::one());
    }
}
