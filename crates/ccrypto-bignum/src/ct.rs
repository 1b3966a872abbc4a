//! Constant-time selection primitives.
//!
//! Every secret-dependent choice in this crate goes through these helpers so
//! that control flow and memory access stay independent of the data. Results
//! are computed with masks over [`subtle::Choice`], never with `if`.

use crate::bignum::BigInt;
use crate::limb::{Limb, LIMB_BITS};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

/// Return `b` if `choice` is set, `a` otherwise.
#[inline]
pub fn mux_limb(choice: Choice, a: Limb, b: Limb) -> Limb {
    Limb::conditional_select(&a, &b, choice)
}

/// Return `b` if `choice` is set, `a` otherwise.
#[inline]
pub fn mux_usize(choice: Choice, a: usize, b: usize) -> usize {
    u64::conditional_select(&(a as u64), &(b as u64), choice) as usize
}

/// All-ones if `choice` is set, zero otherwise.
#[inline]
pub fn mask(choice: Choice) -> Limb {
    (choice.unwrap_u8() as Limb).wrapping_neg()
}

/// Set iff `x != 0`.
#[inline]
pub fn is_nonzero(x: Limb) -> Choice {
    Choice::from(((x | x.wrapping_neg()) >> (LIMB_BITS - 1)) as u8)
}

/// Number of significant bits of a single unit, without a data-dependent
/// loop or `leading_zeros`.
pub fn limb_bit_len(x: Limb) -> usize {
    let mut x = x;
    let mut n: usize = 0;
    for shift in [32usize, 16, 8, 4, 2, 1] {
        let hi = x >> shift;
        let nz = is_nonzero(hi);
        n += shift & (mask(nz) as usize);
        x = mux_limb(nz, x, hi);
    }
    n + (x & 1) as usize
}

impl BigInt {
    /// Constant-time equality comparison over the allocated units.
    pub fn ct_eq(&self, other: &BigInt) -> Choice {
        let a = self.units();
        let b = other.units();
        let max_len = a.len().max(b.len());
        let mut result = (self.is_negative() as u8).ct_eq(&(other.is_negative() as u8));
        for i in 0..max_len {
            let av = a.get(i).copied().unwrap_or(0);
            let bv = b.get(i).copied().unwrap_or(0);
            result &= av.ct_eq(&bv);
        }
        result
    }

    /// Constant-time conditional select: returns `a` if choice == 0, `b` if choice == 1.
    pub fn ct_select(a: &BigInt, b: &BigInt, choice: Choice) -> BigInt {
        let max_len = a.units().len().max(b.units().len());
        let mut units = vec![0 as Limb; max_len];
        for (i, u) in units.iter_mut().enumerate() {
            let av = a.units().get(i).copied().unwrap_or(0);
            let bv = b.units().get(i).copied().unwrap_or(0);
            *u = mux_limb(choice, av, bv);
        }
        let neg = bool::from(Choice::conditional_select(
            &Choice::from(a.is_negative() as u8),
            &Choice::from(b.is_negative() as u8),
            choice,
        ));
        let mut r = BigInt::from_units(&units);
        units.zeroize();
        r.set_negative(neg);
        r
    }
}

impl ConstantTimeEq for BigInt {
    fn ct_eq(&self, other: &Self) -> Choice {
        BigInt::ct_eq(self, other)
    }
}
