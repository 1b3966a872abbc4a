//! Signed addition, subtraction, multiplication and shifts for BigInt.
//!
//! The `set_*` forms write into an existing destination and reuse its
//! buffer. Rust's borrow rules keep the destination distinct from the
//! operands there; the `*_assign` forms cover `r = r op t` and materialise a
//! copy of `self` before overwriting it.

use crate::bignum::BigInt;
use crate::ccn;
use crate::limb::{self, Limb, LIMB_BITS};
use std::cmp::Ordering;

impl BigInt {
    /// Compare absolute values.
    pub fn cmp_abs(&self, other: &BigInt) -> Ordering {
        let a = self.units();
        let b = other.units();
        ccn::cmpn(a.len(), a, b.len(), b).cmp(&0)
    }

    /// `self = s + t`.
    pub fn set_add(&mut self, s: &BigInt, t: &BigInt) {
        self.set_signed_sum(s, s.is_negative(), t, t.is_negative());
    }

    /// `self = s - t`.
    pub fn set_sub(&mut self, s: &BigInt, t: &BigInt) {
        self.set_signed_sum(s, s.is_negative(), t, !t.is_negative() && !t.is_zero());
    }

    /// `self = s * t`.
    pub fn set_mul(&mut self, s: &BigInt, t: &BigInt) {
        let (ns, nt) = (s.num_units(), t.num_units());
        if ns == 0 || nt == 0 {
            self.prepare(0);
            return;
        }
        let buf = self.prepare(ns + nt);
        ccn::mul_uneven(buf, ns, s.units(), nt, t.units());
        self.normalize();
        self.set_negative(s.is_negative() != t.is_negative());
    }

    /// `self += t`.
    pub fn add_assign(&mut self, t: &BigInt) {
        let s = self.clone();
        self.set_add(&s, t);
    }

    /// `self -= t`.
    pub fn sub_assign(&mut self, t: &BigInt) {
        let s = self.clone();
        self.set_sub(&s, t);
    }

    /// `self *= t`.
    pub fn mul_assign(&mut self, t: &BigInt) {
        let s = self.clone();
        self.set_mul(&s, t);
    }

    /// `self = self * self`.
    pub fn sqr_assign(&mut self) {
        let s = self.clone();
        self.set_mul(&s, &s);
    }

    /// Add two BigInts: self + other.
    pub fn add(&self, other: &BigInt) -> BigInt {
        let mut r = BigInt::with_allocator(self.allocator());
        r.set_add(self, other);
        r
    }

    /// Subtract: self - other.
    pub fn sub(&self, other: &BigInt) -> BigInt {
        let mut r = BigInt::with_allocator(self.allocator());
        r.set_sub(self, other);
        r
    }

    /// Multiply: self * other.
    pub fn mul(&self, other: &BigInt) -> BigInt {
        let mut r = BigInt::with_allocator(self.allocator());
        r.set_mul(self, other);
        r
    }

    /// Square: self * self.
    pub fn sqr(&self) -> BigInt {
        self.mul(self)
    }

    /// Shift the magnitude left by `bits`; the sign is kept.
    pub fn shl(&self, bits: usize) -> BigInt {
        let mut r = BigInt::with_allocator(self.allocator());
        if self.is_zero() {
            return r;
        }
        let (whole, part) = (bits / LIMB_BITS, bits % LIMB_BITS);
        let n = self.num_units();
        let buf = r.prepare(n + whole + 1);
        buf[whole..whole + n].copy_from_slice(self.units());
        buf[whole + n] = ccn::shift_left(n, &mut buf[whole..], part);
        r.normalize();
        r.set_negative(self.is_negative());
        r
    }

    /// Shift the magnitude right by `bits`, discarding the low bits; the sign is kept.
    pub fn shr(&self, bits: usize) -> BigInt {
        let mut r = BigInt::with_allocator(self.allocator());
        let (whole, part) = (bits / LIMB_BITS, bits % LIMB_BITS);
        let n = self.num_units();
        if whole >= n {
            return r;
        }
        let buf = r.prepare(n - whole);
        buf.copy_from_slice(&self.units()[whole..]);
        ccn::shift_right(n - whole, buf, part);
        r.normalize();
        r.set_negative(self.is_negative());
        r
    }

    fn set_signed_sum(&mut self, s: &BigInt, s_neg: bool, t: &BigInt, t_neg: bool) {
        if s_neg == t_neg {
            self.set_add_magnitudes(s.units(), t.units());
            self.set_negative(s_neg);
            return;
        }
        match s.cmp_abs(t) {
            Ordering::Less => {
                self.set_sub_magnitudes(t.units(), s.units());
                self.set_negative(t_neg);
            }
            _ => {
                self.set_sub_magnitudes(s.units(), t.units());
                self.set_negative(s_neg);
            }
        }
    }

    fn set_add_magnitudes(&mut self, a: &[Limb], b: &[Limb]) {
        let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
        let buf = self.prepare(long.len() + 1);
        buf[..long.len()].copy_from_slice(long);
        let mut carry = ccn::add_in_place(short.len(), buf, short);
        for u in buf[short.len()..long.len()].iter_mut() {
            let (v, c) = limb::adc(*u, 0, carry);
            *u = v;
            carry = c;
        }
        buf[long.len()] = carry;
        self.normalize();
    }

    /// Requires `|a| >= |b|`.
    fn set_sub_magnitudes(&mut self, a: &[Limb], b: &[Limb]) {
        let buf = self.prepare(a.len());
        buf.copy_from_slice(a);
        let mut borrow = ccn::sub_in_place(b.len(), buf, b);
        for u in buf[b.len()..].iter_mut() {
            let (v, bb) = limb::sbb(*u, 0, borrow);
            *u = v;
            borrow = bb;
        }
        debug_assert_eq!(borrow, 0);
        self.normalize();
    }
}
