//! Fixed-length unit arithmetic.
//!
//! Operands are little-endian unit arrays whose length `n` is supplied by the
//! caller on every call; only the first `n` units of each slice are read or
//! written and `n = 0` denotes the value zero. Output capacity is never
//! inferred: a slice shorter than `n` is a programming error and panics.
//!
//! Unless noted otherwise, running time depends on `n` only, never on the
//! unit values.

use crate::ct;
use crate::limb::{self, Limb, LIMB_BITS};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater, ConstantTimeLess};

#[inline]
#[track_caller]
fn check(n: usize, len: usize, what: &str) {
    assert!(len >= n, "ccn: {what} holds {len} units, {n} required");
}

/// `r = s + t`, returning the carry out of the top unit.
pub fn add(n: usize, r: &mut [Limb], s: &[Limb], t: &[Limb]) -> Limb {
    check(n, r.len(), "r");
    check(n, s.len(), "s");
    check(n, t.len(), "t");
    let mut carry = 0;
    for ((ri, &si), &ti) in r[..n].iter_mut().zip(&s[..n]).zip(&t[..n]) {
        let (v, c) = limb::adc(si, ti, carry);
        *ri = v;
        carry = c;
    }
    carry
}

/// `r = s - t`, returning the borrow out of the top unit.
pub fn sub(n: usize, r: &mut [Limb], s: &[Limb], t: &[Limb]) -> Limb {
    check(n, r.len(), "r");
    check(n, s.len(), "s");
    check(n, t.len(), "t");
    let mut borrow = 0;
    for ((ri, &si), &ti) in r[..n].iter_mut().zip(&s[..n]).zip(&t[..n]) {
        let (v, b) = limb::sbb(si, ti, borrow);
        *ri = v;
        borrow = b;
    }
    borrow
}

/// `r += t`, returning the carry.
pub fn add_in_place(n: usize, r: &mut [Limb], t: &[Limb]) -> Limb {
    check(n, r.len(), "r");
    check(n, t.len(), "t");
    let mut carry = 0;
    for (ri, &ti) in r[..n].iter_mut().zip(&t[..n]) {
        let (v, c) = limb::adc(*ri, ti, carry);
        *ri = v;
        carry = c;
    }
    carry
}

/// `r -= t`, returning the borrow.
pub fn sub_in_place(n: usize, r: &mut [Limb], t: &[Limb]) -> Limb {
    check(n, r.len(), "r");
    check(n, t.len(), "t");
    let mut borrow = 0;
    for (ri, &ti) in r[..n].iter_mut().zip(&t[..n]) {
        let (v, b) = limb::sbb(*ri, ti, borrow);
        *ri = v;
        borrow = b;
    }
    borrow
}

/// `r = s + v` for a single unit `v`, returning the carry.
///
/// The carry is rippled through all `n` units. With `n = 0` nothing fits and
/// `v` itself is returned.
pub fn add1(n: usize, r: &mut [Limb], s: &[Limb], v: Limb) -> Limb {
    check(n, r.len(), "r");
    check(n, s.len(), "s");
    let mut carry = v;
    for (ri, &si) in r[..n].iter_mut().zip(&s[..n]) {
        let (x, c) = limb::adc(si, carry, 0);
        *ri = x;
        carry = c;
    }
    carry
}

/// `r = s - v` for a single unit `v`, returning the borrow.
///
/// With `n = 0` the whole of `v` is owed and returned.
pub fn sub1(n: usize, r: &mut [Limb], s: &[Limb], v: Limb) -> Limb {
    check(n, r.len(), "r");
    check(n, s.len(), "s");
    let mut borrow = v;
    for (ri, &si) in r[..n].iter_mut().zip(&s[..n]) {
        let (x, b) = limb::sbb(si, borrow, 0);
        *ri = x;
        borrow = b;
    }
    borrow
}

/// Compare `s` and `t`: -1, 0 or 1.
pub fn cmp(n: usize, s: &[Limb], t: &[Limb]) -> i32 {
    check(n, s.len(), "s");
    check(n, t.len(), "t");
    let mut res: i32 = 0;
    // Walk upwards so the most significant differing unit decides.
    for (&si, &ti) in s[..n].iter().zip(&t[..n]) {
        res = i32::conditional_select(&res, &1, si.ct_gt(&ti));
        res = i32::conditional_select(&res, &-1, si.ct_lt(&ti));
    }
    res
}

/// Compare `s` (`ns` units) and `t` (`nt` units): -1, 0 or 1.
///
/// The overlapping low units are compared first; any non-zero excess unit of
/// the longer operand then makes it the greater one.
pub fn cmpn(ns: usize, s: &[Limb], nt: usize, t: &[Limb]) -> i32 {
    check(ns, s.len(), "s");
    check(nt, t.len(), "t");
    if ns <= nt {
        let low = cmp(ns, s, t);
        let excess = !Choice::from(is_zero(nt - ns, &t[ns..nt]) as u8);
        i32::conditional_select(&low, &-1, excess)
    } else {
        let low = cmp(nt, s, t);
        let excess = !Choice::from(is_zero(ns - nt, &s[nt..ns]) as u8);
        i32::conditional_select(&low, &1, excess)
    }
}

/// Number of significant units of `s`: the index of the highest non-zero
/// unit plus one, or 0 if `s` is zero.
///
/// All `n` units are visited; the position is tracked by multiplexing, so the
/// time taken does not reveal the magnitude.
pub fn n(n: usize, s: &[Limb]) -> usize {
    check(n, s.len(), "s");
    let mut count: u64 = 0;
    for (i, &u) in s[..n].iter().enumerate() {
        count.conditional_assign(&(i as u64 + 1), ct::is_nonzero(u));
    }
    count as usize
}

/// True iff all `n` units are zero.
pub fn is_zero(n: usize, s: &[Limb]) -> bool {
    check(n, s.len(), "s");
    let acc = s[..n].iter().fold(0, |acc, &u| acc | u);
    bool::from(acc.ct_eq(&0))
}

/// Number of significant bits of `s`.
pub fn bitlen(n: usize, s: &[Limb]) -> usize {
    check(n, s.len(), "s");
    let mut bits: u64 = 0;
    for (i, &u) in s[..n].iter().enumerate() {
        let b = (i * LIMB_BITS + ct::limb_bit_len(u)) as u64;
        bits.conditional_assign(&b, ct::is_nonzero(u));
    }
    bits as usize
}

/// `r = s`.
pub fn set(n: usize, r: &mut [Limb], s: &[Limb]) {
    check(n, r.len(), "r");
    check(n, s.len(), "s");
    r[..n].copy_from_slice(&s[..n]);
}

/// `r = s` where `s` has `ns <= n` units; the top `n - ns` units of `r` are cleared.
pub fn setn(n: usize, r: &mut [Limb], ns: usize, s: &[Limb]) {
    assert!(ns <= n, "ccn: source of {ns} units does not fit {n}");
    check(n, r.len(), "r");
    set(ns, r, s);
    zero(n - ns, &mut r[ns..]);
}

/// `r = 0`.
pub fn zero(n: usize, r: &mut [Limb]) {
    check(n, r.len(), "r");
    r[..n].iter_mut().for_each(|u| *u = 0);
}

/// `r <<= k` for `k < LIMB_BITS`, returning the bits shifted out of the top
/// unit (right-aligned).
pub fn shift_left(n: usize, r: &mut [Limb], k: usize) -> Limb {
    assert!(k < LIMB_BITS, "ccn: shift of {k} bits");
    check(n, r.len(), "r");
    if k == 0 {
        return 0;
    }
    let mut carry = 0;
    for u in r[..n].iter_mut() {
        let v = *u;
        *u = (v << k) | carry;
        carry = v >> (LIMB_BITS - k);
    }
    carry
}

/// `r >>= k` for `k < LIMB_BITS`, returning the bits shifted out of the
/// bottom unit (left-aligned).
pub fn shift_right(n: usize, r: &mut [Limb], k: usize) -> Limb {
    assert!(k < LIMB_BITS, "ccn: shift of {k} bits");
    check(n, r.len(), "r");
    if k == 0 {
        return 0;
    }
    let mut carry = 0;
    for u in r[..n].iter_mut().rev() {
        let v = *u;
        *u = (v >> k) | carry;
        carry = v << (LIMB_BITS - k);
    }
    carry
}

/// `r = s * v`, returning the high unit.
pub fn mul1(n: usize, r: &mut [Limb], s: &[Limb], v: Limb) -> Limb {
    check(n, r.len(), "r");
    check(n, s.len(), "s");
    let mut carry = 0;
    for (ri, &si) in r[..n].iter_mut().zip(&s[..n]) {
        let (lo, hi) = limb::mac(si, v, 0, carry);
        *ri = lo;
        carry = hi;
    }
    carry
}

/// `r += s * v`, returning the high unit.
pub fn addmul1(n: usize, r: &mut [Limb], s: &[Limb], v: Limb) -> Limb {
    check(n, r.len(), "r");
    check(n, s.len(), "s");
    let mut carry = 0;
    for (ri, &si) in r[..n].iter_mut().zip(&s[..n]) {
        let (lo, hi) = limb::mac(si, v, *ri, carry);
        *ri = lo;
        carry = hi;
    }
    carry
}

/// `r = s * t`; `r` must hold `2n` units.
pub fn mul(n: usize, r: &mut [Limb], s: &[Limb], t: &[Limb]) {
    mul_uneven(r, n, s, n, t);
}

/// `r = s * t` for operands of `ns` and `nt` units; `r` must hold `ns + nt` units.
pub fn mul_uneven(r: &mut [Limb], ns: usize, s: &[Limb], nt: usize, t: &[Limb]) {
    check(ns + nt, r.len(), "r");
    check(ns, s.len(), "s");
    check(nt, t.len(), "t");
    zero(ns + nt, r);
    for (i, &si) in s[..ns].iter().enumerate() {
        r[i + nt] = addmul1(nt, &mut r[i..], t, si);
    }
}

/// `q = s / d` for a single non-zero unit `d`, returning the remainder.
///
/// Variable time in `d`: meant for public divisors such as radix powers.
pub fn div1(n: usize, q: &mut [Limb], s: &[Limb], d: Limb) -> Limb {
    assert!(d != 0, "ccn: division by a zero unit");
    check(n, q.len(), "q");
    check(n, s.len(), "s");
    let mut rem = 0;
    for i in (0..n).rev() {
        let (qi, ri) = limb::div_wide(rem, s[i], d);
        q[i] = qi;
        rem = ri;
    }
    rem
}

/// `r = s` if `choice` is set, otherwise `r` is left unchanged.
pub fn cond_assign(n: usize, r: &mut [Limb], s: &[Limb], choice: Choice) {
    check(n, r.len(), "r");
    check(n, s.len(), "s");
    for (ri, si) in r[..n].iter_mut().zip(&s[..n]) {
        ri.conditional_assign(si, choice);
    }
}

/// Swap `a` and `b` if `choice` is set.
pub fn cond_swap(n: usize, a: &mut [Limb], b: &mut [Limb], choice: Choice) {
    check(n, a.len(), "a");
    check(n, b.len(), "b");
    for (ai, bi) in a[..n].iter_mut().zip(b[..n].iter_mut()) {
        Limb::conditional_swap(ai, bi, choice);
    }
}
