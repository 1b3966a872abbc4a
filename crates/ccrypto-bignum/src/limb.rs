//! Single-unit carry, borrow and multiply-accumulate primitives.
//!
//! Two renditions exist for each primitive: one using the native double-width
//! `u128` accumulator and one that splits every unit into two half-units so
//! no intermediate exceeds a single unit. They are numerically identical; the
//! `split-limb` feature selects the second one for the whole crate.

/// Limb type for big number representation (64-bit on 64-bit platforms).
pub type Limb = u64;
/// Double-width type for multiplication intermediates.
pub type DoubleLimb = u128;

/// Bits per limb.
pub const LIMB_BITS: usize = 64;
/// Bytes per limb.
pub const LIMB_BYTES: usize = LIMB_BITS / 8;

const HALF_BITS: u32 = (LIMB_BITS / 2) as u32;
const HALF_MASK: Limb = (1 << HALF_BITS) - 1;

/// `a + b + carry`, returning `(sum, carry_out)`. `carry` must be 0 or 1
/// unless `b` is 0.
#[inline(always)]
pub fn adc(a: Limb, b: Limb, carry: Limb) -> (Limb, Limb) {
    #[cfg(feature = "split-limb")]
    {
        adc_split(a, b, carry)
    }
    #[cfg(not(feature = "split-limb"))]
    {
        adc_wide(a, b, carry)
    }
}

/// `a - b - borrow`, returning `(difference, borrow_out)`.
#[inline(always)]
pub fn sbb(a: Limb, b: Limb, borrow: Limb) -> (Limb, Limb) {
    #[cfg(feature = "split-limb")]
    {
        sbb_split(a, b, borrow)
    }
    #[cfg(not(feature = "split-limb"))]
    {
        sbb_wide(a, b, borrow)
    }
}

/// `a * b + c + carry`, returning `(low, high)`. Never overflows.
#[inline(always)]
pub fn mac(a: Limb, b: Limb, c: Limb, carry: Limb) -> (Limb, Limb) {
    #[cfg(feature = "split-limb")]
    {
        mac_split(a, b, c, carry)
    }
    #[cfg(not(feature = "split-limb"))]
    {
        mac_wide(a, b, c, carry)
    }
}

/// Divide the two-unit value `hi:lo` by `d`, with `hi < d`.
///
/// Variable time: only used where the divisor is public.
#[inline]
pub fn div_wide(hi: Limb, lo: Limb, d: Limb) -> (Limb, Limb) {
    debug_assert!(hi < d);
    let num = ((hi as DoubleLimb) << LIMB_BITS) | lo as DoubleLimb;
    let q = num / d as DoubleLimb;
    let r = num % d as DoubleLimb;
    (q as Limb, r as Limb)
}

#[cfg_attr(feature = "split-limb", allow(dead_code))]
#[inline(always)]
pub(crate) fn adc_wide(a: Limb, b: Limb, carry: Limb) -> (Limb, Limb) {
    let t = a as DoubleLimb + b as DoubleLimb + carry as DoubleLimb;
    (t as Limb, (t >> LIMB_BITS) as Limb)
}

#[cfg_attr(feature = "split-limb", allow(dead_code))]
#[inline(always)]
pub(crate) fn sbb_wide(a: Limb, b: Limb, borrow: Limb) -> (Limb, Limb) {
    let t = (a as DoubleLimb).wrapping_sub(b as DoubleLimb + borrow as DoubleLimb);
    (t as Limb, ((t >> LIMB_BITS) as Limb) & 1)
}

#[cfg_attr(feature = "split-limb", allow(dead_code))]
#[inline(always)]
pub(crate) fn mac_wide(a: Limb, b: Limb, c: Limb, carry: Limb) -> (Limb, Limb) {
    let t = a as DoubleLimb * b as DoubleLimb + c as DoubleLimb + carry as DoubleLimb;
    (t as Limb, (t >> LIMB_BITS) as Limb)
}

#[cfg_attr(not(feature = "split-limb"), allow(dead_code))]
#[inline(always)]
pub(crate) fn adc_split(a: Limb, b: Limb, carry: Limb) -> (Limb, Limb) {
    // Each half-sum is below 2^(HALF_BITS + 2) as long as carry fits a unit.
    let lo = (a & HALF_MASK) + (b & HALF_MASK) + (carry & HALF_MASK);
    let hi = (a >> HALF_BITS) + (b >> HALF_BITS) + (carry >> HALF_BITS) + (lo >> HALF_BITS);
    ((hi << HALF_BITS) | (lo & HALF_MASK), hi >> HALF_BITS)
}

#[cfg_attr(not(feature = "split-limb"), allow(dead_code))]
#[inline(always)]
pub(crate) fn sbb_split(a: Limb, b: Limb, borrow: Limb) -> (Limb, Limb) {
    // The low half-difference lies in (-2^(HALF_BITS + 1), 2^HALF_BITS); an
    // arithmetic shift of its wrapped form yields minus the half-borrow.
    let lo = (a & HALF_MASK)
        .wrapping_sub(b & HALF_MASK)
        .wrapping_sub(borrow & HALF_MASK);
    let lo_borrow = ((lo as i64) >> HALF_BITS).wrapping_neg() as Limb;
    let hi = (a >> HALF_BITS)
        .wrapping_sub(b >> HALF_BITS)
        .wrapping_sub(borrow >> HALF_BITS)
        .wrapping_sub(lo_borrow);
    let hi_borrow = hi >> (LIMB_BITS - 1);
    (((hi & HALF_MASK) << HALF_BITS) | (lo & HALF_MASK), hi_borrow)
}

#[cfg_attr(not(feature = "split-limb"), allow(dead_code))]
#[inline(always)]
pub(crate) fn mac_split(a: Limb, b: Limb, c: Limb, carry: Limb) -> (Limb, Limb) {
    let (a0, a1) = (a & HALF_MASK, a >> HALF_BITS);
    let (b0, b1) = (b & HALF_MASK, b >> HALF_BITS);
    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    let mid = (p00 >> HALF_BITS) + (p01 & HALF_MASK) + (p10 & HALF_MASK);
    let lo = (p00 & HALF_MASK) | ((mid & HALF_MASK) << HALF_BITS);
    let hi = p11 + (p01 >> HALF_BITS) + (p10 >> HALF_BITS) + (mid >> HALF_BITS);

    let (lo, k1) = adc_split(lo, c, 0);
    let (lo, k2) = adc_split(lo, carry, 0);
    (lo, hi + k1 + k2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<Limb> {
        let mut v = vec![
            0,
            1,
            2,
            HALF_MASK - 1,
            HALF_MASK,
            HALF_MASK + 1,
            Limb::MAX - 1,
            Limb::MAX,
            1 << (LIMB_BITS - 1),
        ];
        let mut x: u64 = 0x9E37_79B9_7F4A_7C15;
        for _ in 0..24 {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            v.push(x);
        }
        v
    }

    #[test]
    fn test_split_matches_wide() {
        let s = samples();
        for &a in &s {
            for &b in &s {
                for carry in [0, 1] {
                    assert_eq!(adc_split(a, b, carry), adc_wide(a, b, carry), "adc {a:x} {b:x}");
                    assert_eq!(sbb_split(a, b, carry), sbb_wide(a, b, carry), "sbb {a:x} {b:x}");
                }
                for &c in s.iter().take(6) {
                    assert_eq!(mac_split(a, b, c, 1), mac_wide(a, b, c, 1), "mac {a:x} {b:x}");
                    assert_eq!(mac_split(a, b, c, Limb::MAX), mac_wide(a, b, c, Limb::MAX));
                }
            }
        }
    }

    #[test]
    fn test_full_unit_carry_in() {
        // add1/sub1 feed a whole unit through the carry slot on the first step.
        for &a in &samples() {
            assert_eq!(adc_split(a, 0, Limb::MAX), adc_wide(a, 0, Limb::MAX));
            assert_eq!(sbb_split(a, 0, Limb::MAX), sbb_wide(a, 0, Limb::MAX));
        }
    }

    #[test]
    fn test_adc_overflow() {
        assert_eq!(adc(Limb::MAX, 1, 0), (0, 1));
        assert_eq!(adc(Limb::MAX, Limb::MAX, 1), (Limb::MAX, 1));
        assert_eq!(sbb(0, 1, 0), (Limb::MAX, 1));
        assert_eq!(sbb(5, 3, 1), (1, 0));
    }

    #[test]
    fn test_mac_max() {
        // (2^64-1)^2 + 2(2^64-1) = 2^128 - 1
        assert_eq!(mac(Limb::MAX, Limb::MAX, Limb::MAX, Limb::MAX), (Limb::MAX, Limb::MAX));
    }

    #[test]
    fn test_div_wide() {
        assert_eq!(div_wide(0, 100, 7), (14, 2));
        assert_eq!(div_wide(1, 0, 2), (1 << 63, 0));
    }
}
