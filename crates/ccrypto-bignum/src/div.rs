//! Division with remainder (Knuth, TAOCP vol. 2, 4.3.1, Algorithm D).

use crate::bignum::BigInt;
use crate::ccn;
use crate::limb::{self, DoubleLimb, Limb, LIMB_BITS};
use ccrypto_types::CryptoError;
use zeroize::Zeroize;

impl BigInt {
    /// Division with remainder: returns `(quotient, remainder)`.
    ///
    /// The quotient is truncated toward zero, so `quotient * divisor +
    /// remainder == self`, `|remainder| < |divisor|`, and a non-zero
    /// remainder carries the sign of `self`.
    pub fn divmod(&self, divisor: &BigInt) -> Result<(BigInt, BigInt), CryptoError> {
        if divisor.is_zero() {
            return Err(CryptoError::DivisionByZero);
        }
        let mut q = BigInt::with_allocator(self.allocator());
        let mut r = BigInt::with_allocator(self.allocator());
        divmod_magnitudes(self.units(), divisor.units(), &mut q, &mut r);
        q.set_negative(self.is_negative() != divisor.is_negative());
        r.set_negative(self.is_negative());
        Ok((q, r))
    }

    /// Non-negative residue of `self` modulo `|modulus|`.
    pub fn modulo(&self, modulus: &BigInt) -> Result<BigInt, CryptoError> {
        let (_, r) = self.divmod(modulus)?;
        if r.is_negative() {
            return Ok(r.add(&modulus.abs()));
        }
        Ok(r)
    }
}

/// `q = u / v`, `r = u % v` on magnitudes; `v` is canonical and non-zero.
fn divmod_magnitudes(u: &[Limb], v: &[Limb], q: &mut BigInt, r: &mut BigInt) {
    let n = v.len();
    if ccn::cmpn(u.len(), u, n, v) < 0 {
        q.prepare(0);
        r.set_units(u);
        return;
    }

    if n == 1 {
        let qbuf = q.prepare(u.len());
        let rem = ccn::div1(u.len(), qbuf, u, v[0]);
        q.normalize();
        r.set_units(&[rem]);
        return;
    }

    let m = u.len() - n;
    let shift = LIMB_BITS - crate::ct::limb_bit_len(v[n - 1]);

    // D1: normalise so the top divisor unit has its high bit set.
    let mut vn = v.to_vec();
    ccn::shift_left(n, &mut vn, shift);
    let mut un = vec![0 as Limb; u.len() + 1];
    un[..u.len()].copy_from_slice(u);
    let top = ccn::shift_left(u.len(), &mut un, shift);
    un[u.len()] = top;

    let qbuf = q.prepare(m + 1);
    let base: DoubleLimb = 1 << LIMB_BITS;
    let vtop = vn[n - 1] as DoubleLimb;
    let vnext = vn[n - 2] as DoubleLimb;

    for j in (0..=m).rev() {
        // D3: estimate the quotient unit from the top two remainder units.
        let num = ((un[j + n] as DoubleLimb) << LIMB_BITS) | un[j + n - 1] as DoubleLimb;
        let mut qhat = num / vtop;
        let mut rhat = num % vtop;
        while qhat >= base || qhat * vnext > ((rhat << LIMB_BITS) | un[j + n - 2] as DoubleLimb) {
            qhat -= 1;
            rhat += vtop;
            if rhat >= base {
                break;
            }
        }
        debug_assert!(qhat < base);
        let mut qhat = qhat as Limb;

        // D4: multiply and subtract.
        let mut borrow = 0;
        let mut carry = 0;
        for i in 0..n {
            let (lo, hi) = limb::mac(qhat, vn[i], 0, carry);
            carry = hi;
            let (d, b) = limb::sbb(un[i + j], lo, borrow);
            un[i + j] = d;
            borrow = b;
        }
        let (d, b) = limb::sbb(un[j + n], carry, borrow);
        un[j + n] = d;

        // D6: the estimate was one too large; add the divisor back.
        if b != 0 {
            qhat -= 1;
            let c = ccn::add_in_place(n, &mut un[j..], &vn);
            un[j + n] = un[j + n].wrapping_add(c);
        }
        qbuf[j] = qhat;
    }
    q.normalize();

    // D8: unnormalise the remainder.
    ccn::shift_right(n, &mut un, shift);
    r.set_units(&un[..n]);

    un.zeroize();
    vn.zeroize();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigInt {
        BigInt::from_radix(s, 10).unwrap()
    }

    struct XorShift(u64);

    impl XorShift {
        fn next(&mut self) -> u64 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            self.0
        }

        fn big(&mut self, max_units: usize) -> BigInt {
            let n = (self.next() as usize) % (max_units + 1);
            let units: Vec<u64> = (0..n)
                .map(|_| match self.next() % 4 {
                    0 => u64::MAX,
                    1 => 1,
                    _ => self.next(),
                })
                .collect();
            let mut r = BigInt::from_units(&units);
            r.set_negative(self.next() & 1 == 1);
            r
        }
    }

    #[test]
    fn test_divmod() {
        let a = BigInt::from_u64(100);
        let b = BigInt::from_u64(7);
        let (q, r) = a.divmod(&b).unwrap();
        assert_eq!(q, BigInt::from_u64(14));
        assert_eq!(r, BigInt::from_u64(2));
    }

    #[test]
    fn test_div_by_zero() {
        let a = BigInt::from_u64(100);
        assert_eq!(a.divmod(&BigInt::zero()).unwrap_err(), CryptoError::DivisionByZero);
        assert_eq!(
            BigInt::zero().divmod(&BigInt::zero()).unwrap_err(),
            CryptoError::DivisionByZero
        );
    }

    #[test]
    fn test_signs_truncate_toward_zero() {
        let cases = [
            ("7", "2", "3", "1"),
            ("-7", "2", "-3", "-1"),
            ("7", "-2", "-3", "1"),
            ("-7", "-2", "3", "-1"),
            ("-6", "3", "-2", "0"),
        ];
        for (s, t, q, r) in cases {
            let (qq, rr) = big(s).divmod(&big(t)).unwrap();
            assert_eq!((qq.clone(), rr.clone()), (big(q), big(r)), "{s} / {t}");
            assert!(!rr.is_zero() || !rr.is_negative());
        }
    }

    #[test]
    fn test_multi_unit_known_value() {
        // (2^192 + 5) / (2^64 + 3)
        let s = BigInt::from_units(&[5, 0, 0, 1]);
        let t = BigInt::from_units(&[3, 1]);
        let (q, r) = s.divmod(&t).unwrap();
        assert_eq!(q.mul(&t).add(&r), s);
        assert_eq!(r.cmp_abs(&t), std::cmp::Ordering::Less);
        assert_eq!(q, big("340282366920938463408034375210639556616"));
        assert_eq!(r, big("18446744073709551597"));
    }

    #[test]
    fn test_divmod_identity_sweep() {
        let mut rng = XorShift(0xDEAD_BEEF_1234_5678);
        for _ in 0..500 {
            let s = rng.big(6);
            let t = rng.big(4);
            if t.is_zero() {
                continue;
            }
            let (q, r) = s.divmod(&t).unwrap();
            assert_eq!(q.mul(&t).add(&r), s, "s={s:?} t={t:?}");
            assert_eq!(r.cmp_abs(&t), std::cmp::Ordering::Less);
            if !r.is_zero() {
                assert_eq!(r.is_negative(), s.is_negative());
            }
        }
    }

    #[test]
    fn test_add_back_step() {
        // Divisor chosen so the first quotient estimate overshoots
        // (Knuth's classic add-back trigger with top unit 2^63).
        let t = BigInt::from_units(&[u64::MAX, 1 << 63]);
        let s = BigInt::from_units(&[0, u64::MAX - 1, (1 << 63) - 1]);
        let (q, r) = s.divmod(&t).unwrap();
        assert_eq!(q.mul(&t).add(&r), s);
        assert_eq!(r.cmp_abs(&t), std::cmp::Ordering::Less);
    }

    #[test]
    fn test_modulo_is_non_negative() {
        assert_eq!(big("-7").modulo(&big("5")).unwrap(), big("3"));
        assert_eq!(big("7").modulo(&big("-5")).unwrap(), big("2"));
        assert_eq!(big("-10").modulo(&big("5")).unwrap(), BigInt::zero());
    }
}
