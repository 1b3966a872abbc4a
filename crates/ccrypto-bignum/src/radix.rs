//! Text conversion in radix 2 through 36.

use crate::alloc::{LimbAllocator, SECURE_ALLOCATOR};
use crate::bignum::BigInt;
use crate::ccn;
use crate::limb::{self, Limb, LIMB_BITS};
use ccrypto_types::CryptoError;
use zeroize::Zeroizing;

const MIN_RADIX: u32 = 2;
const MAX_RADIX: u32 = 36;

/// Largest `k` such that `radix^k` fits in a unit, and that power.
fn chunk_params(radix: u32) -> (usize, Limb) {
    let radix = radix as Limb;
    let mut k = 1;
    let mut pow = radix;
    while let Some(next) = pow.checked_mul(radix) {
        pow = next;
        k += 1;
    }
    (k, pow)
}

fn check_radix(radix: u32) -> Result<(), CryptoError> {
    if (MIN_RADIX..=MAX_RADIX).contains(&radix) {
        Ok(())
    } else {
        Err(CryptoError::InvalidRadix(radix))
    }
}

/// `acc = acc * m + a`, growing by at most one unit.
fn mul_add(acc: &mut Vec<Limb>, m: Limb, a: Limb) {
    let mut carry = a;
    for u in acc.iter_mut() {
        let (lo, hi) = limb::mac(*u, m, 0, carry);
        *u = lo;
        carry = hi;
    }
    if carry != 0 {
        acc.push(carry);
    }
}

impl BigInt {
    /// Parse a number written in `radix` (2..=36).
    ///
    /// Digits are `0-9` then `a-z` in either case, optionally preceded by a
    /// single `+` or `-`. No value is produced on error.
    pub fn from_radix(s: &str, radix: u32) -> Result<BigInt, CryptoError> {
        Self::from_radix_in(s, radix, &SECURE_ALLOCATOR)
    }

    /// [`from_radix`](Self::from_radix) with the result's buffer taken from `alloc`.
    pub fn from_radix_in(
        s: &str,
        radix: u32,
        alloc: &'static dyn LimbAllocator,
    ) -> Result<BigInt, CryptoError> {
        check_radix(radix)?;

        let (negative, start) = match s.as_bytes().first() {
            Some(b'-') => (true, 1),
            Some(b'+') => (false, 1),
            _ => (false, 0),
        };
        let digits = &s[start..];
        if digits.is_empty() {
            return Err(CryptoError::InvalidInput);
        }

        // Each digit adds at most this many bits; sizing up front keeps the
        // accumulator from reallocating and leaving stale copies behind.
        let bits_per_digit = (u32::BITS - (radix - 1).leading_zeros()) as usize;
        let cap = (digits.len() * bits_per_digit).div_ceil(LIMB_BITS) + 1;
        let mut acc = Zeroizing::new(Vec::with_capacity(cap));

        let (k, big_base) = chunk_params(radix);
        let mut chunk: Limb = 0;
        let mut chunk_len = 0;
        for (pos, ch) in digits.char_indices() {
            let d = ch.to_digit(radix).ok_or(CryptoError::InvalidDigit {
                ch,
                pos: start + pos,
            })?;
            chunk = chunk * radix as Limb + d as Limb;
            chunk_len += 1;
            if chunk_len == k {
                mul_add(&mut acc, big_base, chunk);
                chunk = 0;
                chunk_len = 0;
            }
        }
        if chunk_len > 0 {
            mul_add(&mut acc, (radix as Limb).pow(chunk_len as u32), chunk);
        }

        let mut r = BigInt::with_allocator(alloc);
        r.set_units(&acc);
        r.set_negative(negative);
        Ok(r)
    }

    /// Render in `radix` (2..=36): lowercase digits, no leading zeros, and a
    /// leading `-` only for non-zero negative values.
    pub fn to_radix(&self, radix: u32) -> Result<String, CryptoError> {
        check_radix(radix)?;
        if self.is_zero() {
            return Ok("0".to_string());
        }

        let (k, big_base) = chunk_params(radix);
        let mut n = self.num_units();
        let mut cur = Zeroizing::new(self.units().to_vec());
        let mut next = Zeroizing::new(vec![0 as Limb; n]);

        // Least significant digit first; reversed at the end.
        let mut out: Vec<char> = Vec::with_capacity(self.bit_len() + 1);
        while n > 0 {
            let mut rem = ccn::div1(n, &mut next, &cur, big_base);
            std::mem::swap(&mut cur, &mut next);
            n = ccn::n(n, &cur);
            for i in 0..k {
                if n == 0 && rem == 0 && i > 0 {
                    break;
                }
                let d = (rem % radix as Limb) as u32;
                rem /= radix as Limb;
                out.push(char::from_digit(d, radix).unwrap_or('0'));
            }
        }
        if self.is_negative() {
            out.push('-');
        }
        Ok(out.iter().rev().collect())
    }
}
