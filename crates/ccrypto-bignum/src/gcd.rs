//! GCD and modular inverse operations.

use crate::bignum::BigInt;
use ccrypto_types::CryptoError;

impl BigInt {
    /// Greatest common divisor of `|self|` and `|other|` (Euclid).
    pub fn gcd(&self, other: &BigInt) -> Result<BigInt, CryptoError> {
        if self.is_zero() && other.is_zero() {
            return Err(CryptoError::InvalidInput);
        }
        let mut a = self.abs();
        let mut b = other.abs();
        if a < b {
            std::mem::swap(&mut a, &mut b);
        }
        while !b.is_zero() {
            let (_, rem) = a.divmod(&b)?;
            a = b;
            b = rem;
        }
        Ok(a)
    }

    /// Modular inverse: `self^(-1) mod modulus`, in `[1, modulus)`.
    ///
    /// Returns `Err(NoInverse)` if gcd(self, modulus) != 1.
    pub fn mod_inv(&self, modulus: &BigInt) -> Result<BigInt, CryptoError> {
        if modulus.is_zero() {
            return Err(CryptoError::DivisionByZero);
        }
        let m = modulus.abs();
        if m.is_one() {
            return Err(CryptoError::InvalidModulus);
        }

        // Extended Euclid, tracking only the coefficient of `self`:
        // old_r = old_s * self (mod m).
        let mut old_r = self.modulo(&m)?;
        if old_r.is_zero() {
            return Err(CryptoError::NoInverse);
        }
        let mut r = m.clone();
        let mut old_s = BigInt::from_u64(1);
        let mut s = BigInt::zero();

        while !r.is_zero() {
            let (quotient, remainder) = old_r.divmod(&r)?;
            old_r = r;
            r = remainder;

            let new_s = old_s.sub(&quotient.mul(&s));
            old_s = s;
            s = new_s;
        }

        if !old_r.is_one() {
            return Err(CryptoError::NoInverse);
        }
        old_s.modulo(&m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd_basic() {
        let a = BigInt::from_u64(12);
        let b = BigInt::from_u64(8);
        assert_eq!(a.gcd(&b).unwrap(), BigInt::from_u64(4));
    }

    #[test]
    fn test_gcd_coprime() {
        let a = BigInt::from_u64(17);
        let b = BigInt::from_u64(13);
        assert_eq!(a.gcd(&b).unwrap(), BigInt::from_u64(1));
    }

    #[test]
    fn test_gcd_signs_and_zero() {
        let a = BigInt::from_i64(-42);
        let z = BigInt::zero();
        assert_eq!(a.gcd(&z).unwrap(), BigInt::from_u64(42));
        assert_eq!(z.gcd(&a).unwrap(), BigInt::from_u64(42));
        assert_eq!(a.gcd(&BigInt::from_i64(-28)).unwrap(), BigInt::from_u64(14));
        assert_eq!(z.gcd(&z).unwrap_err(), CryptoError::InvalidInput);
    }

    #[test]
    fn test_gcd_multi_unit() {
        // gcd(2^130 * 3, 2^70 * 9) = 2^70 * 3
        let one = BigInt::from_u64(1);
        let a = one.shl(130).mul(&BigInt::from_u64(3));
        let b = one.shl(70).mul(&BigInt::from_u64(9));
        assert_eq!(a.gcd(&b).unwrap(), one.shl(70).mul(&BigInt::from_u64(3)));
    }

    #[test]
    fn test_mod_inv_basic() {
        // 3 * 5 = 15 ≡ 1 (mod 7)
        let inv = BigInt::from_u64(3).mod_inv(&BigInt::from_u64(7)).unwrap();
        assert_eq!(inv, BigInt::from_u64(5));
    }

    #[test]
    fn test_mod_inv_negative_input() {
        // -3 ≡ 4 (mod 7), 4 * 2 = 8 ≡ 1
        let inv = BigInt::from_i64(-3).mod_inv(&BigInt::from_u64(7)).unwrap();
        assert_eq!(inv, BigInt::from_u64(2));
    }

    #[test]
    fn test_mod_inv_verify_large() {
        let m = BigInt::from_radix("fffffffffffffffffffffffffffffffeffffffffffffffff", 16).unwrap();
        let a = BigInt::from_radix("123456789abcdef0123456789abcdef", 16).unwrap();
        let inv = a.mod_inv(&m).unwrap();
        assert!(inv < m);
        assert!(a.mul(&inv).modulo(&m).unwrap().is_one());
    }

    #[test]
    fn test_mod_inv_errors() {
        let a = BigInt::from_u64(6);
        assert_eq!(a.mod_inv(&BigInt::from_u64(9)).unwrap_err(), CryptoError::NoInverse);
        assert_eq!(a.mod_inv(&BigInt::zero()).unwrap_err(), CryptoError::DivisionByZero);
        assert_eq!(a.mod_inv(&BigInt::from_u64(1)).unwrap_err(), CryptoError::InvalidModulus);
        assert_eq!(
            BigInt::from_u64(14).mod_inv(&BigInt::from_u64(7)).unwrap_err(),
            CryptoError::NoInverse
        );
    }
}
