//! Montgomery multiplication context for modular exponentiation.

use crate::bignum::BigInt;
use crate::ccn;
use crate::limb::{self, Limb, LIMB_BITS};
use crate::reduce::Reducer;
use ccrypto_types::CryptoError;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

/// Montgomery multiplication context.
///
/// Precomputes values needed for modular multiplication in Montgomery form,
/// with `R = 2^(m_size * LIMB_BITS)`. All residues are handled as fixed
/// `m_size`-unit arrays, and [`mont_mul`](Self::mont_mul) and
/// [`mont_exp`](Self::mont_exp) run in time independent of operand values.
#[derive(Debug, Clone)]
pub struct MontgomeryCtx {
    /// The modulus N (odd, positive).
    modulus: BigInt,
    /// Number of units in the modulus.
    m_size: usize,
    /// N' such that N[0] * N' ≡ -1 (mod 2^64).
    n_prime: Limb,
    /// R² mod N, used for encoding into Montgomery form.
    r_squared: BigInt,
}

impl MontgomeryCtx {
    /// Create a new Montgomery context for the odd modulus `|modulus|`.
    pub fn new(modulus: &BigInt) -> Result<Self, CryptoError> {
        if modulus.is_zero() {
            return Err(CryptoError::DivisionByZero);
        }
        if modulus.is_even() {
            return Err(CryptoError::InvalidModulus);
        }
        let modulus = modulus.abs();
        let m_size = modulus.num_units();
        let n_prime = compute_n_prime(modulus.units()[0]);
        let r_squared = BigInt::from_u64(1)
            .shl(2 * m_size * LIMB_BITS)
            .modulo(&modulus)?;

        Ok(MontgomeryCtx {
            modulus,
            m_size,
            n_prime,
            r_squared,
        })
    }

    /// Convert a value into Montgomery form: aR mod N.
    pub fn to_mont(&self, a: &BigInt) -> Result<BigInt, CryptoError> {
        let a_reduced = a.modulo(&self.modulus)?;
        Ok(self.mont_mul(&a_reduced, &self.r_squared))
    }

    /// Convert from Montgomery form back to normal: a * R^(-1) mod N.
    pub fn from_mont(&self, a_mont: &BigInt) -> BigInt {
        self.mont_mul(a_mont, &BigInt::from_u64(1))
    }

    /// Montgomery multiplication: (a * b * R^(-1)) mod N.
    ///
    /// Both operands must be reduced (below N).
    pub fn mont_mul(&self, a: &BigInt, b: &BigInt) -> BigInt {
        let a = self.padded(a);
        let b = self.padded(b);
        let mut r = Zeroizing::new(vec![0 as Limb; self.m_size]);
        self.mont_mul_units(&mut r, &a, &b);
        self.to_bigint(&r)
    }

    /// Montgomery squaring: (a² * R^(-1)) mod N.
    pub fn mont_sqr(&self, a: &BigInt) -> BigInt {
        self.mont_mul(a, a)
    }

    /// Fixed-window exponentiation: base^exp mod N.
    ///
    /// Every window performs the same squarings and one multiplication by a
    /// table entry chosen with a full constant-time scan, so only the bit
    /// length of `exp` is observable.
    pub fn mont_exp(&self, base: &BigInt, exp: &BigInt) -> Result<BigInt, CryptoError> {
        if exp.is_negative() {
            return Err(CryptoError::InvalidInput);
        }
        let m = self.m_size;
        let exp_bits = exp.bit_len();
        let w = get_window_size(exp_bits);
        let table_size = 1usize << w;

        // table[i] = base^i in Montgomery form.
        let mut table: Vec<Zeroizing<Vec<Limb>>> = Vec::with_capacity(table_size);
        table.push(self.padded(&self.to_mont(&BigInt::from_u64(1))?));
        table.push(self.padded(&self.to_mont(base)?));
        for i in 2..table_size {
            let mut next = Zeroizing::new(vec![0 as Limb; m]);
            self.mont_mul_units(&mut next, &table[i - 1], &table[1]);
            table.push(next);
        }

        let mut acc = Zeroizing::new(table[0].to_vec());
        let mut tmp = Zeroizing::new(vec![0 as Limb; m]);
        let mut sel = Zeroizing::new(vec![0 as Limb; m]);

        let windows = exp_bits.div_ceil(w);
        for win in (0..windows).rev() {
            for _ in 0..w {
                self.mont_mul_units(&mut tmp, &acc, &acc);
                std::mem::swap(&mut acc, &mut tmp);
            }

            let mut window_val = 0u64;
            for b in 0..w {
                window_val |= exp.get_bit(win * w + b) << b;
            }
            for (idx, entry) in table.iter().enumerate() {
                let hit: Choice = (idx as u64).ct_eq(&window_val);
                ccn::cond_assign(m, &mut sel, entry, hit);
            }
            self.mont_mul_units(&mut tmp, &acc, &sel);
            std::mem::swap(&mut acc, &mut tmp);
        }

        Ok(self.from_mont(&self.to_bigint(&acc)))
    }

    /// CIOS Montgomery product `r = a * b * R^(-1) mod N` over `m_size` units.
    fn mont_mul_units(&self, r: &mut [Limb], a: &[Limb], b: &[Limb]) {
        let m = self.m_size;
        let n = self.modulus.units();
        let mut t = Zeroizing::new(vec![0 as Limb; m + 2]);

        for &bi in &b[..m] {
            let mut c = 0;
            for j in 0..m {
                let (lo, hi) = limb::mac(a[j], bi, t[j], c);
                t[j] = lo;
                c = hi;
            }
            let (s, c2) = limb::adc(t[m], c, 0);
            t[m] = s;
            t[m + 1] = c2;

            let q = t[0].wrapping_mul(self.n_prime);
            let (_, mut c) = limb::mac(q, n[0], t[0], 0);
            for j in 1..m {
                let (lo, hi) = limb::mac(q, n[j], t[j], c);
                t[j - 1] = lo;
                c = hi;
            }
            let (s, c2) = limb::adc(t[m], c, 0);
            t[m - 1] = s;
            t[m] = t[m + 1] + c2;
        }

        // t < 2N here; subtract N unless that borrows.
        let borrow = ccn::sub(m, r, &t, n);
        let (_, borrow) = limb::sbb(t[m], 0, borrow);
        ccn::cond_assign(m, r, &t, Choice::from(borrow as u8));
    }

    fn padded(&self, x: &BigInt) -> Zeroizing<Vec<Limb>> {
        let mut buf = Zeroizing::new(vec![0 as Limb; self.m_size]);
        ccn::setn(self.m_size, &mut buf, x.num_units(), x.units());
        buf
    }

    fn to_bigint(&self, units: &[Limb]) -> BigInt {
        let mut r = BigInt::with_allocator(self.modulus.allocator());
        r.set_units(units);
        r
    }
}

impl Reducer for MontgomeryCtx {
    fn modulus(&self) -> &BigInt {
        &self.modulus
    }

    fn reduce(&self, x: &BigInt) -> Result<BigInt, CryptoError> {
        x.modulo(&self.modulus)
    }

    fn mul_mod(&self, a: &BigInt, b: &BigInt) -> Result<BigInt, CryptoError> {
        let a = self.reduce(a)?;
        let b = self.reduce(b)?;
        // (a * b * R^-1) * R^2 * R^-1 = a * b
        Ok(self.mont_mul(&self.mont_mul(&a, &b), &self.r_squared))
    }

    fn exp_mod(&self, base: &BigInt, exp: &BigInt) -> Result<BigInt, CryptoError> {
        self.mont_exp(base, exp)
    }
}

/// Compute N' such that N[0] * N' ≡ -1 (mod 2^64).
///
/// Newton's iteration `x = x * (2 - n0 * x)` doubles the number of correct
/// low bits; `x = n0` is already correct to 3 bits for odd `n0`.
fn compute_n_prime(n0: Limb) -> Limb {
    let mut x = n0;
    for _ in 0..6 {
        x = x.wrapping_mul(2u64.wrapping_sub(n0.wrapping_mul(x)));
    }
    x.wrapping_neg()
}

/// Determine window size for modular exponentiation based on exponent bit length.
fn get_window_size(bits: usize) -> usize {
    if bits > 512 {
        6
    } else if bits > 256 {
        5
    } else if bits > 128 {
        4
    } else if bits > 64 {
        3
    } else if bits > 32 {
        2
    } else {
        1
    }
}
