//! Modular reduction contexts.

use crate::bignum::BigInt;
use crate::montgomery::MontgomeryCtx;
use ccrypto_types::CryptoError;

/// Arithmetic modulo a fixed modulus.
///
/// Every result is the canonical residue in `[0, |modulus|)`, whatever the
/// sign of the inputs.
pub trait Reducer: Send + Sync {
    /// The (positive) modulus this context reduces by.
    fn modulus(&self) -> &BigInt;

    /// `x mod m`.
    fn reduce(&self, x: &BigInt) -> Result<BigInt, CryptoError>;

    /// `a * b mod m`.
    fn mul_mod(&self, a: &BigInt, b: &BigInt) -> Result<BigInt, CryptoError>;

    /// `base ^ exp mod m` for a non-negative exponent.
    fn exp_mod(&self, base: &BigInt, exp: &BigInt) -> Result<BigInt, CryptoError>;
}

/// Reduction by long division; accepts any non-zero modulus.
///
/// Running time depends on the operand values. Use [`MontgomeryCtx`] for
/// secret operands under an odd modulus.
#[derive(Debug, Clone)]
pub struct PlainReducer {
    modulus: BigInt,
}

impl PlainReducer {
    /// Create a context for `|modulus|`.
    pub fn new(modulus: &BigInt) -> Result<Self, CryptoError> {
        if modulus.is_zero() {
            return Err(CryptoError::DivisionByZero);
        }
        Ok(Self {
            modulus: modulus.abs(),
        })
    }
}

impl Reducer for PlainReducer {
    fn modulus(&self) -> &BigInt {
        &self.modulus
    }

    fn reduce(&self, x: &BigInt) -> Result<BigInt, CryptoError> {
        x.modulo(&self.modulus)
    }

    fn mul_mod(&self, a: &BigInt, b: &BigInt) -> Result<BigInt, CryptoError> {
        a.mul(b).modulo(&self.modulus)
    }

    fn exp_mod(&self, base: &BigInt, exp: &BigInt) -> Result<BigInt, CryptoError> {
        if exp.is_negative() {
            return Err(CryptoError::InvalidInput);
        }
        let b = self.reduce(base)?;
        let mut result = BigInt::from_u64(1).modulo(&self.modulus)?;
        for i in (0..exp.bit_len()).rev() {
            result = self.mul_mod(&result, &result)?;
            if exp.get_bit(i) == 1 {
                result = self.mul_mod(&result, &b)?;
            }
        }
        Ok(result)
    }
}

/// Pick a reduction context for `modulus`: Montgomery when it is odd,
/// plain division otherwise.
pub fn reducer_for(modulus: &BigInt) -> Result<Box<dyn Reducer>, CryptoError> {
    if modulus.is_zero() {
        return Err(CryptoError::DivisionByZero);
    }
    if modulus.is_odd() {
        Ok(Box::new(MontgomeryCtx::new(modulus)?))
    } else {
        Ok(Box::new(PlainReducer::new(modulus)?))
    }
}

impl BigInt {
    /// Modular exponentiation: `self ^ exp mod modulus`.
    pub fn mod_exp(&self, exp: &BigInt, modulus: &BigInt) -> Result<BigInt, CryptoError> {
        reducer_for(modulus)?.exp_mod(self, exp)
    }
}
