//! Random big number generation from a [`RandomSource`].

use crate::bignum::BigInt;
use ccrypto_types::{CryptoError, RandomSource};
use zeroize::Zeroizing;

/// Bytes of randomness holding exactly `bits` bits, with the excess high
/// bits of the leading byte cleared.
fn random_bytes(bits: usize, rng: &dyn RandomSource) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let num_bytes = bits.div_ceil(8);
    let mut buf = Zeroizing::new(vec![0u8; num_bytes]);
    rng.fill_bytes(&mut buf)
        .map_err(|_| CryptoError::RandGenFail)?;
    let excess = num_bytes * 8 - bits;
    if excess > 0 {
        buf[0] &= 0xFF >> excess;
    }
    Ok(buf)
}

impl BigInt {
    /// Generate a random BigInt of exactly `bits` bits.
    ///
    /// The most significant bit is always set; if `odd` is true the least
    /// significant bit is forced to 1 as well.
    pub fn random_bits(bits: usize, odd: bool, rng: &dyn RandomSource) -> Result<BigInt, CryptoError> {
        if bits == 0 {
            return Ok(BigInt::zero());
        }
        let buf = random_bytes(bits, rng)?;
        let mut result = BigInt::from_bytes_be(&buf);
        result.set_bit(bits - 1);
        if odd {
            result.set_bit(0);
        }
        Ok(result)
    }

    /// Generate a BigInt uniformly in `[0, upper)` by rejection sampling.
    pub fn random_below(upper: &BigInt, rng: &dyn RandomSource) -> Result<BigInt, CryptoError> {
        if upper.is_zero() || upper.is_negative() {
            return Err(CryptoError::InvalidInput);
        }
        let bits = upper.bit_len();
        loop {
            let candidate = BigInt::from_bytes_be(&random_bytes(bits, rng)?);
            if candidate < *upper {
                return Ok(candidate);
            }
        }
    }

    /// Generate a BigInt uniformly in `[1, upper)`.
    pub fn random_range(upper: &BigInt, rng: &dyn RandomSource) -> Result<BigInt, CryptoError> {
        if upper.is_zero() || upper.is_one() || upper.is_negative() {
            return Err(CryptoError::InvalidInput);
        }
        loop {
            let candidate = Self::random_below(upper, rng)?;
            if !candidate.is_zero() {
                return Ok(candidate);
            }
        }
    }
}
