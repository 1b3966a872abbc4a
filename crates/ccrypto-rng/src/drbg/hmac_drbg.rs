//! HMAC-DRBG (NIST SP 800-90A Section 10.1.2) over SHA-256, SHA-384 or
//! SHA-512.

use super::{check_entropy_len, check_request_len, check_reseed_due, Drbg, MAX_REQUEST_SIZE};
use crate::hmac::Hmac;
use ccrypto_types::{CryptoError, HashAlgId};
use zeroize::{Zeroize, Zeroizing};

/// HMAC-DRBG working state.
pub struct HmacDrbg {
    alg: HashAlgId,
    /// HMAC key K (output size of the digest).
    k: Zeroizing<Vec<u8>>,
    /// Chaining value V.
    v: Zeroizing<Vec<u8>>,
    /// Generate requests since the last (re)seed.
    reseed_counter: u64,
    reseed_interval: u64,
    strict: bool,
    instantiated: bool,
}

impl HmacDrbg {
    /// Instantiate from `entropy || nonce || personalization` (§10.1.2.3).
    pub fn new(
        alg: HashAlgId,
        strict: bool,
        reseed_interval: u64,
        entropy: &[u8],
        nonce: &[u8],
        personalization: &[u8],
    ) -> Result<Self, CryptoError> {
        check_entropy_len(strict, alg.security_strength(), entropy.len())?;
        let len = alg.output_size();
        let mut drbg = HmacDrbg {
            alg,
            k: Zeroizing::new(vec![0x00; len]),
            v: Zeroizing::new(vec![0x01; len]),
            reseed_counter: 0,
            reseed_interval,
            strict,
            instantiated: true,
        };
        drbg.update(&[entropy, nonce, personalization])?;
        drbg.reseed_counter = 1;
        Ok(drbg)
    }

    /// K = HMAC(K, V || round || data); V = HMAC(K, V).
    fn update_round(&mut self, round: u8, data: &[&[u8]]) -> Result<(), CryptoError> {
        let mut next = Zeroizing::new(vec![0u8; self.k.len()]);
        let mut parts: Vec<&[u8]> = Vec::with_capacity(data.len() + 2);
        parts.push(self.v.as_slice());
        parts.push(std::slice::from_ref(&round));
        parts.extend_from_slice(data);
        Hmac::mac_into(self.alg, &self.k, &parts, &mut next)?;
        self.k.copy_from_slice(&next);

        self.step_v()
    }

    /// V = HMAC(K, V).
    fn step_v(&mut self) -> Result<(), CryptoError> {
        let mut next = Zeroizing::new(vec![0u8; self.v.len()]);
        Hmac::mac_into(self.alg, &self.k, &[self.v.as_slice()], &mut next)?;
        self.v.copy_from_slice(&next);
        Ok(())
    }

    /// HMAC_DRBG_Update (§10.1.2.2). `data` is the concatenation of its parts.
    fn update(&mut self, data: &[&[u8]]) -> Result<(), CryptoError> {
        self.update_round(0x00, data)?;
        if data.iter().any(|d| !d.is_empty()) {
            self.update_round(0x01, data)?;
        }
        Ok(())
    }

    /// One generate call of at most `MAX_REQUEST_SIZE` bytes (§10.1.2.5).
    fn generate_block(&mut self, out: &mut [u8], additional: &[u8]) -> Result<(), CryptoError> {
        if !additional.is_empty() {
            self.update(&[additional])?;
        }
        for chunk in out.chunks_mut(self.v.len()) {
            self.step_v()?;
            chunk.copy_from_slice(&self.v[..chunk.len()]);
        }
        self.update(&[additional])?;
        self.reseed_counter += 1;
        Ok(())
    }

    fn check_alive(&self) -> Result<(), CryptoError> {
        if !self.instantiated {
            return Err(CryptoError::DrbgInvalidState);
        }
        Ok(())
    }
}

impl Drbg for HmacDrbg {
    fn reseed(&mut self, entropy: &[u8], additional: Option<&[u8]>) -> Result<(), CryptoError> {
        self.check_alive()?;
        check_entropy_len(self.strict, self.alg.security_strength(), entropy.len())?;
        self.update(&[entropy, additional.unwrap_or_default()])?;
        self.reseed_counter = 1;
        Ok(())
    }

    fn generate(&mut self, out: &mut [u8], additional: Option<&[u8]>) -> Result<(), CryptoError> {
        self.check_alive()?;
        check_request_len(self.strict, MAX_REQUEST_SIZE, out.len())?;
        check_reseed_due(self.reseed_counter, self.reseed_interval, out.len())?;
        let additional = additional.unwrap_or_default();
        if out.is_empty() {
            return self.generate_block(out, additional);
        }
        for chunk in out.chunks_mut(MAX_REQUEST_SIZE) {
            self.generate_block(chunk, additional)?;
        }
        Ok(())
    }

    fn max_request_size(&self) -> usize {
        MAX_REQUEST_SIZE
    }

    fn done(&mut self) {
        self.k.zeroize();
        self.v.zeroize();
        self.reseed_counter = 0;
        self.instantiated = false;
    }
}
