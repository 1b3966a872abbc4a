//! Deterministic random bit generators (NIST SP 800-90A).
//!
//! A [`Drbg`] is obtained only through [`DrbgConfig::instantiate`], so no
//! generator can emit output before it has been seeded. When the reseed
//! counter passes the configured interval, [`Drbg::generate`] reports
//! [`CryptoError::DrbgReseedRequired`] instead of producing output; the
//! caller reseeds and retries.

mod ctr_drbg;
mod hmac_drbg;

pub use ctr_drbg::CtrDrbg;
pub use hmac_drbg::HmacDrbg;

use ccrypto_types::{CipherAlgId, CryptoError, DrbgAlgId, HashAlgId};

/// Largest request a single generate call serves: 2^19 bits.
pub const MAX_REQUEST_SIZE: usize = 1 << 16;

/// Generate calls allowed between reseeds (SP 800-90A Table 2/3).
pub const DEFAULT_RESEED_INTERVAL: u64 = 1 << 48;

/// Common DRBG operations.
pub trait Drbg: Send {
    /// Mix fresh entropy (and optional additional input) into the state and
    /// reset the reseed counter.
    fn reseed(&mut self, entropy: &[u8], additional: Option<&[u8]>) -> Result<(), CryptoError>;

    /// Fill `out` with pseudorandom bytes.
    ///
    /// Returns `Err(DrbgReseedRequired)` without touching `out` once the
    /// reseed interval has elapsed.
    fn generate(&mut self, out: &mut [u8], additional: Option<&[u8]>) -> Result<(), CryptoError>;

    /// Largest `out` accepted by a single [`generate`](Self::generate) call
    /// in strict mode.
    fn max_request_size(&self) -> usize;

    /// Zeroize the state. Every later call fails with `DrbgInvalidState`.
    fn done(&mut self);
}

/// DRBG variant selection and policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrbgConfig {
    /// HMAC-DRBG (SP 800-90A §10.1.2).
    Hmac {
        digest: HashAlgId,
        /// Enforce minimum entropy length and the per-request size limit.
        strict_fips: bool,
        /// Generate calls allowed before a reseed is required.
        reseed_interval: u64,
    },
    /// CTR-DRBG (SP 800-90A §10.2).
    Ctr {
        cipher: CipherAlgId,
        /// Condition inputs with Block_Cipher_df; without it the entropy
        /// input must be exactly seedlen bytes.
        use_df: bool,
        strict_fips: bool,
        reseed_interval: u64,
    },
}

impl Default for DrbgConfig {
    fn default() -> Self {
        DrbgConfig::Ctr {
            cipher: CipherAlgId::Aes256,
            use_df: true,
            strict_fips: false,
            reseed_interval: DEFAULT_RESEED_INTERVAL,
        }
    }
}

impl DrbgConfig {
    /// HMAC-DRBG over `digest` with default policy.
    pub fn hmac(digest: HashAlgId) -> Self {
        DrbgConfig::Hmac {
            digest,
            strict_fips: false,
            reseed_interval: DEFAULT_RESEED_INTERVAL,
        }
    }

    /// CTR-DRBG over `cipher` with default policy.
    pub fn ctr(cipher: CipherAlgId, use_df: bool) -> Self {
        DrbgConfig::Ctr {
            cipher,
            use_df,
            strict_fips: false,
            reseed_interval: DEFAULT_RESEED_INTERVAL,
        }
    }

    /// Same configuration with strict mode switched on or off.
    pub fn with_strict_fips(mut self, on: bool) -> Self {
        match &mut self {
            DrbgConfig::Hmac { strict_fips, .. } | DrbgConfig::Ctr { strict_fips, .. } => {
                *strict_fips = on
            }
        }
        self
    }

    /// Same configuration with a different reseed interval.
    pub fn with_reseed_interval(mut self, interval: u64) -> Self {
        match &mut self {
            DrbgConfig::Hmac { reseed_interval, .. } | DrbgConfig::Ctr { reseed_interval, .. } => {
                *reseed_interval = interval
            }
        }
        self
    }

    pub fn reseed_interval(&self) -> u64 {
        match *self {
            DrbgConfig::Hmac { reseed_interval, .. } | DrbgConfig::Ctr { reseed_interval, .. } => {
                reseed_interval
            }
        }
    }

    /// The mechanism this configuration selects.
    pub fn alg_id(&self) -> DrbgAlgId {
        match self {
            DrbgConfig::Hmac { digest, .. } => match digest {
                HashAlgId::Sha256 => DrbgAlgId::HmacSha256,
                HashAlgId::Sha384 => DrbgAlgId::HmacSha384,
                HashAlgId::Sha512 => DrbgAlgId::HmacSha512,
            },
            DrbgConfig::Ctr { cipher, .. } => match cipher {
                CipherAlgId::Aes128 => DrbgAlgId::CtrAes128,
                CipherAlgId::Aes256 => DrbgAlgId::CtrAes256,
            },
        }
    }

    /// Security strength in bytes; the minimum entropy input in strict mode.
    pub fn security_strength(&self) -> usize {
        match self {
            DrbgConfig::Hmac { digest, .. } => digest.security_strength(),
            DrbgConfig::Ctr { cipher, .. } => cipher.key_len(),
        }
    }

    /// Entropy bytes to request per (re)seed. CTR-DRBG without df needs
    /// exactly seedlen.
    pub fn entropy_len(&self) -> usize {
        match self {
            DrbgConfig::Ctr {
                cipher,
                use_df: false,
                ..
            } => cipher.key_len() + cipher.block_len(),
            _ => self.security_strength(),
        }
    }

    /// Instantiate a generator from `entropy || nonce || personalization`.
    /// A zero reseed interval is rejected.
    pub fn instantiate(
        &self,
        entropy: &[u8],
        nonce: &[u8],
        personalization: &[u8],
    ) -> Result<Box<dyn Drbg>, CryptoError> {
        if self.reseed_interval() == 0 {
            return Err(CryptoError::InvalidInput);
        }
        let drbg: Box<dyn Drbg> = match *self {
            DrbgConfig::Hmac {
                digest,
                strict_fips,
                reseed_interval,
            } => Box::new(HmacDrbg::new(
                digest,
                strict_fips,
                reseed_interval,
                entropy,
                nonce,
                personalization,
            )?),
            DrbgConfig::Ctr {
                cipher,
                use_df,
                strict_fips,
                reseed_interval,
            } => Box::new(CtrDrbg::new(
                cipher,
                use_df,
                strict_fips,
                reseed_interval,
                entropy,
                nonce,
                personalization,
            )?),
        };
        log::debug!("instantiated {:?}", self.alg_id());
        Ok(drbg)
    }
}

/// Strict-mode entropy length check shared by both variants.
pub(crate) fn check_entropy_len(strict: bool, min: usize, got: usize) -> Result<(), CryptoError> {
    if strict && got < min {
        return Err(CryptoError::InvalidInput);
    }
    Ok(())
}

/// Fails when serving `len` bytes in `MAX_REQUEST_SIZE` chunks would run
/// past the reseed interval. Checked before any output is written.
pub(crate) fn check_reseed_due(counter: u64, interval: u64, len: usize) -> Result<(), CryptoError> {
    let calls = len.div_ceil(MAX_REQUEST_SIZE).max(1) as u64;
    if counter.saturating_add(calls - 1) > interval {
        return Err(CryptoError::DrbgReseedRequired);
    }
    Ok(())
}

/// Strict-mode request size check shared by both variants.
pub(crate) fn check_request_len(strict: bool, max: usize, got: usize) -> Result<(), CryptoError> {
    if strict && got > max {
        return Err(CryptoError::DrbgRequestTooLarge { max, got });
    }
    Ok(())
}
