//! Hash conditioning of raw noise (NIST SP 800-90B §3.1.5.1.1).
//!
//! output = H(0x01 || be32(output_bits) || raw)

use crate::provider::hash;
use ccrypto_types::{CryptoError, HashAlgId};
use zeroize::Zeroizing;

/// Extra entropy bits required on top of the output length.
const SECURITY_MARGIN_BITS: usize = 64;

/// Vetted conditioning component over a provider digest.
#[derive(Debug, Clone, Copy)]
pub struct HashConditioner {
    alg: HashAlgId,
}

impl Default for HashConditioner {
    fn default() -> Self {
        Self::new(HashAlgId::Sha256)
    }
}

impl HashConditioner {
    pub fn new(alg: HashAlgId) -> Self {
        HashConditioner { alg }
    }

    /// Bytes produced per [`condition`](Self::condition) call.
    pub fn output_len(&self) -> usize {
        self.alg.output_size()
    }

    pub fn condition(&self, raw: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let out_bits = u32::try_from(self.output_len() * 8).map_err(|_| CryptoError::InvalidInput)?;
        let digest = hash(self.alg, &[&[0x01u8][..], &out_bits.to_be_bytes()[..], raw])?;
        Ok(Zeroizing::new(digest))
    }

    /// Raw bytes needed to credit a full-entropy output at
    /// `min_entropy_per_byte` bits per byte. `None` for a source claiming
    /// no entropy.
    pub fn needed_input_len(&self, min_entropy_per_byte: u32) -> Option<usize> {
        if min_entropy_per_byte == 0 {
            return None;
        }
        let bits = self.output_len() * 8 + SECURITY_MARGIN_BITS;
        Some(bits.div_ceil(min_entropy_per_byte.min(8) as usize))
    }
}
