//! HMAC (Hash-based Message Authentication Code) over a provider [`Digest`].
//!
//! HMAC(K, m) = H((K' XOR opad) || H((K' XOR ipad) || m))
//!
//! where K' is the key padded/hashed to block size, ipad = 0x36, opad = 0x5c
//! (RFC 2104). This is the PRF of HMAC-DRBG.

use crate::provider::{new_digest, Digest};
use ccrypto_types::{CryptoError, HashAlgId};
use zeroize::{Zeroize, Zeroizing};

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// HMAC context keyed once, reusable through [`reset`](Hmac::reset).
pub struct Hmac {
    alg: HashAlgId,
    /// Inner hash context (initialized with ipad-xored key).
    inner: Box<dyn Digest>,
    /// Outer hash context (initialized with opad-xored key).
    outer: Box<dyn Digest>,
    /// Processed key block (for reset).
    key_block: Zeroizing<Vec<u8>>,
}

impl Hmac {
    /// Create a new HMAC instance over `alg` with the given key.
    pub fn new(alg: HashAlgId, key: &[u8]) -> Result<Self, CryptoError> {
        let mut inner = new_digest(alg);
        let block_size = inner.block_size();

        // Long keys are hashed, short keys zero-padded.
        let mut key_block = Zeroizing::new(vec![0u8; block_size]);
        if key.len() > block_size {
            inner.update(key)?;
            let out = inner.output_size();
            inner.finish(&mut key_block[..out])?;
        } else {
            key_block[..key.len()].copy_from_slice(key);
        }

        let mut ctx = Self {
            alg,
            inner,
            outer: new_digest(alg),
            key_block,
        };
        ctx.reset()?;
        Ok(ctx)
    }

    /// Output length in bytes.
    pub fn output_size(&self) -> usize {
        self.alg.output_size()
    }

    /// Feed data into the HMAC computation.
    pub fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        self.inner.update(data)
    }

    /// Finalize the HMAC computation into `out` and re-arm for the same key.
    pub fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        let mut inner_hash = Zeroizing::new(vec![0u8; self.output_size()]);
        self.inner.finish(&mut inner_hash)?;
        self.outer.update(&inner_hash)?;
        self.outer.finish(out)?;
        self.reset()
    }

    /// Reset the HMAC state for reuse with the same key.
    pub fn reset(&mut self) -> Result<(), CryptoError> {
        self.inner.reset();
        self.outer.reset();

        let mut pad = Zeroizing::new(vec![0u8; self.key_block.len()]);
        for (p, k) in pad.iter_mut().zip(self.key_block.iter()) {
            *p = k ^ IPAD;
        }
        self.inner.update(&pad)?;
        for (p, k) in pad.iter_mut().zip(self.key_block.iter()) {
            *p = k ^ OPAD;
        }
        self.outer.update(&pad)
    }

    /// One-shot HMAC over the concatenation of `parts`, written to `out`.
    pub fn mac_into(
        alg: HashAlgId,
        key: &[u8],
        parts: &[&[u8]],
        out: &mut [u8],
    ) -> Result<(), CryptoError> {
        let mut ctx = Self::new(alg, key)?;
        for part in parts {
            ctx.update(part)?;
        }
        ctx.finish(out)
    }

    /// One-shot HMAC computation.
    pub fn mac(alg: HashAlgId, key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut out = vec![0u8; alg.output_size()];
        Self::mac_into(alg, key, &[data], &mut out)?;
        Ok(out)
    }
}

impl Drop for Hmac {
    fn drop(&mut self) {
        self.key_block.zeroize();
        self.inner.reset();
        self.outer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    // RFC 4231 Test Case 1
    #[test]
    fn test_hmac_case1_all_digests() {
        let key = [0x0b; 20];
        let data = b"Hi There";
        assert_eq!(
            hex(&Hmac::mac(HashAlgId::Sha256, &key, data).unwrap()),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
        );
        assert_eq!(
            hex(&Hmac::mac(HashAlgId::Sha384, &key, data).unwrap()),
            "afd03944d84895626b0825f4ab46907f15f9dadbe4101ec682aa034c7cebc59c\
             faea9ea9076ede7f4af152e8b2fa9cb6"
        );
        assert_eq!(
            hex(&Hmac::mac(HashAlgId::Sha512, &key, data).unwrap()),
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cde\
             daa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );
    }

    // RFC 4231 Test Case 2
    #[test]
    fn test_hmac_sha256_case2() {
        let result = Hmac::mac(HashAlgId::Sha256, b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            hex(&result),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    // RFC 4231 Test Case 6 (key longer than block size)
    #[test]
    fn test_hmac_sha256_case6() {
        let key = [0xaa; 131];
        let data = b"Test Using Larger Than Block-Size Key - Hash Key First";
        assert_eq!(
            hex(&Hmac::mac(HashAlgId::Sha256, &key, data).unwrap()),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );
    }

    #[test]
    fn test_split_input_matches_one_shot() {
        let mut out = [0u8; 32];
        Hmac::mac_into(
            HashAlgId::Sha256,
            b"Jefe",
            &[&b"what do ya "[..], &b"want for nothing?"[..]],
            &mut out,
        )
        .unwrap();
        assert_eq!(
            out.to_vec(),
            Hmac::mac(HashAlgId::Sha256, b"Jefe", b"what do ya want for nothing?").unwrap()
        );
    }

    #[test]
    fn test_hmac_reuse_after_finish() {
        let mut ctx = Hmac::new(HashAlgId::Sha256, b"Jefe").unwrap();
        let mut out1 = [0u8; 32];
        ctx.update(b"what do ya want for nothing?").unwrap();
        ctx.finish(&mut out1).unwrap();

        let mut out2 = [0u8; 32];
        ctx.update(b"what do ya want ").unwrap();
        ctx.update(b"for nothing?").unwrap();
        ctx.finish(&mut out2).unwrap();
        assert_eq!(out1, out2);
    }
}
