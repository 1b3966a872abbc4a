//! Trait-based provider mechanism for the DRBG primitives.
//!
//! A DRBG variant is parameterised by an opaque digest or block-cipher
//! implementation. These traits are that seam; the adapters below back them
//! with the RustCrypto `sha2` and `aes` crates.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use ccrypto_types::{CipherAlgId, CryptoError, HashAlgId};
use sha2::digest;

/// A hash / message digest algorithm.
pub trait Digest: Send + Sync {
    /// The output size in bytes.
    fn output_size(&self) -> usize;

    /// The internal block size in bytes.
    fn block_size(&self) -> usize;

    /// Feed data into the hash state.
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;

    /// Finalize the hash, write the digest to `out` and reset the state.
    /// The length of `out` must be at least `output_size()`.
    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError>;

    /// Reset the hash state to process a new message.
    fn reset(&mut self);
}

/// A block cipher used in the forward direction only.
pub trait BlockCipher: Send + Sync {
    /// Block size in bytes.
    fn block_size(&self) -> usize;

    /// Key size in bytes.
    fn key_size(&self) -> usize;

    /// Set the encryption key.
    fn set_encrypt_key(&mut self, key: &[u8]) -> Result<(), CryptoError>;

    /// Encrypt a single block in-place.
    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError>;
}

/// [`Digest`] over any RustCrypto fixed-output hash.
pub struct RustCryptoDigest<D> {
    inner: D,
}

impl<D: digest::Digest> RustCryptoDigest<D> {
    /// A fresh hash context.
    pub fn new() -> Self {
        Self { inner: D::new() }
    }
}

impl<D: digest::Digest> Default for RustCryptoDigest<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Digest for RustCryptoDigest<D>
where
    D: digest::Digest
        + digest::FixedOutputReset
        + digest::core_api::BlockSizeUser
        + digest::Reset
        + Send
        + Sync,
{
    fn output_size(&self) -> usize {
        <D as digest::Digest>::output_size()
    }

    fn block_size(&self) -> usize {
        <D as digest::core_api::BlockSizeUser>::block_size()
    }

    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        digest::Digest::update(&mut self.inner, data);
        Ok(())
    }

    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        let size = self.output_size();
        if out.len() < size {
            return Err(CryptoError::BufferTooSmall {
                need: size,
                got: out.len(),
            });
        }
        let value = digest::Digest::finalize_reset(&mut self.inner);
        out[..size].copy_from_slice(&value);
        Ok(())
    }

    fn reset(&mut self) {
        digest::Digest::reset(&mut self.inner);
    }
}

/// Create a fresh digest context for `alg`.
pub fn new_digest(alg: HashAlgId) -> Box<dyn Digest> {
    match alg {
        HashAlgId::Sha256 => Box::new(RustCryptoDigest::<sha2::Sha256>::new()),
        HashAlgId::Sha384 => Box::new(RustCryptoDigest::<sha2::Sha384>::new()),
        HashAlgId::Sha512 => Box::new(RustCryptoDigest::<sha2::Sha512>::new()),
    }
}

/// One-shot hash of the concatenation of `parts`.
pub fn hash(alg: HashAlgId, parts: &[&[u8]]) -> Result<Vec<u8>, CryptoError> {
    let mut ctx = new_digest(alg);
    for part in parts {
        ctx.update(part)?;
    }
    let mut out = vec![0u8; ctx.output_size()];
    ctx.finish(&mut out)?;
    Ok(out)
}

enum AesKey {
    Aes128(aes::Aes128),
    Aes256(aes::Aes256),
}

/// [`BlockCipher`] over the `aes` crate.
pub struct AesCipher {
    alg: CipherAlgId,
    key: Option<AesKey>,
}

impl AesCipher {
    /// An unkeyed AES context; call [`set_encrypt_key`](BlockCipher::set_encrypt_key) before use.
    pub fn new(alg: CipherAlgId) -> Self {
        Self { alg, key: None }
    }
}

impl BlockCipher for AesCipher {
    fn block_size(&self) -> usize {
        self.alg.block_len()
    }

    fn key_size(&self) -> usize {
        self.alg.key_len()
    }

    fn set_encrypt_key(&mut self, key: &[u8]) -> Result<(), CryptoError> {
        if key.len() != self.key_size() {
            return Err(CryptoError::InvalidInput);
        }
        let keyed = match self.alg {
            CipherAlgId::Aes128 => {
                AesKey::Aes128(aes::Aes128::new_from_slice(key).map_err(|_| CryptoError::InvalidInput)?)
            }
            CipherAlgId::Aes256 => {
                AesKey::Aes256(aes::Aes256::new_from_slice(key).map_err(|_| CryptoError::InvalidInput)?)
            }
        };
        self.key = Some(keyed);
        Ok(())
    }

    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        if block.len() != self.block_size() {
            return Err(CryptoError::InvalidInput);
        }
        let block = GenericArray::from_mut_slice(block);
        match &self.key {
            Some(AesKey::Aes128(c)) => c.encrypt_block(block),
            Some(AesKey::Aes256(c)) => c.encrypt_block(block),
            None => return Err(CryptoError::DrbgInvalidState),
        }
        Ok(())
    }
}

/// Create an unkeyed block cipher context for `alg`.
pub fn new_block_cipher(alg: CipherAlgId) -> Box<dyn BlockCipher> {
    Box::new(AesCipher::new(alg))
}
