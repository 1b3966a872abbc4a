//! CTR-DRBG (Counter-mode Deterministic Random Bit Generator).
//!
//! Implements NIST SP 800-90A Section 10.2 over AES-128 or AES-256, with or
//! without the Block_Cipher_df derivation function.

use super::{check_entropy_len, check_request_len, check_reseed_due, Drbg, MAX_REQUEST_SIZE};
use crate::provider::{new_block_cipher, BlockCipher};
use ccrypto_types::{CipherAlgId, CryptoError};
use zeroize::{Zeroize, Zeroizing};

/// Block length of every supported cipher.
const BLOCK_LEN: usize = 16;

/// CTR-DRBG working state.
pub struct CtrDrbg {
    alg: CipherAlgId,
    /// Cipher keyed with the current Key.
    cipher: Box<dyn BlockCipher>,
    key: Zeroizing<Vec<u8>>,
    /// Counter block V.
    v: [u8; BLOCK_LEN],
    use_df: bool,
    reseed_counter: u64,
    reseed_interval: u64,
    strict: bool,
    instantiated: bool,
}

/// Increment a 128-bit counter (big-endian).
fn increment_counter(v: &mut [u8; BLOCK_LEN]) {
    for byte in v.iter_mut().rev() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}

/// Zero-pad `data` to `seed_len` bytes. Longer input is rejected.
fn pad_to_seed(data: &[u8], seed_len: usize) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if data.len() > seed_len {
        return Err(CryptoError::InvalidInput);
    }
    let mut out = Zeroizing::new(vec![0u8; seed_len]);
    out[..data.len()].copy_from_slice(data);
    Ok(out)
}

impl CtrDrbg {
    /// Instantiate (§10.2.1.3).
    ///
    /// With `use_df` the inputs may have any length and are condensed by
    /// Block_Cipher_df. Without it `entropy` must be exactly seedlen bytes,
    /// `personalization` at most seedlen, and `nonce` is not used.
    pub fn new(
        alg: CipherAlgId,
        use_df: bool,
        strict: bool,
        reseed_interval: u64,
        entropy: &[u8],
        nonce: &[u8],
        personalization: &[u8],
    ) -> Result<Self, CryptoError> {
        check_entropy_len(strict, alg.key_len(), entropy.len())?;
        let mut drbg = CtrDrbg {
            alg,
            cipher: new_block_cipher(alg),
            key: Zeroizing::new(vec![0u8; alg.key_len()]),
            v: [0u8; BLOCK_LEN],
            use_df,
            reseed_counter: 0,
            reseed_interval,
            strict,
            instantiated: true,
        };
        drbg.cipher.set_encrypt_key(&drbg.key)?;

        let seed = drbg.seed_material(entropy, &[nonce, personalization], personalization)?;
        drbg.update(&seed)?;
        drbg.reseed_counter = 1;
        Ok(drbg)
    }

    fn seed_len(&self) -> usize {
        self.alg.key_len() + BLOCK_LEN
    }

    /// `df(entropy || extra)` with the derivation function, otherwise
    /// `entropy XOR pad(direct)`.
    fn seed_material(
        &self,
        entropy: &[u8],
        extra: &[&[u8]],
        direct: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let seed_len = self.seed_len();
        if self.use_df {
            let mut parts = Vec::with_capacity(extra.len() + 1);
            parts.push(entropy);
            parts.extend_from_slice(extra);
            return block_cipher_df(self.alg, &parts, seed_len);
        }
        if entropy.len() != seed_len {
            return Err(CryptoError::InvalidInput);
        }
        let mut seed = pad_to_seed(direct, seed_len)?;
        for (s, e) in seed.iter_mut().zip(entropy) {
            *s ^= e;
        }
        Ok(seed)
    }

    /// Additional input conditioned to seedlen bytes.
    fn condition_additional(&self, additional: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        if additional.is_empty() {
            return Ok(Zeroizing::new(vec![0u8; self.seed_len()]));
        }
        if self.use_df {
            block_cipher_df(self.alg, &[additional], self.seed_len())
        } else {
            pad_to_seed(additional, self.seed_len())
        }
    }

    /// CTR_DRBG_Update (§10.2.1.2). `provided` is exactly seedlen bytes.
    fn update(&mut self, provided: &[u8]) -> Result<(), CryptoError> {
        let seed_len = self.seed_len();
        let mut temp = Zeroizing::new(vec![0u8; seed_len]);
        for chunk in temp.chunks_mut(BLOCK_LEN) {
            increment_counter(&mut self.v);
            let mut block = self.v;
            self.cipher.encrypt_block(&mut block)?;
            chunk.copy_from_slice(&block[..chunk.len()]);
            block.zeroize();
        }
        for (t, p) in temp.iter_mut().zip(provided) {
            *t ^= p;
        }

        let key_len = self.alg.key_len();
        self.key.copy_from_slice(&temp[..key_len]);
        self.v.copy_from_slice(&temp[key_len..]);
        self.cipher.set_encrypt_key(&self.key)
    }

    /// One generate call of at most `MAX_REQUEST_SIZE` bytes (§10.2.1.5).
    fn generate_block(&mut self, out: &mut [u8], additional: &[u8]) -> Result<(), CryptoError> {
        let adin = self.condition_additional(additional)?;
        if !additional.is_empty() {
            self.update(&adin)?;
        }
        for chunk in out.chunks_mut(BLOCK_LEN) {
            increment_counter(&mut self.v);
            let mut block = self.v;
            self.cipher.encrypt_block(&mut block)?;
            chunk.copy_from_slice(&block[..chunk.len()]);
            block.zeroize();
        }
        self.update(&adin)?;
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

impl Drbg for CtrDrbg {
    /// Reseed (§10.2.1.4).
    fn reseed(&mut self, entropy: &[u8], additional: Option<&[u8]>) -> Result<(), CryptoError> {
        self.check_alive()?;
        check_entropy_len(self.strict, self.alg.key_len(), entropy.len())?;
        let additional = additional.unwrap_or_default();
        let seed = self.seed_material(entropy, &[additional], additional)?;
        self.update(&seed)?;
        self.reseed_counter = 1;
        Ok(())
    }

    fn generate(&mut self, out: &mut [u8], additional: Option<&[u8]>) -> Result<(), CryptoError> {
        self.check_alive()?;
        check_request_len(self.strict, MAX_REQUEST_SIZE, out.len())?;
        check_reseed_due(self.reseed_counter, self.reseed_interval, out.len())?;
        let additional = additional.unwrap_or_default();
        if !self.use_df && additional.len() > self.seed_len() {
            return Err(CryptoError::InvalidInput);
        }
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
        self.key.as_mut_slice().zeroize();
        self.v.zeroize();
        // rekey so no schedule of the live key remains
        let _ = self.cipher.set_encrypt_key(&self.key);
        self.reseed_counter = 0;
        self.instantiated = false;
    }
}

impl Drop for CtrDrbg {
    fn drop(&mut self) {
        self.v.zeroize();
    }
}

/// Block_Cipher_df (§10.3.2): derive `output_len` bytes from the
/// concatenation of `parts`.
fn block_cipher_df(
    alg: CipherAlgId,
    parts: &[&[u8]],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let key_len = alg.key_len();
    let input_len: usize = parts.iter().map(|p| p.len()).sum();
    let l = u32::try_from(input_len).map_err(|_| CryptoError::InvalidInput)?;
    let n = u32::try_from(output_len).map_err(|_| CryptoError::InvalidInput)?;

    // S = L || N || input || 0x80, zero-padded to the block length
    let mut s = Zeroizing::new(Vec::with_capacity(8 + input_len + BLOCK_LEN));
    s.extend_from_slice(&l.to_be_bytes());
    s.extend_from_slice(&n.to_be_bytes());
    for part in parts {
        s.extend_from_slice(part);
    }
    s.push(0x80);
    while s.len() % BLOCK_LEN != 0 {
        s.push(0x00);
    }

    // K = 0x00 01 02 ...
    let df_key: Vec<u8> = (0..key_len as u8).collect();
    let mut cipher = new_block_cipher(alg);
    cipher.set_encrypt_key(&df_key)?;

    // temp = BCC(K, IV_i || S) for i = 0, 1, ... until keylen + outlen bytes
    let mut temp = Zeroizing::new(Vec::with_capacity(key_len + 2 * BLOCK_LEN));
    let mut counter: u32 = 0;
    while temp.len() < key_len + BLOCK_LEN {
        let mut iv = [0u8; BLOCK_LEN];
        iv[..4].copy_from_slice(&counter.to_be_bytes());

        let mut chaining = [0u8; BLOCK_LEN];
        for block in std::iter::once(&iv[..]).chain(s.chunks(BLOCK_LEN)) {
            for (c, b) in chaining.iter_mut().zip(block) {
                *c ^= b;
            }
            cipher.encrypt_block(&mut chaining)?;
        }
        temp.extend_from_slice(&chaining);
        chaining.zeroize();
        counter += 1;
    }

    // K = leftmost keylen bytes, X = next block; output = E(K, X) chained
    cipher.set_encrypt_key(&temp[..key_len])?;
    let mut x = [0u8; BLOCK_LEN];
    x.copy_from_slice(&temp[key_len..key_len + BLOCK_LEN]);

    let mut result = Zeroizing::new(vec![0u8; output_len]);
    for chunk in result.chunks_mut(BLOCK_LEN) {
        cipher.encrypt_block(&mut x)?;
        chunk.copy_from_slice(&x[..chunk.len()]);
    }
    x.zeroize();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unhex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    fn counting(len: usize) -> Vec<u8> {
        (0..len as u8).collect()
    }

    fn no_df(seed: &[u8]) -> CtrDrbg {
        CtrDrbg::new(CipherAlgId::Aes256, false, false, 1 << 48, seed, b"", b"").unwrap()
    }

    // NIST CAVP CTR_DRBG.rsp, AES-256 use df, no reseed, no PR, COUNT = 0
    #[test]
    fn test_ctr_drbg_aes256_df_cavp() {
        let entropy = unhex("36401940fa8b1fba91a1661f211d78a0b9389a74e5bccfece8d766af1a6d3b14");
        let nonce = unhex("496f25b0f1301b4f501be30380a137eb");
        let mut drbg =
            CtrDrbg::new(CipherAlgId::Aes256, true, true, 1 << 48, &entropy, &nonce, b"").unwrap();

        let mut out = [0u8; 64];
        drbg.generate(&mut out, None).unwrap();
        drbg.generate(&mut out, None).unwrap();
        assert_eq!(
            hex(&out),
            "5862eb38bd558dd978a696e6df164782ddd887e7e9a6c9f3f1fbafb78941b535\
             a64912dfd224c6dc7454e5250b3d97165e16260c2faf1cc7735cb75fb4f07e1d"
        );
    }

    #[test]
    fn test_ctr_drbg_aes256_no_df_known_answer() {
        let mut drbg = no_df(&counting(48));
        let mut out = [0u8; 64];
        drbg.generate(&mut out, None).unwrap();
        drbg.generate(&mut out, None).unwrap();
        assert_eq!(
            hex(&out),
            "04562ad35e8ecafaafda16981cdaa147606beea62801342af13c8b5535f72f94\
             95b74317c762f0adab7abe710797612176b61b0e208398113cf9c170157bc75f"
        );
    }

    #[test]
    fn test_ctr_drbg_no_df_personalization_is_xored() {
        let mut drbg =
            CtrDrbg::new(CipherAlgId::Aes256, false, false, 1 << 48, &counting(48), b"", b"personal")
                .unwrap();
        let mut out = [0u8; 32];
        drbg.generate(&mut out, None).unwrap();
        assert_eq!(
            hex(&out),
            "e6ce17ef7b916a77bfc679af21332803c8950a98bf66d74c7a27d212fb86e564"
        );
    }

    #[test]
    fn test_ctr_drbg_aes128_df_known_answer() {
        let entropy = counting(16);
        let nonce: Vec<u8> = (100u8..108).collect();
        let mut drbg =
            CtrDrbg::new(CipherAlgId::Aes128, true, false, 1 << 48, &entropy, &nonce, b"ps").unwrap();
        let mut out = [0u8; 32];
        drbg.generate(&mut out, None).unwrap();
        drbg.generate(&mut out, None).unwrap();
        assert_eq!(
            hex(&out),
            "4ecc52a9c3c379daf1c704fdbbd6499f5684b1ecd162b7ef102bd2f5e538c57a"
        );
    }

    #[test]
    fn test_ctr_drbg_df_reseed_and_additional_input() {
        let mut drbg =
            CtrDrbg::new(CipherAlgId::Aes256, true, false, 1 << 48, &counting(32), b"nonce", b"")
                .unwrap();
        drbg.reseed(&[0u8; 32], Some(&b"add"[..])).unwrap();
        let mut out = [0u8; 32];
        drbg.generate(&mut out, Some(&b"adin"[..])).unwrap();
        assert_eq!(
            hex(&out),
            "2605ca5af7cb41b688e87e4bd250f4fa6c066b7b00980c006d49baeb9bff815b"
        );
    }

    #[test]
    fn test_block_cipher_df_known_answer() {
        let out = block_cipher_df(CipherAlgId::Aes256, &[&b"a"[..], &b"bc"[..]], 48).unwrap();
        assert_eq!(
            hex(&out),
            "1e80cfb97cdfb7ee4371b473c7c735dc35c1e0fa681f7c4902d97186e2ce3e5d\
             d01382d74c9445f26ed93a0144fda425"
        );
    }

    #[test]
    fn test_ctr_drbg_no_df_length_rules() {
        assert_eq!(
            CtrDrbg::new(CipherAlgId::Aes256, false, false, 1 << 48, &[0x42; 32], b"", b"").err(),
            Some(CryptoError::InvalidInput)
        );
        assert_eq!(
            CtrDrbg::new(CipherAlgId::Aes256, false, false, 1 << 48, &[0x42; 48], b"", &[1u8; 49])
                .err(),
            Some(CryptoError::InvalidInput)
        );
        let mut drbg = no_df(&[0x42; 48]);
        assert_eq!(drbg.reseed(&[0x55; 47], None).unwrap_err(), CryptoError::InvalidInput);
        let mut out = [0u8; 16];
        assert_eq!(
            drbg.generate(&mut out, Some(&[0u8; 49][..])).unwrap_err(),
            CryptoError::InvalidInput
        );
        drbg.generate(&mut out, Some(&[0u8; 48][..])).unwrap();
    }

    #[test]
    fn test_ctr_drbg_reseed_resets_counter() {
        let mut drbg = no_df(&[0x42; 48]);
        let mut out = [0u8; 32];
        drbg.generate(&mut out, None).unwrap();
        assert_eq!(drbg.reseed_counter, 2);
        drbg.reseed(&[0x55; 48], None).unwrap();
        assert_eq!(drbg.reseed_counter, 1);
    }

    #[test]
    fn test_ctr_drbg_odd_lengths() {
        let mut drbg = no_df(&[0xAB; 48]);
        for len in [1usize, 15, 16, 17, 100] {
            let mut out = vec![0u8; len];
            drbg.generate(&mut out, None).unwrap();
            assert!(out.iter().any(|&b| b != 0));
        }
    }

    #[test]
    fn test_increment_counter() {
        let mut v = [0u8; BLOCK_LEN];
        increment_counter(&mut v);
        assert_eq!(v[BLOCK_LEN - 1], 1);

        v = [0u8; BLOCK_LEN];
        v[BLOCK_LEN - 1] = 0xFF;
        increment_counter(&mut v);
        assert_eq!(v[BLOCK_LEN - 1], 0);
        assert_eq!(v[BLOCK_LEN - 2], 1);

        v = [0xFF; BLOCK_LEN];
        increment_counter(&mut v);
        assert_eq!(v, [0u8; BLOCK_LEN]);
    }
}
