/// Digest algorithms usable as the HMAC-DRBG primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgId {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgId {
    /// Digest output length in bytes.
    pub fn output_size(self) -> usize {
        match self {
            HashAlgId::Sha256 => 32,
            HashAlgId::Sha384 => 48,
            HashAlgId::Sha512 => 64,
        }
    }

    /// Highest security strength in bytes an HMAC-DRBG over this digest
    /// supports (SP 800-90A Table 2).
    pub fn security_strength(self) -> usize {
        32
    }
}

/// Block ciphers usable as the CTR-DRBG primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherAlgId {
    Aes128,
    Aes256,
}

impl CipherAlgId {
    /// Key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            CipherAlgId::Aes128 => 16,
            CipherAlgId::Aes256 => 32,
        }
    }

    /// Block length in bytes.
    pub fn block_len(self) -> usize {
        16
    }
}

/// DRBG mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrbgAlgId {
    HmacSha256,
    HmacSha384,
    HmacSha512,
    CtrAes128,
    CtrAes256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(HashAlgId::Sha384.output_size(), 48);
        assert_eq!(CipherAlgId::Aes128.key_len(), 16);
        assert_eq!(CipherAlgId::Aes256.block_len(), 16);
    }
}
