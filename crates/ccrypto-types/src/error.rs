/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    // General errors
    #[error("invalid input")]
    InvalidInput,
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },

    // Big number errors
    #[error("big number: unsupported radix {0}")]
    InvalidRadix(u32),
    #[error("big number: invalid digit {ch:?} at position {pos}")]
    InvalidDigit { ch: char, pos: usize },
    #[error("big number: division by zero")]
    DivisionByZero,
    #[error("big number: no modular inverse")]
    NoInverse,
    #[error("big number: modulus not supported by this context")]
    InvalidModulus,
    #[error("big number: random generation failed")]
    RandGenFail,

    // Entropy errors
    #[error("entropy: source failed to deliver entropy")]
    EntropySourceFailure,
    #[error("entropy: repetition count test failed")]
    EntropyRctFailure,
    #[error("entropy: adaptive proportion test failed")]
    EntropyAptFailure,

    // DRBG errors
    #[error("drbg: reseed required")]
    DrbgReseedRequired,
    #[error("drbg: invalid state")]
    DrbgInvalidState,
    #[error("drbg: request of {got} bytes exceeds maximum of {max}")]
    DrbgRequestTooLarge { max: usize, got: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            CryptoError::DivisionByZero.to_string(),
            "big number: division by zero"
        );
        assert_eq!(
            CryptoError::InvalidDigit { ch: 'z', pos: 3 }.to_string(),
            "big number: invalid digit 'z' at position 3"
        );
        assert_eq!(
            CryptoError::DrbgRequestTooLarge { max: 16, got: 17 }.to_string(),
            "drbg: request of 17 bytes exceeds maximum of 16"
        );
    }
}
