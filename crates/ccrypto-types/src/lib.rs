#![forbid(unsafe_code)]
#![doc = "Common error codes, algorithm identifiers and the randomness seam shared by the ccrypto crates."]

pub mod algorithm;
pub mod error;

pub use algorithm::*;
pub use error::*;

/// A source of cryptographically strong random bytes.
///
/// Implemented by the CSPRNG manager; consumed by big-number routines that
/// need random values without depending on the generator crate.
pub trait RandomSource: Send + Sync {
    /// Fill `out` entirely with random bytes.
    fn fill_bytes(&self, out: &mut [u8]) -> Result<(), CryptoError>;
}
