//! Entropy sources feeding the CSPRNG's reseeds.
//!
//! An [`EntropySource`] may return fewer bytes than requested but never
//! more. Three implementations are provided:
//! 1. [`SystemEntropy`]: the operating system via `getrandom`.
//! 2. [`HealthTestedEntropy`]: raw samples from a pluggable [`NoiseSource`],
//!    checked by the SP 800-90B continuous tests and hash-conditioned.
//! 3. [`FnEntropy`]: a closure, for custom sources and tests.

pub mod conditioning;
pub mod health;

pub use conditioning::HashConditioner;
pub use health::{AptTest, HealthTest, RctTest};

use ccrypto_types::{CryptoError, HashAlgId};
use zeroize::Zeroizing;

/// Source of seed material.
pub trait EntropySource: Send {
    /// Fill a prefix of `buf` and return its length (at most `buf.len()`).
    fn get_entropy(&mut self, buf: &mut [u8]) -> Result<usize, CryptoError>;
}

/// Operating system entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEntropy;

impl EntropySource for SystemEntropy {
    fn get_entropy(&mut self, buf: &mut [u8]) -> Result<usize, CryptoError> {
        getrandom::getrandom(buf).map_err(|err| {
            log::warn!("getrandom failed: {err}");
            CryptoError::EntropySourceFailure
        })?;
        Ok(buf.len())
    }
}

/// Closure-backed entropy source.
pub struct FnEntropy<F>(F);

impl<F> FnEntropy<F>
where
    F: FnMut(&mut [u8]) -> Result<usize, CryptoError> + Send,
{
    pub fn new(f: F) -> Self {
        FnEntropy(f)
    }
}

impl<F> EntropySource for FnEntropy<F>
where
    F: FnMut(&mut [u8]) -> Result<usize, CryptoError> + Send,
{
    fn get_entropy(&mut self, buf: &mut [u8]) -> Result<usize, CryptoError> {
        let n = (self.0)(buf)?;
        Ok(n.min(buf.len()))
    }
}

/// Raw physical noise, possibly with less than full entropy.
pub trait NoiseSource: Send {
    fn name(&self) -> &str;

    /// Claimed min-entropy per byte, in bits (1 to 8).
    fn min_entropy_per_byte(&self) -> u32;

    /// Read raw samples into `buf`; returns the number written.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CryptoError>;
}

/// `getrandom` as a full-entropy noise source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNoiseSource;

impl NoiseSource for SystemNoiseSource {
    fn name(&self) -> &str {
        "system"
    }

    fn min_entropy_per_byte(&self) -> u32 {
        8
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CryptoError> {
        SystemEntropy.get_entropy(buf)
    }
}

/// Parameters of a [`HealthTestedEntropy`].
#[derive(Debug, Clone)]
pub struct EntropyConfig {
    /// Run RCT and APT on each raw byte. Default: true.
    pub enable_health_tests: bool,
    /// Default: 21.
    pub rct_cutoff: u32,
    /// Default: 512.
    pub apt_window_size: u32,
    /// Default: 410.
    pub apt_cutoff: u32,
    /// Digest used to condition raw noise. Default: SHA-256.
    pub conditioning_hash: HashAlgId,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        EntropyConfig {
            enable_health_tests: true,
            rct_cutoff: health::DEFAULT_RCT_CUTOFF,
            apt_window_size: health::DEFAULT_APT_WINDOW,
            apt_cutoff: health::DEFAULT_APT_CUTOFF,
            conditioning_hash: HashAlgId::Sha256,
        }
    }
}

/// Health-tested, conditioned entropy from a [`NoiseSource`].
///
/// Each conditioned block is fed by enough raw noise to credit its full
/// length; bytes of the last block beyond the request are discarded.
pub struct HealthTestedEntropy {
    health: Option<HealthTest>,
    conditioner: HashConditioner,
    source: Box<dyn NoiseSource>,
}

impl HealthTestedEntropy {
    /// Health-tested entropy from the operating system.
    pub fn new(config: EntropyConfig) -> Self {
        Self::with_source(config, Box::new(SystemNoiseSource))
    }

    pub fn with_source(config: EntropyConfig, source: Box<dyn NoiseSource>) -> Self {
        let health = config.enable_health_tests.then(|| {
            HealthTest::new(config.rct_cutoff, config.apt_window_size, config.apt_cutoff)
        });
        HealthTestedEntropy {
            health,
            conditioner: HashConditioner::new(config.conditioning_hash),
            source,
        }
    }

    /// Startup test (SP 800-90B §4.3): draw and test
    /// `STARTUP_TEST_SAMPLES` samples, then discard them.
    pub fn startup_test(&mut self) -> Result<(), CryptoError> {
        let mut samples = Zeroizing::new(vec![0u8; health::STARTUP_TEST_SAMPLES]);
        self.read_tested(&mut samples)?;
        if let Some(ht) = self.health.as_mut() {
            ht.reset();
        }
        Ok(())
    }

    /// Fill `raw` completely from the noise source, testing every byte.
    fn read_tested(&mut self, raw: &mut [u8]) -> Result<(), CryptoError> {
        let mut filled = 0;
        while filled < raw.len() {
            let read = self.source.read(&mut raw[filled..])?.min(raw.len() - filled);
            if read == 0 {
                log::warn!("noise source {} returned no data", self.source.name());
                return Err(CryptoError::EntropySourceFailure);
            }
            let fresh = &raw[filled..filled + read];
            if let Some(ht) = self.health.as_mut() {
                if let Err(err) = ht.test_bytes(fresh) {
                    log::warn!("noise source {} failed health test: {err}", self.source.name());
                    return Err(err);
                }
            }
            filled += read;
        }
        Ok(())
    }
}

impl EntropySource for HealthTestedEntropy {
    fn get_entropy(&mut self, buf: &mut [u8]) -> Result<usize, CryptoError> {
        let needed = self
            .conditioner
            .needed_input_len(self.source.min_entropy_per_byte())
            .ok_or(CryptoError::EntropySourceFailure)?;
        let mut raw = Zeroizing::new(vec![0u8; needed]);
        for chunk in buf.chunks_mut(self.conditioner.output_len()) {
            self.read_tested(&mut raw)?;
            let block = self.conditioner.condition(&raw)?;
            chunk.copy_from_slice(&block[..chunk.len()]);
        }
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingNoise(u8);

    impl NoiseSource for CountingNoise {
        fn name(&self) -> &str {
            "counting"
        }
        fn min_entropy_per_byte(&self) -> u32 {
            8
        }
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, CryptoError> {
            // short reads on purpose
            let n = buf.len().min(7);
            for b in &mut buf[..n] {
                *b = self.0;
                self.0 = self.0.wrapping_add(1);
            }
            Ok(n)
        }
    }

    struct StuckNoise;

    impl NoiseSource for StuckNoise {
        fn name(&self) -> &str {
            "stuck"
        }
        fn min_entropy_per_byte(&self) -> u32 {
            8
        }
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, CryptoError> {
            buf.fill(0x42);
            Ok(buf.len())
        }
    }

    #[test]
    fn test_system_entropy() {
        let mut es = SystemEntropy;
        let mut buf = [0u8; 64];
        assert_eq!(es.get_entropy(&mut buf).unwrap(), 64);
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_health_tested_system_entropy() {
        let mut es = HealthTestedEntropy::new(EntropyConfig::default());
        es.startup_test().unwrap();
        let mut buf = [0u8; 48];
        assert_eq!(es.get_entropy(&mut buf).unwrap(), 48);
    }

    #[test]
    fn test_conditioned_output_is_deterministic_for_fixed_noise() {
        let mut a = HealthTestedEntropy::with_source(EntropyConfig::default(), Box::new(CountingNoise(0)));
        let mut b = HealthTestedEntropy::with_source(EntropyConfig::default(), Box::new(CountingNoise(0)));
        let mut out_a = [0u8; 40];
        let mut out_b = [0u8; 40];
        a.get_entropy(&mut out_a).unwrap();
        b.get_entropy(&mut out_b).unwrap();
        assert_eq!(out_a, out_b);
        // never the raw counter bytes
        assert_ne!(out_a[..8], [0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_stuck_source_rejected() {
        let config = EntropyConfig {
            rct_cutoff: 5,
            ..Default::default()
        };
        let mut es = HealthTestedEntropy::with_source(config, Box::new(StuckNoise));
        let mut buf = [0u8; 32];
        assert_eq!(es.get_entropy(&mut buf), Err(CryptoError::EntropyRctFailure));
        assert_eq!(es.startup_test(), Err(CryptoError::EntropyRctFailure));

        let unchecked = EntropyConfig {
            enable_health_tests: false,
            ..Default::default()
        };
        let mut es = HealthTestedEntropy::with_source(unchecked, Box::new(StuckNoise));
        assert_eq!(es.get_entropy(&mut buf), Ok(32));
    }

    #[test]
    fn test_fn_entropy_clamps_length() {
        let mut es = FnEntropy::new(|buf: &mut [u8]| {
            buf.fill(1);
            Ok(buf.len() + 10)
        });
        let mut buf = [0u8; 4];
        assert_eq!(es.get_entropy(&mut buf), Ok(4));

        let mut failing = FnEntropy::new(|_: &mut [u8]| Err(CryptoError::EntropySourceFailure));
        assert_eq!(failing.get_entropy(&mut buf), Err(CryptoError::EntropySourceFailure));
    }
}
