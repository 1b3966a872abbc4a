//! Continuous health tests for raw noise (NIST SP 800-90B §4.4).
//!
//! The Repetition Count Test catches a source stuck on one value; the
//! Adaptive Proportion Test catches a source that favours one value within a
//! window. Cutoffs assume H = 1 bit per sample and a false-alarm rate of
//! 2^-20.

use ccrypto_types::CryptoError;

/// RCT cutoff: 1 + ceil(20 / H).
pub const DEFAULT_RCT_CUTOFF: u32 = 21;

/// APT window for non-binary samples.
pub const DEFAULT_APT_WINDOW: u32 = 512;

/// APT cutoff for W = 512.
pub const DEFAULT_APT_CUTOFF: u32 = 410;

/// Samples drawn and discarded by a startup test (§4.3).
pub const STARTUP_TEST_SAMPLES: usize = 1024;

/// Repetition Count Test (§4.4.1).
#[derive(Debug, Clone)]
pub struct RctTest {
    cutoff: u32,
    last: Option<u64>,
    run: u32,
}

impl RctTest {
    pub fn new(cutoff: u32) -> Self {
        RctTest {
            cutoff,
            last: None,
            run: 0,
        }
    }

    /// Feed one sample; fails once the same value has been seen `cutoff`
    /// times in a row.
    pub fn test(&mut self, sample: u64) -> Result<(), CryptoError> {
        if self.last == Some(sample) {
            self.run += 1;
            if self.run >= self.cutoff {
                return Err(CryptoError::EntropyRctFailure);
            }
        } else {
            self.last = Some(sample);
            self.run = 1;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.run = 0;
    }
}

/// Adaptive Proportion Test (§4.4.2).
///
/// The first sample of each window is the reference; the test fails when
/// the reference occurs `cutoff` times before the window closes.
#[derive(Debug, Clone)]
pub struct AptTest {
    window: u32,
    cutoff: u32,
    reference: Option<u64>,
    hits: u32,
    seen: u32,
}

impl AptTest {
    pub fn new(window: u32, cutoff: u32) -> Self {
        AptTest {
            window,
            cutoff,
            reference: None,
            hits: 0,
            seen: 0,
        }
    }

    pub fn test(&mut self, sample: u64) -> Result<(), CryptoError> {
        let Some(reference) = self.reference else {
            self.reference = Some(sample);
            self.hits = 1;
            self.seen = 1;
            return Ok(());
        };

        if sample == reference {
            self.hits += 1;
            if self.hits >= self.cutoff {
                return Err(CryptoError::EntropyAptFailure);
            }
        }
        self.seen += 1;
        if self.seen >= self.window {
            self.reset();
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.reference = None;
        self.hits = 0;
        self.seen = 0;
    }
}

/// Both continuous tests, run on every sample.
#[derive(Debug, Clone)]
pub struct HealthTest {
    rct: RctTest,
    apt: AptTest,
}

impl HealthTest {
    pub fn new(rct_cutoff: u32, apt_window: u32, apt_cutoff: u32) -> Self {
        HealthTest {
            rct: RctTest::new(rct_cutoff),
            apt: AptTest::new(apt_window, apt_cutoff),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_RCT_CUTOFF, DEFAULT_APT_WINDOW, DEFAULT_APT_CUTOFF)
    }

    pub fn test_sample(&mut self, sample: u64) -> Result<(), CryptoError> {
        self.rct.test(sample)?;
        self.apt.test(sample)
    }

    /// Test every byte of `samples` in order.
    pub fn test_bytes(&mut self, samples: &[u8]) -> Result<(), CryptoError> {
        samples
            .iter()
            .try_for_each(|&byte| self.test_sample(u64::from(byte)))
    }

    pub fn reset(&mut self) {
        self.rct.reset();
        self.apt.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rct_accepts_changing_values() {
        let mut rct = RctTest::new(DEFAULT_RCT_CUTOFF);
        for i in 0u64..100 {
            rct.test(i % 3).unwrap();
        }
    }

    #[test]
    fn test_rct_trips_at_cutoff() {
        let mut rct = RctTest::new(5);
        for _ in 0..4 {
            rct.test(42).unwrap();
        }
        assert_eq!(rct.test(42), Err(CryptoError::EntropyRctFailure));
    }

    #[test]
    fn test_rct_run_restarts_on_new_value() {
        let mut rct = RctTest::new(5);
        for _ in 0..4 {
            rct.test(1).unwrap();
        }
        for _ in 0..4 {
            rct.test(2).unwrap();
        }
        assert_eq!(rct.test(2), Err(CryptoError::EntropyRctFailure));

        rct.reset();
        for _ in 0..4 {
            rct.test(2).unwrap();
        }
    }

    #[test]
    fn test_apt_trips_on_bias() {
        let mut apt = AptTest::new(100, 50);
        // reference plus 48 repeats keeps hits at 49
        for _ in 0..49 {
            apt.test(7).unwrap();
        }
        assert_eq!(apt.test(7), Err(CryptoError::EntropyAptFailure));
    }

    #[test]
    fn test_apt_window_closes() {
        let mut apt = AptTest::new(10, 5);
        // four hits per window never reach the cutoff
        for _ in 0..20 {
            for i in 0u64..10 {
                apt.test(if i < 4 { 0 } else { i }).unwrap();
            }
        }
    }

    #[test]
    fn test_health_test_bytes() {
        let mut ht = HealthTest::with_defaults();
        let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        ht.test_bytes(&data).unwrap();

        let mut ht = HealthTest::new(5, 64, 60);
        assert_eq!(ht.test_bytes(&[9u8; 5]), Err(CryptoError::EntropyRctFailure));
        ht.reset();
        ht.test_bytes(&[9u8; 4]).unwrap();
    }
}
