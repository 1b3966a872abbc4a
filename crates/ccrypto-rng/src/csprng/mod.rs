//! Thread-safe CSPRNG manager.
//!
//! A [`Csprng`] owns one DRBG, an entropy source, a reseed policy and an
//! output cache behind a single mutex. The lock is taken once per step of a
//! generate call: small requests are served from the cache (refilled whole
//! when it runs short), large requests stream from the DRBG in bounded
//! chunks, and other threads may interleave between steps.
//!
//! Losing the ability to reseed is not an error the caller can handle: the
//! generator logs, wipes its state and panics. The panic poisons the lock,
//! so every later use of the same instance panics as well.
//!
//! Entropy sources and policies run on the calling thread with the lock held.
//! They must not call back into the same generator.

mod policy;

pub use policy::{CounterPolicy, FnPolicy, NeverReseed, ReseedPolicy, TimerPolicy};

use std::sync::{Mutex, MutexGuard};

use crate::drbg::{Drbg, DrbgConfig};
use crate::entropy::EntropySource;
use ccrypto_types::{CryptoError, RandomSource};
use zeroize::{Zeroize, Zeroizing};

/// Entropy attempts per implicit reseed before the generator gives up.
pub const MAX_RESEED_RETRY: u32 = 100;

/// Default bound on a single streamed DRBG call.
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 4096;

/// Default output cache size.
pub const DEFAULT_CACHE_SIZE: usize = 256;

/// Nonce length drawn by [`Csprng::from_entropy_source`].
const NONCE_LEN: usize = 16;

/// Generator parameters.
#[derive(Debug, Clone)]
pub struct CsprngConfig {
    /// DRBG instantiated by [`Csprng::init`].
    pub drbg: DrbgConfig,
    /// Requests smaller than this are served through the cache. Zero
    /// disables caching.
    pub cache_size: usize,
    /// Largest single DRBG call when streaming; clamped to the DRBG's own
    /// limit.
    pub max_request_size: usize,
    /// Entropy bytes per reseed. `None` uses what the DRBG needs.
    pub entropy_len: Option<usize>,
    /// Entropy attempts per implicit reseed.
    pub max_reseed_retry: u32,
}

impl Default for CsprngConfig {
    fn default() -> Self {
        CsprngConfig {
            drbg: DrbgConfig::default(),
            cache_size: DEFAULT_CACHE_SIZE,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            entropy_len: None,
            max_reseed_retry: MAX_RESEED_RETRY,
        }
    }
}

/// Observable generator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsprngState {
    Seeded,
    /// A reseed is due and happens at the start of the next step.
    NeedsReseed,
    /// Terminal; every call panics.
    Fatal,
}

struct Inner {
    drbg: Box<dyn Drbg>,
    policy: Box<dyn ReseedPolicy>,
    entropy: Box<dyn EntropySource>,
    /// Cached DRBG output; bytes before `cursor` are consumed and zero.
    cache: Zeroizing<Vec<u8>>,
    cursor: usize,
    state: CsprngState,
    max_request: usize,
    entropy_len: usize,
    max_retry: u32,
}

/// Cryptographically secure generator shared across threads.
pub struct Csprng {
    inner: Mutex<Inner>,
}

impl Csprng {
    /// Instantiate `config.drbg` from `seed || nonce || personalization`.
    ///
    /// The cache starts empty, so the first generate call refills it.
    pub fn init(
        config: CsprngConfig,
        entropy: Box<dyn EntropySource>,
        policy: Box<dyn ReseedPolicy>,
        seed: &[u8],
        nonce: &[u8],
        personalization: &[u8],
    ) -> Result<Self, CryptoError> {
        let drbg = config.drbg.instantiate(seed, nonce, personalization)?;
        Self::from_drbg(config, drbg, entropy, policy)
    }

    /// Instantiate with seed and nonce drawn from `entropy` itself.
    pub fn from_entropy_source(
        config: CsprngConfig,
        mut entropy: Box<dyn EntropySource>,
        policy: Box<dyn ReseedPolicy>,
        personalization: &[u8],
    ) -> Result<Self, CryptoError> {
        let seed_len = config.entropy_len.unwrap_or_else(|| config.drbg.entropy_len());
        let mut material = Zeroizing::new(vec![0u8; seed_len + NONCE_LEN]);
        fetch_entropy(entropy.as_mut(), &mut material, config.max_reseed_retry)?;
        let (seed, nonce) = material.split_at(seed_len);
        Self::init(config, entropy, policy, seed, nonce, personalization)
    }

    /// Wrap an already instantiated DRBG. `config.drbg` only supplies the
    /// default entropy length.
    pub fn from_drbg(
        config: CsprngConfig,
        drbg: Box<dyn Drbg>,
        entropy: Box<dyn EntropySource>,
        policy: Box<dyn ReseedPolicy>,
    ) -> Result<Self, CryptoError> {
        let max_request = config.max_request_size.min(drbg.max_request_size());
        if max_request == 0 {
            return Err(CryptoError::InvalidInput);
        }
        let entropy_len = config.entropy_len.unwrap_or_else(|| config.drbg.entropy_len());
        let cache_size = config.cache_size.min(max_request);
        let inner = Inner {
            drbg,
            policy,
            entropy,
            cache: Zeroizing::new(vec![0u8; cache_size]),
            cursor: cache_size,
            state: CsprngState::Seeded,
            max_request,
            entropy_len,
            max_retry: config.max_reseed_retry.max(1),
        };
        Ok(Csprng {
            inner: Mutex::new(inner),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("csprng: generator is in the fatal state"),
        }
    }

    /// Fill `out` entirely. Panics if the generator enters the fatal state.
    pub fn generate(&self, out: &mut [u8]) {
        let mut filled = 0;
        while filled < out.len() {
            let mut inner = self.lock();
            inner.ensure_seeded();
            filled += inner.step(&mut out[filled..]);
        }
    }

    /// `n` fresh bytes.
    pub fn generate_vec(&self, n: usize) -> Vec<u8> {
        let mut out = vec![0u8; n];
        self.generate(&mut out);
        out
    }

    /// Reseed from caller-supplied entropy; `nonce` is mixed in as
    /// additional input. On failure the cache and policy are untouched.
    pub fn reseed(&self, seed: &[u8], nonce: &[u8]) -> Result<(), CryptoError> {
        let mut inner = self.lock();
        inner.drbg.reseed(seed, Some(nonce))?;
        inner.reseed_done();
        Ok(())
    }

    /// Reseed from the configured entropy source, with the usual retry
    /// budget. Exhausting it is reported, not fatal.
    pub fn reseed_via_entropy_source(&self, nonce: &[u8]) -> Result<(), CryptoError> {
        let mut inner = self.lock();
        let mut entropy = Zeroizing::new(vec![0u8; inner.entropy_len]);
        let max_retry = inner.max_retry;
        fetch_entropy(inner.entropy.as_mut(), &mut entropy, max_retry)?;
        inner.drbg.reseed(&entropy, Some(nonce))?;
        inner.reseed_done();
        Ok(())
    }

    pub fn state(&self) -> CsprngState {
        match self.inner.lock() {
            Ok(inner) => inner.state,
            Err(_) => CsprngState::Fatal,
        }
    }
}

impl RandomSource for Csprng {
    fn fill_bytes(&self, out: &mut [u8]) -> Result<(), CryptoError> {
        self.generate(out);
        Ok(())
    }
}

/// Fill `buf` from `source`, accumulating short reads. Errors and empty
/// reads count against `max_retry`.
fn fetch_entropy(
    source: &mut dyn EntropySource,
    buf: &mut [u8],
    max_retry: u32,
) -> Result<(), CryptoError> {
    let mut filled = 0;
    let mut failures = 0;
    while filled < buf.len() {
        match source.get_entropy(&mut buf[filled..]) {
            Ok(n) if n > 0 => {
                filled += n.min(buf.len() - filled);
                continue;
            }
            Ok(_) => log::warn!("entropy attempt {}/{max_retry} returned no data", failures + 1),
            Err(err) => log::warn!("entropy attempt {}/{max_retry} failed: {err}", failures + 1),
        }
        failures += 1;
        if failures >= max_retry {
            buf.zeroize();
            return Err(CryptoError::EntropySourceFailure);
        }
    }
    Ok(())
}

impl Inner {
    /// Reseed if the policy or the DRBG asked for it.
    fn ensure_seeded(&mut self) {
        if self.state == CsprngState::NeedsReseed || self.policy.need_reseed() {
            self.state = CsprngState::NeedsReseed;
            self.reseed_from_source();
        }
    }

    /// Implicit reseed; fatal when the entropy budget runs out.
    fn reseed_from_source(&mut self) {
        let mut entropy = Zeroizing::new(vec![0u8; self.entropy_len]);
        if let Err(err) = fetch_entropy(self.entropy.as_mut(), &mut entropy, self.max_retry) {
            self.fatal(err);
        }
        if let Err(err) = self.drbg.reseed(&entropy, None) {
            self.fatal(err);
        }
        self.reseed_done();
    }

    /// Invalidate the cache and tell the policy.
    fn reseed_done(&mut self) {
        self.cache.as_mut_slice().zeroize();
        self.cursor = self.cache.len();
        self.state = CsprngState::Seeded;
        self.policy.reseed_complete();
        log::debug!("csprng reseeded");
    }

    /// Serve a prefix of `out`; returns its length.
    fn step(&mut self, out: &mut [u8]) -> usize {
        let available = self.cache.len() - self.cursor;
        if out.len() <= available {
            return self.take_cached(out);
        }
        if out.len() < self.cache.len() {
            self.refill_cache();
            return self.take_cached(out);
        }
        let n = out.len().min(self.max_request);
        self.drbg_generate(&mut out[..n]);
        n
    }

    fn take_cached(&mut self, out: &mut [u8]) -> usize {
        let n = out.len();
        let cached = &mut self.cache[self.cursor..self.cursor + n];
        out.copy_from_slice(cached);
        cached.zeroize();
        self.cursor += n;
        n
    }

    fn refill_cache(&mut self) {
        let mut cache = std::mem::replace(&mut self.cache, Zeroizing::new(Vec::new()));
        self.drbg_generate(&mut cache);
        self.cache = cache;
        self.cursor = 0;
        log::trace!("csprng cache refilled with {} bytes", self.cache.len());
    }

    /// One DRBG call; a reseed-required status is answered with a reseed
    /// and a single retry.
    fn drbg_generate(&mut self, buf: &mut [u8]) {
        match self.drbg.generate(buf, None) {
            Ok(()) => return,
            Err(CryptoError::DrbgReseedRequired) => self.state = CsprngState::NeedsReseed,
            Err(err) => self.fatal(err),
        }
        self.reseed_from_source();
        if let Err(err) = self.drbg.generate(buf, None) {
            self.fatal(err);
        }
    }

    fn fatal(&mut self, err: CryptoError) -> ! {
        log::error!("csprng entering fatal state: {err}");
        self.state = CsprngState::Fatal;
        self.cache.as_mut_slice().zeroize();
        self.cursor = self.cache.len();
        self.drbg.done();
        panic!("csprng: fatal state ({err})");
    }
}
