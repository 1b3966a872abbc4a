//! Process-wide generator, created on first use and never replaced.

use std::sync::OnceLock;

use crate::csprng::{CounterPolicy, Csprng, CsprngConfig};
use crate::entropy::SystemEntropy;

/// Generate steps between reseeds of the shared generator.
const GLOBAL_RESEED_STEPS: u64 = 1 << 16;

const PERSONALIZATION: &[u8] = b"ccrypto-rng global csprng";

static GLOBAL: OnceLock<Csprng> = OnceLock::new();

/// The shared generator, seeded from the operating system.
///
/// Panics if the operating system cannot supply the initial seed; no
/// generator is handed out in that case.
pub fn global() -> &'static Csprng {
    GLOBAL.get_or_init(|| {
        match Csprng::from_entropy_source(
            CsprngConfig::default(),
            Box::new(SystemEntropy),
            Box::new(CounterPolicy::new(GLOBAL_RESEED_STEPS)),
            PERSONALIZATION,
        ) {
            Ok(rng) => rng,
            Err(err) => {
                log::error!("cannot seed the global csprng: {err}");
                panic!("csprng: global instance could not be seeded ({err})");
            }
        }
    })
}
