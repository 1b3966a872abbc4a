#![forbid(unsafe_code)]
#![doc = "DRBGs, entropy sources and the thread-safe CSPRNG manager of the ccrypto core."]

pub mod csprng;
pub mod drbg;
pub mod entropy;
pub mod hmac;
pub mod provider;

mod global;

pub use csprng::{
    CounterPolicy, Csprng, CsprngConfig, CsprngState, FnPolicy, NeverReseed, ReseedPolicy,
    TimerPolicy, MAX_RESEED_RETRY,
};
pub use drbg::{CtrDrbg, Drbg, DrbgConfig, HmacDrbg};
pub use entropy::{EntropyConfig, EntropySource, FnEntropy, HealthTestedEntropy, SystemEntropy};
pub use global::global;
