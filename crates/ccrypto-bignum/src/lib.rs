#![forbid(unsafe_code)]
#![doc = "Constant-time unit arithmetic and a sign-magnitude big integer for the ccrypto core."]

pub mod ccn;
pub mod ct;
pub mod limb;

mod alloc;
mod bignum;
mod div;
mod gcd;
mod montgomery;
mod ops;
mod radix;
mod rand;
mod reduce;

pub use alloc::{LimbAllocator, SecureAllocator, ALLOC_GRANULARITY, SECURE_ALLOCATOR};
pub use bignum::BigInt;
pub use limb::{Limb, LIMB_BITS};
pub use montgomery::MontgomeryCtx;
pub use reduce::{reducer_for, PlainReducer, Reducer};
