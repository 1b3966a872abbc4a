//! Pluggable unit-buffer allocation for [`BigInt`](crate::BigInt).

use crate::limb::Limb;
use zeroize::Zeroize;

/// Unit buffers are sized in multiples of this many units.
pub const ALLOC_GRANULARITY: usize = 4;

/// Allocation strategy for big-integer unit buffers.
///
/// A `BigInt` obtains, grows and releases its buffer exclusively through the
/// allocator it was created with. Implementations must hand out zero-filled
/// buffers of exactly the requested length.
pub trait LimbAllocator: Send + Sync {
    /// Allocate a zero-filled buffer of `len` units.
    fn alloc(&self, len: usize) -> Vec<Limb>;

    /// Release a buffer. Its contents may be secret.
    fn free(&self, buf: Vec<Limb>);

    /// Grow `buf` to `len` units, keeping its contents.
    ///
    /// The old buffer must be wiped before it is released. The default
    /// allocates fresh, copies, zeroizes the old buffer and hands it to
    /// [`free`](Self::free).
    fn realloc(&self, buf: &mut Vec<Limb>, len: usize) {
        let mut fresh = self.alloc(len);
        let keep = buf.len().min(len);
        fresh[..keep].copy_from_slice(&buf[..keep]);
        let mut old = std::mem::replace(buf, fresh);
        old.as_mut_slice().zeroize();
        self.free(old);
    }
}

/// Default allocator: heap buffers that are wiped before release.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecureAllocator;

impl LimbAllocator for SecureAllocator {
    fn alloc(&self, len: usize) -> Vec<Limb> {
        vec![0; len]
    }

    fn free(&self, mut buf: Vec<Limb>) {
        buf.zeroize();
    }
}

/// The allocator used by [`BigInt::new`](crate::BigInt::new).
pub static SECURE_ALLOCATOR: SecureAllocator = SecureAllocator;

/// Capacity to reserve when `need` units are required and `cap` are held:
/// at least double the current capacity, rounded up to the granularity.
pub(crate) fn grown_capacity(cap: usize, need: usize) -> usize {
    need.max(cap * 2).div_ceil(ALLOC_GRANULARITY) * ALLOC_GRANULARITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grown_capacity() {
        assert_eq!(grown_capacity(0, 1), 4);
        assert_eq!(grown_capacity(4, 5), 8);
        assert_eq!(grown_capacity(8, 9), 16);
        assert_eq!(grown_capacity(4, 21), 24);
    }

    #[test]
    fn test_default_realloc_keeps_prefix() {
        let a = SecureAllocator;
        let mut buf = a.alloc(2);
        buf.copy_from_slice(&[7, 8]);
        a.realloc(&mut buf, 4);
        assert_eq!(buf, vec![7, 8, 0, 0]);
    }
}
