//! Every unit buffer goes through the injected allocator and is wiped before
//! it is handed back.

use ccrypto_bignum::{BigInt, Limb, LimbAllocator};
use std::sync::atomic::{AtomicUsize, Ordering};

struct CountingAllocator {
    allocs: AtomicUsize,
    frees: AtomicUsize,
    dirty_frees: AtomicUsize,
}

impl LimbAllocator for CountingAllocator {
    fn alloc(&self, len: usize) -> Vec<Limb> {
        self.allocs.fetch_add(1, Ordering::SeqCst);
        vec![0; len]
    }

    fn free(&self, buf: Vec<Limb>) {
        self.frees.fetch_add(1, Ordering::SeqCst);
        if buf.iter().any(|&u| u != 0) {
            self.dirty_frees.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn realloc(&self, buf: &mut Vec<Limb>, len: usize) {
        let mut fresh = self.alloc(len);
        fresh[..buf.len()].copy_from_slice(&buf[..]);
        let mut old = std::mem::replace(buf, fresh);
        old.iter_mut().for_each(|u| *u = 0);
        self.free(old);
    }
}

static COUNTING: CountingAllocator = CountingAllocator {
    allocs: AtomicUsize::new(0),
    frees: AtomicUsize::new(0),
    dirty_frees: AtomicUsize::new(0),
};

#[test]
fn test_buffers_are_zeroed_and_released() {
    {
        let mut x = BigInt::from_radix_in("123456789abcdef0123456789abcdef", 16, &COUNTING).unwrap();

        // Grow well past the initial capacity, forcing reallocation.
        for _ in 0..6 {
            x.sqr_assign();
        }
        let y = x.clone();
        let (q, r) = y.divmod(&BigInt::from_u64(0x1_0000_0001)).unwrap();
        assert_eq!(q.mul(&BigInt::from_u64(0x1_0000_0001)).add(&r), y);
    }

    let allocs = COUNTING.allocs.load(Ordering::SeqCst);
    assert!(allocs > 2);
    assert_eq!(COUNTING.frees.load(Ordering::SeqCst), allocs);
    assert_eq!(COUNTING.dirty_frees.load(Ordering::SeqCst), 0);
}
