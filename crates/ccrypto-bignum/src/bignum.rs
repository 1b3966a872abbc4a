//! Sign-magnitude big integer type.

use crate::alloc::{grown_capacity, LimbAllocator, SECURE_ALLOCATOR};
use crate::ccn;
use crate::limb::{Limb, LIMB_BITS, LIMB_BYTES};
use ccrypto_types::CryptoError;
use zeroize::Zeroize;

/// A heap-allocated, sign-magnitude big integer that is zeroized on release.
///
/// The magnitude is a little-endian unit buffer obtained from a
/// [`LimbAllocator`]. Only the first `n` units are significant and the logical
/// length is kept canonical: the top significant unit is never zero, and
/// every unit past it is zero. Zero is always positive.
pub struct BigInt {
    /// Little-endian units (units[0] is the least significant); `len()` is the capacity.
    units: Vec<Limb>,
    /// Number of significant units.
    n: usize,
    /// True if the number is negative.
    negative: bool,
    alloc: &'static dyn LimbAllocator,
}

impl BigInt {
    /// Create a zero-valued BigInt using the secure default allocator.
    pub fn new() -> Self {
        Self::with_allocator(&SECURE_ALLOCATOR)
    }

    /// Create a zero-valued BigInt whose buffer comes from `alloc`.
    pub fn with_allocator(alloc: &'static dyn LimbAllocator) -> Self {
        Self {
            units: Vec::new(),
            n: 0,
            negative: false,
            alloc,
        }
    }

    /// Create a zero-valued BigInt.
    pub fn zero() -> Self {
        Self::new()
    }

    /// Create a BigInt from a `u64` value.
    pub fn from_u64(value: u64) -> Self {
        Self::from_units(&[value])
    }

    /// Create a BigInt from an `i64` value.
    pub fn from_i64(value: i64) -> Self {
        let mut r = Self::from_u64(value.unsigned_abs());
        r.set_negative(value < 0);
        r
    }

    /// Create a non-negative BigInt from little-endian units.
    pub fn from_units(units: &[Limb]) -> Self {
        let mut r = Self::new();
        r.set_units(units);
        r
    }

    /// Create a non-negative BigInt from big-endian bytes.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        let mut r = Self::new();
        let num_units = bytes.len().div_ceil(LIMB_BYTES);
        let buf = r.prepare(num_units);
        for (i, &byte) in bytes.iter().rev().enumerate() {
            buf[i / LIMB_BYTES] |= (byte as Limb) << ((i % LIMB_BYTES) * 8);
        }
        r.normalize();
        r
    }

    /// Export the magnitude as minimal big-endian bytes (`[0]` for zero).
    pub fn to_bytes_be(&self) -> Vec<u8> {
        let need = self.bit_len().div_ceil(8);
        if need == 0 {
            return vec![0];
        }
        let mut bytes = vec![0u8; need];
        self.write_be(&mut bytes, need);
        bytes
    }

    /// Export the magnitude as big-endian bytes left-padded to exactly `len` bytes.
    pub fn to_bytes_be_padded(&self, len: usize) -> Result<Vec<u8>, CryptoError> {
        let need = self.bit_len().div_ceil(8);
        if need > len {
            return Err(CryptoError::BufferTooSmall { need, got: len });
        }
        let mut bytes = vec![0u8; len];
        self.write_be(&mut bytes, need);
        Ok(bytes)
    }

    /// Write the low `need` magnitude bytes right-aligned into `out`.
    fn write_be(&self, out: &mut [u8], need: usize) {
        let len = out.len();
        for i in 0..need {
            out[len - 1 - i] = (self.units[i / LIMB_BYTES] >> ((i % LIMB_BYTES) * 8)) as u8;
        }
    }

    /// Return the number of significant bits.
    pub fn bit_len(&self) -> usize {
        ccn::bitlen(self.n, &self.units)
    }

    /// Return the number of significant units.
    pub fn num_units(&self) -> usize {
        self.n
    }

    /// Return the allocated capacity in units.
    pub fn capacity(&self) -> usize {
        self.units.len()
    }

    /// Return the significant units.
    pub fn units(&self) -> &[Limb] {
        &self.units[..self.n]
    }

    /// Return the allocator backing this number.
    pub fn allocator(&self) -> &'static dyn LimbAllocator {
        self.alloc
    }

    /// Return true if this number is zero.
    pub fn is_zero(&self) -> bool {
        self.n == 0
    }

    /// Return true if this number equals 1.
    pub fn is_one(&self) -> bool {
        !self.negative && self.n == 1 && self.units[0] == 1
    }

    /// Return true if this number is negative.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Return true if this number is even.
    pub fn is_even(&self) -> bool {
        !self.is_odd()
    }

    /// Return true if this number is odd.
    pub fn is_odd(&self) -> bool {
        self.n > 0 && self.units[0] & 1 == 1
    }

    /// Set the sign. Zero stays positive.
    pub fn set_negative(&mut self, neg: bool) {
        self.negative = neg && self.n != 0;
    }

    /// Return `-self`.
    pub fn neg(&self) -> BigInt {
        let mut r = self.clone();
        r.set_negative(!self.negative);
        r
    }

    /// Return `|self|`.
    pub fn abs(&self) -> BigInt {
        let mut r = self.clone();
        r.negative = false;
        r
    }

    /// Get bit at position `idx` (0-indexed from LSB) of the magnitude.
    pub fn get_bit(&self, idx: usize) -> u64 {
        let unit = idx / LIMB_BITS;
        if unit >= self.n {
            0
        } else {
            (self.units[unit] >> (idx % LIMB_BITS)) & 1
        }
    }

    /// Set bit at position `idx` (0-indexed from LSB) of the magnitude.
    pub fn set_bit(&mut self, idx: usize) {
        let unit = idx / LIMB_BITS;
        self.reserve(unit + 1);
        self.units[unit] |= 1 << (idx % LIMB_BITS);
        self.n = self.n.max(unit + 1);
    }

    /// Replace the magnitude with `src` (non-negative result).
    pub(crate) fn set_units(&mut self, src: &[Limb]) {
        let buf = self.prepare(src.len());
        buf.copy_from_slice(src);
        self.negative = false;
        self.normalize();
    }

    /// Make room for `need` units, growing geometrically. Never shrinks.
    ///
    /// The old buffer is wiped by the allocator's `realloc` before release.
    pub(crate) fn reserve(&mut self, need: usize) {
        if need > self.units.len() {
            let cap = grown_capacity(self.units.len(), need);
            if self.units.is_empty() {
                self.units = self.alloc.alloc(cap);
            } else {
                self.alloc.realloc(&mut self.units, cap);
            }
        }
    }

    /// Clear the magnitude and return a zeroed working area of `len` units.
    ///
    /// The caller writes the result there and then calls [`normalize`](Self::normalize).
    pub(crate) fn prepare(&mut self, len: usize) -> &mut [Limb] {
        self.reserve(len);
        let used = self.n.max(len);
        ccn::zero(used, &mut self.units);
        self.n = 0;
        self.negative = false;
        &mut self.units[..len]
    }

    /// Recompute the significant length after a raw write.
    pub(crate) fn normalize(&mut self) {
        self.n = ccn::n(self.units.len(), &self.units);
        if self.n == 0 {
            self.negative = false;
        }
    }
}

impl Default for BigInt {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for BigInt {
    fn clone(&self) -> Self {
        let mut r = Self::with_allocator(self.alloc);
        r.set_units(self.units());
        r.negative = self.negative;
        r
    }
}

impl Zeroize for BigInt {
    fn zeroize(&mut self) {
        self.units.as_mut_slice().zeroize();
        self.n = 0;
        self.negative = false;
    }
}

impl Drop for BigInt {
    fn drop(&mut self) {
        if self.units.is_empty() {
            return;
        }
        self.units.as_mut_slice().zeroize();
        let units = std::mem::take(&mut self.units);
        self.alloc.free(units);
    }
}

impl std::fmt::Debug for BigInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.negative { "-" } else { "" };
        let hex = self
            .to_bytes_be()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>();
        write!(f, "BigInt({sign}0x{hex})")
    }
}

impl std::fmt::Display for BigInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_radix(10).map_err(|_| std::fmt::Error)?)
    }
}

impl PartialEq for BigInt {
    fn eq(&self, other: &Self) -> bool {
        self.negative == other.negative && self.units() == other.units()
    }
}

impl Eq for BigInt {}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self.negative, other.negative) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (false, false) => self.cmp_abs(other),
            // Both negative: larger magnitude is smaller
            (true, true) => other.cmp_abs(self),
        }
    }
}

impl From<u64> for BigInt {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}
