//! Deterministic checksums for replicated design state.
//!
//! Every persistent field of an entity is folded, in declaration order, into
//! a [`StateHash`]. Two replicas holding the same content produce the same
//! value; a field left out of the fold cannot reveal divergence, so
//! implementations of [`CheckSum`] cover the full persisted field set.

use crate::fixed::Fixed64;
use std::collections::{BTreeMap, BTreeSet};

/// A simple deterministic hash of simulation state for desync detection.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    /// Start a new hash.
    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    /// Feed bytes into the hash.
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write(&[v as u8]);
    }

    /// Length-prefixed, so `("ab", "c")` and `("a", "bc")` hash differently.
    pub fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write(s.as_bytes());
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    /// Fold any checksummable value.
    pub fn write_item<T: CheckSum + ?Sized>(&mut self, item: &T) {
        item.hash_into(self);
    }

    /// Finalize and return the hash value.
    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

/// An entity that can be folded into a [`StateHash`].
pub trait CheckSum {
    fn hash_into(&self, hasher: &mut StateHash);

    fn checksum(&self) -> u64 {
        let mut hasher = StateHash::new();
        self.hash_into(&mut hasher);
        hasher.finish()
    }
}

impl CheckSum for str {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_str(self);
    }
}

impl CheckSum for String {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_str(self);
    }
}

impl CheckSum for bool {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_bool(*self);
    }
}

impl CheckSum for i32 {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_i32(*self);
    }
}

impl CheckSum for u32 {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_u32(*self);
    }
}

impl CheckSum for Fixed64 {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_fixed64(*self);
    }
}

impl<T: CheckSum> CheckSum for Option<T> {
    fn hash_into(&self, hasher: &mut StateHash) {
        match self {
            Some(v) => {
                hasher.write_u32(1);
                v.hash_into(hasher);
            }
            None => hasher.write_u32(0),
        }
    }
}

impl<T: CheckSum> CheckSum for [T] {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_u64(self.len() as u64);
        for item in self {
            item.hash_into(hasher);
        }
    }
}

impl<T: CheckSum> CheckSum for Vec<T> {
    fn hash_into(&self, hasher: &mut StateHash) {
        self.as_slice().hash_into(hasher);
    }
}

impl<T: CheckSum> CheckSum for Box<T> {
    fn hash_into(&self, hasher: &mut StateHash) {
        (**self).hash_into(hasher);
    }
}

impl<T: CheckSum> CheckSum for BTreeSet<T> {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_u64(self.len() as u64);
        for item in self {
            item.hash_into(hasher);
        }
    }
}

impl<K: CheckSum, V: CheckSum> CheckSum for BTreeMap<K, V> {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_u64(self.len() as u64);
        for (k, v) in self {
            k.hash_into(hasher);
            v.hash_into(hasher);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_hash_deterministic() {
        let mut h1 = StateHash::new();
        h1.write_u64(42);
        h1.write_u32(7);

        let mut h2 = StateHash::new();
        h2.write_u64(42);
        h2.write_u32(7);

        assert_eq!(h1.finish(), h2.finish());
    }

    #[test]
    fn state_hash_order_matters() {
        let mut h1 = StateHash::new();
        h1.write_u32(1);
        h1.write_u32(2);

        let mut h2 = StateHash::new();
        h2.write_u32(2);
        h2.write_u32(1);

        assert_ne!(h1.finish(), h2.finish());
    }

    #[test]
    fn strings_are_length_prefixed() {
        let mut h1 = StateHash::new();
        h1.write_str("ab");
        h1.write_str("c");

        let mut h2 = StateHash::new();
        h2.write_str("a");
        h2.write_str("bc");

        assert_ne!(h1.finish(), h2.finish());
    }

    #[test]
    fn option_distinguishes_none_from_default() {
        assert_ne!(None::<u32>.checksum(), Some(0u32).checksum());
    }

    #[test]
    fn vec_order_matters() {
        let a = vec!["x".to_string(), "y".to_string()];
        let b = vec!["y".to_string(), "x".to_string()];
        assert_ne!(a.checksum(), b.checksum());
    }

    #[test]
    fn btree_set_ignores_insertion_order() {
        let a: BTreeSet<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        let b: BTreeSet<String> = ["y", "x"].iter().map(|s| s.to_string()).collect();
        assert_eq!(a.checksum(), b.checksum());
    }
}
