//! Key hashing for [`Mapping`](super::Mapping).
//!
//! Hashes must be deterministic for the lifetime of a mapping, so every
//! hasher used here is built from fixed keys rather than a random state.
//!
//! - default: `std::collections::hash_map::DefaultHasher`
//! - `fxhash` feature: `rustc_hash::FxHasher`
//! - `ahash` feature: `ahash::AHasher` (ignored when `fxhash` is also enabled)

use std::hash::{Hash, Hasher};

#[cfg(feature = "fxhash")]
type SelectedHasher = rustc_hash::FxHasher;

#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
type SelectedHasher = ahash::AHasher;

#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
type SelectedHasher = std::collections::hash_map::DefaultHasher;

/// Branching factor (2^5 = 32)
pub(super) const BRANCHING_FACTOR: usize = 32;

/// Bits per level in the trie
pub(super) const BITS_PER_LEVEL: usize = 5;

/// Bit mask for extracting index within a node
const MASK: u64 = (BRANCHING_FACTOR - 1) as u64;

/// Number of levels needed to consume all 64 hash bits.
pub(super) const MAX_DEPTH: usize = 64_usize.div_ceil(BITS_PER_LEVEL);

/// Computes the hash of a key with the hasher selected at compile time.
#[inline]
pub(super) fn compute_hash<Q: Hash + ?Sized>(key: &Q) -> u64 {
    let mut hasher = SelectedHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Extracts the index at a given depth from a hash.
#[inline]
pub(super) const fn hash_index(hash: u64, depth: usize) -> usize {
    debug_assert!(depth < MAX_DEPTH);
    ((hash >> (depth * BITS_PER_LEVEL)) & MASK) as usize
}

/// Returns the bitmap bit occupied by `hash` at `depth`.
#[inline]
pub(super) const fn bit_at(hash: u64, depth: usize) -> u32 {
    1u32 << hash_index(hash, depth)
}

/// Returns the position of `bit` inside a compressed child array.
#[inline]
pub(super) const fn position_of(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}
