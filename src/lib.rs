//! # mapping
//!
//! A key-unique hash mapping (a dictionary) for Rust.
//!
//! ## Overview
//!
//! [`Mapping`] associates each distinct key with exactly one value. It is
//! stored as a mutable Hash Array Mapped Trie (HAMT): 32-way branching nodes
//! addressed by five bits of the key hash per level, with collision buckets
//! for keys whose full hashes are equal.
//!
//! - **Construction**: `new`, [`mapping!`], `FromIterator`, `From<[(K, V); N]>`
//!   and [`Mapping::merged`] for combining several sources
//! - **Lookup**: `get`, `get_or`, `contains_key`
//! - **Mutation**: `set`, `insert`, `set_default`, `pop`, `pop_or`, `remove`
//! - **Views**: [`KeysView`], [`ValuesView`] and [`ItemsView`], restartable
//!   and sized
//! - **Lazy iteration**: `iter_keys`, `iter_values` and `iter`, single pass
//!
//! ## Feature Flags
//!
//! - `sync` (default): [`SharedMapping`], a lock-guarded shared handle
//! - `serde`: Serialization as a map
//! - `tracing`: Structured `trace`/`debug` events from trie maintenance
//! - `fxhash`: Hash keys with `rustc-hash`
//! - `ahash`: Hash keys with `ahash` (ignored when `fxhash` is also enabled)
//! - `full`: `sync`, `serde` and `tracing`
//!
//! ## Example
//!
//! ```rust
//! use mapping::prelude::*;
//!
//! let mut stock = mapping! { "apple" => 3, "pear" => 0 };
//! stock.set("plum", 7);
//!
//! assert_eq!(stock.pop_or("pear", 0), 0);
//! assert!(stock.pop("kiwi").is_err());
//! assert_eq!(*stock.set_default("fig", 1), 1);
//! assert_eq!(stock.len(), 3);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

#[macro_use]
mod macros;

pub mod map;

pub use map::{
    IntoIter, ItemsView, Iter, IterMut, KeyNotFoundError, Keys, KeysView, Mapping, Values,
    ValuesMut, ValuesView,
};

#[cfg(feature = "sync")]
pub use map::SharedMapping;

/// Prelude module for convenient imports.
///
/// Re-exports the mapping type, its error, and the [`mapping!`] macro.
///
/// # Usage
///
/// ```rust
/// use mapping::prelude::*;
/// ```
pub mod prelude {
    pub use crate::mapping;
    pub use crate::map::{KeyNotFoundError, Mapping};

    #[cfg(feature = "sync")]
    pub use crate::map::SharedMapping;
}
