//! A key-unique hash mapping based on a mutable HAMT.
//!
//! This module provides [`Mapping`], a hash map that is updated in place and
//! whose API separates *lookups that may miss* from *strict removals*:
//!
//! - [`Mapping::get`], [`Mapping::get_or`], [`Mapping::pop_or`] and
//!   [`Mapping::set_default`] never fail; absence is an `Option` or a default
//! - [`Mapping::pop`] is the only operation that reports a missing key as an
//!   error ([`KeyNotFoundError`])
//!
//! # Overview
//!
//! Entries live in a Hash Array Mapped Trie: a 32-way branching trie where
//! successive 5-bit slices of the key hash pick the child at each level.
//!
//! - O(log32 N) get (effectively O(1) for practical sizes)
//! - O(log32 N) insert
//! - O(log32 N) remove
//! - O(1) len and `is_empty`
//!
//! Enumeration order follows hash bits and is unspecified. Callers that need
//! a stable order sort the output of a view.
//!
//! # Examples
//!
//! ```rust
//! use mapping::Mapping;
//!
//! let mut map = Mapping::new();
//! map.set("one".to_string(), 1);
//! map.set("two".to_string(), 2);
//!
//! assert_eq!(map.get("one"), Some(&1));
//! assert_eq!(map.get_or("three", &0), &0);
//! assert_eq!(map.pop_or("three", 3), 3);
//! assert!(map.pop("three").is_err());
//! assert_eq!(map.pop("two"), Ok(2));
//! assert_eq!(map.len(), 1);
//! ```

mod error;
mod hash;
mod iter;
mod node;
#[cfg(feature = "sync")]
mod shared;
mod view;

pub use error::KeyNotFoundError;
pub use iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
#[cfg(feature = "sync")]
pub use shared::SharedMapping;
pub use view::{ItemsView, KeysView, ValuesView};

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use hash::compute_hash;
use node::{Node, OnOccupied};

// =============================================================================
// Mapping Definition
// =============================================================================

/// A key-unique hash mapping updated in place.
///
/// At most one entry exists per distinct key; storing an existing key
/// overwrites its value.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log32 N)        |
/// | `insert`       | O(log32 N)        |
/// | `pop`          | O(log32 N)        |
/// | `set_default`  | O(log32 N)        |
/// | `contains_key` | O(log32 N)        |
/// | `len`          | O(1)              |
/// | `is_empty`     | O(1)              |
///
/// # Examples
///
/// ```rust
/// use mapping::Mapping;
///
/// let mut map = Mapping::from([(2, 2)]);
/// map.set(1, 1);
///
/// assert_eq!(map.get(&1), Some(&1));
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Clone)]
pub struct Mapping<K, V> {
    /// Root node of the trie, always a branch
    root: Node<K, V>,
    /// Number of entries
    length: usize,
}

static_assertions::assert_impl_all!(Mapping<i32, String>: Send, Sync, Clone, Default);
static_assertions::assert_impl_all!(KeyNotFoundError<String>: std::error::Error, Send, Sync);

impl<K, V> Mapping<K, V> {
    /// Creates a new empty mapping.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let map: Mapping<String, i32> = Mapping::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: Node::empty(),
            length: 0,
        }
    }

    /// Returns the number of entries in the mapping.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let mut map = Mapping::new();
    /// map.set("a", 1);
    /// map.set("a", 2);
    /// map.set("b", 3);
    /// assert_eq!(map.len(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the mapping contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        trace_event!(length = self.length, "clearing mapping");
        self.root = Node::empty();
        self.length = 0;
    }

    /// Removes and returns an arbitrary entry, or `None` if the mapping is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let mut map = Mapping::from([("only", 1)]);
    /// assert_eq!(map.pop_item(), Some(("only", 1)));
    /// assert_eq!(map.pop_item(), None);
    /// ```
    pub fn pop_item(&mut self) -> Option<(K, V)> {
        let popped = self.root.pop_any();
        if popped.is_some() {
            self.length -= 1;
        }
        popped
    }

    /// Returns a lazy, single-pass iterator over key-value pairs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let map = Mapping::from([("a", 1), ("b", 2)]);
    /// let total: i32 = map.iter().map(|(_, value)| value).sum();
    /// assert_eq!(total, 3);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root, self.length)
    }

    /// Returns a lazy, single-pass iterator over keys.
    #[must_use]
    pub fn iter_keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Returns a lazy, single-pass iterator over values.
    #[must_use]
    pub fn iter_values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Returns an iterator over key-value pairs with mutable values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let mut map = Mapping::from([("a", 1), ("b", 2)]);
    /// for (_, value) in map.iter_mut() {
    ///     *value *= 10;
    /// }
    /// assert_eq!(map.get("b"), Some(&20));
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.root, self.length)
    }

    /// Returns an iterator over mutable values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    /// Returns a restartable view of the keys.
    ///
    /// Iterating `&Mapping` directly yields the same keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let map: Mapping<i32, i32> = (0..10).map(|index| (index, index * index)).collect();
    ///
    /// let expected: Vec<i32> = (0..10).collect();
    /// let mut keys = map.keys().to_vec();
    /// keys.sort();
    /// assert_eq!(keys, expected.iter().collect::<Vec<_>>());
    ///
    /// let mut direct: Vec<&i32> = (&map).into_iter().collect();
    /// direct.sort();
    /// assert_eq!(direct, keys);
    /// ```
    #[must_use]
    pub const fn keys(&self) -> KeysView<'_, K, V> {
        KeysView::new(self)
    }

    /// Returns a restartable view of the values.
    #[must_use]
    pub const fn values(&self) -> ValuesView<'_, K, V> {
        ValuesView::new(self)
    }

    /// Returns a restartable view of the key-value pairs.
    #[must_use]
    pub const fn items(&self) -> ItemsView<'_, K, V> {
        ItemsView::new(self)
    }
}

impl<K: Hash + Eq, V> Mapping<K, V> {
    /// Builds a mapping from an ordered sequence of pair sources.
    ///
    /// Sources are applied left to right, so on a key collision the value from
    /// the later source wins.
    ///
    /// # Arguments
    ///
    /// * `sources` - Pair sources, earliest first
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let base = Mapping::from([("a", 1), ("b", 2)]);
    /// let merged = Mapping::merged([base.into_iter().collect::<Vec<_>>(), vec![("a", 9)]]);
    ///
    /// assert_eq!(merged.get("a"), Some(&9));
    /// assert_eq!(merged.get("b"), Some(&2));
    /// ```
    pub fn merged<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = (K, V)>,
    {
        sources
            .into_iter()
            .fold(Self::new(), |mut merged, source| {
                merged.extend(source);
                merged
            })
    }

    /// Returns a reference to the value corresponding to the key, or `None`
    /// if the key is absent.
    ///
    /// The key may be any borrowed form of the mapping's key type, but `Hash`
    /// and `Eq` on the borrowed form must match those for the key type.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to look up
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let map = Mapping::from([("hello".to_string(), 42)]);
    ///
    /// // Can use &str to look up String keys
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.root.get(compute_hash(key), key, 0)
    }

    /// Returns the value for the key, or `default` if the key is absent.
    ///
    /// `default` is not stored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let map = Mapping::from([(3, 9)]);
    /// assert_eq!(map.get_or(&4, &5), &5);
    /// assert_eq!(map.get_or(&3, &5), &9);
    /// assert!(!map.contains_key(&4));
    /// ```
    #[must_use]
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns a mutable reference to the value for the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.root.get_mut(compute_hash(key), key, 0)
    }

    /// Returns `true` if the mapping contains the key.
    ///
    /// Presence is decided by the key alone, whatever the stored value is.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let map = Mapping::from([("empty", "")]);
    /// assert!(map.contains_key("empty"));
    /// assert!(!Mapping::<&str, &str>::new().contains_key("empty"));
    /// ```
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    ///
    /// If the mapping already contains the key, the value is replaced and the
    /// stored key is kept.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let mut map = Mapping::new();
    /// assert_eq!(map.insert("key", 1), None);
    /// assert_eq!(map.insert("key", 2), Some(1));
    /// assert_eq!(map.get("key"), Some(&2));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = compute_hash(&key);
        let (_, previous) = self.root.upsert(hash, key, value, OnOccupied::Replace, 0);
        if previous.is_none() {
            self.length += 1;
        }
        previous
    }

    /// Inserts or overwrites the entry for `key`.
    ///
    /// Same as [`insert`](Self::insert) without handing back the old value.
    #[inline]
    pub fn set(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    /// Returns the value for `key`, inserting `default` first if the key is
    /// absent.
    ///
    /// An existing value is never overwritten, whatever `default` is.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let mut map = Mapping::new();
    /// assert_eq!(*map.set_default(11, 9), 9);
    /// assert_eq!(*map.set_default(11, 10), 9);
    /// assert_eq!(map.get(&11), Some(&9));
    /// ```
    pub fn set_default(&mut self, key: K, default: V) -> &mut V {
        let hash = compute_hash(&key);
        let (current, rejected) = self.root.upsert(hash, key, default, OnOccupied::Keep, 0);
        if rejected.is_none() {
            self.length += 1;
        }
        current
    }

    /// Removes a key, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key, returning the stored key and value if it was present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.root.remove(compute_hash(key), key, 0);
        if removed.is_some() {
            self.length -= 1;
        }
        removed
    }

    /// Removes a key and returns its value.
    ///
    /// # Errors
    ///
    /// Returns [`KeyNotFoundError`] carrying an owned copy of the key if the
    /// key is absent. The mapping is left unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let mut map = Mapping::from([(4, 16)]);
    /// assert_eq!(map.pop(&4), Ok(16));
    ///
    /// let error = map.pop(&4).unwrap_err();
    /// assert_eq!(error.key(), &4);
    /// ```
    pub fn pop<Q>(&mut self, key: &Q) -> Result<V, KeyNotFoundError<Q::Owned>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned + ?Sized,
    {
        self.remove(key).ok_or_else(|| {
            debug_event!(length = self.length, "pop on a missing key");
            KeyNotFoundError::new(key.to_owned())
        })
    }

    /// Removes a key and returns its value, or returns `default` without
    /// touching the mapping if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mapping::Mapping;
    ///
    /// let mut map = Mapping::from([(5, 25)]);
    /// assert_eq!(map.pop_or(&5, 5), 25);
    /// assert_eq!(map.pop_or(&5, 5), 5);
    /// ```
    pub fn pop_or<Q>(&mut self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(key).unwrap_or(default)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<K, V> Default for Mapping<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V> Extend<(K, V)> for Mapping<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for Mapping<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        mapping.extend(iter);
        mapping
    }
}

impl<K: Hash + Eq, V, const N: usize> From<[(K, V); N]> for Mapping<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V> IntoIterator for Mapping<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.root, self.length)
    }
}

/// Iterating a borrowed mapping yields its keys, like [`Mapping::keys`].
impl<'a, K, V> IntoIterator for &'a Mapping<K, V> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_keys()
    }
}

impl<K: Hash + Eq, V: PartialEq> PartialEq for Mapping<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Hash + Eq, V: Eq> Eq for Mapping<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Mapping<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Mapping<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self.iter() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for Mapping<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct MappingVisitor<K, V> {
    key_marker: std::marker::PhantomData<K>,
    value_marker: std::marker::PhantomData<V>,
}

#[cfg(feature = "serde")]
impl<K, V> MappingVisitor<K, V> {
    const fn new() -> Self {
        Self {
            key_marker: std::marker::PhantomData,
            value_marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for MappingVisitor<K, V>
where
    K: serde::Deserialize<'de> + Hash + Eq,
    V: serde::Deserialize<'de>,
{
    type Value = Mapping<K, V>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut mapping = Mapping::new();
        while let Some((key, value)) = access.next_entry()? {
            mapping.insert(key, value);
        }
        Ok(mapping)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for Mapping<K, V>
where
    K: serde::Deserialize<'de> + Hash + Eq,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(MappingVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
