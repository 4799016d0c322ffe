//! Restartable views over a [`Mapping`](super::Mapping).
//!
//! A view borrows the mapping and can be iterated any number of times; each
//! pass reflects the same entry set because the borrow freezes the mapping.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use super::Mapping;
use super::iter::{Iter, Keys, Values};

// =============================================================================
// KeysView
// =============================================================================

/// A view of the keys of a [`Mapping`].
///
/// Created by [`Mapping::keys`].
///
/// # Examples
///
/// ```rust
/// use mapping::Mapping;
///
/// let map: Mapping<i32, &str> = [(1, "one"), (2, "two")].into_iter().collect();
/// let keys = map.keys();
///
/// assert_eq!(keys.len(), 2);
/// assert!(keys.contains(&1));
///
/// let mut first_pass = keys.to_vec();
/// let mut second_pass: Vec<&i32> = keys.iter().collect();
/// first_pass.sort();
/// second_pass.sort();
/// assert_eq!(first_pass, second_pass);
/// ```
pub struct KeysView<'a, K, V> {
    mapping: &'a Mapping<K, V>,
}

impl<'a, K, V> KeysView<'a, K, V> {
    pub(super) const fn new(mapping: &'a Mapping<K, V>) -> Self {
        Self { mapping }
    }

    /// Returns the number of keys in the view.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Returns `true` if the view contains no keys.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Starts a new pass over the keys.
    #[must_use]
    pub fn iter(&self) -> Keys<'a, K, V> {
        self.mapping.iter_keys()
    }

    /// Collects the keys into a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<&'a K> {
        self.iter().collect()
    }
}

impl<K: Hash + Eq, V> KeysView<'_, K, V> {
    /// Returns `true` if the key is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.mapping.contains_key(key)
    }
}

impl<K, V> Clone for KeysView<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for KeysView<'_, K, V> {}

impl<'a, K, V> IntoIterator for KeysView<'a, K, V> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &KeysView<'a, K, V> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug, V> fmt::Debug for KeysView<'_, K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

// =============================================================================
// ValuesView
// =============================================================================

/// A view of the values of a [`Mapping`].
///
/// Values are not deduplicated: the view always has one value per key.
///
/// Created by [`Mapping::values`].
pub struct ValuesView<'a, K, V> {
    mapping: &'a Mapping<K, V>,
}

impl<'a, K, V> ValuesView<'a, K, V> {
    pub(super) const fn new(mapping: &'a Mapping<K, V>) -> Self {
        Self { mapping }
    }

    /// Returns the number of values in the view.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Returns `true` if the view contains no values.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Starts a new pass over the values.
    #[must_use]
    pub fn iter(&self) -> Values<'a, K, V> {
        self.mapping.iter_values()
    }

    /// Collects the values into a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<&'a V> {
        self.iter().collect()
    }
}

impl<K, V: PartialEq> ValuesView<'_, K, V> {
    /// Returns `true` if any key maps to `value`.
    ///
    /// # Complexity
    ///
    /// O(N)
    pub fn contains(&self, value: &V) -> bool {
        self.iter().any(|candidate| candidate == value)
    }
}

impl<K, V> Clone for ValuesView<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for ValuesView<'_, K, V> {}

impl<'a, K, V> IntoIterator for ValuesView<'a, K, V> {
    type Item = &'a V;
    type IntoIter = Values<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &ValuesView<'a, K, V> {
    type Item = &'a V;
    type IntoIter = Values<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V: fmt::Debug> fmt::Debug for ValuesView<'_, K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

// =============================================================================
// ItemsView
// =============================================================================

/// A view of the key-value pairs of a [`Mapping`].
///
/// Created by [`Mapping::items`].
pub struct ItemsView<'a, K, V> {
    mapping: &'a Mapping<K, V>,
}

impl<'a, K, V> ItemsView<'a, K, V> {
    pub(super) const fn new(mapping: &'a Mapping<K, V>) -> Self {
        Self { mapping }
    }

    /// Returns the number of pairs in the view.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Returns `true` if the view contains no pairs.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Starts a new pass over the pairs.
    #[must_use]
    pub fn iter(&self) -> Iter<'a, K, V> {
        self.mapping.iter()
    }

    /// Collects the pairs into a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<(&'a K, &'a V)> {
        self.iter().collect()
    }
}

impl<K: Hash + Eq, V: PartialEq> ItemsView<'_, K, V> {
    /// Returns `true` if `key` is present and maps to `value`.
    pub fn contains<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.mapping.get(key) == Some(value)
    }
}

impl<K, V> Clone for ItemsView<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for ItemsView<'_, K, V> {}

impl<'a, K, V> IntoIterator for ItemsView<'a, K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &ItemsView<'a, K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ItemsView<'_, K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::Mapping;
    use rstest::rstest;

    fn sample() -> Mapping<String, i32> {
        [
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 1),
        ]
        .into_iter()
        .collect()
    }

    #[rstest]
    fn test_views_share_cardinality() {
        let map = sample();
        assert_eq!(map.keys().len(), 3);
        assert_eq!(map.values().len(), 3);
        assert_eq!(map.items().len(), 3);
    }

    #[rstest]
    fn test_values_view_keeps_duplicates() {
        let map = sample();
        let mut values: Vec<i32> = map.values().iter().copied().collect();
        values.sort_unstable();
        assert_eq!(values, vec![1, 1, 2]);
    }

    #[rstest]
    fn test_keys_view_contains_uses_borrowed_form() {
        let map = sample();
        assert!(map.keys().contains("a"));
        assert!(!map.keys().contains("z"));
    }

    #[rstest]
    fn test_values_view_contains() {
        let map = sample();
        assert!(map.values().contains(&2));
        assert!(!map.values().contains(&3));
    }

    #[rstest]
    fn test_items_view_contains_checks_value() {
        let map = sample();
        assert!(map.items().contains("b", &2));
        assert!(!map.items().contains("b", &1));
        assert!(!map.items().contains("z", &1));
    }

    #[rstest]
    fn test_view_is_restartable() {
        let map = sample();
        let items = map.items();
        let first: usize = items.iter().count();
        let second: usize = (&items).into_iter().count();
        assert_eq!(first, 3);
        assert_eq!(second, 3);
    }

    #[rstest]
    fn test_keys_and_values_line_up_with_items() {
        let map = sample();
        let keys = map.keys().to_vec();
        let values = map.values().to_vec();
        let items = map.items().to_vec();
        let zipped: Vec<_> = keys.into_iter().zip(values).collect();
        assert_eq!(zipped, items);
    }

    #[rstest]
    fn test_empty_views() {
        let map: Mapping<i32, i32> = Mapping::new();
        assert!(map.keys().is_empty());
        assert!(map.values().is_empty());
        assert!(map.items().is_empty());
        assert_eq!(format!("{:?}", map.keys()), "[]");
    }
}
