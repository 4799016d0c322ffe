//! Error types for [`Mapping`](super::Mapping).

use std::fmt;

/// Returned by [`Mapping::pop`](super::Mapping::pop) when the key is absent.
///
/// The missing key is kept so that callers can report or retry with it.
///
/// # Examples
///
/// ```rust
/// use mapping::{KeyNotFoundError, Mapping};
///
/// let mut map: Mapping<i32, i32> = Mapping::new();
/// let error = map.pop(&5).unwrap_err();
///
/// assert_eq!(error, KeyNotFoundError::new(5));
/// assert_eq!(error.key(), &5);
/// assert_eq!(format!("{error}"), "key not found: 5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNotFoundError<K> {
    key: K,
}

impl<K> KeyNotFoundError<K> {
    /// Creates an error for the given missing key.
    #[inline]
    #[must_use]
    pub const fn new(key: K) -> Self {
        Self { key }
    }

    /// Returns the key that was not found.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Consumes the error, returning the missing key.
    #[inline]
    #[must_use]
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K: fmt::Debug> fmt::Display for KeyNotFoundError<K> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "key not found: {:?}", self.key)
    }
}

impl<K: fmt::Debug> std::error::Error for KeyNotFoundError<K> {}
