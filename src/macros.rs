//! Macros shared across the crate.
//!
//! [`mapping!`](crate::mapping!) is the literal syntax for building a
//! [`Mapping`](crate::Mapping). The event macros forward to `tracing` when the
//! `tracing` feature is enabled and expand to nothing otherwise.

/// Emits a `TRACE` level event when the `tracing` feature is enabled.
macro_rules! trace_event {
    ($($argument:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            ::tracing::trace!($($argument)*);
        }
    };
}

/// Emits a `DEBUG` level event when the `tracing` feature is enabled.
macro_rules! debug_event {
    ($($argument:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            ::tracing::debug!($($argument)*);
        }
    };
}

/// Creates a [`Mapping`](crate::Mapping) from `key => value` pairs.
///
/// Pairs are applied left to right, so a repeated key keeps the value
/// written last.
///
/// # Syntax
///
/// - `mapping!()` - An empty mapping
/// - `mapping!(k1 => v1, k2 => v2, ...)` - A mapping holding the given pairs
///
/// # Examples
///
/// ```
/// use mapping::mapping;
///
/// let prices = mapping! {
///     "apple" => 3,
///     "pear" => 5,
/// };
///
/// assert_eq!(prices.len(), 2);
/// assert_eq!(prices.get("pear"), Some(&5));
/// ```
///
/// ## Later pairs win
///
/// ```
/// use mapping::mapping;
///
/// let map = mapping!(1 => "first", 1 => "second");
///
/// assert_eq!(map.len(), 1);
/// assert_eq!(map.get(&1), Some(&"second"));
/// ```
///
/// ## Empty mapping
///
/// ```
/// use mapping::{mapping, Mapping};
///
/// let empty: Mapping<String, u8> = mapping!();
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! mapping {
    () => {
        $crate::Mapping::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Mapping::from([$(($key, $value)),+])
    };
}
