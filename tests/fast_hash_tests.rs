//! Tests for the hasher feature flags.
//!
//! Whichever of the default, `fxhash` or `ahash` hashers is selected, lookups
//! must stay deterministic and behave identically.

use mapping::Mapping;
use rstest::rstest;

// =============================================================================
// Determinism Tests
// =============================================================================

/// The same key must be found again by every mapping that stores it.
#[rstest]
fn test_same_key_is_found_across_mappings() {
    let mut first = Mapping::new();
    let mut second = Mapping::new();
    first.set("key".to_string(), 1);
    second.set("key".to_string(), 2);

    assert_eq!(first.get("key"), Some(&1));
    assert_eq!(second.get("key"), Some(&2));
}

/// Mappings built from the same entries answer every lookup the same way.
#[rstest]
fn test_identical_entries_give_identical_mappings() {
    let entries: Vec<(String, i32)> = vec![
        ("alpha".to_string(), 1),
        ("beta".to_string(), 2),
        ("gamma".to_string(), 3),
        ("delta".to_string(), 4),
    ];

    let first: Mapping<String, i32> = entries.iter().cloned().collect();
    let second: Mapping<String, i32> = entries.iter().rev().cloned().collect();

    for (key, expected) in &entries {
        assert_eq!(first.get(key), Some(expected));
        assert_eq!(second.get(key), Some(expected));
    }
    assert_eq!(first, second);
}

// =============================================================================
// Key Type Coverage
// =============================================================================

#[rstest]
#[case::integers(10_000)]
#[case::small(16)]
fn test_integer_keys(#[case] count: u64) {
    let map: Mapping<u64, u64> = (0..count).map(|key| (key, key ^ 0xff)).collect();
    for key in 0..count {
        assert_eq!(map.get(&key), Some(&(key ^ 0xff)));
    }
}

#[rstest]
fn test_tuple_keys() {
    let mut map = Mapping::new();
    for row in 0..20 {
        for column in 0..20 {
            map.set((row, column), row * column);
        }
    }
    assert_eq!(map.len(), 400);
    assert_eq!(map.get(&(7, 9)), Some(&63));
}

#[rstest]
fn test_borrowed_and_owned_lookups_agree() {
    let map: Mapping<String, usize> = ["a", "bb", "ccc"]
        .into_iter()
        .map(|key| (key.to_string(), key.len()))
        .collect();

    for key in ["a", "bb", "ccc"] {
        assert_eq!(map.get(key), map.get(&key.to_string()));
    }
}
