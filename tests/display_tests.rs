//! Tests for the Display and Debug output of Mapping.

use mapping::{Mapping, mapping};
use rstest::rstest;

#[rstest]
fn test_display_empty() {
    let map: Mapping<i32, i32> = Mapping::new();
    assert_eq!(format!("{map}"), "{}");
}

#[rstest]
fn test_display_single_entry() {
    let map = mapping!("a" => 1);
    assert_eq!(format!("{map}"), "{a: 1}");
}

#[rstest]
fn test_display_multiple_entries() {
    let map = mapping!(1 => "one", 2 => "two");
    let display = format!("{map}");
    assert!(display == "{1: one, 2: two}" || display == "{2: two, 1: one}");
}

#[rstest]
fn test_debug_uses_map_form() {
    let map = mapping!("a" => 1);
    assert_eq!(format!("{map:?}"), "{\"a\": 1}");
}

#[rstest]
fn test_views_debug_as_lists() {
    let map = mapping!("a" => 1);
    assert_eq!(format!("{:?}", map.keys()), "[\"a\"]");
    assert_eq!(format!("{:?}", map.values()), "[1]");
    assert_eq!(format!("{:?}", map.items()), "[(\"a\", 1)]");
}
