//! Hash Array Mapped Trie storage for [`Mapping`](super::Mapping).
//!
//! The trie is mutated in place. Each level consumes
//! [`BITS_PER_LEVEL`](super::hash::BITS_PER_LEVEL) bits of the key hash:
//!
//! - `Branch` nodes keep a 32-bit occupancy bitmap and a compressed child array
//! - a child is either an entry (with its cached hash) or a boxed sub-node
//! - keys whose full hashes are equal share a `Collision` bucket
//!
//! The root is always a `Branch`. Removals collapse sub-nodes that are left
//! holding a single entry back into their parent slot.

use std::borrow::Borrow;
use std::hash::Hash;
use std::mem;

use smallvec::{SmallVec, smallvec};

use super::hash::{MAX_DEPTH, bit_at, position_of};

/// Inline capacity of a collision bucket. Full 64-bit collisions are rare,
/// so two slots cover almost every bucket without a heap allocation.
pub(super) const COLLISION_INLINE_CAPACITY: usize = 2;

pub(super) type CollisionEntries<K, V> = SmallVec<[(K, V); COLLISION_INLINE_CAPACITY]>;

/// A stored key-value pair together with the full hash of its key.
#[derive(Clone)]
pub(super) struct Entry<K, V> {
    pub(super) hash: u64,
    pub(super) key: K,
    pub(super) value: V,
}

/// Internal node structure for the HAMT.
#[derive(Clone)]
pub(super) enum Node<K, V> {
    /// Bitmap-indexed branch node
    Branch {
        /// Bitmap indicating which slots are occupied
        bitmap: u32,
        /// Children (entries or subnodes), compressed
        children: Vec<Child<K, V>>,
    },
    /// Keys with the same full hash
    Collision {
        hash: u64,
        entries: CollisionEntries<K, V>,
    },
}

/// A child in a branch node.
#[derive(Clone)]
pub(super) enum Child<K, V> {
    Entry(Entry<K, V>),
    Node(Box<Node<K, V>>),
}

/// What to do when the key being stored is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum OnOccupied {
    /// Overwrite the stored value, handing back the previous one.
    Replace,
    /// Leave the stored value alone, handing back the rejected one.
    Keep,
}

/// How a branch slot relates to a key being stored.
enum Probe {
    SameKey,
    OtherKey,
    Subnode,
}

/// Result of tidying a sub-node after an entry left it.
enum Compaction<K, V> {
    Keep,
    Single(Entry<K, V>),
    Empty,
}

impl<K, V> Entry<K, V> {
    pub(super) fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> Child<K, V> {
    fn into_pair(self) -> Option<(K, V)> {
        match self {
            Self::Entry(entry) => Some(entry.into_pair()),
            Self::Node(_) => None,
        }
    }

    const fn is_entry(&self) -> bool {
        matches!(self, Self::Entry(_))
    }

    fn expect_entry_mut(&mut self) -> &mut Entry<K, V> {
        match self {
            Self::Entry(entry) => entry,
            Self::Node(_) => unreachable!("slot was probed as an entry"),
        }
    }

    fn expect_node_mut(&mut self) -> &mut Node<K, V> {
        match self {
            Self::Node(node) => node,
            Self::Entry(_) => unreachable!("slot was probed as a subnode"),
        }
    }

    /// Turns an entry into a one-entry sub-node at `depth`, ready to receive
    /// a second key with hash `incoming_hash`.
    fn into_subnode(self, incoming_hash: u64, depth: usize) -> Box<Node<K, V>> {
        match self {
            Self::Entry(entry) if entry.hash == incoming_hash => {
                trace_event!(hash = entry.hash, depth, "creating collision bucket");
                Box::new(Node::Collision {
                    hash: entry.hash,
                    entries: smallvec![(entry.key, entry.value)],
                })
            }
            Self::Entry(entry) => Box::new(Node::Branch {
                bitmap: bit_at(entry.hash, depth),
                children: vec![Self::Entry(entry)],
            }),
            Self::Node(node) => node,
        }
    }
}

/// Applies the occupied-slot policy to a value already in the trie.
fn occupy<V>(current: &mut V, value: V, on_occupied: OnOccupied) -> (&mut V, Option<V>) {
    match on_occupied {
        OnOccupied::Replace => {
            let previous = mem::replace(current, value);
            (current, Some(previous))
        }
        OnOccupied::Keep => (current, Some(value)),
    }
}

impl<K, V> Node<K, V> {
    /// Creates an empty branch node.
    pub(super) const fn empty() -> Self {
        Self::Branch {
            bitmap: 0,
            children: Vec::new(),
        }
    }

    /// Removes and returns an arbitrary entry.
    pub(super) fn pop_any(&mut self) -> Option<(K, V)> {
        match self {
            Self::Branch { bitmap, children } => {
                let last = children.len().checked_sub(1)?;
                let top_bit = 1u32 << (u32::BITS - 1 - bitmap.leading_zeros());
                if let Child::Node(subnode) = &mut children[last] {
                    let popped = subnode.pop_any();
                    Self::compact_slot(bitmap, children, last, top_bit);
                    popped
                } else {
                    *bitmap &= !top_bit;
                    children.pop().and_then(Child::into_pair)
                }
            }
            Self::Collision { entries, .. } => entries.pop(),
        }
    }

    /// Tidies the sub-node at `position` after an entry was removed from it.
    fn compact_slot(bitmap: &mut u32, children: &mut Vec<Child<K, V>>, position: usize, bit: u32) {
        let Child::Node(subnode) = &mut children[position] else {
            return;
        };
        match subnode.compacted() {
            Compaction::Keep => {}
            Compaction::Single(entry) => children[position] = Child::Entry(entry),
            Compaction::Empty => {
                children.remove(position);
                *bitmap &= !bit;
            }
        }
    }

    fn compacted(&mut self) -> Compaction<K, V> {
        match self {
            Self::Branch { children, .. } if children.is_empty() => Compaction::Empty,
            Self::Branch { children, .. } if children.len() == 1 && children[0].is_entry() => {
                match children.pop() {
                    Some(Child::Entry(entry)) => Compaction::Single(entry),
                    Some(Child::Node(_)) | None => unreachable!("guard checked for a single entry"),
                }
            }
            Self::Collision { entries, .. } if entries.is_empty() => Compaction::Empty,
            Self::Collision { hash, entries } if entries.len() == 1 => {
                let hash = *hash;
                entries.pop().map_or(Compaction::Keep, |(key, value)| {
                    Compaction::Single(Entry { hash, key, value })
                })
            }
            _ => Compaction::Keep,
        }
    }
}

impl<K: Hash + Eq, V> Node<K, V> {
    /// Returns a reference to the value stored for `key`.
    pub(super) fn get<Q>(&self, hash: u64, key: &Q, depth: usize) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self {
            Self::Branch { bitmap, children } => {
                let bit = bit_at(hash, depth);
                if bitmap & bit == 0 {
                    return None;
                }
                match &children[position_of(*bitmap, bit)] {
                    Child::Entry(entry) => {
                        (entry.hash == hash && entry.key.borrow() == key).then_some(&entry.value)
                    }
                    Child::Node(subnode) => subnode.get(hash, key, depth + 1),
                }
            }
            Self::Collision {
                hash: collision_hash,
                entries,
            } => {
                if *collision_hash != hash {
                    return None;
                }
                entries
                    .iter()
                    .find(|(entry_key, _)| entry_key.borrow() == key)
                    .map(|(_, value)| value)
            }
        }
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub(super) fn get_mut<Q>(&mut self, hash: u64, key: &Q, depth: usize) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self {
            Self::Branch { bitmap, children } => {
                let bit = bit_at(hash, depth);
                if *bitmap & bit == 0 {
                    return None;
                }
                match &mut children[position_of(*bitmap, bit)] {
                    Child::Entry(entry) => (entry.hash == hash && entry.key.borrow() == key)
                        .then_some(&mut entry.value),
                    Child::Node(subnode) => subnode.get_mut(hash, key, depth + 1),
                }
            }
            Self::Collision {
                hash: collision_hash,
                entries,
            } => {
                if *collision_hash != hash {
                    return None;
                }
                entries
                    .iter_mut()
                    .find(|(entry_key, _)| entry_key.borrow() == key)
                    .map(|(_, value)| value)
            }
        }
    }

    /// Stores `value` under `key`, following `on_occupied` if the key exists.
    ///
    /// Returns the slot now holding the key's value, and `None` when a new
    /// entry was created. Otherwise the second element holds the displaced
    /// value (`Replace`) or the rejected incoming value (`Keep`).
    pub(super) fn upsert(
        &mut self,
        hash: u64,
        key: K,
        value: V,
        on_occupied: OnOccupied,
        depth: usize,
    ) -> (&mut V, Option<V>) {
        debug_assert!(depth < MAX_DEPTH);

        if let Self::Collision {
            hash: collision_hash,
            ..
        } = &*self
            && *collision_hash != hash
        {
            let collision_hash = *collision_hash;
            let collision = mem::replace(self, Self::empty());
            trace_event!(collision_hash, depth, "splitting collision bucket");
            *self = Self::Branch {
                bitmap: bit_at(collision_hash, depth),
                children: vec![Child::Node(Box::new(collision))],
            };
        }

        match self {
            Self::Branch { bitmap, children } => {
                Self::upsert_into_branch(bitmap, children, hash, key, value, on_occupied, depth)
            }
            Self::Collision { entries, .. } => {
                Self::upsert_into_collision(entries, key, value, on_occupied)
            }
        }
    }

    fn upsert_into_branch<'a>(
        bitmap: &mut u32,
        children: &'a mut Vec<Child<K, V>>,
        hash: u64,
        key: K,
        value: V,
        on_occupied: OnOccupied,
        depth: usize,
    ) -> (&'a mut V, Option<V>) {
        let bit = bit_at(hash, depth);
        let position = position_of(*bitmap, bit);

        if *bitmap & bit == 0 {
            *bitmap |= bit;
            children.insert(position, Child::Entry(Entry { hash, key, value }));
            return (&mut children[position].expect_entry_mut().value, None);
        }

        let probe = match &children[position] {
            Child::Entry(entry) if entry.hash == hash && entry.key == key => Probe::SameKey,
            Child::Entry(_) => Probe::OtherKey,
            Child::Node(_) => Probe::Subnode,
        };

        match probe {
            Probe::SameKey => {
                let entry = children[position].expect_entry_mut();
                return occupy(&mut entry.value, value, on_occupied);
            }
            Probe::OtherKey => {
                let existing = children.remove(position);
                children.insert(position, Child::Node(existing.into_subnode(hash, depth + 1)));
            }
            Probe::Subnode => {}
        }

        children[position]
            .expect_node_mut()
            .upsert(hash, key, value, on_occupied, depth + 1)
    }

    fn upsert_into_collision(
        entries: &mut CollisionEntries<K, V>,
        key: K,
        value: V,
        on_occupied: OnOccupied,
    ) -> (&mut V, Option<V>) {
        let index = match entries.iter().position(|(entry_key, _)| *entry_key == key) {
            Some(index) => return occupy(&mut entries[index].1, value, on_occupied),
            None => {
                entries.push((key, value));
                entries.len() - 1
            }
        };
        (&mut entries[index].1, None)
    }

    /// Removes `key`, returning the stored pair.
    pub(super) fn remove<Q>(&mut self, hash: u64, key: &Q, depth: usize) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self {
            Self::Branch { bitmap, children } => {
                let bit = bit_at(hash, depth);
                if *bitmap & bit == 0 {
                    return None;
                }
                let position = position_of(*bitmap, bit);

                match &mut children[position] {
                    Child::Entry(entry) => {
                        if entry.hash != hash || entry.key.borrow() != key {
                            return None;
                        }
                        *bitmap &= !bit;
                        children.remove(position).into_pair()
                    }
                    Child::Node(subnode) => {
                        let removed = subnode.remove(hash, key, depth + 1)?;
                        Self::compact_slot(bitmap, children, position, bit);
                        Some(removed)
                    }
                }
            }
            Self::Collision {
                hash: collision_hash,
                entries,
            } => {
                if *collision_hash != hash {
                    return None;
                }
                let index = entries
                    .iter()
                    .position(|(entry_key, _)| entry_key.borrow() == key)?;
                Some(entries.swap_remove(index))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::hash::compute_hash;
    use rstest::rstest;

    fn insert(root: &mut Node<i32, i32>, key: i32, value: i32) -> Option<i32> {
        let (_, previous) = root.upsert(compute_hash(&key), key, value, OnOccupied::Replace, 0);
        previous
    }

    fn depth_of(node: &Node<i32, i32>) -> usize {
        match node {
            Node::Branch { children, .. } => {
                1 + children
                    .iter()
                    .map(|child| match child {
                        Child::Entry(_) => 0,
                        Child::Node(subnode) => depth_of(subnode),
                    })
                    .max()
                    .unwrap_or(0)
            }
            Node::Collision { .. } => 1,
        }
    }

    fn count(node: &Node<i32, i32>) -> usize {
        match node {
            Node::Branch { children, .. } => children
                .iter()
                .map(|child| match child {
                    Child::Entry(_) => 1,
                    Child::Node(subnode) => count(subnode),
                })
                .sum(),
            Node::Collision { entries, .. } => entries.len(),
        }
    }

    fn bitmap_matches_children(node: &Node<i32, i32>) -> bool {
        match node {
            Node::Branch { bitmap, children } => {
                bitmap.count_ones() as usize == children.len()
                    && children.iter().all(|child| match child {
                        Child::Entry(_) => true,
                        Child::Node(subnode) => bitmap_matches_children(subnode),
                    })
            }
            Node::Collision { entries, .. } => entries.len() >= 2,
        }
    }

    #[rstest]
    fn test_empty_node_finds_nothing() {
        let root: Node<i32, i32> = Node::empty();
        assert_eq!(root.get(compute_hash(&1), &1, 0), None);
    }

    #[rstest]
    fn test_upsert_then_get() {
        let mut root = Node::empty();
        assert_eq!(insert(&mut root, 1, 10), None);
        assert_eq!(root.get(compute_hash(&1), &1, 0), Some(&10));
    }

    #[rstest]
    fn test_upsert_replace_returns_previous() {
        let mut root = Node::empty();
        insert(&mut root, 1, 10);
        assert_eq!(insert(&mut root, 1, 20), Some(10));
        assert_eq!(root.get(compute_hash(&1), &1, 0), Some(&20));
    }

    #[rstest]
    fn test_upsert_keep_rejects_incoming() {
        let mut root = Node::empty();
        insert(&mut root, 1, 10);
        let (current, rejected) = root.upsert(compute_hash(&1), 1, 99, OnOccupied::Keep, 0);
        assert_eq!(*current, 10);
        assert_eq!(rejected, Some(99));
    }

    #[rstest]
    fn test_many_entries_build_subnodes() {
        let mut root = Node::empty();
        for key in 0..1000 {
            insert(&mut root, key, key * 2);
        }
        assert_eq!(count(&root), 1000);
        assert!(depth_of(&root) > 1);
        assert!(bitmap_matches_children(&root));
        for key in 0..1000 {
            assert_eq!(root.get(compute_hash(&key), &key, 0), Some(&(key * 2)));
        }
    }

    #[rstest]
    fn test_remove_collapses_back_to_single_level() {
        let mut root = Node::empty();
        for key in 0..1000 {
            insert(&mut root, key, key);
        }
        for key in 1..1000 {
            assert_eq!(root.remove(compute_hash(&key), &key, 0), Some((key, key)));
        }
        assert_eq!(count(&root), 1);
        assert_eq!(depth_of(&root), 1);
        assert!(bitmap_matches_children(&root));
    }

    #[rstest]
    fn test_remove_missing_is_none() {
        let mut root = Node::empty();
        insert(&mut root, 1, 1);
        assert_eq!(root.remove(compute_hash(&2), &2, 0), None);
        assert_eq!(count(&root), 1);
    }

    #[rstest]
    fn test_pop_any_drains_everything() {
        let mut root = Node::empty();
        for key in 0..200 {
            insert(&mut root, key, key);
        }
        let mut drained: Vec<i32> = std::iter::from_fn(|| root.pop_any())
            .map(|(key, _)| key)
            .collect();
        drained.sort_unstable();
        assert_eq!(drained, (0..200).collect::<Vec<_>>());
        assert_eq!(count(&root), 0);
        assert!(matches!(root, Node::Branch { bitmap: 0, .. }));
    }

    #[rstest]
    fn test_collision_bucket_holds_equal_hashes() {
        let mut root: Node<i32, i32> = Node::empty();
        let hash = 0xDEAD_BEEF;
        root.upsert(hash, 1, 10, OnOccupied::Replace, 0);
        root.upsert(hash, 2, 20, OnOccupied::Replace, 0);
        root.upsert(hash, 3, 30, OnOccupied::Replace, 0);

        assert_eq!(root.get(hash, &1, 0), Some(&10));
        assert_eq!(root.get(hash, &2, 0), Some(&20));
        assert_eq!(root.get(hash, &3, 0), Some(&30));
        assert_eq!(count(&root), 3);

        let Node::Branch { children, .. } = &root else {
            panic!("root must be a branch");
        };
        assert!(matches!(
            &children[0],
            Child::Node(node) if matches!(**node, Node::Collision { .. })
        ));
    }

    #[rstest]
    fn test_collision_bucket_split_by_near_hash() {
        let mut root: Node<i32, i32> = Node::empty();
        let hash = 0b00001;
        let near = 0b11111_00001;
        root.upsert(hash, 1, 10, OnOccupied::Replace, 0);
        root.upsert(hash, 2, 20, OnOccupied::Replace, 0);
        root.upsert(near, 3, 30, OnOccupied::Replace, 0);

        assert_eq!(root.get(hash, &1, 0), Some(&10));
        assert_eq!(root.get(hash, &2, 0), Some(&20));
        assert_eq!(root.get(near, &3, 0), Some(&30));
        assert!(bitmap_matches_children(&root));

        assert_eq!(root.remove(hash, &1, 0), Some((1, 10)));
        assert_eq!(root.remove(near, &3, 0), Some((3, 30)));
        assert_eq!(root.get(hash, &2, 0), Some(&20));
        assert_eq!(depth_of(&root), 1);
    }

    #[rstest]
    fn test_collision_lookup_with_different_hash_misses() {
        let mut root: Node<i32, i32> = Node::empty();
        root.upsert(7, 1, 10, OnOccupied::Replace, 0);
        root.upsert(7, 2, 20, OnOccupied::Replace, 0);
        assert_eq!(root.get(7 + (1 << 40), &1, 0), None);
        assert_eq!(root.remove(7 + (1 << 40), &1, 0), None);
    }

    #[rstest]
    fn test_get_mut_updates_in_place() {
        let mut root = Node::empty();
        insert(&mut root, 5, 25);
        if let Some(value) = root.get_mut(compute_hash(&5), &5, 0) {
            *value += 1;
        }
        assert_eq!(root.get(compute_hash(&5), &5, 0), Some(&26));
    }
}
