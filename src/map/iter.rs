//! Iterators over a [`Mapping`](super::Mapping).
//!
//! All iterators walk the trie depth-first with an explicit stack of
//! per-node cursors, so they are lazy and single-pass. The enumeration order
//! follows hash bits and is unspecified.

use std::iter::FusedIterator;
use std::slice;
use std::vec;

use super::node::{COLLISION_INLINE_CAPACITY, Child, Node};

// =============================================================================
// Borrowing iterator
// =============================================================================

enum Frame<'a, K, V> {
    Branch(slice::Iter<'a, Child<K, V>>),
    Collision(slice::Iter<'a, (K, V)>),
}

impl<'a, K, V> Frame<'a, K, V> {
    fn of(node: &'a Node<K, V>) -> Self {
        match node {
            Node::Branch { children, .. } => Self::Branch(children.iter()),
            Node::Collision { entries, .. } => Self::Collision(entries.iter()),
        }
    }
}

impl<K, V> Clone for Frame<'_, K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Branch(children) => Self::Branch(children.clone()),
            Self::Collision(entries) => Self::Collision(entries.clone()),
        }
    }
}

enum Visit<'a, K, V> {
    Child(&'a Child<K, V>),
    Pair(&'a K, &'a V),
}

/// An iterator over the key-value pairs of a [`Mapping`](super::Mapping).
///
/// Created by [`Mapping::iter`](super::Mapping::iter).
pub struct Iter<'a, K, V> {
    stack: Vec<Frame<'a, K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(root: &'a Node<K, V>, length: usize) -> Self {
        Self {
            stack: vec![Frame::of(root)],
            remaining: length,
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let visit = match self.stack.last_mut()? {
                Frame::Branch(children) => children.next().map(Visit::Child),
                Frame::Collision(entries) => {
                    entries.next().map(|(key, value)| Visit::Pair(key, value))
                }
            };

            match visit {
                Some(Visit::Child(Child::Entry(entry))) => {
                    self.remaining -= 1;
                    return Some((&entry.key, &entry.value));
                }
                Some(Visit::Child(Child::Node(subnode))) => self.stack.push(Frame::of(subnode)),
                Some(Visit::Pair(key, value)) => {
                    self.remaining -= 1;
                    return Some((key, value));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An iterator over the keys of a [`Mapping`](super::Mapping).
///
/// Created by [`Mapping::iter_keys`](super::Mapping::iter_keys), or by
/// iterating `&Mapping` directly.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(super) const fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`Mapping`](super::Mapping).
///
/// Created by [`Mapping::iter_values`](super::Mapping::iter_values).
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(super) const fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

// =============================================================================
// Mutable iterator
// =============================================================================

enum FrameMut<'a, K, V> {
    Branch(slice::IterMut<'a, Child<K, V>>),
    Collision(slice::IterMut<'a, (K, V)>),
}

impl<'a, K, V> FrameMut<'a, K, V> {
    fn of(node: &'a mut Node<K, V>) -> Self {
        match node {
            Node::Branch { children, .. } => Self::Branch(children.iter_mut()),
            Node::Collision { entries, .. } => Self::Collision(entries.iter_mut()),
        }
    }
}

enum VisitMut<'a, K, V> {
    Child(&'a mut Child<K, V>),
    Pair(&'a K, &'a mut V),
}

/// An iterator over the entries of a [`Mapping`](super::Mapping) with
/// mutable references to the values.
///
/// Created by [`Mapping::iter_mut`](super::Mapping::iter_mut).
pub struct IterMut<'a, K, V> {
    stack: Vec<FrameMut<'a, K, V>>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(super) fn new(root: &'a mut Node<K, V>, length: usize) -> Self {
        Self {
            stack: vec![FrameMut::of(root)],
            remaining: length,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let visit = match self.stack.last_mut()? {
                FrameMut::Branch(children) => children.next().map(VisitMut::Child),
                FrameMut::Collision(entries) => entries
                    .next()
                    .map(|(key, value)| VisitMut::Pair(&*key, value)),
            };

            match visit {
                Some(VisitMut::Child(Child::Entry(entry))) => {
                    self.remaining -= 1;
                    return Some((&entry.key, &mut entry.value));
                }
                Some(VisitMut::Child(Child::Node(subnode))) => {
                    self.stack.push(FrameMut::of(subnode));
                }
                Some(VisitMut::Pair(key, value)) => {
                    self.remaining -= 1;
                    return Some((key, value));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over mutable references to the values of a
/// [`Mapping`](super::Mapping).
///
/// Created by [`Mapping::values_mut`](super::Mapping::values_mut).
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> ValuesMut<'a, K, V> {
    pub(super) const fn new(inner: IterMut<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

// =============================================================================
// Owning iterator
// =============================================================================

enum OwnedFrame<K, V> {
    Branch(vec::IntoIter<Child<K, V>>),
    Collision(smallvec::IntoIter<[(K, V); COLLISION_INLINE_CAPACITY]>),
}

impl<K, V> OwnedFrame<K, V> {
    fn of(node: Node<K, V>) -> Self {
        match node {
            Node::Branch { children, .. } => Self::Branch(children.into_iter()),
            Node::Collision { entries, .. } => Self::Collision(entries.into_iter()),
        }
    }
}

enum OwnedVisit<K, V> {
    Child(Child<K, V>),
    Pair((K, V)),
}

/// An owning iterator over the key-value pairs of a
/// [`Mapping`](super::Mapping).
///
/// Created by the `IntoIterator` implementation of `Mapping`.
pub struct IntoIter<K, V> {
    stack: Vec<OwnedFrame<K, V>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(super) fn new(root: Node<K, V>, length: usize) -> Self {
        Self {
            stack: vec![OwnedFrame::of(root)],
            remaining: length,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let visit = match self.stack.last_mut()? {
                OwnedFrame::Branch(children) => children.next().map(OwnedVisit::Child),
                OwnedFrame::Collision(entries) => entries.next().map(OwnedVisit::Pair),
            };

            match visit {
                Some(OwnedVisit::Child(Child::Entry(entry))) => {
                    self.remaining -= 1;
                    return Some(entry.into_pair());
                }
                Some(OwnedVisit::Child(Child::Node(subnode))) => {
                    self.stack.push(OwnedFrame::of(*subnode));
                }
                Some(OwnedVisit::Pair(pair)) => {
                    self.remaining -= 1;
                    return Some(pair);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

#[cfg(test)]
mod tests {
    use crate::Mapping;
    use rstest::rstest;

    fn squares() -> Mapping<i32, i32> {
        (0..100).map(|index| (index, index * index)).collect()
    }

    #[rstest]
    fn test_iter_visits_every_entry_once() {
        let map = squares();
        let mut entries: Vec<(i32, i32)> = map.iter().map(|(key, value)| (*key, *value)).collect();
        entries.sort_unstable();
        assert_eq!(
            entries,
            (0..100).map(|index| (index, index * index)).collect::<Vec<_>>()
        );
    }

    #[rstest]
    fn test_iter_reports_exact_length() {
        let map = squares();
        let mut iterator = map.iter();
        assert_eq!(iterator.len(), 100);
        iterator.next();
        assert_eq!(iterator.len(), 99);
        assert_eq!(iterator.count(), 99);
    }

    #[rstest]
    fn test_iter_is_fused() {
        let map: Mapping<i32, i32> = [(1, 1)].into_iter().collect();
        let mut iterator = map.iter();
        assert!(iterator.next().is_some());
        assert!(iterator.next().is_none());
        assert!(iterator.next().is_none());
    }

    #[rstest]
    fn test_cloned_iterator_restarts_from_same_point() {
        let map = squares();
        let mut iterator = map.iter_keys();
        iterator.next();
        let resumed: Vec<&i32> = iterator.clone().collect();
        let original: Vec<&i32> = iterator.collect();
        assert_eq!(resumed, original);
    }

    #[rstest]
    fn test_iter_mut_updates_all_values() {
        let mut map = squares();
        for (key, value) in map.iter_mut() {
            *value -= key * key;
        }
        assert!(map.iter_values().all(|value| *value == 0));
    }

    #[rstest]
    fn test_into_iter_yields_owned_pairs() {
        let map: Mapping<String, i32> = [("a".to_string(), 1), ("b".to_string(), 2)]
            .into_iter()
            .collect();
        let mut entries: Vec<(String, i32)> = map.into_iter().collect();
        entries.sort();
        assert_eq!(entries, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[rstest]
    fn test_empty_iterators() {
        let map: Mapping<i32, i32> = Mapping::new();
        assert_eq!(map.iter().next(), None);
        assert_eq!(map.iter_keys().next(), None);
        assert_eq!(map.iter_values().next(), None);
        assert_eq!(map.into_iter().next(), None);
    }
}
