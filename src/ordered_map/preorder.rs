use std::iter::FusedIterator;

use super::Node;

/// Root-first traversal of an `OrderedMap`
///
/// Every node comes before its left subtree, which comes before its right subtree. The order
/// depends on the shape of the tree, which makes it useful for checking how a map was balanced.
pub struct IterPreorder<'a, K, V> {
    /// Subtrees still to visit, the next one on top
    pending: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> IterPreorder<'a, K, V> {
    pub(super) fn new(root: Option<&'a Node<K, V>>, len: usize) -> Self {
        Self {
            pending: root.into_iter().collect(),
            remaining: len,
        }
    }
}

impl<'a, K, V> Clone for IterPreorder<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for IterPreorder<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pending.pop()?;
        // Right goes in first so that the left subtree is visited first
        self.pending.extend(node.right());
        self.pending.extend(node.left());
        self.remaining -= 1;

        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for IterPreorder<'a, K, V> {}

impl<'a, K, V> FusedIterator for IterPreorder<'a, K, V> {}

#[cfg(test)]
mod tests {
    use crate::AvlMap;

    #[test]
    fn parents_come_before_children() {
        let mut map = AvlMap::new();
        for key in 1..=7 {
            map.insert(key, key * 2).unwrap();
        }

        let mut iter = map.iter_preorder();
        assert_eq!(iter.len(), 7);
        assert_eq!(iter.next(), Some((&4, &8)));
        assert_eq!(iter.len(), 6);

        let rest: Vec<_> = iter.clone().map(|(key, _)| *key).collect();
        assert_eq!(rest, vec![2, 1, 3, 6, 5, 7]);
        assert_eq!(iter.count(), 6);
    }

    #[test]
    fn empty_map_yields_nothing() {
        let map: AvlMap<u8, ()> = AvlMap::new();
        let mut iter = map.iter_preorder();
        assert_eq!(iter.size_hint(), (0, Some(0)));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }
}
