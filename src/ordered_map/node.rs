use std::cmp;

/// A single node of an `OrderedMap`
///
/// Each node exclusively owns its two subtrees. The cached height is exact
/// after every public operation: a leaf has height `0` and an absent subtree
/// counts as `-1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Option<Box<Node<K, V>>>,
    pub(crate) right: Option<Box<Node<K, V>>>,
    pub(crate) height: i32,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            height: 0,
        }
    }

    pub(crate) fn into_inner(self) -> (K, V) {
        (self.key, self.value)
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }

    /// Height of the subtree rooted at this node
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Height of the right subtree minus height of the left subtree
    pub fn balance_factor(&self) -> i32 {
        height(self.right()) - height(self.left())
    }

    /// Recomputes the cached height from the (already correct) child heights
    pub(crate) fn update_height(&mut self) {
        self.height = 1 + cmp::max(height(self.left()), height(self.right()));
    }
}

/// Height of an optional subtree, `-1` for an absent one
pub(crate) fn height<K, V>(node: Option<&Node<K, V>>) -> i32 {
    node.map_or(-1, Node::height)
}
