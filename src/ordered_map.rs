mod balance;
mod node;
mod preorder;
mod inorder;

pub use balance::*;
pub use node::*;
pub use preorder::*;
pub use inorder::*;

use std::fmt;
use std::mem;
use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::{Error, Result};

/// A plain binary search tree ordered by `C`
pub type BstMap<K, V, C = NaturalOrder> = OrderedMap<K, V, C, Unbalanced>;

/// A height-balanced (AVL) binary search tree ordered by `C`
pub type AvlMap<K, V, C = NaturalOrder> = OrderedMap<K, V, C, HeightBalanced>;

/// A key-ordered map backed by a binary search tree whose nodes own their children through `Box`
///
/// BST properties: For each node with key `k`:
/// - The key of each node in the left subtree compares less than `k`
/// - The key of each node in the right subtree compares greater than `k`
///
/// Duplicate keys are rejected. Keys are compared with the comparator `C` given at construction,
/// and the shape of the tree is maintained by the balancing strategy `B`. With
/// [`HeightBalanced`] every operation is `O(log n)`; with [`Unbalanced`] operations degrade to
/// `O(n)` on sorted input.
pub struct OrderedMap<K, V, C = NaturalOrder, B = HeightBalanced> {
    root: Option<Box<Node<K, V>>>,
    len: usize,
    comparator: C,
    balance: PhantomData<B>,
}

impl<K, V, C, B> Drop for OrderedMap<K, V, C, B> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Clone, V: Clone, C: Clone, B> Clone for OrderedMap<K, V, C, B> {
    fn clone(&self) -> Self {
        Self {
            root: clone_tree(self.root()),
            len: self.len,
            comparator: self.comparator.clone(),
            balance: PhantomData,
        }
    }
}

impl<K, V, C: Default, B> Default for OrderedMap<K, V, C, B> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C, B> fmt::Debug for OrderedMap<K, V, C, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter_inorder()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C, B> PartialEq for OrderedMap<K, V, C, B> {
    fn eq(&self, other: &Self) -> bool {
        // Trees holding the same entries may be shaped differently depending on insertion order.
        // In-order traversal yields entries in sorted order regardless of shape, so compare that.
        if self.len() != other.len() {
            return false;
        }

        self.iter_inorder().zip(other.iter_inorder()).all(|((k1, v1), (k2, v2))| {
            k1.eq(k2) && v1.eq(v2)
        })
    }
}

impl<K: Eq, V: Eq, C, B> Eq for OrderedMap<K, V, C, B> {}

impl<K: Ord, V, B> OrderedMap<K, V, NaturalOrder, B> {
    /// Creates an empty map ordered by `K`'s `Ord` implementation
    ///
    /// # Examples
    ///
    /// ```
    /// use assoc::AvlMap;
    /// let mut map: AvlMap<&str, i32> = AvlMap::new();
    /// ```
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, V, C, B> OrderedMap<K, V, C, B> {
    /// Creates an empty map ordered by the given comparator
    ///
    /// # Examples
    ///
    /// ```
    /// use assoc::AvlMap;
    ///
    /// let mut map = AvlMap::with_comparator(|a: &i32, b: &i32| b.cmp(a));
    /// map.insert(1, ()).unwrap();
    /// map.insert(2, ()).unwrap();
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![2, 1]);
    /// ```
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            root: None,
            len: 0,
            comparator,
            balance: PhantomData,
        }
    }

    /// Returns the number of entries in the map
    ///
    /// Time complexity: `O(1)`
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the map is empty
    ///
    /// Time complexity: `O(1)`
    pub fn is_empty(&self) -> bool {
        debug_assert!(self.len != 0 || self.root.is_none());
        self.len == 0
    }

    /// Height of the tree, `-1` when empty
    ///
    /// Time complexity: `O(1)`
    pub fn height(&self) -> i32 {
        height(self.root())
    }

    /// Returns the comparator that orders this map
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Removes every entry, keeping the comparator
    ///
    /// Nodes are freed one at a time, so a degenerate tree of any depth can be cleared.
    pub fn clear(&mut self) {
        let mut stack: Vec<_> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
        self.len = 0;
    }

    /// Performs a pre-order traversal of the tree
    pub fn iter_preorder(&self) -> IterPreorder<'_, K, V> {
        IterPreorder::new(self.root(), self.len)
    }

    /// Performs an in-order traversal of the tree, yielding entries in ascending key order
    ///
    /// The iterator borrows the map, so a fresh traversal can be started at any time.
    pub fn iter_inorder(&self) -> IterInorder<'_, K, V> {
        IterInorder::new(self.root(), self.len)
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item=&K> + '_ {
        self.iter_inorder().map(|(key, _)| key)
    }

    /// Values in ascending key order
    pub fn values(&self) -> impl Iterator<Item=&V> + '_ {
        self.iter_inorder().map(|(_, value)| value)
    }

    /// Returns a listing of every entry, one `key => value` line per entry in ascending key order
    ///
    /// # Examples
    ///
    /// ```
    /// use assoc::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(2, "b").unwrap();
    /// map.insert(1, "a").unwrap();
    /// assert_eq!(map.dump().to_string(), "1 => \"a\"\n2 => \"b\"\n");
    /// ```
    pub fn dump(&self) -> Dump<'_, K, V, C, B> {
        Dump {map: self}
    }

    /// Returns the root node of the tree, or `None` if the tree is empty
    ///
    /// Note that the root can be **any** node inserted into the tree. This may change depending on
    /// the balancing strategy of the map. For a guaranteed ordering, use the various iteration
    /// methods.
    ///
    /// This is a low-level API meant to be used for implementing traversals. The inner structure of
    /// the tree can be anything that satisfies the BST properties.
    pub fn root(&self) -> Option<&Node<K, V>> {
        self.root.as_deref()
    }
}

impl<K, V, C, B> OrderedMap<K, V, C, B>
    where C: Comparator<K>,
{
    /// Returns `true` if the map contains a value for the specified key
    ///
    /// Time complexity: `O(log n)` for a balanced tree
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns a reference to the value corresponding to the given key, or `None` if no such key
    /// exists in the binary search tree
    ///
    /// Time complexity: `O(log n)` for a balanced tree
    pub fn get(&self, key: &K) -> Option<&V> {
        let mut current = self.root();
        while let Some(node) = current {
            match self.comparator.compare(key, node.key()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => current = node.right(),
                Ordering::Equal => return Some(node.value()),
            }
        }

        None
    }

    /// Returns a mutable reference to the value corresponding to the given key, or `None` if no
    /// such key exists in the binary search tree
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let comparator = &self.comparator;
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current.take() {
            match comparator.compare(key, node.key()) {
                Ordering::Less => current = node.left.as_deref_mut(),
                Ordering::Greater => current = node.right.as_deref_mut(),
                Ordering::Equal => return Some(node.value_mut()),
            }
        }

        None
    }

    /// Returns the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no entry has the given key.
    ///
    /// # Examples
    ///
    /// ```
    /// use assoc::{AvlMap, Error};
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, "a").unwrap();
    /// assert_eq!(map.search(&1), Ok(&"a"));
    /// assert_eq!(map.search(&2), Err(Error::NotFound));
    /// ```
    pub fn search(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(Error::NotFound)
    }
}

impl<K, V, C, B> OrderedMap<K, V, C, B>
    where C: Comparator<K>,
          B: Balance,
{
    /// Inserts a new entry into the tree and returns the new number of entries
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if an entry with an equal key already exists. The map is
    /// left untouched in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use assoc::{AvlMap, Error};
    ///
    /// let mut map = AvlMap::new();
    /// assert_eq!(map.insert(37, "a"), Ok(1));
    /// assert_eq!(map.insert(37, "b"), Err(Error::DuplicateKey));
    /// assert_eq!(map.get(&37), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<usize> {
        let mut path = Vec::new();
        let mut current = self.root.take();
        while let Some(mut node) = current {
            let side = self.comparator.compare(&key, node.key());
            current = match side {
                Ordering::Less => node.left.take(),
                Ordering::Greater => node.right.take(),
                Ordering::Equal => {
                    self.root = reattach(path, Some(node), |node| node);
                    return Err(Error::DuplicateKey);
                },
            };
            path.push((node, side));
        }

        self.root = reattach(path, Some(Box::new(Node::new(key, value))), B::rebalance);
        self.len += 1;
        Ok(self.len)
    }

    /// Removes the entry with the given key and returns its value
    ///
    /// A node with two children takes the key and value of its in-order predecessor (the rightmost
    /// node of its left subtree), and the predecessor's node is removed instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no entry has the given key. The map is left untouched in that
    /// case.
    ///
    /// # Examples
    ///
    /// ```
    /// use assoc::{AvlMap, Error};
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, "a").unwrap();
    /// assert_eq!(map.remove(&1), Ok("a"));
    /// assert_eq!(map.remove(&1), Err(Error::NotFound));
    /// ```
    pub fn remove(&mut self, key: &K) -> Result<V> {
        let mut path = Vec::new();
        let mut current = self.root.take();
        let mut found = None;
        while let Some(mut node) = current {
            let side = self.comparator.compare(key, node.key());
            current = match side {
                Ordering::Less => node.left.take(),
                Ordering::Greater => node.right.take(),
                Ordering::Equal => {
                    found = Some(node);
                    break;
                },
            };
            path.push((node, side));
        }

        let mut node = match found {
            Some(node) => node,
            None => {
                // The walk ended at an empty slot, so putting the path back restores the tree
                self.root = reattach(path, None, |node| node);
                return Err(Error::NotFound);
            },
        };

        let (subtree, removed) = match (node.left.take(), node.right.take()) {
            (None, child) | (child, None) => (child, node.value),

            (Some(left), Some(right)) => {
                let (left, (key, value)) = remove_max::<K, V, B>(left);
                node.left = left;
                node.right = Some(right);
                node.key = key;
                let removed = mem::replace(&mut node.value, value);
                (Some(B::rebalance(node)), removed)
            },
        };

        self.root = reattach(path, subtree, B::rebalance);
        self.len -= 1;
        Ok(removed)
    }

    /// Builds a new map holding a copy of every value of `source`, keyed by `extract(value)` and
    /// ordered by `comparator`
    ///
    /// Values are visited in `source`'s order. When two values produce the same derived key, the
    /// first one is kept and the later one is skipped with a warning. `source` is not modified and
    /// the two maps share no nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use assoc::AvlMap;
    ///
    /// let mut by_id = AvlMap::new();
    /// by_id.insert(1, "pear").unwrap();
    /// by_id.insert(2, "apple").unwrap();
    ///
    /// let by_name: AvlMap<String, &str> = AvlMap::rekey_from(&by_id, |v| v.to_string(), Default::default());
    /// assert_eq!(by_name.values().copied().collect::<Vec<_>>(), vec!["apple", "pear"]);
    /// ```
    pub fn rekey_from<K1, C1, B1, F>(source: &OrderedMap<K1, V, C1, B1>, mut extract: F, comparator: C) -> Self
        where F: FnMut(&V) -> K,
              V: Clone,
    {
        let mut map = Self::with_comparator(comparator);
        let mut skipped = 0usize;
        for value in source.values() {
            if let Err(err) = map.insert(extract(value), value.clone()) {
                skipped += 1;
                tracing::warn!(%err, position = map.len() + skipped, "skipping value with a duplicate derived key");
            }
        }

        if skipped > 0 {
            tracing::warn!(copied = map.len(), skipped, "re-keyed copy is missing values");
        }

        map
    }
}

/// Hangs `subtree` back under the last node of `path`, then each node under the one before it,
/// passing every node to `fix` innermost first
///
/// Each entry of `path` is a node detached on the way down together with the side (`Less` for
/// left, `Greater` for right) that the walk continued on.
fn reattach<K, V, F>(mut path: Vec<(Box<Node<K, V>>, Ordering)>, mut subtree: Option<Box<Node<K, V>>>, mut fix: F) -> Option<Box<Node<K, V>>>
    where F: FnMut(Box<Node<K, V>>) -> Box<Node<K, V>>,
{
    while let Some((mut node, side)) = path.pop() {
        match side {
            Ordering::Less => node.left = subtree,
            _ => node.right = subtree,
        }
        subtree = Some(fix(node));
    }

    subtree
}

/// Detaches the rightmost node of the subtree rooted at `node`, returning the remaining subtree
/// and the detached entry
fn remove_max<K, V, B: Balance>(mut node: Box<Node<K, V>>) -> (Option<Box<Node<K, V>>>, (K, V)) {
    let mut path = Vec::new();
    while let Some(right) = node.right.take() {
        path.push((node, Ordering::Greater));
        node = right;
    }

    let left = node.left.take();
    (reattach(path, left, B::rebalance), node.into_inner())
}

/// Copies a tree node by node, keeping its exact shape
fn clone_tree<K: Clone, V: Clone>(root: Option<&Node<K, V>>) -> Option<Box<Node<K, V>>> {
    enum Step<'a, K, V> {
        Visit(Option<&'a Node<K, V>>),
        Build(&'a Node<K, V>),
    }

    let mut steps = vec![Step::Visit(root)];
    // Finished subtrees, left before right
    let mut built: Vec<Option<Box<Node<K, V>>>> = Vec::new();
    while let Some(step) = steps.pop() {
        match step {
            Step::Visit(None) => built.push(None),
            Step::Visit(Some(node)) => {
                steps.push(Step::Build(node));
                steps.push(Step::Visit(node.right()));
                steps.push(Step::Visit(node.left()));
            },
            Step::Build(node) => {
                let right = built.pop().flatten();
                let left = built.pop().flatten();
                built.push(Some(Box::new(Node {
                    key: node.key.clone(),
                    value: node.value.clone(),
                    left,
                    right,
                    height: node.height,
                })));
            },
        }
    }

    built.pop().flatten()
}

/// Display adapter returned by [`OrderedMap::dump`]
pub struct Dump<'a, K, V, C, B> {
    map: &'a OrderedMap<K, V, C, B>,
}

impl<'a, K: fmt::Debug, V: fmt::Debug, C, B> fmt::Display for Dump<'a, K, V, C, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.map.iter_inorder() {
            writeln!(f, "{:?} => {:?}", key, value)?;
        }
        Ok(())
    }
}

impl<'a, K, V, C, B> IntoIterator for &'a OrderedMap<K, V, C, B> {
    type Item = (&'a K, &'a V);
    type IntoIter = IterInorder<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_inorder()
    }
}
