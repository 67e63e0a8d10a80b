use super::Node;

/// Strategy invoked on every node along the path of an insertion or removal,
/// innermost node first
///
/// Implementations receive a subtree whose children already satisfy the
/// strategy's invariants and return the (possibly new) root of that subtree
/// with an exact cached height.
pub trait Balance {
    fn rebalance<K, V>(node: Box<Node<K, V>>) -> Box<Node<K, V>>;
}

/// Plain binary search tree: heights are tracked but no rotations happen
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unbalanced;

impl Balance for Unbalanced {
    #[inline]
    fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        node.update_height();
        node
    }
}

/// AVL tree: keeps `|height(left) - height(right)| <= 1` at every node
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeightBalanced;

impl Balance for HeightBalanced {
    fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        match node.balance_factor() {
            2 => {
                // Right-left case: straighten the right subtree first
                if node.right().map_or(0, Node::balance_factor) < 0 {
                    node.right = node.right.take().map(rotate_right);
                }
                rotate_left(node)
            },

            -2 => {
                // Left-right case
                if node.left().map_or(0, Node::balance_factor) > 0 {
                    node.left = node.left.take().map(rotate_left);
                }
                rotate_right(node)
            },

            _ => {
                node.update_height();
                node
            },
        }
    }
}

/// Rotates `root` to the right, lifting its left child into its place
///
/// ```text
///       root          left
///      /    \        /    \
///    left    c  =>  a     root
///   /    \               /    \
///  a      b             b      c
/// ```
fn rotate_right<K, V>(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let mut left = match root.left.take() {
        Some(left) => left,
        None => {
            root.update_height();
            return root;
        },
    };

    root.left = left.right.take();
    root.update_height();
    left.right = Some(root);
    left.update_height();

    left
}

/// Rotates `root` to the left, lifting its right child into its place
fn rotate_left<K, V>(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let mut right = match root.right.take() {
        Some(right) => right,
        None => {
            root.update_height();
            return root;
        },
    };

    root.right = right.left.take();
    root.update_height();
    right.left = Some(root);
    right.update_height();

    right
}
