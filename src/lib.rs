//! Associative containers with explicit ordering and hashing
//!
//! - [`OrderedMap`]: a binary search tree ordered by a [`Comparator`] fixed at construction,
//!   either plain ([`BstMap`]) or height-balanced ([`AvlMap`])
//! - [`HashMap`]: a fixed-size hash table that chains colliding entries
//! - [`ChainedList`]: the singly linked list used for the hash table's chains
//!
//! Lookups that can miss return `Option` or [`Result`] and never panic. A failed operation never
//! modifies its container.

pub mod comparator;
pub mod error;
pub mod hash_map;
pub mod list;
pub mod ordered_map;

pub use comparator::{Comparator, NaturalOrder, Reversed};
pub use error::{Error, Result};
pub use hash_map::HashMap;
pub use list::ChainedList;
pub use ordered_map::{AvlMap, BstMap, OrderedMap};

/// Builds an [`AvlMap`] from `key => value` pairs. When a key repeats, the first value is kept.
#[macro_export(local_inner_macros)]
macro_rules! avlmap {
    // trailing comma case
    ($($key:expr => $value:expr,)+) => (avlmap!($($key => $value),+));

    ( $($key:expr => $value:expr),* ) => {
        {
            let mut _map = $crate::AvlMap::new();
            $(
                let _ = _map.insert($key, $value);
            )*
            _map
        }
    };
}

/// Builds a [`ChainedList`] holding the given items in order
#[macro_export(local_inner_macros)]
macro_rules! chained_list {
    ($($item:expr,)+) => (chained_list!($($item),+));

    ( $($item:expr),* ) => {
        {
            let mut _list = $crate::ChainedList::new();
            $(
                _list.push_back($item);
            )*
            _list
        }
    };
}
