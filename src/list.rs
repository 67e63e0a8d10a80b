//! A singly linked list with a tail pointer
//!
//! Appending is `O(1)`. Everything else walks from the head and is `O(n)`.

use std::fmt;
use std::iter::{FromIterator, FusedIterator, Sum};
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::error::{Error, Result};

struct Cell<T> {
    item: T,
    next: Option<NonNull<Cell<T>>>,
}

impl<T> Cell<T> {
    /// Allocates a new cell on the heap. The returned pointer owns the allocation and must
    /// eventually be passed to `Cell::free`.
    fn alloc(item: T, next: Option<NonNull<Cell<T>>>) -> NonNull<Cell<T>> {
        NonNull::from(Box::leak(Box::new(Cell {item, next})))
    }

    /// Releases a cell allocated by `Cell::alloc`
    ///
    /// # Safety
    ///
    /// `ptr` must come from `Cell::alloc`, must not have been freed already and must not be
    /// reachable from any list afterwards.
    unsafe fn free(ptr: NonNull<Cell<T>>) -> Cell<T> {
        *Box::from_raw(ptr.as_ptr())
    }
}

/// A singly linked list that exclusively owns its cells
///
/// Removing an item releases its cell immediately.
pub struct ChainedList<T> {
    head: Option<NonNull<Cell<T>>>,
    /// The last cell of the chain, `None` exactly when `head` is `None`
    tail: Option<NonNull<Cell<T>>>,
    len: usize,
    // Tells the drop checker that we own values of type `T` through the cells
    marker: PhantomData<Box<Cell<T>>>,
}

// Safety: the list owns its cells uniquely, exactly like a `Box<T>` chain would, so sending or
// sharing the list is as safe as sending or sharing the items themselves.
unsafe impl<T: Send> Send for ChainedList<T> {}
unsafe impl<T: Sync> Sync for ChainedList<T> {}

impl<T> Default for ChainedList<T> {
    fn default() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            marker: PhantomData,
        }
    }
}

impl<T> Drop for ChainedList<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> ChainedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of items in the list
    ///
    /// Time complexity: `O(1)`
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list contains no items
    pub fn is_empty(&self) -> bool {
        debug_assert!(self.len != 0 || (self.head.is_none() && self.tail.is_none()));
        self.len == 0
    }

    /// Appends an item to the end of the list
    ///
    /// Time complexity: `O(1)`
    pub fn push_back(&mut self, item: T) {
        let cell = Cell::alloc(item, None);
        match self.tail {
            // Safety: `tail` always points to the live last cell of this list
            Some(tail) => unsafe { (*tail.as_ptr()).next = Some(cell) },
            None => self.head = Some(cell),
        }
        self.tail = Some(cell);
        self.len += 1;
    }

    /// Prepends an item to the front of the list
    ///
    /// Time complexity: `O(1)`
    pub fn push_front(&mut self, item: T) {
        let cell = Cell::alloc(item, self.head);
        if self.tail.is_none() {
            self.tail = Some(cell);
        }
        self.head = Some(cell);
        self.len += 1;
    }

    /// Inserts an item so that it ends up at position `index`, shifting later items back
    ///
    /// `index == len()` appends in `O(1)`. Other positions walk the list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index > len()`. The list is not modified.
    ///
    /// # Examples
    ///
    /// ```
    /// use assoc::ChainedList;
    ///
    /// let mut list: ChainedList<_> = vec!['a', 'c'].into_iter().collect();
    /// list.insert(1, 'b').unwrap();
    /// list.insert(3, 'd').unwrap();
    /// assert!(list.insert(9, 'z').is_err());
    /// assert_eq!(list.iter().collect::<String>(), "abcd");
    /// ```
    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        if index > self.len {
            return Err(Error::OutOfBounds {index, len: self.len});
        }

        if index == 0 {
            self.push_front(item);
        } else if index == self.len {
            self.push_back(item);
        } else {
            // 0 < index < len, so the cell before the insertion point exists and is not the tail
            let mut prev = match self.head {
                Some(head) => head,
                None => return Err(Error::OutOfBounds {index, len: self.len}),
            };
            // Safety: walking at most `index - 1 < len` links from the head stays on live cells
            unsafe {
                for _ in 1..index {
                    match (*prev.as_ptr()).next {
                        Some(next) => prev = next,
                        None => break,
                    }
                }
                let cell = Cell::alloc(item, (*prev.as_ptr()).next);
                (*prev.as_ptr()).next = Some(cell);
            }
            self.len += 1;
        }

        Ok(())
    }

    /// Removes and returns the first item
    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        // Safety: `head` is live and is unlinked from the list before it is freed
        let cell = unsafe { Cell::free(head) };
        self.head = cell.next;
        if self.head.is_none() {
            self.tail = None;
        }
        self.len -= 1;
        Some(cell.item)
    }

    /// Removes every item, releasing all cells
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    pub fn first(&self) -> Option<&T> {
        // Safety: `head` points to a live cell owned by this list
        self.head.map(|cell| unsafe { &(*cell.as_ptr()).item })
    }

    pub fn last(&self) -> Option<&T> {
        // Safety: `tail` points to a live cell owned by this list
        self.tail.map(|cell| unsafe { &(*cell.as_ptr()).item })
    }

    /// Iterates over the items from head to tail
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head,
            remaining: self.len,
            marker: PhantomData,
        }
    }

    /// Iterates mutably over the items from head to tail
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            next: self.head,
            remaining: self.len,
            marker: PhantomData,
        }
    }

    /// Returns the first item equal to `probe`, searching from the head
    ///
    /// `probe` may be any type the items can be compared with, which lets a keyed item be found by
    /// its key alone.
    pub fn find<Q: ?Sized>(&self, probe: &Q) -> Option<&T>
        where T: PartialEq<Q>,
    {
        self.iter().find(|item| *item == probe)
    }

    /// Mutable version of [`ChainedList::find`]
    pub fn find_mut<Q: ?Sized>(&mut self, probe: &Q) -> Option<&mut T>
        where T: PartialEq<Q>,
    {
        self.iter_mut().find(|item| **item == *probe)
    }

    pub fn contains<Q: ?Sized>(&self, probe: &Q) -> bool
        where T: PartialEq<Q>,
    {
        self.find(probe).is_some()
    }

    /// Unlinks and returns the first item equal to `probe`
    ///
    /// Returns `None` and leaves the list untouched if no item matches.
    pub fn remove<Q: ?Sized>(&mut self, probe: &Q) -> Option<T>
        where T: PartialEq<Q>,
    {
        let mut prev: Option<NonNull<Cell<T>>> = None;
        let mut current = self.head;

        // Safety: every pointer visited is reached by following links from `head`, so it refers
        // to a live cell. The matching cell is unlinked before it is freed.
        unsafe {
            while let Some(cell) = current {
                if (*cell.as_ptr()).item != *probe {
                    prev = current;
                    current = (*cell.as_ptr()).next;
                    continue;
                }

                let next = (*cell.as_ptr()).next;
                match prev {
                    Some(prev) => (*prev.as_ptr()).next = next,
                    None => self.head = next,
                }
                if next.is_none() {
                    self.tail = prev;
                }
                self.len -= 1;

                return Some(Cell::free(cell).item);
            }
        }

        None
    }

    /// Folds a projection of every item into a total
    ///
    /// # Examples
    ///
    /// ```
    /// use assoc::ChainedList;
    ///
    /// let list: ChainedList<(&str, f64)> = vec![("tea", 2.5), ("jam", 4.0)].into_iter().collect();
    /// assert_eq!(list.reduce_to_total(|&(_, price)| price), 6.5);
    /// ```
    pub fn reduce_to_total<N, F>(&self, projection: F) -> N
        where F: FnMut(&T) -> N,
              N: Sum<N>,
    {
        self.iter().map(projection).sum()
    }

    /// Counts the items matching `predicate`
    pub fn count_matching<F>(&self, mut predicate: F) -> usize
        where F: FnMut(&T) -> bool,
    {
        self.iter().filter(|item| predicate(item)).count()
    }
}

impl<T: Clone> Clone for ChainedList<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for ChainedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for ChainedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for ChainedList<T> {}

impl<T> Extend<T> for ChainedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<T> FromIterator<T> for ChainedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<'a, T> IntoIterator for &'a ChainedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a, T> {
    next: Option<NonNull<Cell<T>>>,
    remaining: usize,
    marker: PhantomData<&'a T>,
}

// Safety: `Iter` only hands out shared references to items
unsafe impl<'a, T: Sync> Send for Iter<'a, T> {}
unsafe impl<'a, T: Sync> Sync for Iter<'a, T> {}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self {..*self}
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.next?;
        // Safety: the list is borrowed for `'a`, so every linked cell stays alive and unmodified
        let cell = unsafe { &*cell.as_ptr() };
        self.next = cell.next;
        self.remaining -= 1;
        Some(&cell.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

pub struct IterMut<'a, T> {
    next: Option<NonNull<Cell<T>>>,
    remaining: usize,
    marker: PhantomData<&'a mut T>,
}

// Safety: `IterMut` hands out unique references to distinct items, like `&mut T` would
unsafe impl<'a, T: Send> Send for IterMut<'a, T> {}
unsafe impl<'a, T: Sync> Sync for IterMut<'a, T> {}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.next?;
        // Safety: the list is mutably borrowed for `'a` and each cell is yielded at most once, so
        // the returned references never alias
        let cell = unsafe { &mut *cell.as_ptr() };
        self.next = cell.next;
        self.remaining -= 1;
        Some(&mut cell.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for IterMut<'a, T> {}

impl<'a, T> FusedIterator for IterMut<'a, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    use std::mem;
    use std::rc::Rc;

    use rand::prelude::*;
    use static_assertions::const_assert_eq;

    // Head, tail and length: no per-list allocation
    const_assert_eq!(mem::size_of::<ChainedList<u64>>(), 3 * mem::size_of::<usize>());
    // Links use the null niche
    const_assert_eq!(mem::size_of::<Option<NonNull<Cell<u64>>>>(), mem::size_of::<usize>());

    fn items<T: Clone>(list: &ChainedList<T>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    #[test]
    fn push_back_keeps_order() {
        let mut list = ChainedList::new();
        assert!(list.is_empty());
        assert_eq!(list.first(), None);
        assert_eq!(list.last(), None);

        for i in 0..5 {
            list.push_back(i);
            assert_eq!(list.last(), Some(&i));
        }

        assert_eq!(items(&list), vec![0, 1, 2, 3, 4]);
        assert_eq!(list.first(), Some(&0));
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn positional_insert() {
        let mut list = ChainedList::new();
        list.insert(0, 'b').unwrap();
        list.insert(0, 'a').unwrap();
        list.insert(2, 'd').unwrap();
        list.insert(2, 'c').unwrap();

        assert_eq!(items(&list), vec!['a', 'b', 'c', 'd']);
        assert_eq!(list.last(), Some(&'d'));
        assert_eq!(list.insert(5, 'z'), Err(Error::OutOfBounds {index: 5, len: 4}));
        assert_eq!(list.len(), 4);

        // Appending through `insert` must keep the tail correct
        list.insert(4, 'e').unwrap();
        list.push_back('f');
        assert_eq!(items(&list), vec!['a', 'b', 'c', 'd', 'e', 'f']);
    }

    #[test]
    fn remove_updates_head_and_tail() {
        let mut list: ChainedList<_> = (1..=4).collect();

        assert_eq!(list.remove(&4), Some(4));
        assert_eq!(list.last(), Some(&3));
        list.push_back(5);
        assert_eq!(items(&list), vec![1, 2, 3, 5]);

        assert_eq!(list.remove(&1), Some(1));
        assert_eq!(list.first(), Some(&2));

        assert_eq!(list.remove(&3), Some(3));
        assert_eq!(list.remove(&42), None);
        assert_eq!(items(&list), vec![2, 5]);

        assert_eq!(list.remove(&2), Some(2));
        assert_eq!(list.remove(&5), Some(5));
        assert!(list.is_empty());
        assert_eq!(list.last(), None);

        list.push_back(9);
        assert_eq!(items(&list), vec![9]);
    }

    #[test]
    fn remove_takes_first_match() {
        let mut list: ChainedList<_> = vec![(1, 'a'), (2, 'b'), (1, 'c')].into_iter().collect();

        #[derive(Debug)]
        struct Key(i32);
        impl PartialEq<Key> for (i32, char) {
            fn eq(&self, other: &Key) -> bool {
                self.0 == other.0
            }
        }

        assert_eq!(list.find(&Key(1)), Some(&(1, 'a')));
        assert_eq!(list.remove(&Key(1)), Some((1, 'a')));
        assert_eq!(list.find(&Key(1)), Some(&(1, 'c')));
        assert!(list.contains(&Key(2)));
        assert!(!list.contains(&Key(3)));

        if let Some(item) = list.find_mut(&Key(2)) {
            item.1 = 'z';
        }
        assert_eq!(items(&list), vec![(2, 'z'), (1, 'c')]);
    }

    #[test]
    fn totals_and_counts() {
        let list: ChainedList<_> = vec![("tea", 3), ("jam", 5), ("tea", 2)].into_iter().collect();

        assert_eq!(list.reduce_to_total(|&(_, qty)| qty), 10);
        assert_eq!(list.reduce_to_total(|&(_, qty)| qty as f64 * 0.5), 5.0);
        assert_eq!(list.count_matching(|&(name, _)| name == "tea"), 2);
        assert_eq!(list.count_matching(|_| false), 0);

        let empty: ChainedList<i32> = ChainedList::new();
        assert_eq!(empty.reduce_to_total(|&x| x), 0);
    }

    #[test]
    fn drop_releases_every_item() {
        let tracker = Rc::new(());
        {
            let mut list = ChainedList::new();
            for _ in 0..10 {
                list.push_back(Rc::clone(&tracker));
            }
            assert_eq!(Rc::strong_count(&tracker), 11);
            list.pop_front();
            assert_eq!(Rc::strong_count(&tracker), 10);
        }
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn clone_and_eq() {
        let list: ChainedList<_> = (0..10).collect();
        let copy = list.clone();
        assert_eq!(list, copy);
        assert_eq!(format!("{:?}", copy), format!("{:?}", (0..10).collect::<Vec<_>>()));

        let shorter: ChainedList<_> = (0..9).collect();
        assert_ne!(list, shorter);
    }

    #[test]
    fn test_random_operations() {
        cfg_if::cfg_if! {
            if #[cfg(miri)] {
                const TEST_CASES: usize = 8;
                const OPERATIONS: usize = 24;
            } else {
                const TEST_CASES: usize = 256;
                const OPERATIONS: usize = 128;
            }
        }

        let mut rng = rand::thread_rng();
        for _ in 0..TEST_CASES {
            let mut list = ChainedList::new();
            // Compare against a Vec
            let mut expected: Vec<u8> = Vec::new();

            for _ in 0..OPERATIONS {
                match rng.gen_range(1..=100) {
                    1..=40 => {
                        let item = rng.gen();
                        list.push_back(item);
                        expected.push(item);
                    },

                    41..=70 => {
                        let index = rng.gen_range(0..=expected.len() + 1);
                        let item = rng.gen();
                        let result = list.insert(index, item);
                        if index <= expected.len() {
                            assert_eq!(result, Ok(()));
                            expected.insert(index, item);
                        } else {
                            assert!(result.is_err());
                        }
                    },

                    71..=100 => {
                        let item: u8 = rng.gen();
                        let position = expected.iter().position(|&x| x == item);
                        let removed = position.map(|index| expected.remove(index));
                        assert_eq!(list.remove(&item), removed);
                    },

                    _ => unreachable!(),
                }

                assert_eq!(list.len(), expected.len());
                assert_eq!(list.last(), expected.last());
                assert_eq!(items(&list), expected);
            }
        }
    }
}
