mod entry;

pub use entry::*;

use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

use fnv::FnvBuildHasher;

use crate::error::{Error, Result};
use crate::list::ChainedList;

/// A hash table with a fixed number of buckets, resolving collisions by chaining
///
/// The bucket of a key is `hash(key) mod bucket_count`. Hashes are unsigned, so the index is
/// never negative. The bucket count is chosen once at construction and the table never grows,
/// so lookups are `O(1)` only while chains stay short; picking a bucket count close to the
/// expected number of entries is the caller's job.
///
/// The default hasher is FNV-1a, which gives the same bucket layout on every run. The hasher
/// must agree with `Eq`: equal keys must hash identically. Breaking that rule makes lookups miss
/// entries but never corrupts the table.
#[derive(Clone)]
pub struct HashMap<K, V, S = FnvBuildHasher> {
    buckets: Box<[ChainedList<Entry<K, V>>]>,
    /// Number of entries across all buckets, updated on every successful insert and remove
    len: usize,
    hash_builder: S,
}

impl<K, V> HashMap<K, V, FnvBuildHasher>
    where K: Hash + Eq,
{
    /// Creates an empty table with `bucket_count` buckets and the default hasher
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `bucket_count` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use assoc::HashMap;
    ///
    /// let map: HashMap<u32, &str> = HashMap::with_buckets(16).unwrap();
    /// assert_eq!(map.bucket_count(), 16);
    /// assert!(HashMap::<u32, &str>::with_buckets(0).is_err());
    /// ```
    pub fn with_buckets(bucket_count: usize) -> Result<Self> {
        Self::with_buckets_and_hasher(bucket_count, FnvBuildHasher::default())
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates an empty table with `bucket_count` buckets that hashes keys with `hash_builder`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `bucket_count` is zero.
    pub fn with_buckets_and_hasher(bucket_count: usize, hash_builder: S) -> Result<Self> {
        if bucket_count == 0 {
            return Err(Error::InvalidConfiguration("bucket count must be greater than zero"));
        }

        let buckets: Vec<_> = (0..bucket_count).map(|_| ChainedList::new()).collect();
        Ok(Self {
            buckets: buckets.into_boxed_slice(),
            len: 0,
            hash_builder,
        })
    }

    /// Returns the number of entries in the table
    ///
    /// Time complexity: `O(1)`
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the fixed number of buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the chain stored in bucket `index`, or `None` if the index is out of range
    pub fn bucket(&self, index: usize) -> Option<&ChainedList<Entry<K, V>>> {
        self.buckets.get(index)
    }

    /// Iterates over every entry, bucket by bucket in ascending index order, and in insertion
    /// order within a bucket
    pub fn iter(&self) -> impl Iterator<Item=(&K, &V)> + '_ {
        self.buckets.iter()
            .flat_map(ChainedList::iter)
            .map(|entry| (entry.key(), entry.value()))
    }

    /// Removes every entry, keeping the bucket count
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Returns a per-bucket listing of the table
    ///
    /// Each bucket gets one line, in ascending index order: `[i] empty` for an empty bucket, or
    /// its entries in insertion order.
    ///
    /// # Examples
    ///
    /// ```
    /// use assoc::HashMap;
    ///
    /// let mut map = HashMap::with_buckets(1).unwrap();
    /// map.insert("b", 2).unwrap();
    /// map.insert("a", 1).unwrap();
    /// assert_eq!(map.dump().to_string(), "[0] \"b\" => 2, \"a\" => 1\n");
    /// ```
    pub fn dump(&self) -> Dump<'_, K, V> {
        Dump {buckets: &self.buckets}
    }
}

impl<K, V, S> HashMap<K, V, S>
    where K: Hash + Eq,
          S: BuildHasher,
{
    /// Computes the bucket a key belongs to
    pub fn bucket_index(&self, key: &K) -> usize {
        let mut hasher = self.hash_builder.build_hasher();
        key.hash(&mut hasher);
        // The modulus is taken on the unsigned hash, so the result is always in range
        (hasher.finish() % self.buckets.len() as u64) as usize
    }

    /// Inserts a new entry at the end of its bucket's chain and returns the bucket index used
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if an entry with an equal key is already stored. The table
    /// is left untouched in that case.
    pub fn insert(&mut self, key: K, value: V) -> Result<usize> {
        let index = self.bucket_index(&key);
        let bucket = &mut self.buckets[index];
        if bucket.contains(&Probe(&key)) {
            return Err(Error::DuplicateKey);
        }

        bucket.push_back(Entry::new(key, value));
        self.len += 1;
        Ok(index)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns a reference to the value stored under `key`, or `None` if there is none
    pub fn get(&self, key: &K) -> Option<&V> {
        let index = self.bucket_index(key);
        self.buckets[index].find(&Probe(key)).map(Entry::value)
    }

    /// Returns a mutable reference to the value stored under `key`, or `None` if there is none
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.bucket_index(key);
        self.buckets[index].find_mut(&Probe(key)).map(Entry::value_mut)
    }

    /// Returns the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no entry has the given key.
    pub fn search(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(Error::NotFound)
    }

    /// Splices the entry with the given key out of its bucket and returns its value
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no entry has the given key.
    pub fn remove(&mut self, key: &K) -> Result<V> {
        let index = self.bucket_index(key);
        let entry = self.buckets[index].remove(&Probe(key)).ok_or(Error::NotFound)?;
        self.len -= 1;
        Ok(entry.into_value())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Display adapter returned by [`HashMap::dump`]
pub struct Dump<'a, K, V> {
    buckets: &'a [ChainedList<Entry<K, V>>],
}

impl<'a, K: fmt::Debug, V: fmt::Debug> fmt::Display for Dump<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, bucket) in self.buckets.iter().enumerate() {
            write!(f, "[{}]", index)?;
            if bucket.is_empty() {
                writeln!(f, " empty")?;
                continue;
            }

            for (position, entry) in bucket.iter().enumerate() {
                let separator = if position == 0 { " " } else { ", " };
                write!(f, "{}{:?}", separator, entry)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
