use std::fmt;

/// A key/value pair stored in a bucket
///
/// Two entries are equal when their keys are equal; values are ignored. An entry also compares
/// equal to a [`Probe`] carrying just a key, so buckets can be searched without building a
/// placeholder value.
#[derive(Clone)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {key, value}
    }

    pub(crate) fn into_value(self) -> V {
        self.value
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
}

impl<K: PartialEq, V> PartialEq for Entry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Eq, V> Eq for Entry<K, V> {}

/// A borrowed key used to look up an entry in a bucket
#[derive(Debug, Clone, Copy)]
pub struct Probe<'a, K>(pub &'a K);

impl<'a, K: PartialEq, V> PartialEq<Probe<'a, K>> for Entry<K, V> {
    fn eq(&self, probe: &Probe<'a, K>) -> bool {
        self.key == *probe.0
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} => {:?}", self.key, self.value)
    }
}
