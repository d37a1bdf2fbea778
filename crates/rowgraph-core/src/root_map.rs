use std::{collections::BTreeMap, fmt, ops::Index};

///
/// RootMap
///
/// Map from id to entity that keeps the order in which ids were first
/// inserted. Overwriting an existing id keeps its original position.
///

#[derive(Clone)]
pub struct RootMap<K, V> {
    entries: Vec<(K, V)>,
    index: BTreeMap<K, usize>,
}

impl<K, V> RootMap<K, V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Mutable access to every value; keys stay fixed.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn into_values(self) -> impl Iterator<Item = V> {
        self.entries.into_iter().map(|(_, v)| v)
    }
}

impl<K: Ord + Clone, V> RootMap<K, V> {
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.index.get(key).map(|&i| &mut self.entries[i].1)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or overwrite. Returns the previous value for `key`, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }

        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));

        None
    }

    /// Insert only if `key` is not present yet. Returns true if inserted.
    pub fn insert_absent(&mut self, key: K, value: V) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.insert(key, value);

        true
    }
}

impl<K, V> Default for RootMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Panics if `key` is not present, like `BTreeMap`'s `Index`.
impl<K: Ord + Clone, V> Index<&K> for RootMap<K, V> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

// Set-union semantics: an id already present keeps its existing value.
impl<K: Ord + Clone, V> Extend<(K, V)> for RootMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert_absent(k, v);
        }
    }
}

impl<K: Ord + Clone, V> FromIterator<(K, V)> for RootMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }

        map
    }
}

impl<K, V> IntoIterator for RootMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// Equality is order-sensitive.
impl<K: PartialEq, V: PartialEq> PartialEq for RootMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq, V: Eq> Eq for RootMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RootMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn overwrite_keeps_first_position() {
        let mut map = RootMap::new();
        map.insert(3, "a");
        map.insert(1, "b");
        assert_eq!(map.insert(3, "c"), Some("a"));

        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(map.get(&3), Some(&"c"));
    }

    #[test]
    fn extend_keeps_existing_values() {
        let mut map = RootMap::new();
        map.insert(10, "first");
        map.extend([(10, "second"), (11, "other")]);

        assert_eq!(map.get(&10), Some(&"first"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn index_reads_like_get() {
        let map: RootMap<i64, &str> = [(7, "seven")].into_iter().collect();

        assert_eq!(map[&7], "seven");
        assert!(std::panic::catch_unwind(|| map[&8]).is_err());
    }

    proptest! {
        #[test]
        fn keys_are_unique_in_first_seen_order(keys in proptest::collection::vec(0u8..16, 0..64)) {
            let map: RootMap<u8, ()> = keys.iter().map(|k| (*k, ())).collect();

            let mut expected = Vec::new();
            for k in &keys {
                if !expected.contains(k) {
                    expected.push(*k);
                }
            }

            prop_assert_eq!(map.keys().copied().collect::<Vec<_>>(), expected);
        }
    }
}
