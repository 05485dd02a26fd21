use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::DefaultHashBuilder;
use crate::error::Error;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

/// A hash map implemented using the bounded robin-hood `HashTable` as the
/// underlying storage.
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash keys. Each pair lives in
/// its own heap allocation owned by exactly one slot.
///
/// Inserting a key that is already present keeps the stored value: the first
/// insertion wins. Use [`entry`](Self::entry) or [`get_mut`](Self::get_mut) to
/// overwrite.
///
/// # Performance Characteristics
///
/// - **Lookups**: scan at most [`block_size`](Self::block_size) slots.
/// - **Memory**: one pointer and one `usize` per slot, plus a heap allocation
///   of `(K, V)` per entry. Right after a rebuild at most one slot in five is
///   occupied.
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: HashTable<(K, V)>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(self.table.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

/// Copies the map by re-inserting every pair into a fresh map that shares the
/// source's hasher builder. The copy owns its pairs and its slot layout is
/// rebuilt from scratch rather than copied.
impl<K, V, S> Clone for HashMap<K, V, S>
where
    K: Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        let mut map = Self::with_hasher(self.hash_builder.clone());
        map.extend(self.iter().map(|(k, v)| (k.clone(), v.clone())));
        map
    }

    fn clone_from(&mut self, source: &Self) {
        let pairs: Vec<(K, V)> = source
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.hash_builder = source.hash_builder.clone();
        self.clear();
        self.extend(pairs);
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter()
            .all(|(k, v)| other.get(k).is_some_and(|o| v == o))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> HashMap<K, V, S> {
    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_block::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// # }
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots in the backing array.
    ///
    /// The map only grows when an insertion cannot be placed within
    /// [`block_size`](Self::block_size) slots of its ideal bucket.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the current probe bound of the underlying table.
    pub fn block_size(&self) -> usize {
        self.table.block_size()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes all elements and resets the map to a single slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_block::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 1);
    /// # }
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over the key-value pairs of the map.
    ///
    /// Pairs are yielded in slot order. The order is stable while the map is
    /// not modified and may change after any insertion or removal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_block::HashMap;
    ///
    /// let map = HashMap::from([(1, "a"), (2, "b")]);
    /// for (key, value) in map.iter() {
    ///     println!("Key: {}, Value: {}", key, value);
    /// }
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the pairs of the map with mutable references
    /// to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values of the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_block::HashMap;
    ///
    /// let mut map = HashMap::from([("a", 1), ("b", 2)]);
    /// for value in map.values_mut() {
    ///     *value *= 10;
    /// }
    /// assert_eq!(map.get(&"b"), Some(&20));
    /// # }
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Returns an iterator that removes and yields all key-value pairs from the
    /// map.
    ///
    /// After calling `drain()`, the map will be empty.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Counts the entries at each displacement from their ideal bucket.
    ///
    /// Compiled with the `stats` feature or under `cfg(test)`.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> crate::hash_table::ProbeHistogram {
        self.table.probe_histogram()
    }

    /// Returns utilization statistics of the underlying table.
    ///
    /// Compiled with the `stats` feature or under `cfg(test)`.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new hash map with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use robin_block::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 1);
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates a new hash map able to hold `capacity` elements without
    /// exceeding the load bound a rebuild would establish.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use robin_block::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_capacity_and_hasher(100, SimpleHasher);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Inserts a key-value pair if the key is not already present.
    ///
    /// Returns `true` if the pair was inserted. If the key was present the map
    /// is left untouched, the existing value is kept and `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_block::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert!(map.insert(37, "a"));
    /// assert!(!map.insert(37, "b"));
    /// assert_eq!(map.get(&37), Some(&"a"));
    /// # }
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let hash = self.hash_builder.hash_one(&key);
        let hash_builder = &self.hash_builder;
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(_) => false,
            TableEntry::Vacant(entry) => {
                entry.insert((key, value), |(k, _)| hash_builder.hash_one(k));
                true
            }
        }
    }

    /// Returns the stored key and value for `key`, or `None` if absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_block::HashMap;
    ///
    /// let map = HashMap::from([(1, "a")]);
    /// assert_eq!(map.find(&1), Some((&1, &"a")));
    /// assert_eq!(map.find(&2), None);
    /// # }
    /// ```
    pub fn find(&self, key: &K) -> Option<(&K, &V)> {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find(hash, |(k, _)| k == key)
            .map(|(k, v)| (k, v))
    }

    /// Returns the stored key and a mutable reference to the value for `key`.
    pub fn find_mut(&mut self, key: &K) -> Option<(&K, &mut V)> {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find_mut(hash, |(k, _)| k == key)
            .map(|(k, v)| (&*k, v))
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_block::HashMap;
    ///
    /// let mut map = HashMap::from([(1, "a")]);
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map.get(&1), Some(&"b"));
    /// # }
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.find_mut(key).map(|(_, v)| v)
    }

    /// Returns the stored key-value pair corresponding to the key.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.find(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns a reference to the value for `key`, or
    /// [`Error::KeyNotFound`] if the key is absent. Never inserts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_block::Error;
    /// use robin_block::HashMap;
    ///
    /// let map = HashMap::from([(1, "a")]);
    /// assert_eq!(map.at(&1), Ok(&"a"));
    /// assert_eq!(map.at(&2), Err(Error::KeyNotFound));
    /// assert_eq!(map.len(), 1);
    /// # }
    /// ```
    pub fn at(&self, key: &K) -> Result<&V, Error> {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns a mutable reference to the value for `key`, or
    /// [`Error::KeyNotFound`] if the key is absent. Never inserts.
    pub fn at_mut(&mut self, key: &K) -> Result<&mut V, Error> {
        self.get_mut(key).ok_or(Error::KeyNotFound)
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_block::HashMap;
    ///
    /// let mut counts: HashMap<&str, u32> = HashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.get_or_insert_default(word) += 1;
    /// }
    /// assert_eq!(counts.get(&"a"), Some(&2));
    /// assert_eq!(counts.get(&"b"), Some(&1));
    /// # }
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map. Removing an absent key does nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_block::HashMap;
    ///
    /// let mut map = HashMap::from([(1, "a")]);
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// # }
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| k == key)
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_block::HashMap;
    ///
    /// let mut map = HashMap::new();
    ///
    /// map.entry(1).or_insert("a");
    /// map.entry(2).or_insert("b");
    /// *map.entry(1).or_insert("c") = "d";
    ///
    /// assert_eq!(map.get(&1), Some(&"d"));
    /// assert_eq!(map.get(&2), Some(&"b"));
    /// # }
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, S> {
        let hash = self.hash_builder.hash_one(&key);
        let hash_builder = &self.hash_builder;
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry {
                entry,
                key,
                hash_builder,
            }),
        }
    }

    /// Panics unless every entry sits exactly at its recorded displacement
    /// from its ideal bucket.
    #[cfg(test)]
    pub(crate) fn assert_displacements(&self) {
        self.table
            .assert_displacements(|(k, _)| self.hash_builder.hash_one(k));
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V> HashMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Creates a new hash map using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_block::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a new hash map with the specified capacity using the default
    /// hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_block::HashMap;
    ///
    /// let mut map = HashMap::with_capacity(100);
    /// map.insert("key", 1);
    /// assert!(map.capacity() >= 500);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> Index<&K> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// Returns a reference to the value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found"),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts every pair. Keys already present, including keys repeated
    /// within `iter`, keep their first value.
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V, const N: usize> From<[(K, V); N]> for HashMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Builds a map from a list of pairs. Repeated keys keep their first value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_block::HashMap;
    ///
    /// let map = HashMap::from([(1, "a"), (2, "b"), (1, "c")]);
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map[&1], "a");
    /// # }
    /// ```
    fn from(pairs: [(K, V); N]) -> Self {
        let mut map = Self::with_capacity(N);
        map.extend(pairs);
        map
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashMap<K, V, S> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V, S> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, S>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V, S> Entry<'a, K, V, S>
where
    K: Hash,
    S: BuildHasher,
{
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, S> Entry<'a, K, V, S>
where
    K: Hash,
    V: Default,
    S: BuildHasher,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V, S> {
    entry: crate::hash_table::VacantEntry<'a, (K, V)>,
    key: K,
    hash_builder: &'a S,
}

impl<'a, K, V, S> VacantEntry<'a, K, V, S>
where
    K: Hash,
    S: BuildHasher,
{
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let hash_builder = self.hash_builder;
        &mut self
            .entry
            .insert((self.key, value), |(k, _)| hash_builder.hash_one(k))
            .1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Replaces the value in the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// An iterator over the key-value pairs of a `HashMap`, in slot order.
///
/// Can be walked from either end.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the key-value pairs of a `HashMap`.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (&*k, v))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// An owning iterator over the key-value pairs of a `HashMap`.
pub struct IntoIter<K, V> {
    inner: crate::hash_table::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Drain<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}
impl<K, V> FusedIterator for Drain<'_, K, V> {}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::collections::BTreeMap;
    use alloc::collections::BTreeSet;
    use alloc::vec;
    use core::hash::BuildHasher;
    use core::hash::BuildHasherDefault;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::hash_table::DEFAULT_BLOCK_SIZE;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Sends every key to the same ideal bucket.
    #[derive(Default)]
    struct ConstantHasher;

    impl Hasher for ConstantHasher {
        fn finish(&self) -> u64 {
            0
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    type ConstantHashBuilder = BuildHasherDefault<ConstantHasher>;

    #[test]
    fn test_new_and_with_hasher() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.capacity(), 1);
        assert_eq!(map.block_size(), DEFAULT_BLOCK_SIZE);

        let map2 = HashMap::<i32, String, _>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
        assert_eq!(map2.len(), 0);
    }

    #[test]
    fn test_with_capacity() {
        let map: HashMap<i32, String, _> =
            HashMap::with_capacity_and_hasher(100, SipHashBuilder::default());
        assert!(map.capacity() >= 100);
        assert!(map.is_empty());

        let map2 =
            HashMap::<i32, String, _>::with_capacity_and_hasher(200, SipHashBuilder::default());
        assert!(map2.capacity() >= 200);
        assert!(map2.is_empty());
    }

    #[test]
    #[cfg(any(feature = "std", feature = "foldhash"))]
    fn test_default_hasher_constructors() {
        let mut map = HashMap::new();
        map.insert(1u8, 'a');
        assert_eq!(map.get(&1), Some(&'a'));

        let mut sized = HashMap::with_capacity(10);
        sized.insert("k", 0);
        assert!(sized.capacity() >= 50);

        let literal = HashMap::from([(1, "a"), (2, "b"), (1, "c")]);
        assert_eq!(literal.len(), 2);
        assert_eq!(literal[&1], "a");
        literal.assert_displacements();
    }

    #[test]
    fn test_hasher_is_shared() {
        let builder = SipHashBuilder::default();
        let map: HashMap<i32, i32, _> = HashMap::with_hasher(builder.clone());
        assert_eq!(map.hasher().hash_one(7), builder.hash_one(7));
    }

    #[test]
    fn test_insert_keeps_first_value() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        assert!(map.insert(1, "hello".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());

        assert_eq!(map.get(&1), Some(&"hello".to_string()));
        assert_eq!(map.get(&2), None);

        assert!(!map.insert(1, "world".to_string()));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"hello".to_string()));
    }

    #[test]
    fn test_basic_scenario() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "a");
        map.insert(2, "b");
        map.insert(1, "c");
        assert_eq!(map.len(), 2);
        assert_eq!(map.find(&1), Some((&1, &"a")));
        assert_eq!(map.find(&2), Some((&2, &"b")));

        map.remove(&2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.find(&2), None);

        map.clear();
        assert_eq!(map.len(), 0);
        assert_eq!(map.iter().next(), None);
    }

    #[test]
    fn test_get_mut() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        if let Some(value) = map.get_mut(&1) {
            value.push_str(" world");
        }

        assert_eq!(map.get(&1), Some(&"hello world".to_string()));
        assert_eq!(map.get_mut(&2), None);

        if let Some((key, value)) = map.find_mut(&1) {
            assert_eq!(*key, 1);
            value.push('!');
        }
        assert_eq!(map.get_key_value(&1), Some((&1, &"hello world!".to_string())));
    }

    #[test]
    fn test_at() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, 10);

        assert_eq!(map.at(&1), Ok(&10));
        assert_eq!(map.at(&2), Err(Error::KeyNotFound));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&2));

        *map.at_mut(&1).unwrap() += 1;
        assert_eq!(map.at(&1), Ok(&11));
        assert_eq!(map.at_mut(&3), Err(Error::KeyNotFound));
        assert_eq!(format!("{}", Error::KeyNotFound), "key not found");
    }

    #[test]
    fn test_get_or_insert_default() {
        let mut map: HashMap<i32, Vec<i32>, _> = HashMap::with_hasher(SipHashBuilder::default());

        assert!(map.get_or_insert_default(1).is_empty());
        assert_eq!(map.len(), 1);

        map.get_or_insert_default(1).push(42);
        map.get_or_insert_default(1).push(24);
        assert_eq!(map.get(&1), Some(&vec![42, 24]));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_index() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert("a", 1);
        assert_eq!(map[&"a"], 1);
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn test_index_missing_key_panics() {
        let map: HashMap<&str, i32, _> = HashMap::with_hasher(SipHashBuilder::default());
        let _value = map[&"missing"];
    }

    #[test]
    fn test_remove() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());

        assert_eq!(map.remove(&1), Some("hello".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));

        assert_eq!(map.remove(&1), None);
        assert_eq!(map.remove(&3), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        assert_eq!(map.remove_entry(&1), Some((1, "hello".to_string())));
        assert_eq!(map.len(), 0);
        assert_eq!(map.remove_entry(&1), None);
    }

    #[test]
    fn test_clear() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..100 {
            map.insert(i, i.to_string());
        }
        assert!(map.capacity() > 1);

        map.clear();
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert_eq!(map.capacity(), 1);
        assert_eq!(map.block_size(), DEFAULT_BLOCK_SIZE);
        assert!(!map.contains_key(&1));
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn test_entry_api() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        let value = map.entry(1).or_insert("hello".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        let value = map.entry(1).or_insert("world".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        map.entry(2).or_insert_with(|| "computed".to_string());
        assert_eq!(map.get(&2), Some(&"computed".to_string()));

        map.entry(1)
            .and_modify(|v| v.push_str(" world"))
            .or_insert("default".to_string());
        assert_eq!(map.get(&1), Some(&"hello world".to_string()));

        assert_eq!(map.entry(3).key(), &3);
        assert!(!map.contains_key(&3));
    }

    #[test]
    fn test_occupied_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        match map.entry(1) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(entry.get(), &"hello".to_string());

                *entry.get_mut() = "world".to_string();
                assert_eq!(entry.get(), &"world".to_string());

                let old_value = entry.insert("new".to_string());
                assert_eq!(old_value, "world".to_string());
                assert_eq!(entry.get(), &"new".to_string());

                let (key, value) = entry.remove_entry();
                assert_eq!(key, 1);
                assert_eq!(value, "new".to_string());
            }
            Entry::Vacant(_) => panic!("Expected occupied entry"),
        }

        assert!(map.is_empty());
    }

    #[test]
    fn test_vacant_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        match map.entry(1) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &1);

                let value = entry.insert("hello".to_string());
                assert_eq!(value, &"hello".to_string());
            }
            Entry::Occupied(_) => panic!("Expected vacant entry"),
        }

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"hello".to_string()));

        match map.entry(2) {
            Entry::Vacant(entry) => assert_eq!(entry.into_key(), 2),
            Entry::Occupied(_) => panic!("Expected vacant entry"),
        }
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_vacant_entry_survives_rebuild() {
        let mut map = HashMap::with_hasher(ConstantHashBuilder::default());
        for i in 0..300u32 {
            let value = map.entry(i).or_insert(0);
            *value = i + 1;
        }
        for i in 0..300u32 {
            assert_eq!(map.get(&i), Some(&(i + 1)));
        }
        map.assert_displacements();
    }

    #[test]
    fn test_iterators() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for (k, v) in [(1, "one"), (2, "two"), (3, "three")] {
            map.insert(k, v.to_string());
        }

        let pairs: BTreeMap<i32, &str> = map.iter().map(|(k, v)| (*k, v.as_str())).collect();
        assert_eq!(pairs, BTreeMap::from([(1, "one"), (2, "two"), (3, "three")]));

        let keys: BTreeSet<i32> = map.keys().copied().collect();
        assert_eq!(keys, BTreeSet::from([1, 2, 3]));
        assert_eq!(map.values().map(String::len).sum::<usize>(), 11);

        for (_, v) in map.iter_mut() {
            v.make_ascii_uppercase();
        }
        for v in map.values_mut() {
            v.push('!');
        }
        assert_eq!(map.get(&3), Some(&"THREE!".to_string()));

        for (k, v) in &mut map {
            if *k == 1 {
                v.clear();
            }
        }
        assert_eq!(map[&1], "");
        assert_eq!((&map).into_iter().count(), 3);
    }

    #[test]
    fn test_drain_resets_map() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..300 {
            map.insert(i, i * 7);
        }
        assert!(map.capacity() > 1);

        let drained: BTreeMap<i32, i32> = map.drain().collect();
        assert_eq!(drained.len(), 300);
        assert_eq!(drained.get(&299), Some(&(299 * 7)));
        assert!(map.is_empty());
        assert_eq!(map.capacity(), 1);

        assert!(map.insert(4, 4));
        assert_eq!(map.len(), 1);
        map.assert_displacements();
    }

    #[test]
    fn test_iteration_order_is_stable_and_reversible() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..200 {
            map.insert(i, i);
        }

        let forward: Vec<i32> = map.keys().copied().collect();
        let again: Vec<i32> = map.keys().copied().collect();
        assert_eq!(forward, again);

        let mut backward: Vec<i32> = map.iter().rev().map(|(k, _)| *k).collect();
        backward.reverse();
        assert_eq!(forward, backward);

        let mut sorted = forward.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..200).collect::<Vec<_>>());
        assert_eq!(map.iter().len(), 200);
    }

    #[test]
    fn test_views_walk_both_ends() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..100 {
            map.insert(i, i * 2);
        }
        let order: Vec<i32> = map.keys().copied().collect();

        let mut keys: Vec<i32> = map.keys().rev().copied().collect();
        keys.reverse();
        assert_eq!(keys, order);
        assert_eq!(map.keys().len(), 100);

        let mut values: Vec<i32> = map.values().rev().copied().collect();
        values.reverse();
        assert_eq!(values, order.iter().map(|k| k * 2).collect::<Vec<_>>());
        assert_eq!(map.values().len(), 100);

        if let Some(last) = map.values_mut().next_back() {
            *last = -1;
        }
        assert_eq!(map.get(order.last().unwrap()), Some(&-1));
        assert_eq!(map.values_mut().len(), 100);

        let mut owned: Vec<i32> = map.clone().into_iter().rev().map(|(k, _)| k).collect();
        owned.reverse();
        assert_eq!(owned.len(), 100);

        let mut drain = map.drain();
        assert_eq!(drain.len(), 100);
        assert!(drain.next_back().is_some());
        assert_eq!(drain.len(), 99);
        drop(drain);
        assert!(map.is_empty());
    }

    #[test]
    fn test_into_iter() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            map.insert(i, i * i);
        }

        let mut pairs: Vec<(i32, i32)> = map.into_iter().collect();
        pairs.sort_unstable();
        assert_eq!(pairs, (0..10).map(|i| (i, i * i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_collision_handling() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        for i in 0..1000 {
            map.insert(i, i * 2);
        }

        assert_eq!(map.len(), 1000);

        for i in 0..1000 {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }

        for i in (0..1000).step_by(2) {
            assert_eq!(map.remove(&i), Some(i * 2));
        }

        assert_eq!(map.len(), 500);

        for i in (1..1000).step_by(2) {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }
        for i in (0..1000).step_by(2) {
            assert_eq!(map.get(&i), None);
        }
        map.assert_displacements();
    }

    #[test]
    fn test_constant_hash_forces_rebuilds() {
        let mut map = HashMap::with_hasher(ConstantHashBuilder::default());
        for i in 0..500u32 {
            assert!(map.insert(i, i));
            map.assert_displacements();
        }

        assert_eq!(map.len(), 500);
        assert!(map.block_size() >= 500);
        assert!(map.debug_stats().rebuilds > 0);
        for i in 0..500u32 {
            assert_eq!(map.get(&i), Some(&i));
        }

        for i in (0..500u32).filter(|i| i % 3 == 0) {
            map.remove(&i);
        }
        for i in 0..500u32 {
            assert_eq!(map.contains_key(&i), i % 3 != 0);
        }
        map.assert_displacements();
    }

    #[test]
    fn test_remove_never_shrinks() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..1000 {
            map.insert(i, ());
        }
        let capacity = map.capacity();
        let block_size = map.block_size();

        for i in 0..1000 {
            map.remove(&i);
        }
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
        assert_eq!(map.block_size(), block_size);
    }

    #[test]
    fn test_from_array_and_iter() {
        let map: HashMap<i32, &str, SipHashBuilder> =
            [(1, "a"), (2, "b"), (1, "c")].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&1], "a");

        let collected: HashMap<i32, i32, SipHashBuilder> = (0..50).map(|i| (i, -i)).collect();
        assert_eq!(collected.len(), 50);
        assert_eq!(collected.get(&49), Some(&-49));

        let mut extended = collected;
        extended.extend([(49, 0), (50, -50)]);
        assert_eq!(extended.get(&49), Some(&-49));
        assert_eq!(extended.get(&50), Some(&-50));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..100 {
            map.insert(i, vec![i]);
        }

        let cloned = map.clone();
        assert_eq!(cloned, map);
        cloned.assert_displacements();

        map.get_mut(&1).unwrap().push(100);
        map.remove(&2);
        map.insert(1000, vec![]);

        assert_eq!(cloned.len(), 100);
        assert_eq!(cloned.get(&1), Some(&vec![1]));
        assert_eq!(cloned.get(&2), Some(&vec![2]));
        assert!(!cloned.contains_key(&1000));
        assert_ne!(cloned, map);
    }

    #[test]
    fn test_clone_from_replaces_contents() {
        let source: HashMap<i32, i32, _> = {
            let mut map = HashMap::with_hasher(SipHashBuilder::default());
            for i in 0..20 {
                map.insert(i, i);
            }
            map
        };

        let mut target = HashMap::with_hasher(SipHashBuilder::default());
        for i in 100..300 {
            target.insert(i, 0);
        }
        target.clone_from(&source);

        assert_eq!(target, source);
        assert!(!target.contains_key(&100));
        assert_eq!(target.hasher().hash_one(5), source.hasher().hash_one(5));
        target.assert_displacements();
    }

    #[test]
    fn test_clone_normalizes_layout() {
        let mut map = HashMap::with_hasher(ConstantHashBuilder::default());
        for i in 0..200u32 {
            map.insert(i, i);
        }
        for i in 0..190u32 {
            map.remove(&i);
        }

        // The clone is rebuilt from its ten surviving pairs.
        let cloned = map.clone();
        assert_eq!(cloned, map);
        assert!(cloned.capacity() < map.capacity());
        cloned.assert_displacements();
    }

    #[test]
    fn test_debug_output() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "a");
        assert_eq!(format!("{map:?}"), r#"{1: "a"}"#);
    }

    #[test]
    fn test_stats() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..1000 {
            map.insert(i, i);
        }

        let histogram = map.probe_histogram();
        assert_eq!(histogram.populated, 1000);
        assert_eq!(histogram.counts.iter().sum::<usize>(), 1000);

        let stats = map.debug_stats();
        assert_eq!(stats.populated, 1000);
        assert_eq!(stats.capacity, map.capacity());
        assert!(stats.load_factor <= 1.0);
    }
}
