//! The raw storage engine: a power-of-two array of boxed slots with a parallel
//! array of displacement counters, probed linearly from each value's ideal
//! bucket.
//!
//! Insertion follows the robin-hood rule: while walking forward, a pending
//! value takes over any slot whose occupant sits closer to its own ideal
//! bucket, and the evicted occupant continues the walk. The walk is bounded by
//! [`HashTable::block_size`]. When a value cannot be placed inside that bound
//! the table is rebuilt at a larger capacity and the probe bound is re-derived
//! from the worst bucket collision count observed.
//!
//! Like the map built on top of it, this type requires callers to provide the
//! hash value and an equality predicate for each operation. Operations that
//! may trigger a rebuild also need a way to re-hash stored values.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::mem;

/// Probe bound of a freshly created (or cleared) table.
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// A rebuilt table holds at most one value per `STANDARD_DIFF` slots.
pub const STANDARD_DIFF: usize = 5;

/// Smallest power-of-two slot count that keeps `populated` values within the
/// post-rebuild load bound.
#[inline(always)]
fn slots_for(populated: usize) -> usize {
    populated
        .checked_mul(STANDARD_DIFF)
        .and_then(usize::checked_next_power_of_two)
        .expect("capacity overflow")
        .max(1)
}

fn empty_slots<V>(count: usize) -> Vec<Option<Box<V>>> {
    let mut slots = Vec::with_capacity(count);
    slots.resize_with(count, || None);
    slots
}

/// A hash table using robin-hood linear probing inside a bounded probe window.
///
/// `HashTable<V>` stores values of type `V`, each in its own heap allocation
/// so that eviction and rebuild only move pointers. Lookups scan at most
/// [`block_size`](Self::block_size) slots starting at the value's ideal bucket.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use robin_block::hash_table::Entry;
/// # use robin_block::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::new();
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     Entry::Vacant(entry) => {
///         entry.insert(
///             Person {
///                 id: 123,
///                 name: "Alice".to_string(),
///             },
///             |p| hash_id(p.id),
///         );
///     }
///     Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
///
/// assert_eq!(table.find(hash, |p| p.id == 123).unwrap().name, "Alice");
/// ```
pub struct HashTable<V> {
    slots: Vec<Option<Box<V>>>,
    displacement: Vec<usize>,

    populated: usize,
    block_size: usize,
    rebuilds: usize,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        let displacements = self
            .slots
            .chunks(16)
            .zip(self.displacement.chunks(16))
            .map(|(slots, displacement)| {
                slots
                    .iter()
                    .zip(displacement)
                    .map(|(slot, d)| match slot {
                        Some(_) => format!("{d:02x}"),
                        None => "..".to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect::<Vec<String>>();

        f.debug_struct("HashTable")
            .field("displacements", &displacements)
            .field("populated", &self.populated)
            .field("capacity", &self.slots.len())
            .field("block_size", &self.block_size)
            .finish()
    }
}

/// Copies the slot layout as-is. Cloned values stay in the same slots with the
/// same displacements, which is only meaningful because the clone keeps being
/// addressed with the same hashes.
impl<V> Clone for HashTable<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            displacement: self.displacement.clone(),
            populated: self.populated,
            block_size: self.block_size,
            rebuilds: self.rebuilds,
        }
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table with a single slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_block::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::new();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 1);
    /// ```
    pub fn new() -> Self {
        Self::with_slots(1)
    }

    /// Creates an empty table sized so that `capacity` values fit within the
    /// load bound a rebuild would establish.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_block::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 500);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_slots(slots_for(capacity))
    }

    fn with_slots(count: usize) -> Self {
        debug_assert!(count.is_power_of_two());

        Self {
            slots: empty_slots(count),
            displacement: vec![0; count],
            populated: 0,
            block_size: DEFAULT_BLOCK_SIZE,
            rebuilds: 0,
        }
    }

    /// Returns the number of values in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no values.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots in the backing array. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the current probe bound. Every stored value sits fewer than
    /// this many slots past its ideal bucket.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Resets the table to a single empty slot and the default probe bound.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_block::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for i in 0..10u64 {
    ///     table.insert_unique(i, i, |&v| v);
    /// }
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 1);
    /// ```
    pub fn clear(&mut self) {
        self.slots = empty_slots(1);
        self.displacement = vec![0; 1];
        self.populated = 0;
        self.block_size = DEFAULT_BLOCK_SIZE;
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    #[inline(always)]
    fn ideal_bucket(&self, hash: u64) -> usize {
        hash as usize & self.mask()
    }

    #[inline(always)]
    fn next(&self, index: usize) -> usize {
        (index + 1) & self.mask()
    }

    fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        let mut index = self.ideal_bucket(hash);
        for _ in 0..self.block_size {
            if let Some(value) = &self.slots[index] {
                if eq(value) {
                    return Some(index);
                }
            }
            index = self.next(index);
        }

        None
    }

    fn occupied(&self, index: usize) -> &V {
        match &self.slots[index] {
            Some(value) => value,
            None => unreachable!("slot {index} is empty"),
        }
    }

    fn occupied_mut(&mut self, index: usize) -> &mut V {
        match &mut self.slots[index] {
            Some(value) => value,
            None => unreachable!("slot {index} is empty"),
        }
    }

    /// Finds the value matching `eq` among the values hashed to `hash`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_block::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert_unique(7, 7u64, |&v| v);
    /// assert_eq!(table.find(7, |&v| v == 7), Some(&7));
    /// assert_eq!(table.find(8, |&v| v == 8), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        self.find_index(hash, eq)
            .map(|index| self.occupied(index))
    }

    /// Finds the value matching `eq` and returns a mutable reference to it.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        self.find_index(hash, eq)
            .map(|index| self.occupied_mut(index))
    }

    /// Gets the entry for the value matching `eq` for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_block::hash_table::Entry;
    /// # use robin_block::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// match table.entry(3, |&v: &u64| v == 3) {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert(3, |&v| v);
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    /// assert!(matches!(table.entry(3, |&v| v == 3), Entry::Occupied(_)));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        match self.find_index(hash, eq) {
            Some(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            None => Entry::Vacant(VacantEntry { table: self, hash }),
        }
    }

    /// Inserts a value without checking whether an equal value is present.
    ///
    /// `hash` must equal `hasher(&value)`, and `hasher` must produce the same
    /// hashes that were used to insert every value already stored; it is used
    /// to relocate values if the insertion forces a rebuild.
    ///
    /// Returns a mutable reference to the inserted value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_block::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// *table.insert_unique(1, 10u64, |v| v / 10) += 1;
    /// assert_eq!(table.find(1, |&v| v == 11), Some(&11));
    /// ```
    pub fn insert_unique(&mut self, hash: u64, value: V, hasher: impl Fn(&V) -> u64) -> &mut V {
        debug_assert_eq!(hash, hasher(&value));

        let value = Box::new(value);
        let address: *const V = &*value;
        self.place(value, &hasher);

        // Eviction and rebuilds move the box, never its contents, so the
        // allocation address identifies where the value ended up.
        match self.find_index(hash, |v| core::ptr::eq(v, address)) {
            Some(index) => self.occupied_mut(index),
            None => unreachable!("inserted value is not reachable from its ideal bucket"),
        }
    }

    /// Removes the value matching `eq` and returns it.
    ///
    /// Other values keep their slots and displacements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_block::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert_unique(5, 5u64, |&v| v);
    /// assert_eq!(table.remove(5, |&v| v == 5), Some(5));
    /// assert_eq!(table.remove(5, |&v| v == 5), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.find_index(hash, eq)?;
        Some(self.take(index))
    }

    fn take(&mut self, index: usize) -> V {
        match self.slots[index].take() {
            Some(value) => {
                self.populated -= 1;
                *value
            }
            None => unreachable!("slot {index} is empty"),
        }
    }

    /// Places `value` using the bounded robin-hood walk, rebuilding as often
    /// as needed until the pending value fits.
    fn place(&mut self, value: Box<V>, hasher: &impl Fn(&V) -> u64) {
        let mut pending = Some(value);

        loop {
            let hash = match pending.as_deref() {
                Some(candidate) => hasher(candidate),
                None => return,
            };

            let mut index = self.ideal_bucket(hash);
            let mut displacement = 0;
            while displacement < self.block_size && pending.is_some() {
                if self.slots[index].is_none() || self.displacement[index] < displacement {
                    mem::swap(&mut self.slots[index], &mut pending);
                    mem::swap(&mut self.displacement[index], &mut displacement);
                }
                displacement += 1;
                index = self.next(index);
            }

            if pending.is_none() {
                self.populated += 1;
                return;
            }

            self.rebuild(hasher);
        }
    }

    /// Moves every value into a fresh backing array and re-derives the probe
    /// bound from the bucket collision counts at the new capacity.
    ///
    /// A table that already satisfies the load bound ran out of probe window
    /// because of clustering rather than load. It keeps its capacity and
    /// doubles its previous bound instead, so repeated rebuilds cannot stall
    /// on hashes that stay clustered at every capacity.
    ///
    /// A load-driven rebuild always grows: `slots_for(populated)` exceeds the
    /// old capacity whenever `populated * STANDARD_DIFF` reaches it.
    ///
    /// The new arrays are allocated before the live slots are touched.
    #[cold]
    #[inline(never)]
    fn rebuild(&mut self, hasher: &impl Fn(&V) -> u64) {
        let clustered = self.populated * STANDARD_DIFF < self.slots.len();
        let floor = if clustered {
            self.block_size.saturating_mul(2)
        } else {
            DEFAULT_BLOCK_SIZE
        };
        let count = slots_for(self.populated).max(self.slots.len());
        debug_assert!(clustered || count > self.slots.len());
        let mask = count - 1;

        let mut slots = empty_slots(count);
        let displacement = vec![0; count];
        let mut collisions = vec![0usize; count];
        for value in self.slots.iter().flatten() {
            collisions[hasher(value) as usize & mask] += 1;
        }
        let worst = collisions.iter().copied().max().unwrap_or(0);

        mem::swap(&mut self.slots, &mut slots);
        self.displacement = displacement;
        self.block_size = floor.max(DEFAULT_BLOCK_SIZE).max(2 * worst);
        self.populated = 0;
        self.rebuilds += 1;

        for value in slots.into_iter().flatten() {
            self.place(value, hasher);
        }
    }

    /// Returns an iterator over the values in slot order.
    ///
    /// The order is stable while the table is not modified, but changes
    /// whenever an insertion evicts values or rebuilds the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_block::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for i in 0..4u64 {
    ///     table.insert_unique(i, i, |&v| v);
    /// }
    /// let mut values: Vec<u64> = table.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, [0, 1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator yielding mutable references in slot order.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            slots: self.slots.iter_mut(),
            remaining: self.populated,
        }
    }

    /// Removes every value from the table, yielding them in slot order.
    ///
    /// The table is reset to a single empty slot and the default probe bound
    /// as soon as the drain starts, whether or not the iterator is consumed.
    /// Like [`clear`](Self::clear), the rebuild count is kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_block::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert_unique(1, 1u64, |&v| v);
    /// table.insert_unique(2, 2u64, |&v| v);
    ///
    /// let values: Vec<u64> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values.len(), 2);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        let rebuilds = self.rebuilds;
        let taken = mem::take(self);
        self.rebuilds = rebuilds;
        Drain {
            inner: taken.into_iter(),
            _marker: PhantomData,
        }
    }

    /// Computes how many values sit at each displacement from their ideal
    /// bucket.
    ///
    /// Compiled with the `stats` feature or under `cfg(test)`.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut counts = vec![0usize; self.block_size];
        for (slot, &displacement) in self.slots.iter().zip(&self.displacement) {
            if slot.is_some() {
                counts[displacement] += 1;
            }
        }

        ProbeHistogram {
            counts,
            populated: self.populated,
        }
    }

    /// Returns utilization statistics for the current table state.
    ///
    /// Compiled with the `stats` feature or under `cfg(test)`.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let mut max_displacement = 0;
        let mut total_displacement = 0;
        for (slot, &displacement) in self.slots.iter().zip(&self.displacement) {
            if slot.is_some() {
                max_displacement = max_displacement.max(displacement);
                total_displacement += displacement;
            }
        }

        DebugStats {
            populated: self.populated,
            capacity: self.slots.len(),
            block_size: self.block_size,
            rebuilds: self.rebuilds,
            max_displacement,
            mean_displacement: if self.populated == 0 {
                0.0
            } else {
                total_displacement as f64 / self.populated as f64
            },
            load_factor: self.populated as f64 / self.slots.len() as f64,
            total_bytes: self.slots.len()
                * (mem::size_of::<Option<Box<V>>>() + mem::size_of::<usize>())
                + self.populated * mem::size_of::<V>(),
        }
    }

    /// Panics unless every stored value sits exactly `displacement` slots past
    /// its ideal bucket and inside the probe bound.
    #[cfg(test)]
    pub(crate) fn assert_displacements(&self, hasher: impl Fn(&V) -> u64) {
        let mut occupied = 0;
        for (index, (slot, &displacement)) in self.slots.iter().zip(&self.displacement).enumerate()
        {
            if let Some(value) = slot {
                occupied += 1;
                let ideal = self.ideal_bucket(hasher(value));
                assert!(
                    displacement < self.block_size,
                    "slot {index}: displacement {displacement} outside block size {}",
                    self.block_size
                );
                assert_eq!(
                    (ideal + displacement) & self.mask(),
                    index,
                    "slot {index}: displacement {displacement} from ideal bucket {ideal}"
                );
            }
        }
        assert_eq!(occupied, self.populated);
    }
}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> IntoIter<V> {
        IntoIter {
            slots: self.slots.into_iter(),
            remaining: self.populated,
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut HashTable<V> {
    type IntoIter = IterMut<'a, V>;
    type Item = &'a mut V;

    fn into_iter(self) -> IterMut<'a, V> {
        self.iter_mut()
    }
}

/// Count of stored values per displacement.
///
/// Compiled with the `stats` feature or under `cfg(test)`.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// `counts[d]` is the number of values sitting `d` slots past their ideal
    /// bucket. Has one bin per displacement below the probe bound.
    pub counts: Vec<usize>,
    /// Number of values in the table.
    pub populated: usize,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Pretty-prints the histogram as a horizontal bar chart, skipping the
    /// trailing run of empty bins.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.populated);

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = ['▏', '▎', '▍', '▌', '▋', '▊', '▉'];
            if units % 8 > 0 {
                bar.push(partial[units % 8 - 1]);
            }
            bar
        };

        let last = self.counts.iter().rposition(|&c| c != 0).unwrap_or(0);
        for (displacement, &count) in self.counts.iter().enumerate().take(last + 1) {
            println!("{:>3} | {} ({})", displacement, make_bar(count), count);
        }
    }
}

/// Debug statistics for hash table analysis.
///
/// Compiled with the `stats` feature or under `cfg(test)`.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of values currently in the table
    pub populated: usize,
    /// Number of slots in the backing array
    pub capacity: usize,
    /// Current probe bound
    pub block_size: usize,
    /// Rebuilds performed since the table was created
    pub rebuilds: usize,
    /// Largest displacement of any stored value
    pub max_displacement: usize,
    /// Mean displacement over stored values
    pub mean_displacement: f64,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Approximate heap bytes owned by the table
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Displacement: max {} / mean {:.2} (block size {})",
            self.max_displacement, self.mean_displacement, self.block_size
        );
        println!("Rebuilds: {}", self.rebuilds);
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable reference
    /// to the stored value.
    pub fn or_insert(self, default: V, hasher: impl Fn(&V) -> u64) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default, hasher),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the stored value.
    pub fn or_insert_with(
        self,
        default: impl FnOnce() -> V,
        hasher: impl Fn(&V) -> u64,
    ) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default(), hasher),
        }
    }
}

/// A view into a vacant entry in a [`HashTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts the value and returns a mutable reference to it.
    ///
    /// `hasher` must agree with the hash this entry was looked up with; see
    /// [`HashTable::insert_unique`].
    pub fn insert(self, value: V, hasher: impl Fn(&V) -> u64) -> &'a mut V {
        self.table.insert_unique(self.hash, value, hasher)
    }
}

/// A view into an occupied entry in a [`HashTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the stored value.
    pub fn get(&self) -> &V {
        self.table.occupied(self.index)
    }

    /// Gets a mutable reference to the stored value.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.occupied_mut(self.index)
    }

    /// Converts the entry into a mutable reference bound to the table.
    pub fn into_mut(self) -> &'a mut V {
        self.table.occupied_mut(self.index)
    }

    /// Removes the value from the table and returns it.
    pub fn remove(self) -> V {
        self.table.take(self.index)
    }
}

/// An iterator over the values in a [`HashTable`], in slot order.
///
/// Created by [`HashTable::iter`]. Walks the backing array from both ends,
/// skipping empty slots.
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Option<Box<V>>>,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Some(value) = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.slots.next_back() {
            if let Some(value) = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the values in a [`HashTable`], in slot order.
pub struct IterMut<'a, V> {
    slots: core::slice::IterMut<'a, Option<Box<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Some(value) = slot.as_deref_mut() {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IterMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.slots.next_back() {
            if let Some(value) = slot.as_deref_mut() {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
impl<V> FusedIterator for IterMut<'_, V> {}

/// An owning iterator over the values of a [`HashTable`], in slot order.
pub struct IntoIter<V> {
    slots: alloc::vec::IntoIter<Option<Box<V>>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Some(value) = slot {
                self.remaining -= 1;
                return Some(*value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IntoIter<V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.slots.next_back() {
            if let Some(value) = slot {
                self.remaining -= 1;
                return Some(*value);
            }
        }
        None
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}
impl<V> FusedIterator for IntoIter<V> {}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`]. Values
/// not consumed are dropped with the iterator.
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V> {
    inner: IntoIter<V>,
    _marker: PhantomData<&'a mut HashTable<V>>,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for Drain<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}
impl<V> FusedIterator for Drain<'_, V> {}
