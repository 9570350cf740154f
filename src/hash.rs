//! A Robin-Hood open-addressing hash table.
//!
//! Linear probing with the Robin-Hood steal rule minimizes the variance of probe length across
//! entries: whichever of the inserting element and the slot's current occupant has travelled
//! farther from its home slot keeps the slot, and the other keeps probing.  This makes the
//! expected and worst-case probe lengths close to each other, which in turn lets `get` stop early
//! the moment it meets an occupant that is *closer* to its own home than the search has already
//! travelled — such an occupant would have stolen the slot from our key, had our key been present.
//!
//! This is the substrate the rest of the library builds on: [`crate::DisjointSet`] keys its
//! parent/rank records through it, and the graph engine (`crate::graph`) uses one per vertex for
//! attributes, one per vertex for the outgoing-edge-by-destination index, and one for the vertex
//! table itself.

use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};

/// The default non-cryptographic hasher used by [`RobinHoodMap`]: FNV-1a, byte-wise multiplicative
/// mixing.  Callers who want a different hash (e.g. `std`'s SipHash-backed
/// `RandomState`, for DoS resistance against adversarial keys) can instantiate
/// `RobinHoodMap<K, V, S>` with any `S: BuildHasher`.
#[derive(Clone, Copy)]
pub struct FnvHasher(u64);

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

impl Default for FnvHasher {
    fn default() -> Self {
        FnvHasher(FNV_OFFSET_BASIS)
    }
}

impl Hasher for FnvHasher {
    fn write(&mut self, bytes: &[u8]) {
        let mut hash = self.0;
        for &byte in bytes {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        self.0 = hash;
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

/// A [`BuildHasher`] that produces [`FnvHasher`]s.
pub type FnvBuildHasher = BuildHasherDefault<FnvHasher>;

/// Default initial capacity when none is requested.
const INITIAL_CAPACITY: usize = 8;
/// Default maximum load factor: insertion that would push occupancy past this fraction of
/// capacity triggers a rehash first.
const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    disp: u64, // distance (in slots) from this entry's home slot
}

/// An open-addressing hash map keyed by `K`, using Robin-Hood linear probing.
///
/// `S` is the [`BuildHasher`] family; it defaults to [`FnvBuildHasher`].  The load factor never
/// exceeds `max_load_factor` (default 0.75) after a `put`: an insertion that would push occupancy
/// past the ceiling rehashes into a table of at least double the capacity first.
pub struct RobinHoodMap<K, V, S = FnvBuildHasher> {
    slots: Vec<Option<Entry<K, V>>>,
    len: usize,
    max_load_factor: f64,
    hash_builder: S,
}

impl<K, V> RobinHoodMap<K, V, FnvBuildHasher> {
    /// Creates an empty map with a small default initial capacity.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Creates an empty map with at least the given initial capacity.
    ///
    /// Capacity is lower-bounded at 1 regardless of what is requested.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FnvBuildHasher::default())
    }
}

impl<K, V> Default for RobinHoodMap<K, V, FnvBuildHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S: BuildHasher> RobinHoodMap<K, V, S> {
    /// Creates an empty map with at least the given initial capacity, using the given hasher
    /// family in place of the default FNV-1a.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let capacity = capacity.max(1);
        RobinHoodMap {
            slots: (0..capacity).map(|_| None).collect(),
            len: 0,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            hash_builder,
        }
    }

    /// Overrides the default maximum load factor (0.75).
    ///
    /// # Panics
    ///
    /// Panics if `factor` is not in `(0.0, 1.0]`.
    pub fn with_max_load_factor(mut self, factor: f64) -> Self {
        assert!(factor > 0.0 && factor <= 1.0, "load factor out of range");
        self.max_load_factor = factor;
        self
    }

    /// Returns the number of key-value pairs in this map.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is this map empty?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current slot capacity (not the number of occupied slots).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the current load factor, `len / capacity`.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.slots.len() as f64
    }

    fn hash_of<Q: Hash + ?Sized>(&self, key: &Q) -> u64 {
        let mut hasher = self.hash_builder.build_hasher();
        key.hash(&mut hasher);
        hasher.finish()
    }
}

impl<K: Eq + Hash, V, S: BuildHasher> RobinHoodMap<K, V, S> {
    /// Inserts `key`/`value`, returning the previous value if `key` was already present.
    ///
    /// Rehashes into a larger table first if this insertion would push the load factor past
    /// `max_load_factor`.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if (self.len + 1) as f64 > self.max_load_factor * self.slots.len() as f64 {
            self.grow();
        }
        self.insert_inner(key, value)
    }

    fn insert_inner(&mut self, key: K, value: V) -> Option<V> {
        let cap = self.slots.len();
        let hash = self.hash_of(&key);
        let mut entry = Entry {
            key,
            value,
            hash,
            disp: 0,
        };
        let mut idx = (hash % cap as u64) as usize;
        loop {
            match &mut self.slots[idx] {
                None => {
                    self.slots[idx] = Some(entry);
                    self.len += 1;
                    return None;
                }
                Some(occupant) if occupant.hash == entry.hash && occupant.key == entry.key => {
                    return Some(std::mem::replace(&mut occupant.value, entry.value));
                }
                Some(occupant) if occupant.disp < entry.disp => {
                    std::mem::swap(occupant, &mut entry);
                }
                Some(_) => {}
            }
            idx = (idx + 1) % cap;
            entry.disp += 1;
        }
    }

    fn grow(&mut self) {
        let new_cap = (self.slots.len() * 2).max(INITIAL_CAPACITY);
        let old_slots =
            std::mem::replace(&mut self.slots, (0..new_cap).map(|_| None).collect());
        self.len = 0;
        for entry in old_slots.into_iter().flatten() {
            self.insert_inner(entry.key, entry.value);
        }
    }

    // Returns the slot index currently holding `key`, if any, plus the number of probes taken
    // (the key's current displacement).
    fn locate<Q>(&self, key: &Q) -> Option<usize>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let cap = self.slots.len();
        let hash = self.hash_of(key);
        let mut idx = (hash % cap as u64) as usize;
        let mut disp: u64 = 0;
        loop {
            match &self.slots[idx] {
                None => return None,
                Some(e) if e.hash == hash && e.key.borrow() == key => return Some(idx),
                Some(e) if e.disp < disp => return None,
                _ => {}
            }
            idx = (idx + 1) % cap;
            disp += 1;
        }
    }

    /// Returns a reference to the value associated with `key`, or `None` if absent.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.locate(key).map(|idx| &self.slots[idx].as_ref().unwrap().value)
    }

    /// Returns a mutable reference to the value associated with `key`, or `None` if absent.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        match self.locate(key) {
            Some(idx) => Some(&mut self.slots[idx].as_mut().unwrap().value),
            None => None,
        }
    }

    /// Does this map contain `key`?
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.locate(key).is_some()
    }

    /// Removes `key`, returning its value if present.
    ///
    /// Uses backward-shift deletion: the vacated slot is filled by shifting the following
    /// probe-chain elements back by one, stopping at an empty slot or one with zero displacement
    /// (an element already at its home slot has nothing to gain by moving).
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let idx = self.locate(key)?;
        let removed = self.slots[idx].take().unwrap();
        self.len -= 1;
        let cap = self.slots.len();
        let mut cur = idx;
        loop {
            let next = (cur + 1) % cap;
            let should_shift = matches!(&self.slots[next], Some(e) if e.disp > 0);
            if !should_shift {
                break;
            }
            let mut moved = self.slots[next].take().unwrap();
            moved.disp -= 1;
            self.slots[cur] = Some(moved);
            cur = next;
        }
        Some(removed.value)
    }

    /// Returns an iterator over `(&key, &value)` pairs in slot order.
    ///
    /// Slot order depends on insertion and deletion history (it is the physical array order, not
    /// insertion order), per the library-wide ordering guarantee that hash-table iteration follows
    /// slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    /// Debug invariant check: every occupied slot's recorded displacement equals
    /// `(slot_index - home_index(key)) mod capacity`, and the load factor is within bounds.
    pub fn check(&self) -> bool {
        let cap = self.slots.len();
        if self.len as f64 > self.max_load_factor * cap as f64 {
            return false;
        }
        for (idx, slot) in self.slots.iter().enumerate() {
            if let Some(e) = slot {
                let home = (e.hash % cap as u64) as usize;
                let expected_disp = (idx + cap - home) % cap;
                if expected_disp as u64 != e.disp {
                    return false;
                }
            }
        }
        true
    }
}

pub struct Iter<'a, K, V> {
    slots: std::slice::Iter<'a, Option<Entry<K, V>>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Some(e) = slot {
                return Some((&e.key, &e.value));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_replace() {
        let mut m = RobinHoodMap::new();
        assert_eq!(m.put("a", 1), None);
        assert_eq!(m.put("b", 2), None);
        assert_eq!(m.put("a", 10), Some(1));
        assert_eq!(m.get("a"), Some(&10));
        assert_eq!(m.get("b"), Some(&2));
        assert_eq!(m.get("c"), None);
        assert_eq!(m.len(), 2);
        assert!(m.check());
    }

    #[test]
    fn delete_backward_shift() {
        let mut m = RobinHoodMap::with_capacity(4);
        for i in 0..20 {
            m.put(i, i * i);
        }
        assert!(m.check());
        for i in 0..20 {
            assert_eq!(m.get(&i), Some(&(i * i)));
        }
        for i in (0..20).step_by(2) {
            assert_eq!(m.delete(&i), Some(i * i));
        }
        assert!(m.check());
        for i in 0..20 {
            if i % 2 == 0 {
                assert_eq!(m.get(&i), None);
            } else {
                assert_eq!(m.get(&i), Some(&(i * i)));
            }
        }
        assert_eq!(m.len(), 10);
    }

    #[test]
    fn grows_to_keep_load_factor_bounded() {
        let mut m = RobinHoodMap::with_capacity(1);
        for i in 0..500 {
            m.put(i, i);
        }
        assert!(m.load_factor() <= 0.75 + 1e-9);
        assert!(m.check());
    }

    #[test]
    fn iteration_visits_every_entry_exactly_once() {
        let mut m = RobinHoodMap::new();
        for i in 0..50 {
            m.put(i, i.to_string());
        }
        let mut seen: Vec<i32> = m.iter().map(|(k, _)| *k).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }
}
