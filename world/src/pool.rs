//! Dense entity storage addressed by stable identifiers.

use std::collections::HashMap;

use grid_siege_core::EntityId;

/// Ownership container pairing a dense array with an id-to-slot map.
///
/// Identifiers are allocated monotonically starting at one and are never
/// reused, so a stale id can only ever miss. Running out of the `u32` id
/// space is a contract violation caught by a debug assertion; release builds
/// saturate instead of wrapping back to one. Iteration follows the dense
/// array, which is reordered by [`Pool::remove_at`].
#[derive(Clone, Debug)]
pub struct Pool<I: EntityId, T> {
    items: Vec<T>,
    ids: Vec<I>,
    slots: HashMap<I, usize>,
    next_raw: u32,
}

impl<I: EntityId, T> Default for Pool<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: EntityId, T> Pool<I, T> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            ids: Vec::new(),
            slots: HashMap::new(),
            next_raw: 1,
        }
    }

    /// Appends an entity and returns the identifier allocated for it.
    pub fn push_back(&mut self, item: T) -> I {
        let id = I::from_raw(self.next_raw);
        debug_assert!(self.next_raw != u32::MAX, "identifier space exhausted");
        self.next_raw = self.next_raw.saturating_add(1);
        let _ = self.slots.insert(id, self.items.len());
        self.items.push(item);
        self.ids.push(id);
        id
    }

    /// Looks up an entity by identifier.
    #[must_use]
    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(&id).and_then(|&slot| self.items.get(slot))
    }

    /// Looks up an entity by identifier for mutation.
    #[must_use]
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        match self.slots.get(&id) {
            Some(&slot) => self.items.get_mut(slot),
            None => None,
        }
    }

    /// Reports whether an entity with the identifier is alive.
    #[must_use]
    pub fn exist(&self, id: I) -> bool {
        self.slots.contains_key(&id)
    }

    /// Dense index currently holding the entity, if any.
    #[must_use]
    pub fn index_of(&self, id: I) -> Option<usize> {
        self.slots.get(&id).copied()
    }

    /// Removes the entity stored at `index` by swapping in the last entity.
    ///
    /// The identifier of the moved entity is re-pointed at its new slot.
    /// Returns `None` when the index is out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<(I, T)> {
        if index >= self.items.len() {
            return None;
        }

        let item = self.items.swap_remove(index);
        let id = self.ids.swap_remove(index);
        let _ = self.slots.remove(&id);
        if let Some(&moved) = self.ids.get(index) {
            let _ = self.slots.insert(moved, index);
        }
        Some((id, item))
    }

    /// Removes the entity with the identifier, if present.
    pub fn remove(&mut self, id: I) -> Option<T> {
        let index = self.index_of(id)?;
        self.remove_at(index).map(|(_, item)| item)
    }

    /// Removes every entity matching `predicate`, returning how many went.
    ///
    /// Walks the dense array from the back so swap-removal never skips an
    /// entity.
    pub fn sweep<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = 0;
        for index in (0..self.items.len()).rev() {
            if predicate(&self.items[index]) {
                let _ = self.remove_at(index);
                removed += 1;
            }
        }
        removed
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Reports whether the pool holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Identifier and entity stored at a dense index.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<(I, &T)> {
        Some((*self.ids.get(index)?, self.items.get(index)?))
    }

    /// Identifiers in dense order.
    #[must_use]
    pub fn ids(&self) -> &[I] {
        &self.ids
    }

    /// Iterates live entities in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.ids.iter().copied().zip(self.items.iter())
    }

    /// Iterates live entities mutably in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> {
        self.ids.iter().copied().zip(self.items.iter_mut())
    }

    /// Removes every entity. Identifiers keep increasing afterwards.
    pub fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_siege_core::UnitId;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn identifiers_start_at_one_and_are_never_reused() {
        let mut pool: Pool<UnitId, &str> = Pool::new();
        let first = pool.push_back("a");
        let second = pool.push_back("b");
        assert_eq!(first, UnitId::new(1));
        assert_eq!(second, UnitId::new(2));

        assert_eq!(pool.remove(second), Some("b"));
        let third = pool.push_back("c");
        assert_eq!(third, UnitId::new(3));
        assert!(!pool.exist(second));
        assert_eq!(pool.get(second), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "identifier space exhausted")]
    fn exhausted_identifiers_never_wrap_to_one() {
        let mut pool: Pool<UnitId, u8> = Pool::new();
        pool.next_raw = u32::MAX - 1;
        assert_eq!(pool.push_back(1), UnitId::new(u32::MAX - 1));
        let _ = pool.push_back(2);
    }

    #[test]
    fn remove_at_repoints_moved_entity() {
        let mut pool: Pool<UnitId, u32> = Pool::new();
        let a = pool.push_back(10);
        let b = pool.push_back(20);
        let c = pool.push_back(30);

        let removed = pool.remove_at(0).expect("index in range");
        assert_eq!(removed, (a, 10));
        assert_eq!(pool.index_of(c), Some(0));
        assert_eq!(pool.get(c), Some(&30));
        assert_eq!(pool.get(b), Some(&20));
        assert_eq!(pool.remove_at(7), None);
    }

    #[test]
    fn sweep_removes_all_matches_including_swapped_ones() {
        let mut pool: Pool<UnitId, u32> = Pool::new();
        for value in 0..10 {
            let _ = pool.push_back(value);
        }

        let removed = pool.sweep(|value| value % 3 == 0);

        assert_eq!(removed, 4);
        let mut survivors: Vec<u32> = pool.iter().map(|(_, value)| *value).collect();
        survivors.sort_unstable();
        assert_eq!(survivors, vec![1, 2, 4, 5, 7, 8]);
    }

    #[test]
    fn ids_stay_bound_to_their_entity_under_random_churn() {
        let mut rng = ChaCha8Rng::seed_from_u64(0xfeed);
        let mut pool: Pool<UnitId, u64> = Pool::new();
        let mut expected: Vec<(UnitId, u64)> = Vec::new();

        for step in 0..2_000_u64 {
            if pool.is_empty() || rng.gen_bool(0.6) {
                let value = step * 7 + 3;
                let id = pool.push_back(value);
                expected.push((id, value));
            } else {
                let index = rng.gen_range(0..pool.len());
                let (id, value) = pool.remove_at(index).expect("index in range");
                let position = expected
                    .iter()
                    .position(|(known, _)| *known == id)
                    .expect("removed id was tracked");
                assert_eq!(expected.swap_remove(position).1, value);
            }

            if step % 97 == 0 {
                if let Some((id, value)) = expected.first().copied() {
                    *pool.get_mut(id).expect("tracked id is alive") = value + 1;
                    expected[0].1 = value + 1;
                }
            }

            assert_eq!(pool.len(), expected.len());
            for (id, value) in &expected {
                assert_eq!(pool.get(*id), Some(value), "id {id:?} drifted");
            }
        }
    }
}
