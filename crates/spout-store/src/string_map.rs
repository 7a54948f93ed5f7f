//! Range-bounded id allocation over a [`SimpleStore`].

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::{Insertion, SimpleStore, StoreError};

/// Allocates ids in `[min_id, max_id)` for string keys and remembers them in a store.
///
/// Registration is safe to call from many threads: concurrent registrations of
/// the same key agree on a single id, and two keys never share one.
pub struct StringMap {
    store: Arc<dyn SimpleStore>,
    min_id: i32,
    max_id: i32,
    next: AtomicI32,
}

impl std::fmt::Debug for StringMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringMap")
            .field("min_id", &self.min_id)
            .field("max_id", &self.max_id)
            .field("len", &self.store.len())
            .finish()
    }
}

impl StringMap {
    /// Wrap `store`, allocating from `[min_id, max_id)`.
    pub fn new(store: Arc<dyn SimpleStore>, min_id: i32, max_id: i32) -> Self {
        Self {
            store,
            min_id,
            max_id: max_id.max(min_id),
            next: AtomicI32::new(min_id),
        }
    }

    pub fn min_id(&self) -> i32 {
        self.min_id
    }

    pub fn max_id(&self) -> i32 {
        self.max_id
    }

    pub fn store(&self) -> &Arc<dyn SimpleStore> {
        &self.store
    }

    /// Id for `key`, allocating the lowest free one if it has none yet.
    pub fn register(&self, key: &str) -> Result<i32, StoreError> {
        if let Some(id) = self.store.get(key) {
            return Ok(id);
        }

        while let Some(id) = self.next_candidate() {
            if let Some(id) = self.try_claim(key, id) {
                return Ok(id);
            }
        }

        // The cursor ran off the end; reuse ids freed by removed keys.
        for id in self.min_id..self.max_id {
            if let Some(id) = self.try_claim(key, id) {
                return Ok(id);
            }
        }

        Err(StoreError::IdRangeExhausted {
            min: self.min_id,
            max: self.max_id,
        })
    }

    /// Claim `id` for `key`.
    ///
    /// Returns `false` when `id` is outside the range, belongs to another key,
    /// or `key` already owns a different id.
    pub fn register_with_id(&self, key: &str, id: i32) -> bool {
        if id < self.min_id || id >= self.max_id {
            return false;
        }
        match self.store.set_if_absent(key, id) {
            Insertion::Inserted => {
                debug!("Registered {key} with requested id {id}");
                true
            }
            Insertion::KeyExists(existing) => existing == id,
            Insertion::IdTaken(_) => false,
        }
    }

    pub fn get_id(&self, key: &str) -> Option<i32> {
        self.store.get(key)
    }

    pub fn get_key(&self, id: i32) -> Option<String> {
        self.store.reverse_get(id)
    }

    /// All registered `(key, id)` pairs, ordered by id.
    pub fn items(&self) -> Vec<(String, i32)> {
        self.store.entries()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Translate an id of this map into the id `other` uses for the same key,
    /// registering the key in `other` if needed.
    pub fn convert_to(&self, other: &StringMap, id: i32) -> Result<Option<i32>, StoreError> {
        match self.get_key(id) {
            Some(key) => other.register(&key).map(Some),
            None => Ok(None),
        }
    }

    /// Translate an id of `other` into this map's id for the same key.
    pub fn convert_from(&self, other: &StringMap, id: i32) -> Result<Option<i32>, StoreError> {
        other.convert_to(self, id)
    }

    pub fn save(&self) -> Result<(), StoreError> {
        self.store.save()
    }

    fn next_candidate(&self) -> Option<i32> {
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_id).then_some(n + 1)
            })
            .ok()
    }

    fn try_claim(&self, key: &str, id: i32) -> Option<i32> {
        match self.store.set_if_absent(key, id) {
            Insertion::Inserted => {
                debug!("Allocated id {id} for {key}");
                Some(id)
            }
            Insertion::KeyExists(existing) => Some(existing),
            Insertion::IdTaken(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn map(min: i32, max: i32) -> StringMap {
        StringMap::new(Arc::new(MemoryStore::new()), min, max)
    }

    #[test]
    fn register_is_stable_per_key() {
        let map = map(0, 100);
        let stone = map.register("stone").unwrap();
        let dirt = map.register("dirt").unwrap();
        assert_ne!(stone, dirt);
        assert_eq!(map.register("stone").unwrap(), stone);
        assert_eq!(map.get_key(dirt).as_deref(), Some("dirt"));
    }

    #[test]
    fn allocation_skips_ids_already_claimed() {
        let map = map(0, 100);
        assert!(map.register_with_id("air", 0));
        assert!(map.register_with_id("stone", 1));
        assert_eq!(map.register("grass").unwrap(), 2);
    }

    #[test]
    fn allocation_starts_at_min_id() {
        let map = map(10, 20);
        assert_eq!(map.register("first").unwrap(), 10);
    }

    #[test]
    fn explicit_id_conflicts_are_refused() {
        let map = map(0, 100);
        assert!(map.register_with_id("stone", 1));
        // Same mapping again is fine.
        assert!(map.register_with_id("stone", 1));
        // Id owned by another key.
        assert!(!map.register_with_id("granite", 1));
        // Key already owns a different id.
        assert!(!map.register_with_id("stone", 2));
        // Outside the range.
        assert!(!map.register_with_id("bedrock", 100));
        assert!(!map.register_with_id("bedrock", -1));
    }

    #[test]
    fn exhausted_range_is_an_error() {
        let map = map(0, 2);
        map.register("a").unwrap();
        map.register("b").unwrap();
        assert!(matches!(
            map.register("c"),
            Err(StoreError::IdRangeExhausted { min: 0, max: 2 })
        ));
    }

    #[test]
    fn freed_ids_are_reused_after_cursor_exhaustion() {
        let map = map(0, 2);
        map.register("a").unwrap();
        map.register("b").unwrap();
        map.store().remove("a");
        assert_eq!(map.register("c").unwrap(), 0);
    }

    #[test]
    fn keys_keep_their_case() {
        let map = map(0, 10);
        let id = map.register("Stone").unwrap();
        assert_eq!(map.get_key(id).as_deref(), Some("Stone"));
        assert_eq!(map.get_id("stone"), None);
    }

    #[test]
    fn convert_between_maps() {
        let server = map(0, 100);
        let world = map(500, 600);
        let stone = server.register("stone").unwrap();

        let world_id = server.convert_to(&world, stone).unwrap().unwrap();
        assert_eq!(world_id, 500);
        assert_eq!(world.convert_to(&server, world_id).unwrap(), Some(stone));
        assert_eq!(server.convert_from(&world, world_id).unwrap(), Some(stone));
        assert_eq!(server.convert_to(&world, 42).unwrap(), None);
    }

    #[test]
    fn concurrent_registration_agrees_on_ids() {
        let map = map(0, 1000);
        let keys: Vec<String> = (0..50).map(|i| format!("material_{i}")).collect();

        let results: Vec<Vec<i32>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        keys.iter()
                            .map(|k| map.register(k).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for other in &results[1..] {
            assert_eq!(other, &results[0]);
        }
        let mut ids = results[0].clone();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), keys.len());
        assert_eq!(map.len(), keys.len());
    }
}
