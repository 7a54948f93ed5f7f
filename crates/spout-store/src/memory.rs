//! In-memory store.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Insertion, SimpleStore, StoreError};

#[derive(Debug, Default)]
pub(crate) struct Maps {
    pub(crate) by_key: HashMap<String, i32>,
    pub(crate) by_id: HashMap<i32, String>,
    pub(crate) dirty: bool,
}

impl Maps {
    fn insert(&mut self, key: &str, id: i32) -> Option<i32> {
        if let Some(old_key) = self.by_id.remove(&id) {
            if old_key != key {
                self.by_key.remove(&old_key);
            }
        }
        let previous = self.by_key.insert(key.to_string(), id);
        if let Some(old_id) = previous {
            if old_id != id {
                self.by_id.remove(&old_id);
            }
        }
        self.by_id.insert(id, key.to_string());
        self.dirty = true;
        previous
    }

    pub(crate) fn replace_all(&mut self, entries: Vec<(String, i32)>) {
        self.by_key.clear();
        self.by_id.clear();
        for (key, id) in entries {
            self.insert(&key, id);
        }
        self.dirty = false;
    }

    pub(crate) fn sorted_entries(&self) -> Vec<(String, i32)> {
        let mut entries: Vec<(String, i32)> = self
            .by_key
            .iter()
            .map(|(k, &id)| (k.clone(), id))
            .collect();
        entries.sort_by_key(|&(_, id)| id);
        entries
    }
}

/// Store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    maps: RwLock<Maps>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the store changed since it was last loaded or saved.
    pub fn is_dirty(&self) -> bool {
        self.read().dirty
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Maps> {
        self.maps.read().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Maps> {
        self.maps.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl SimpleStore for MemoryStore {
    fn get(&self, key: &str) -> Option<i32> {
        self.read().by_key.get(key).copied()
    }

    fn reverse_get(&self, id: i32) -> Option<String> {
        self.read().by_id.get(&id).cloned()
    }

    fn set(&self, key: &str, id: i32) -> Option<i32> {
        self.write().insert(key, id)
    }

    fn set_if_absent(&self, key: &str, id: i32) -> Insertion {
        let mut maps = self.write();
        if let Some(&existing) = maps.by_key.get(key) {
            return Insertion::KeyExists(existing);
        }
        if let Some(owner) = maps.by_id.get(&id) {
            return Insertion::IdTaken(owner.clone());
        }
        maps.insert(key, id);
        Insertion::Inserted
    }

    fn remove(&self, key: &str) -> Option<i32> {
        let mut maps = self.write();
        let id = maps.by_key.remove(key)?;
        maps.by_id.remove(&id);
        maps.dirty = true;
        Some(id)
    }

    fn clear(&self) {
        let mut maps = self.write();
        if !maps.by_key.is_empty() {
            maps.dirty = true;
        }
        maps.by_key.clear();
        maps.by_id.clear();
    }

    fn len(&self) -> usize {
        self.read().by_key.len()
    }

    fn keys(&self) -> Vec<String> {
        self.read().by_key.keys().cloned().collect()
    }

    fn entries(&self) -> Vec<(String, i32)> {
        self.read().sorted_entries()
    }

    fn save(&self) -> Result<(), StoreError> {
        self.write().dirty = false;
        Ok(())
    }

    fn load(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
