//! Persistent name <-> id stores.
//!
//! A [`SimpleStore`] keeps a bidirectional mapping between string keys and
//! integer ids. [`StringMap`] sits on top of a store and hands out ids from a
//! fixed range, so that names registered in one run keep their ids in the next.

pub mod binary;
pub mod error;
pub mod memory;
pub mod string_map;

pub use binary::BinaryFileStore;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use string_map::StringMap;

/// Outcome of [`SimpleStore::set_if_absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The mapping was added.
    Inserted,
    /// The key was already mapped; carries its id.
    KeyExists(i32),
    /// The id belongs to another key; carries that key.
    IdTaken(String),
}

/// Bidirectional key/id store.
///
/// Implementations are internally synchronized; every method takes `&self`.
pub trait SimpleStore: Send + Sync {
    /// Id mapped to `key`.
    fn get(&self, key: &str) -> Option<i32>;

    /// Key mapped to `id`.
    fn reverse_get(&self, id: i32) -> Option<String>;

    /// Map `key` to `id`, replacing any previous mapping of either side.
    /// Returns the id `key` was previously mapped to.
    fn set(&self, key: &str, id: i32) -> Option<i32>;

    /// Map `key` to `id` only if neither side is mapped yet.
    fn set_if_absent(&self, key: &str, id: i32) -> Insertion;

    /// Remove `key` and its id. Returns the removed id.
    fn remove(&self, key: &str) -> Option<i32>;

    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn keys(&self) -> Vec<String>;

    /// All `(key, id)` pairs, ordered by id.
    fn entries(&self) -> Vec<(String, i32)>;

    /// Persist the store. In-memory stores succeed without doing anything.
    fn save(&self) -> Result<(), StoreError>;

    /// Replace the contents with the persisted state.
    fn load(&self) -> Result<(), StoreError>;
}
