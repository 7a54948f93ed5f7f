//! Material id registry.
//!
//! Ids come from a persistent [`StringMap`] so a material keeps its id across
//! restarts. Lookups by id go through a fixed slot table whose slots are
//! published exactly once and read without locking; lookups by name go through
//! a concurrent map keyed by the lowercase name.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use spout_store::{BinaryFileStore, SimpleStore, StringMap};
use tracing::{debug, info, warn};

use crate::{Material, MaterialError};

/// Number of id slots.
pub const MAX_SIZE: usize = 1 << 16;

/// File, relative to the world folder, that persists the name -> id table.
pub const STORE_FILE: &str = "server.dat";

/// Highest id (exclusive) handed out by the registry's string map.
const MAX_ID: i32 = i16::MAX as i32;

/// Registry of all materials known to the server.
pub struct MaterialRegistry {
    slots: Box<[OnceLock<Arc<Material>>]>,
    name_lookup: DashMap<String, Arc<Material>>,
    string_map: OnceLock<StringMap>,
    registered: AtomicUsize,
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MaterialRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterialRegistry")
            .field("registered", &self.len())
            .field("names", &self.name_lookup.len())
            .field("set_up", &self.string_map.get().is_some())
            .finish()
    }
}

impl MaterialRegistry {
    /// Empty registry. [`setup`](Self::setup) must run before top-level
    /// materials can be registered.
    pub fn new() -> Self {
        Self {
            slots: (0..MAX_SIZE).map(|_| OnceLock::new()).collect(),
            name_lookup: DashMap::with_capacity(1000),
            string_map: OnceLock::new(),
            registered: AtomicUsize::new(0),
        }
    }

    /// Install the id store. May only be called once.
    pub fn setup(&self, store: Arc<dyn SimpleStore>) -> Result<&StringMap, MaterialError> {
        self.string_map
            .set(StringMap::new(store, 0, MAX_ID))
            .map_err(|_| MaterialError::AlreadySetUp)?;
        self.string_map.get().ok_or(MaterialError::NotSetUp)
    }

    /// Set up from `<world_folder>/server.dat`, loading it if it exists.
    pub fn setup_in(&self, world_folder: &Path) -> Result<&StringMap, MaterialError> {
        self.setup_file(&world_folder.join(STORE_FILE))
    }

    /// Set up from an explicit store file, loading it if it exists.
    pub fn setup_file(&self, path: &Path) -> Result<&StringMap, MaterialError> {
        if self.string_map.get().is_some() {
            return Err(MaterialError::AlreadySetUp);
        }
        let store = BinaryFileStore::new(path);
        if path.exists() {
            store.load()?;
            info!(
                "Loaded {} material ids from {}",
                store.len(),
                path.display()
            );
        }
        self.setup(Arc::new(store))
    }

    pub fn string_map(&self) -> Option<&StringMap> {
        self.string_map.get()
    }

    /// Register `material`, allocating an id for it if it is top-level.
    pub fn register(&self, material: Arc<Material>) -> Result<Arc<Material>, MaterialError> {
        self.register_inner(material, None)
    }

    /// Register `material`, preferring `id`. Falls back to allocation when the
    /// store refuses the id.
    pub fn register_with_id(
        &self,
        material: Arc<Material>,
        id: u16,
    ) -> Result<Arc<Material>, MaterialError> {
        self.register_inner(material, Some(id))
    }

    fn register_inner(
        &self,
        material: Arc<Material>,
        requested: Option<u16>,
    ) -> Result<Arc<Material>, MaterialError> {
        if material.is_sub_material() {
            let parent = material
                .parent_material()
                .ok_or_else(|| MaterialError::ParentDropped(material.name().to_string()))?;
            parent.register_sub_material(Arc::clone(&material))?;
            self.name_lookup
                .insert(material.name().to_lowercase(), Arc::clone(&material));
            debug!(
                "Registered sub-material {} ({}:{})",
                material.name(),
                parent.name(),
                material.data()
            );
            return Ok(material);
        }

        if material.id().is_some() {
            return Err(MaterialError::AlreadyRegistered(material.name().to_string()));
        }
        let map = self.string_map.get().ok_or(MaterialError::NotSetUp)?;

        let raw_id = match requested {
            Some(id) if map.register_with_id(material.name(), i32::from(id)) => i32::from(id),
            _ => map.register(material.name())?,
        };
        let id = u16::try_from(raw_id).map_err(|_| MaterialError::IdOutOfRange(raw_id))?;
        let slot = &self.slots[usize::from(id)];

        if let Some(existing) = slot.get() {
            return Err(self.conflict(id, existing));
        }
        // The id is only assigned once the slot is ours, so a material that
        // loses the race stays unregistered and may be registered again.
        if slot.set(Arc::clone(&material)).is_err() {
            let existing = slot.get().map(|m| m.name().to_string()).unwrap_or_default();
            warn!("Lost race for id {id}: {} beat {}", existing, material.name());
            return Err(MaterialError::IdConflict { id, existing });
        }
        if !material.assign_id(id) {
            warn!(
                "{} already carries id {:?}, now also in slot {id}",
                material.name(),
                material.id()
            );
        }

        self.registered.fetch_add(1, Ordering::Relaxed);
        self.name_lookup
            .insert(material.name().to_lowercase(), Arc::clone(&material));
        debug!("Registered material {} with id {id}", material.name());
        Ok(material)
    }

    fn conflict(&self, id: u16, existing: &Material) -> MaterialError {
        warn!("Another material is already mapped to id {id}: {}", existing.name());
        MaterialError::IdConflict {
            id,
            existing: existing.name().to_string(),
        }
    }

    /// Material in slot `id`. Out-of-range ids and empty slots yield `None`.
    pub fn get(&self, id: i32) -> Option<Arc<Material>> {
        let index = usize::try_from(id).ok()?;
        self.slots.get(index)?.get().cloned()
    }

    /// Case-insensitive lookup, covering sub-materials too.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<Material>> {
        self.name_lookup
            .get(&name.to_lowercase())
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Every material occupying a slot, ordered by id.
    pub fn values(&self) -> Vec<Arc<Material>> {
        let mut values = Vec::with_capacity(self.len());
        values.extend(self.slots.iter().filter_map(|slot| slot.get().cloned()));
        values
    }

    /// Number of top-level materials in the slot table.
    pub fn len(&self) -> usize {
        self.registered.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist the name -> id table.
    pub fn save(&self) -> Result<(), MaterialError> {
        let map = self.string_map.get().ok_or(MaterialError::NotSetUp)?;
        map.save()?;
        Ok(())
    }
}
