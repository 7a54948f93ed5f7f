//! Block and item type definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock, Weak};

use crate::MaterialError;

/// Whether a material can be placed in the world or only held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Block,
    Item,
}

/// A block or item type.
///
/// Top-level materials receive an id when registered. Sub-materials are
/// variants of a parent (e.g. a wool colour), share the parent's id, and are
/// told apart by their data value. A sub-material only holds a weak link to its
/// parent; the parent owns its registered variants.
pub struct Material {
    name: String,
    kind: MaterialKind,
    data: u16,
    parent: Option<Weak<Material>>,
    id: OnceLock<u16>,
    sub_materials: RwLock<BTreeMap<u16, Arc<Material>>>,
}

impl Material {
    /// New top-level material.
    pub fn new(name: impl Into<String>, kind: MaterialKind) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            kind,
            data: 0,
            parent: None,
            id: OnceLock::new(),
            sub_materials: RwLock::new(BTreeMap::new()),
        })
    }

    /// New variant of `parent` with the given data value. Inherits the parent's kind.
    pub fn sub_material(parent: &Arc<Material>, name: impl Into<String>, data: u16) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            kind: parent.kind,
            data,
            parent: Some(Arc::downgrade(parent)),
            id: OnceLock::new(),
            sub_materials: RwLock::new(BTreeMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    /// Registry id. Sub-materials report their parent's id.
    pub fn id(&self) -> Option<u16> {
        match &self.parent {
            Some(parent) => parent.upgrade().and_then(|p| p.id()),
            None => self.id.get().copied(),
        }
    }

    pub fn data(&self) -> u16 {
        self.data
    }

    pub fn is_sub_material(&self) -> bool {
        self.parent.is_some()
    }

    pub fn parent_material(&self) -> Option<Arc<Material>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Whether this material has been registered: top-level materials hold an
    /// id, sub-materials are present in their parent's table.
    pub fn is_registered(&self) -> bool {
        match self.parent_material() {
            Some(parent) => parent
                .sub_material_for(self.data)
                .is_some_and(|sub| std::ptr::eq(Arc::as_ptr(&sub), self)),
            None if self.parent.is_some() => false,
            None => self.id.get().is_some(),
        }
    }

    /// Attach `sub` to this material's variant table under its data value.
    pub fn register_sub_material(&self, sub: Arc<Material>) -> Result<(), MaterialError> {
        let mut subs = self
            .sub_materials
            .write()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = subs.get(&sub.data) {
            if Arc::ptr_eq(existing, &sub) {
                return Err(MaterialError::AlreadyRegistered(sub.name.clone()));
            }
            return Err(MaterialError::SubMaterialConflict {
                parent: self.name.clone(),
                data: sub.data,
            });
        }
        subs.insert(sub.data, sub);
        Ok(())
    }

    /// Registered variant with the given data value.
    pub fn sub_material_for(&self, data: u16) -> Option<Arc<Material>> {
        self.sub_materials
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&data)
            .cloned()
    }

    /// Registered variants, ordered by data value.
    pub fn sub_materials(&self) -> Vec<Arc<Material>> {
        self.sub_materials
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    pub fn has_sub_materials(&self) -> bool {
        !self
            .sub_materials
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }

    /// Set the id once. Returns `false` if one was already assigned.
    pub(crate) fn assign_id(&self, id: u16) -> bool {
        self.id.set(id).is_ok()
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("id", &self.id())
            .field("data", &self.data)
            .field(
                "parent",
                &self.parent_material().map(|p| p.name().to_string()),
            )
            .finish()
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_material_has_no_id_until_assigned() {
        let stone = Material::new("Stone", MaterialKind::Block);
        assert_eq!(stone.id(), None);
        assert!(!stone.is_registered());
        assert!(stone.assign_id(1));
        assert!(!stone.assign_id(2));
        assert_eq!(stone.id(), Some(1));
        assert!(stone.is_registered());
    }

    #[test]
    fn sub_material_shares_parent_id_and_kind() {
        let wool = Material::new("Wool", MaterialKind::Block);
        let red = Material::sub_material(&wool, "Red Wool", 14);
        assert!(red.is_sub_material());
        assert_eq!(red.kind(), MaterialKind::Block);
        assert_eq!(red.data(), 14);
        assert_eq!(red.parent_material().unwrap().name(), "Wool");

        wool.assign_id(35);
        assert_eq!(red.id(), Some(35));
    }

    #[test]
    fn sub_material_table() {
        let wool = Material::new("Wool", MaterialKind::Block);
        let red = Material::sub_material(&wool, "Red Wool", 14);
        let blue = Material::sub_material(&wool, "Blue Wool", 11);
        assert!(!red.is_registered());

        wool.register_sub_material(Arc::clone(&red)).unwrap();
        wool.register_sub_material(Arc::clone(&blue)).unwrap();
        assert!(red.is_registered());
        assert!(wool.has_sub_materials());

        let names: Vec<String> = wool
            .sub_materials()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["Blue Wool", "Red Wool"]);
        assert_eq!(wool.sub_material_for(14).unwrap().name(), "Red Wool");
        assert!(wool.sub_material_for(3).is_none());
    }

    #[test]
    fn sub_material_data_collision() {
        let wool = Material::new("Wool", MaterialKind::Block);
        let red = Material::sub_material(&wool, "Red Wool", 14);
        let crimson = Material::sub_material(&wool, "Crimson Wool", 14);

        wool.register_sub_material(Arc::clone(&red)).unwrap();
        assert!(matches!(
            wool.register_sub_material(Arc::clone(&red)),
            Err(MaterialError::AlreadyRegistered(_))
        ));
        assert!(matches!(
            wool.register_sub_material(Arc::clone(&crimson)),
            Err(MaterialError::SubMaterialConflict { data: 14, .. })
        ));
        assert!(!crimson.is_registered());
    }
}
