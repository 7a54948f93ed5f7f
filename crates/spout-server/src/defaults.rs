//! Built-in materials registered at startup.

use std::sync::Arc;

use spout_material::{Material, MaterialError, MaterialKind, MaterialRegistry};

/// Blocks with their preferred ids.
const BLOCKS: &[(&str, u16)] = &[
    ("air", 0),
    ("stone", 1),
    ("grass", 2),
    ("dirt", 3),
    ("cobblestone", 4),
    ("planks", 5),
    ("bedrock", 7),
    ("water", 8),
    ("lava", 10),
    ("sand", 12),
    ("gravel", 13),
    ("log", 17),
    ("leaves", 18),
    ("glass", 20),
    ("wool", 35),
];

/// Items with their preferred ids.
const ITEMS: &[(&str, u16)] = &[
    ("iron_shovel", 256),
    ("iron_pickaxe", 257),
    ("flint_and_steel", 259),
    ("apple", 260),
    ("bow", 261),
    ("arrow", 262),
    ("stick", 280),
];

/// Wool colours, indexed by data value.
const WOOL_COLOURS: [&str; 16] = [
    "white",
    "orange",
    "magenta",
    "light_blue",
    "yellow",
    "lime",
    "pink",
    "gray",
    "light_gray",
    "cyan",
    "purple",
    "blue",
    "brown",
    "green",
    "red",
    "black",
];

/// Register the built-in blocks, items and wool colours.
/// Returns the number of top-level materials registered.
pub fn register_defaults(registry: &MaterialRegistry) -> Result<usize, MaterialError> {
    let mut count = 0;
    for &(name, id) in BLOCKS {
        registry.register_with_id(Material::new(name, MaterialKind::Block), id)?;
        count += 1;
    }
    for &(name, id) in ITEMS {
        registry.register_with_id(Material::new(name, MaterialKind::Item), id)?;
        count += 1;
    }

    if let Some(wool) = registry.get_by_name("wool") {
        for (data, colour) in WOOL_COLOURS.iter().enumerate() {
            let sub = Material::sub_material(&wool, format!("{colour}_wool"), data as u16);
            registry.register(Arc::clone(&sub))?;
        }
    }
    Ok(count)
}
