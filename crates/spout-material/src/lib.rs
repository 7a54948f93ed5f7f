//! Material definitions and the id registry for blocks and items.

pub mod error;
pub mod material;
pub mod registry;

pub use error::MaterialError;
pub use material::{Material, MaterialKind};
pub use registry::{MaterialRegistry, MAX_SIZE, STORE_FILE};
