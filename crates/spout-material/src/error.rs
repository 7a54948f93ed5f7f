//! Material registry errors.

use spout_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("material registry has not been set up")]
    NotSetUp,

    #[error("can not set up material registry twice")]
    AlreadySetUp,

    #[error("another material ({existing}) is already mapped to id {id}")]
    IdConflict { id: u16, existing: String },

    #[error("material {0} is already registered")]
    AlreadyRegistered(String),

    #[error("{parent} already has a sub-material with data {data}")]
    SubMaterialConflict { parent: String, data: u16 },

    #[error("parent of sub-material {0} no longer exists")]
    ParentDropped(String),

    #[error("id {0} does not fit the slot table")]
    IdOutOfRange(i32),

    #[error("material store error: {0}")]
    Store(#[from] StoreError),
}
