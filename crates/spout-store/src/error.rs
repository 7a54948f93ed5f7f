//! Store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store data truncated: need {needed} more bytes, have {remaining}")]
    Truncated { needed: usize, remaining: usize },

    #[error("invalid UTF-8 in store key")]
    InvalidUtf8,

    #[error("key too long: {len} bytes (limit: {limit})")]
    KeyTooLong { len: usize, limit: usize },

    #[error("id range [{min}, {max}) exhausted")]
    IdRangeExhausted { min: i32, max: i32 },
}
