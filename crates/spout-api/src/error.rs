//! API error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network synchronizer already set for {0}")]
    SynchronizerAlreadySet(String),

    #[error("controller {0} is already attached to a player")]
    ControllerAlreadyAttached(String),

    #[error("player {0} is offline")]
    PlayerOffline(String),
}
