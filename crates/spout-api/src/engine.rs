//! The host engine as seen by plugins.

use std::path::Path;
use std::sync::Arc;

use crate::Player;

/// Handle to the running engine.
pub trait Engine: Send + Sync {
    /// Players currently connected.
    fn online_players(&self) -> Vec<Arc<dyn Player>>;

    /// Directory holding world data and server-wide stores.
    fn world_folder(&self) -> &Path;

    /// Online player with the given name (case-insensitive).
    fn player(&self, name: &str) -> Option<Arc<dyn Player>> {
        self.online_players()
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }
}
