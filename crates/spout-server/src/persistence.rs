//! Default player save handler: JSON files under `<world>/players/`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spout_api::{Player, World};
use tracing::warn;

use crate::player::ServerPlayer;

/// Serializable player data for JSON persistence.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub display_name: String,
    pub world: String,
    pub position: Option<[f32; 3]>,
    #[serde(default)]
    pub ticks_lived: u64,
    #[serde(default)]
    pub last_address: Option<String>,
}

impl PlayerData {
    /// Extract persistent state from a player.
    pub fn from_player(player: &ServerPlayer) -> Self {
        Self {
            display_name: player.display_name(),
            world: player.server_world().name().to_string(),
            position: player.location(),
            ticks_lived: player.behavior().map_or(0, |b| b.ticks_lived()),
            last_address: player.address().map(|a| a.to_string()),
        }
    }

    /// Apply loaded data to a freshly joined player.
    pub fn apply_to_player(&self, player: &ServerPlayer) {
        player.set_display_name(&self.display_name);
        if let Some(behavior) = player.behavior() {
            behavior.set_ticks_lived(self.ticks_lived);
        }
    }

    /// Saved position, if the player was last seen in `world`.
    pub fn position_in(&self, world: &str) -> Option<[f32; 3]> {
        if self.world == world {
            self.position
        } else {
            None
        }
    }

    /// Load player data from a JSON file.
    pub fn load(world_dir: &Path, name: &str) -> Option<Self> {
        let path = data_path(world_dir, name);
        let data = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&data) {
            Ok(player) => Some(player),
            Err(e) => {
                warn!("Failed to parse player data for {name}: {e}");
                None
            }
        }
    }

    /// Save player data to a JSON file.
    pub fn save(&self, world_dir: &Path, name: &str) -> std::io::Result<()> {
        let path = data_path(world_dir, name);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&path, json)
    }
}

fn data_path(world_dir: &Path, name: &str) -> PathBuf {
    world_dir
        .join("players")
        .join(format!("{}.json", name.to_lowercase()))
}
