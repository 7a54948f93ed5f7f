use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default)]
    pub materials: MaterialsSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub permissions: PermissionsSection,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
}

fn default_server_name() -> String {
    "Spout Server".into()
}

fn default_tick_rate() -> u32 {
    20
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            tick_rate: default_tick_rate(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WorldSection {
    #[serde(default = "default_world_name")]
    pub name: String,
    /// Folder holding world data, player files and the material store.
    #[serde(default = "default_world_folder")]
    pub folder: PathBuf,
    #[serde(default = "default_spawn")]
    pub spawn: [f32; 3],
}

fn default_world_name() -> String {
    "world".into()
}

fn default_world_folder() -> PathBuf {
    PathBuf::from("world")
}

fn default_spawn() -> [f32; 3] {
    [0.5, 64.0, 0.5]
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            folder: default_world_folder(),
            spawn: default_spawn(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MaterialsSection {
    /// Material id store, relative to the world folder.
    #[serde(default = "default_store_file")]
    pub store_file: String,
}

fn default_store_file() -> String {
    spout_material::STORE_FILE.into()
}

impl Default for MaterialsSection {
    fn default() -> Self {
        Self {
            store_file: default_store_file(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PermissionsSection {
    /// Player names granted every permission node.
    #[serde(default)]
    pub ops: Vec<String>,
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Interval between ticks in seconds.
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.server.tick_rate.max(1) as f32
    }
}
