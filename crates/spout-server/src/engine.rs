//! Headless engine: owns the world, the players and the material registry,
//! and drives controller hooks once per tick.
//!
//! Networking is not part of this crate; a transport hands connections to
//! [`ServerEngine::connect`] as [`Session`]s.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use spout_api::event::{self, PlayerSaveEvent};
use spout_api::protocol;
use spout_api::{
    ApiError, CommandSource, Engine, Player, PlayerController, PlayerInputState, Session, World,
};
use spout_material::{MaterialError, MaterialRegistry};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::controller::PlayerBehavior;
use crate::defaults;
use crate::persistence::PlayerData;
use crate::player::{ChatLine, ServerPlayer};
use crate::world::ServerWorld;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0} is already online")]
    AlreadyOnline(String),

    #[error("invalid player name: {0:?}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Material(#[from] MaterialError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct ServerEngine {
    world_folder: PathBuf,
    spawn: [f32; 3],
    tick_seconds: f32,
    ops: HashSet<String>,
    world: Arc<ServerWorld>,
    materials: MaterialRegistry,
    /// Keyed by lowercase player name.
    players: DashMap<String, Arc<ServerPlayer>>,
    next_entity_id: AtomicI32,
    ticks: AtomicU64,
    chat_tx: UnboundedSender<ChatLine>,
    chat_rx: Mutex<UnboundedReceiver<ChatLine>>,
}

impl ServerEngine {
    /// Create the world folder, set up the material registry from its store
    /// and register the built-in materials.
    pub fn new(config: &ServerConfig) -> Result<Arc<Self>, EngineError> {
        let world_folder = config.world.folder.clone();
        std::fs::create_dir_all(&world_folder)?;

        let materials = MaterialRegistry::new();
        materials.setup_file(&world_folder.join(&config.materials.store_file))?;
        let count = defaults::register_defaults(&materials)?;
        info!("Registered {count} materials");

        let (chat_tx, chat_rx) = mpsc::unbounded_channel();
        Ok(Arc::new(Self {
            world_folder,
            spawn: config.world.spawn,
            tick_seconds: config.tick_seconds(),
            ops: config
                .permissions
                .ops
                .iter()
                .map(|name| name.to_lowercase())
                .collect(),
            world: ServerWorld::new(config.world.name.clone()),
            materials,
            players: DashMap::new(),
            next_entity_id: AtomicI32::new(1),
            ticks: AtomicU64::new(0),
            chat_tx,
            chat_rx: Mutex::new(chat_rx),
        }))
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn world(&self) -> &Arc<ServerWorld> {
        &self.world
    }

    pub fn current_tick(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Log a player in over `session`: attach its controller, restore saved
    /// data and spawn it.
    ///
    /// The name is claimed atomically, so of several concurrent logins under
    /// one name exactly one succeeds. A claimed entry whose session has closed
    /// is retired and replaced.
    pub fn connect(
        &self,
        name: &str,
        session: Arc<dyn Session>,
    ) -> Result<Arc<ServerPlayer>, EngineError> {
        if !is_valid_name(name) {
            return Err(EngineError::InvalidName(name.to_string()));
        }
        let key = name.to_lowercase();

        let id = self.next_entity_id.fetch_add(1, Ordering::Relaxed);
        let player = ServerPlayer::new(
            id,
            name,
            self.ops.contains(&key),
            Arc::clone(&self.world),
            session,
            self.chat_tx.clone(),
        );
        player.set_behavior(PlayerBehavior::new())?;

        let stale = match self.players.entry(key) {
            Entry::Occupied(entry) if entry.get().is_online() => {
                return Err(EngineError::AlreadyOnline(name.to_string()));
            }
            Entry::Occupied(mut entry) => Some(entry.insert(Arc::clone(&player))),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&player));
                None
            }
        };
        if let Some(stale) = stale {
            self.retire(&stale);
        }

        let saved = PlayerData::load(&self.world_folder, name);
        if let Some(data) = &saved {
            data.apply_to_player(&player);
        }
        let spawn = saved
            .and_then(|data| data.position_in(self.world.name()))
            .unwrap_or(self.spawn);
        player.spawn_at(spawn);

        info!(
            "{name} joined the game (entity id {id}, at {:.1}, {:.1}, {:.1})",
            spawn[0], spawn[1], spawn[2]
        );
        Ok(player)
    }

    /// Save and remove a player. Returns `false` if it was not known.
    pub fn disconnect(&self, name: &str) -> bool {
        let Some((_, player)) = self.players.remove(&name.to_lowercase()) else {
            return false;
        };
        self.retire(&player);
        true
    }

    fn retire(&self, player: &ServerPlayer) {
        self.save_player(player);
        player.despawn();
        info!("{} left the game", player.name());
    }

    /// Record the latest input reported by `name`'s client.
    pub fn update_input(&self, name: &str, input: PlayerInputState) -> Result<(), EngineError> {
        let player = self
            .players
            .get(&name.to_lowercase())
            .map(|entry| Arc::clone(entry.value()))
            .filter(|player| player.is_online())
            .ok_or_else(|| ApiError::PlayerOffline(name.to_string()))?;
        player.set_input(input);
        Ok(())
    }

    /// Advance the server by one tick.
    pub fn tick(&self) {
        let dt = self.tick_seconds;
        self.broadcast_chat();

        let controllers: Vec<Arc<dyn PlayerController>> = self
            .players
            .iter()
            .filter(|entry| entry.value().is_online())
            .filter_map(|entry| entry.value().controller())
            .collect();
        for controller in &controllers {
            controller.on_tick(dt);
        }
        for controller in &controllers {
            controller.pre_snapshot();
        }
        for controller in &controllers {
            controller.finalize_tick();
        }

        self.reap_disconnected();
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    fn broadcast_chat(&self) {
        let mut rx = self.chat_rx.lock().unwrap_or_else(|e| e.into_inner());
        while let Ok(line) = rx.try_recv() {
            let text = line.format();
            info!("{text}");
            protocol::execute_with_all_players(self, |player: &Arc<dyn Player>| {
                player.send_message(&text);
            });
        }
    }

    fn reap_disconnected(&self) {
        let gone: Vec<String> = self
            .players
            .iter()
            .filter(|entry| !entry.value().is_online())
            .map(|entry| entry.key().clone())
            .collect();
        for key in gone {
            // A fresh login may have claimed the name since the scan.
            if let Some((_, player)) = self.players.remove_if(&key, |_, p| !p.is_online()) {
                self.retire(&player);
            }
        }
    }

    /// Fire [`PlayerSaveEvent`] for `player` and write its data unless a
    /// listener already did. Returns `true` if the default handler wrote it.
    pub fn save_player(&self, player: &ServerPlayer) -> bool {
        if let Some(controller) = player.controller() {
            let event = event::call(PlayerSaveEvent::new(controller));
            if event.is_saved() {
                debug!("Player data for {} saved by a listener", player.name());
                return false;
            }
        }
        match PlayerData::from_player(player).save(&self.world_folder, player.name()) {
            Ok(()) => {
                debug!("Saved player data for {}", player.name());
                true
            }
            Err(e) => {
                warn!("Failed to save player data for {}: {e}", player.name());
                false
            }
        }
    }

    /// Save every player and the material id store.
    pub fn save_all(&self) {
        let players: Vec<Arc<ServerPlayer>> = self
            .players
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for player in &players {
            self.save_player(player);
        }
        if let Err(e) = self.materials.save() {
            warn!("Failed to save material ids: {e}");
        }
        info!("Saved {} players", players.len());
    }

    /// Tick at the configured rate until `shutdown` flips.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(Duration::from_secs_f32(self.tick_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(),
                _ = shutdown.changed() => break,
            }
        }
    }

    /// Save everything, then disconnect all players.
    pub fn shutdown(&self) {
        self.save_all();
        for entry in self.players.iter() {
            entry.value().kick_with("Server closed");
            entry.value().despawn();
        }
        self.players.clear();
        info!("Shut down after {} ticks", self.current_tick());
    }
}

/// Names are 1-16 ASCII letters, digits or underscores; they double as file
/// names under `<world>/players/`.
fn is_valid_name(name: &str) -> bool {
    (1..=16).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Engine for ServerEngine {
    fn online_players(&self) -> Vec<Arc<dyn Player>> {
        self.players
            .iter()
            .filter(|entry| entry.value().is_online())
            .map(|entry| Arc::clone(entry.value()) as Arc<dyn Player>)
            .collect()
    }

    fn world_folder(&self) -> &Path {
        &self.world_folder
    }
}
