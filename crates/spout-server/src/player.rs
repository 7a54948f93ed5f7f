//! Server-side player.

use std::net::IpAddr;
use std::sync::{Arc, OnceLock, RwLock};

use spout_api::{
    ApiError, CommandSource, Entity, NetworkSynchronizer, Player, PlayerController,
    PlayerInputState, Point, Session, World,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::controller::PlayerBehavior;
use crate::world::ServerWorld;

/// A chat line waiting to be broadcast on the next tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub sender: String,
    pub message: String,
}

impl ChatLine {
    pub fn format(&self) -> String {
        format!("<{}> {}", self.sender, self.message)
    }
}

pub struct ServerPlayer {
    id: i32,
    name: String,
    op: bool,
    address: IpAddr,
    world: Arc<ServerWorld>,
    display_name: RwLock<String>,
    location: RwLock<Option<[f32; 3]>>,
    input: RwLock<PlayerInputState>,
    session: RwLock<Option<Arc<dyn Session>>>,
    synchronizer: OnceLock<Arc<dyn NetworkSynchronizer>>,
    behavior: OnceLock<Arc<PlayerBehavior>>,
    chat: UnboundedSender<ChatLine>,
}

impl ServerPlayer {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        op: bool,
        world: Arc<ServerWorld>,
        session: Arc<dyn Session>,
        chat: UnboundedSender<ChatLine>,
    ) -> Arc<Self> {
        let name = name.into();
        let address = session.address().ip();
        Arc::new(Self {
            id,
            display_name: RwLock::new(name.clone()),
            name,
            op,
            address,
            world,
            location: RwLock::new(None),
            input: RwLock::new(PlayerInputState::IDLE),
            session: RwLock::new(Some(session)),
            synchronizer: OnceLock::new(),
            behavior: OnceLock::new(),
            chat,
        })
    }

    /// Place the player in its world at `position`.
    pub fn spawn_at(self: &Arc<Self>, position: [f32; 3]) {
        *self.location.write().unwrap_or_else(|e| e.into_inner()) = Some(position);
        self.world.add_player(self);
    }

    /// Remove the player from its world; it keeps no position afterwards.
    pub fn despawn(&self) {
        *self.location.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.world.remove_player(self.id);
    }

    pub fn location(&self) -> Option<[f32; 3]> {
        *self.location.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_location(&self, position: [f32; 3]) {
        let mut location = self.location.write().unwrap_or_else(|e| e.into_inner());
        if location.is_some() {
            *location = Some(position);
        }
    }

    pub fn server_world(&self) -> &Arc<ServerWorld> {
        &self.world
    }

    pub fn set_input(&self, input: PlayerInputState) {
        *self.input.write().unwrap_or_else(|e| e.into_inner()) = input;
    }

    /// Install the player's controller. Only one per login.
    pub fn set_behavior(self: &Arc<Self>, behavior: Arc<PlayerBehavior>) -> Result<(), ApiError> {
        let player: Arc<dyn Player> = Arc::clone(self) as Arc<dyn Player>;
        behavior.attach(&player)?;
        self.behavior
            .set(behavior)
            .map_err(|_| ApiError::ControllerAlreadyAttached(self.name.clone()))
    }

    pub fn behavior(&self) -> Option<&Arc<PlayerBehavior>> {
        self.behavior.get()
    }

    fn connected_session(&self) -> Option<Arc<dyn Session>> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .filter(|s| s.is_connected())
            .cloned()
    }
}

impl CommandSource for ServerPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_message(&self, message: &str) -> bool {
        match self.connected_session() {
            Some(session) => {
                session.send_text(message);
                true
            }
            None => false,
        }
    }

    fn has_permission(&self, _node: &str) -> bool {
        self.op
    }
}

impl Entity for ServerPlayer {
    fn id(&self) -> i32 {
        self.id
    }

    fn world(&self) -> Option<Arc<dyn World>> {
        Some(Arc::clone(&self.world) as Arc<dyn World>)
    }

    fn position(&self) -> Option<Point> {
        let [x, y, z] = self.location()?;
        Some(Point::new(Arc::clone(&self.world) as Arc<dyn World>, x, y, z))
    }
}

impl Player for ServerPlayer {
    fn display_name(&self) -> String {
        self.display_name
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_display_name(&self, name: &str) {
        *self.display_name.write().unwrap_or_else(|e| e.into_inner()) = name.to_string();
    }

    fn chat(&self, message: &str) {
        let line = ChatLine {
            sender: self.display_name(),
            message: message.to_string(),
        };
        if self.chat.send(line).is_err() {
            debug!("Dropped chat from {}: server is shutting down", self.name);
        }
    }

    fn set_network_synchronizer(
        &self,
        synchronizer: Arc<dyn NetworkSynchronizer>,
    ) -> Result<(), ApiError> {
        self.synchronizer
            .set(synchronizer)
            .map_err(|_| ApiError::SynchronizerAlreadySet(self.name.clone()))
    }

    fn network_synchronizer(&self) -> Option<Arc<dyn NetworkSynchronizer>> {
        self.synchronizer.get().cloned()
    }

    fn session(&self) -> Option<Arc<dyn Session>> {
        self.connected_session()
    }

    fn is_online(&self) -> bool {
        self.connected_session().is_some()
    }

    /// Address the player logged in from; kept after disconnecting.
    fn address(&self) -> Option<IpAddr> {
        Some(self.address)
    }

    fn kick_with(&self, reason: &str) {
        let session = self
            .session
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(session) = session {
            session.disconnect(reason);
            if reason.is_empty() {
                info!("Kicked {}", self.name);
            } else {
                info!("Kicked {}: {reason}", self.name);
            }
        }
    }

    fn input(&self) -> PlayerInputState {
        *self.input.read().unwrap_or_else(|e| e.into_inner())
    }

    fn controller(&self) -> Option<Arc<dyn PlayerController>> {
        self.behavior
            .get()
            .map(|b| Arc::clone(b) as Arc<dyn PlayerController>)
    }
}
