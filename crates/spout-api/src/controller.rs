//! Behaviour attached to entities.
//!
//! A [`Controller`] receives the engine's per-tick hooks. Player controllers
//! usually embed a [`BasicPlayer`], which tracks the owning player and
//! forwards the death/snapshot/tick-end hooks to that player's
//! [`NetworkSynchronizer`](crate::NetworkSynchronizer).

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use tracing::debug;

use crate::{ApiError, CommandSource, NetworkSynchronizer, Player};

/// Identifies a kind of controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControllerType {
    name: String,
    id: u32,
}

impl ControllerType {
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl fmt::Display for ControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// Logic driving an entity.
pub trait Controller: Send + Sync {
    fn controller_type(&self) -> &ControllerType;

    /// Called once the controller is attached to its entity.
    fn on_attached(&self) {}

    /// Advance by `dt` seconds.
    fn on_tick(&self, dt: f32);

    fn on_death(&self) {}

    fn pre_snapshot(&self) {}

    fn finalize_tick(&self) {}
}

/// Controller of a player entity.
pub trait PlayerController: Controller {
    /// The controlled player, while it is alive.
    fn player(&self) -> Option<Arc<dyn Player>>;
}

/// Forwards lifecycle hooks of a player's controller to the player's
/// network synchronizer.
pub struct PlayerControllerBase {
    player: Weak<dyn Player>,
    controller: ControllerType,
}

impl PlayerControllerBase {
    pub fn new(player: &Arc<dyn Player>, controller: ControllerType) -> Self {
        Self {
            player: Arc::downgrade(player),
            controller,
        }
    }

    pub fn player(&self) -> Option<Arc<dyn Player>> {
        self.player.upgrade()
    }

    pub fn controller_type(&self) -> &ControllerType {
        &self.controller
    }

    pub fn on_death(&self) {
        if let Some(sync) = self.synchronizer() {
            sync.on_death();
        }
    }

    pub fn pre_snapshot(&self) {
        if let Some(sync) = self.synchronizer() {
            sync.pre_snapshot();
        }
    }

    pub fn on_tick(&self, _dt: f32) {}

    pub fn finalize_tick(&self) {
        if let Some(sync) = self.synchronizer() {
            sync.finalize_tick();
        }
    }

    fn synchronizer(&self) -> Option<Arc<dyn NetworkSynchronizer>> {
        self.player()?.network_synchronizer()
    }
}

impl fmt::Debug for PlayerControllerBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerControllerBase")
            .field("player", &self.player().map(|p| p.name().to_string()))
            .field("controller", &self.controller)
            .finish()
    }
}

/// Shared state for player controllers: the controller type and the player it
/// is attached to. `on_tick` is left to the embedding controller.
#[derive(Debug)]
pub struct BasicPlayer {
    controller_type: ControllerType,
    base: OnceLock<PlayerControllerBase>,
}

impl BasicPlayer {
    pub fn new(controller_type: ControllerType) -> Self {
        Self {
            controller_type,
            base: OnceLock::new(),
        }
    }

    pub fn controller_type(&self) -> &ControllerType {
        &self.controller_type
    }

    /// Bind to `player`. A controller belongs to one player for its lifetime.
    pub fn attach(&self, player: &Arc<dyn Player>) -> Result<(), ApiError> {
        self.base
            .set(PlayerControllerBase::new(player, self.controller_type.clone()))
            .map_err(|_| ApiError::ControllerAlreadyAttached(self.controller_type.to_string()))?;
        debug!("Attached {} to {}", self.controller_type, player.name());
        Ok(())
    }

    /// The player this controller is attached to.
    pub fn parent(&self) -> Option<Arc<dyn Player>> {
        self.base.get()?.player()
    }

    pub fn on_attached(&self) {}

    pub fn on_death(&self) {
        if let Some(base) = self.base.get() {
            base.on_death();
        }
    }

    pub fn pre_snapshot(&self) {
        if let Some(base) = self.base.get() {
            base.pre_snapshot();
        }
    }

    pub fn finalize_tick(&self) {
        if let Some(base) = self.base.get() {
            base.finalize_tick();
        }
    }
}
