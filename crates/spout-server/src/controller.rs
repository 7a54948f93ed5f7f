//! Default controller attached to every player on join.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use spout_api::{ApiError, BasicPlayer, Controller, ControllerType, Player, PlayerController};

/// Type id of [`PlayerBehavior`].
pub const PLAYER_CONTROLLER_ID: u32 = 1;

/// Counts the ticks a player has been online and forwards lifecycle hooks to
/// the player's network synchronizer.
#[derive(Debug)]
pub struct PlayerBehavior {
    basic: BasicPlayer,
    ticks_lived: AtomicU64,
}

impl PlayerBehavior {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            basic: BasicPlayer::new(ControllerType::new("player", PLAYER_CONTROLLER_ID)),
            ticks_lived: AtomicU64::new(0),
        })
    }

    pub fn attach(&self, player: &Arc<dyn Player>) -> Result<(), ApiError> {
        self.basic.attach(player)?;
        self.on_attached();
        Ok(())
    }

    pub fn ticks_lived(&self) -> u64 {
        self.ticks_lived.load(Ordering::Relaxed)
    }

    /// Restore the counter from saved player data.
    pub fn set_ticks_lived(&self, ticks: u64) {
        self.ticks_lived.store(ticks, Ordering::Relaxed);
    }
}

impl Controller for PlayerBehavior {
    fn controller_type(&self) -> &ControllerType {
        self.basic.controller_type()
    }

    fn on_attached(&self) {
        self.basic.on_attached();
    }

    fn on_tick(&self, _dt: f32) {
        self.ticks_lived.fetch_add(1, Ordering::Relaxed);
    }

    fn on_death(&self) {
        self.basic.on_death();
    }

    fn pre_snapshot(&self) {
        self.basic.pre_snapshot();
    }

    fn finalize_tick(&self) {
        self.basic.finalize_tick();
    }
}

impl PlayerController for PlayerBehavior {
    fn player(&self) -> Option<Arc<dyn Player>> {
        self.basic.parent()
    }
}
