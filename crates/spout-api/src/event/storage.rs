//! Storage events.

use std::fmt;
use std::sync::Arc;

use crate::event::{Event, HandlerList};
use crate::PlayerController;

/// Fired when a player's data is about to be saved.
///
/// A plugin that stores the data itself marks the event saved. If nobody
/// does, the engine's default save handler writes it.
pub struct PlayerSaveEvent {
    player: Arc<dyn PlayerController>,
    saved: bool,
}

impl PlayerSaveEvent {
    pub fn new(player: Arc<dyn PlayerController>) -> Self {
        Self {
            player,
            saved: false,
        }
    }

    /// Controller of the player whose data is being saved.
    pub fn player(&self) -> &Arc<dyn PlayerController> {
        &self.player
    }

    /// Whether a listener already saved the data.
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn set_saved(&mut self, saved: bool) {
        self.saved = saved;
    }
}

impl fmt::Debug for PlayerSaveEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerSaveEvent")
            .field("controller", self.player.controller_type())
            .field("saved", &self.saved)
            .finish()
    }
}

impl Event for PlayerSaveEvent {
    fn handlers() -> &'static HandlerList<Self> {
        static HANDLERS: HandlerList<PlayerSaveEvent> = HandlerList::new();
        &HANDLERS
    }
}
