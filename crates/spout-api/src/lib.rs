//! Plugin API: entity, player and controller interfaces, events, GUI screens,
//! and protocol helpers.
//!
//! The traits here are implemented by the host engine and consumed by plugins.
//! Nothing here renders or talks to clients; event listeners are simply run in
//! order when an event is called.

pub mod command;
pub mod controller;
pub mod engine;
pub mod entity;
pub mod error;
pub mod event;
pub mod gui;
pub mod input;
pub mod player;
pub mod protocol;

pub use command::CommandSource;
pub use controller::{
    BasicPlayer, Controller, ControllerType, PlayerController, PlayerControllerBase,
};
pub use engine::Engine;
pub use entity::{Entity, Point, World};
pub use error::ApiError;
pub use event::{Event, HandlerList, ListenerId, Order, PlayerSaveEvent};
pub use gui::{OverlayScreen, Screen, ScreenType, Widget, WidgetType};
pub use input::{InputFlags, PlayerInputState};
pub use player::Player;
pub use protocol::{NetworkSynchronizer, ProtocolEvent, Session};

#[cfg(test)]
pub(crate) mod testing;
