//! Connection-facing interfaces and broadcast helpers.

use std::any::Any;
use std::fmt::Debug;
use std::net::SocketAddr;

pub mod util;

pub use util::{
    execute_with_all_players, execute_with_nearby_players, execute_with_nearby_players_of,
    execute_with_nearest_player, execute_with_players, CallProtocolEvent, PlayerCallback,
};

/// A client connection.
pub trait Session: Send + Sync {
    fn address(&self) -> SocketAddr;

    fn is_connected(&self) -> bool;

    /// Deliver a chat/system line to the client.
    fn send_text(&self, message: &str);

    /// Close the connection, showing `reason` to the client.
    fn disconnect(&self, reason: &str);
}

/// A game occurrence that a [`NetworkSynchronizer`] translates into packets.
///
/// Synchronizers recover the concrete type through [`as_any`](Self::as_any).
pub trait ProtocolEvent: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Per-player component that streams world and entity state to a client.
pub trait NetworkSynchronizer: Send + Sync {
    fn on_death(&self);

    /// Called before the engine snapshots world state for this tick.
    fn pre_snapshot(&self);

    /// Called once all controllers have ticked.
    fn finalize_tick(&self);

    fn call_protocol_event(&self, event: &dyn ProtocolEvent);
}
