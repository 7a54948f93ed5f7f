//! Anything that can issue commands and receive replies.

/// A command sender: a player, the console, an RCON client.
pub trait CommandSource: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver a message. Returns `false` if it could not be delivered.
    fn send_message(&self, message: &str) -> bool;

    fn has_permission(&self, node: &str) -> bool;
}
