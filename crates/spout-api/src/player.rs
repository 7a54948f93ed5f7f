//! The player interface.

use std::net::IpAddr;
use std::sync::Arc;

use crate::{
    ApiError, CommandSource, Entity, NetworkSynchronizer, PlayerController, PlayerInputState,
    Session,
};

/// A connected (or recently connected) player.
///
/// Every method is safe to call from any thread.
pub trait Player: CommandSource + Entity {
    fn display_name(&self) -> String;

    fn set_display_name(&self, name: &str);

    /// Send `message` as if the player had typed it into chat.
    fn chat(&self, message: &str);

    /// Attach the synchronizer that streams world state to this player's
    /// client. Only one may be set per login.
    fn set_network_synchronizer(
        &self,
        synchronizer: Arc<dyn NetworkSynchronizer>,
    ) -> Result<(), ApiError>;

    fn network_synchronizer(&self) -> Option<Arc<dyn NetworkSynchronizer>>;

    /// The player's connection, or `None` if offline.
    fn session(&self) -> Option<Arc<dyn Session>>;

    fn is_online(&self) -> bool;

    /// Remote address of the session.
    fn address(&self) -> Option<IpAddr> {
        self.session().map(|s| s.address().ip())
    }

    /// Kick without a reason.
    fn kick(&self) {
        self.kick_with("");
    }

    fn kick_with(&self, reason: &str);

    /// Keys and mouse movement from the last input update.
    fn input(&self) -> PlayerInputState;

    fn controller(&self) -> Option<Arc<dyn PlayerController>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPlayer, MockSession, MockSynchronizer};

    #[test]
    fn address_comes_from_session() {
        let player = MockPlayer::new("Alice", 1);
        assert_eq!(player.address(), None);

        player.connect(MockSession::new("10.0.0.7:50000"));
        assert_eq!(player.address(), Some("10.0.0.7".parse().unwrap()));
    }

    #[test]
    fn kick_without_reason_uses_empty_message() {
        let player = MockPlayer::new("Alice", 1);
        let session = MockSession::new("127.0.0.1:19132");
        player.connect(session.clone());

        player.kick();
        assert_eq!(session.disconnect_reason().as_deref(), Some(""));
        assert!(!player.is_online());
    }

    #[test]
    fn synchronizer_only_set_once() {
        let player = MockPlayer::new("Alice", 1);
        let first = MockSynchronizer::new();
        player.set_network_synchronizer(first).unwrap();
        let second = MockSynchronizer::new();
        assert!(matches!(
            player.set_network_synchronizer(second),
            Err(ApiError::SynchronizerAlreadySet(_))
        ));
    }
}
