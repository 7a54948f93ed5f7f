//! Shared test doubles.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use spout_api::Session;

use crate::config::ServerConfig;
use crate::engine::ServerEngine;
use crate::player::ServerPlayer;

/// Session that records what it was sent.
#[derive(Default)]
pub struct TestSession {
    closed: AtomicBool,
    received: Mutex<Vec<String>>,
    reason: Mutex<Option<String>>,
}

impl TestSession {
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    /// Reason passed to the last `disconnect`.
    pub fn kick_reason(&self) -> Option<String> {
        self.reason.lock().unwrap().clone()
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Session for TestSession {
    fn address(&self) -> SocketAddr {
        "192.168.1.20:52100".parse().unwrap()
    }

    fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    fn send_text(&self, message: &str) {
        self.received.lock().unwrap().push(message.to_string());
    }

    fn disconnect(&self, reason: &str) {
        *self.reason.lock().unwrap() = Some(reason.to_string());
        self.close();
    }
}

/// Default config with a fresh world folder and `Admin` as op.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.world.folder =
        std::env::temp_dir().join(format!("spout_engine_{}", rand::random::<u64>()));
    config.permissions.ops = vec!["Admin".into()];
    config
}

pub fn join(engine: &ServerEngine, name: &str) -> (Arc<ServerPlayer>, Arc<TestSession>) {
    let session = Arc::new(TestSession::default());
    let player = engine
        .connect(name, Arc::clone(&session) as Arc<dyn Session>)
        .unwrap();
    (player, session)
}
