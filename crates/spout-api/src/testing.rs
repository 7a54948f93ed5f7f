//! Hand-written trait implementations shared by the unit tests.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use crate::{
    ApiError, CommandSource, Controller, ControllerType, Engine, Entity, NetworkSynchronizer,
    Player, PlayerController, PlayerInputState, Point, ProtocolEvent, Session, World,
};

// ─── World ───────────────────────────────────────────────────────────────────

pub struct MockWorld {
    name: String,
    players: Mutex<Vec<Weak<MockPlayer>>>,
}

impl MockWorld {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            players: Mutex::new(Vec::new()),
        })
    }

    fn spawned(&self) -> Vec<Arc<MockPlayer>> {
        self.players
            .lock()
            .unwrap()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }
}

impl World for MockWorld {
    fn name(&self) -> &str {
        &self.name
    }

    fn nearby_players(
        &self,
        position: &Point,
        ignore: Option<&dyn Entity>,
        range: i32,
    ) -> Vec<Arc<dyn Player>> {
        let ignored = ignore.map(|e| e.id());
        self.spawned()
            .into_iter()
            .filter(|p| Some(p.id) != ignored)
            .filter(|p| {
                p.position()
                    .is_some_and(|pos| pos.distance(position) <= range as f32)
            })
            .map(|p| p as Arc<dyn Player>)
            .collect()
    }

    fn nearest_player(&self, entity: &dyn Entity, range: i32) -> Option<Arc<dyn Player>> {
        let origin = entity.position()?;
        self.spawned()
            .into_iter()
            .filter(|p| p.id != entity.id())
            .filter_map(|p| {
                let distance = p.position()?.distance(&origin);
                (distance <= range as f32).then_some((distance, p))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p as Arc<dyn Player>)
    }
}

// ─── Session ─────────────────────────────────────────────────────────────────

pub struct MockSession {
    address: SocketAddr,
    connected: AtomicBool,
    reason: Mutex<Option<String>>,
    texts: Mutex<Vec<String>>,
}

impl MockSession {
    pub fn new(address: &str) -> Arc<Self> {
        Arc::new(Self {
            address: address.parse().unwrap(),
            connected: AtomicBool::new(true),
            reason: Mutex::new(None),
            texts: Mutex::new(Vec::new()),
        })
    }

    pub fn disconnect_reason(&self) -> Option<String> {
        self.reason.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

impl Session for MockSession {
    fn address(&self) -> SocketAddr {
        self.address
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn send_text(&self, message: &str) {
        self.texts.lock().unwrap().push(message.to_string());
    }

    fn disconnect(&self, reason: &str) {
        self.connected.store(false, Ordering::Relaxed);
        *self.reason.lock().unwrap() = Some(reason.to_string());
    }
}

// ─── Synchronizer ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockSynchronizer {
    deaths: AtomicU32,
    pre_snapshots: AtomicU32,
    finalized: AtomicU32,
    events: Mutex<Vec<String>>,
}

impl MockSynchronizer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn deaths(&self) -> u32 {
        self.deaths.load(Ordering::Relaxed)
    }

    pub fn pre_snapshots(&self) -> u32 {
        self.pre_snapshots.load(Ordering::Relaxed)
    }

    pub fn finalized_ticks(&self) -> u32 {
        self.finalized.load(Ordering::Relaxed)
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl NetworkSynchronizer for MockSynchronizer {
    fn on_death(&self) {
        self.deaths.fetch_add(1, Ordering::Relaxed);
    }

    fn pre_snapshot(&self) {
        self.pre_snapshots.fetch_add(1, Ordering::Relaxed);
    }

    fn finalize_tick(&self) {
        self.finalized.fetch_add(1, Ordering::Relaxed);
    }

    fn call_protocol_event(&self, event: &dyn ProtocolEvent) {
        self.events.lock().unwrap().push(format!("{event:?}"));
    }
}

// ─── Player ──────────────────────────────────────────────────────────────────

type Location = (Arc<MockWorld>, f32, f32, f32);

pub struct MockPlayer {
    name: String,
    id: i32,
    display_name: Mutex<String>,
    session: Mutex<Option<Arc<MockSession>>>,
    synchronizer: OnceLock<Arc<dyn NetworkSynchronizer>>,
    location: Mutex<Option<Location>>,
}

impl MockPlayer {
    pub fn new(name: &str, id: i32) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            id,
            display_name: Mutex::new(name.into()),
            session: Mutex::new(None),
            synchronizer: OnceLock::new(),
            location: Mutex::new(None),
        })
    }

    pub fn connect(&self, session: Arc<MockSession>) {
        *self.session.lock().unwrap() = Some(session);
    }

    pub fn spawn(self: &Arc<Self>, world: &Arc<MockWorld>, x: f32, y: f32, z: f32) {
        world.players.lock().unwrap().push(Arc::downgrade(self));
        *self.location.lock().unwrap() = Some((Arc::clone(world), x, y, z));
    }
}

impl CommandSource for MockPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_message(&self, message: &str) -> bool {
        match self.session.lock().unwrap().as_ref() {
            Some(session) => {
                session.send_text(message);
                true
            }
            None => false,
        }
    }

    fn has_permission(&self, _node: &str) -> bool {
        false
    }
}

impl Entity for MockPlayer {
    fn id(&self) -> i32 {
        self.id
    }

    fn world(&self) -> Option<Arc<dyn World>> {
        self.location
            .lock()
            .unwrap()
            .as_ref()
            .map(|(world, ..)| Arc::clone(world) as Arc<dyn World>)
    }

    fn position(&self) -> Option<Point> {
        self.location
            .lock()
            .unwrap()
            .as_ref()
            .map(|(world, x, y, z)| Point::new(Arc::clone(world) as Arc<dyn World>, *x, *y, *z))
    }
}

impl Player for MockPlayer {
    fn display_name(&self) -> String {
        self.display_name.lock().unwrap().clone()
    }

    fn set_display_name(&self, name: &str) {
        *self.display_name.lock().unwrap() = name.to_string();
    }

    fn chat(&self, message: &str) {
        self.send_message(&format!("<{}> {message}", self.display_name()));
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
        self.session
            .lock()
            .unwrap()
            .clone()
            .map(|s| s as Arc<dyn Session>)
    }

    fn is_online(&self) -> bool {
        self.session
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|s| s.is_connected())
    }

    fn kick_with(&self, reason: &str) {
        if let Some(session) = self.session.lock().unwrap().take() {
            session.disconnect(reason);
        }
    }

    fn input(&self) -> PlayerInputState {
        PlayerInputState::IDLE
    }

    fn controller(&self) -> Option<Arc<dyn PlayerController>> {
        None
    }
}

// ─── Engine & controller ─────────────────────────────────────────────────────

pub struct MockEngine {
    players: Vec<Arc<dyn Player>>,
    folder: PathBuf,
}

impl MockEngine {
    pub fn new(players: Vec<Arc<MockPlayer>>) -> Self {
        Self {
            players: players.into_iter().map(|p| p as Arc<dyn Player>).collect(),
            folder: PathBuf::from("world"),
        }
    }
}

impl Engine for MockEngine {
    fn online_players(&self) -> Vec<Arc<dyn Player>> {
        self.players
            .iter()
            .filter(|p| p.is_online())
            .cloned()
            .collect()
    }

    fn world_folder(&self) -> &Path {
        &self.folder
    }
}

pub struct MockController {
    controller_type: ControllerType,
    player: Option<Arc<dyn Player>>,
}

impl MockController {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            controller_type: ControllerType::new(name, 0),
            player: None,
        })
    }

    pub fn attached(player_name: &str) -> Arc<Self> {
        Arc::new(Self {
            controller_type: ControllerType::new("mock", 0),
            player: Some(MockPlayer::new(player_name, 1) as Arc<dyn Player>),
        })
    }
}

impl Controller for MockController {
    fn controller_type(&self) -> &ControllerType {
        &self.controller_type
    }

    fn on_tick(&self, _dt: f32) {}
}

impl PlayerController for MockController {
    fn player(&self) -> Option<Arc<dyn Player>> {
        self.player.clone()
    }
}
