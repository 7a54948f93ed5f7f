//! The single world hosted by the server.

use std::sync::{Arc, RwLock, Weak};

use spout_api::{Entity, Player, Point, World};

use crate::player::ServerPlayer;

/// World that tracks which players are in it. Distance queries scan every
/// player; there is no spatial index.
pub struct ServerWorld {
    name: String,
    players: RwLock<Vec<Weak<ServerPlayer>>>,
}

impl ServerWorld {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            players: RwLock::new(Vec::new()),
        })
    }

    pub fn add_player(&self, player: &Arc<ServerPlayer>) {
        let mut players = self.players.write().unwrap_or_else(|e| e.into_inner());
        players.retain(|p| p.strong_count() > 0);
        players.push(Arc::downgrade(player));
    }

    pub fn remove_player(&self, id: i32) {
        self.players
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|p| p.upgrade().is_some_and(|p| p.id() != id));
    }

    /// Online players currently in this world.
    pub fn players(&self) -> Vec<Arc<ServerPlayer>> {
        self.players
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|p| p.is_online())
            .collect()
    }
}

impl World for ServerWorld {
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
        let range = range as f32;
        self.players()
            .into_iter()
            .filter(|p| Some(p.id()) != ignored)
            .filter(|p| {
                p.position()
                    .is_some_and(|pos| pos.same_world(position) && pos.distance(position) <= range)
            })
            .map(|p| p as Arc<dyn Player>)
            .collect()
    }

    fn nearest_player(&self, entity: &dyn Entity, range: i32) -> Option<Arc<dyn Player>> {
        let origin = entity.position()?;
        let range = range as f32;
        self.players()
            .into_iter()
            .filter(|p| p.id() != entity.id())
            .filter_map(|p| {
                let distance = p.position()?.distance(&origin);
                (distance <= range).then_some((distance, p))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p as Arc<dyn Player>)
    }
}
