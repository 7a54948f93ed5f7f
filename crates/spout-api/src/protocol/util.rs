//! Run an action for every player matching a selection.

use std::sync::Arc;

use crate::{Engine, Entity, Player, Point, ProtocolEvent};

/// Action performed on each selected player.
pub trait PlayerCallback {
    fn call(&mut self, player: &Arc<dyn Player>);
}

impl<F> PlayerCallback for F
where
    F: FnMut(&Arc<dyn Player>),
{
    fn call(&mut self, player: &Arc<dyn Player>) {
        self(player)
    }
}

/// Run `callback` for every online player of `engine`.
pub fn execute_with_all_players(engine: &dyn Engine, callback: impl PlayerCallback) {
    execute_with_players(&engine.online_players(), callback);
}

/// Run `callback` for each player in `players` that is online.
pub fn execute_with_players<'a, I>(players: I, mut callback: impl PlayerCallback)
where
    I: IntoIterator<Item = &'a Arc<dyn Player>>,
{
    for player in players {
        if player.is_online() {
            callback.call(player);
        }
    }
}

/// Run `callback` for every player within `range` of `position`, skipping `ignore`.
pub fn execute_with_nearby_players(
    position: &Point,
    ignore: Option<&dyn Entity>,
    range: i32,
    mut callback: impl PlayerCallback,
) {
    for player in position.world.nearby_players(position, ignore, range) {
        callback.call(&player);
    }
}

/// Run `callback` for every player within `range` of `entity`.
///
/// Does nothing if there is no entity or it is not in a region.
pub fn execute_with_nearby_players_of(
    entity: Option<&dyn Entity>,
    range: i32,
    callback: impl PlayerCallback,
) {
    let Some(position) = entity.and_then(|e| e.position()) else {
        return;
    };
    execute_with_nearby_players(&position, None, range, callback);
}

/// Run `callback` for the player closest to `entity`, if one is within `range`.
pub fn execute_with_nearest_player(
    entity: Option<&dyn Entity>,
    range: i32,
    mut callback: impl PlayerCallback,
) {
    let Some(entity) = entity else {
        return;
    };
    if entity.position().is_none() {
        return;
    }
    let Some(world) = entity.world() else {
        return;
    };
    if let Some(player) = world.nearest_player(entity, range) {
        callback.call(&player);
    }
}

/// Callback that hands a protocol event to each player's synchronizer.
#[derive(Debug, Clone)]
pub struct CallProtocolEvent {
    event: Arc<dyn ProtocolEvent>,
}

impl CallProtocolEvent {
    pub fn new(event: Arc<dyn ProtocolEvent>) -> Self {
        Self { event }
    }

    pub fn event(&self) -> &Arc<dyn ProtocolEvent> {
        &self.event
    }
}

impl PlayerCallback for CallProtocolEvent {
    fn call(&mut self, player: &Arc<dyn Player>) {
        if let Some(synchronizer) = player.network_synchronizer() {
            synchronizer.call_protocol_event(self.event.as_ref());
        }
    }
}
