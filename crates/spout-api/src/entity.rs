//! Entities, worlds and positions.
//!
//! Geometry and spatial queries are the host's business; these traits only
//! expose what the API needs to find players around a point.

use std::fmt;
use std::sync::Arc;

use crate::Player;

/// A world that entities live in.
pub trait World: Send + Sync {
    fn name(&self) -> &str;

    /// Players within `range` blocks of `position`, excluding `ignore`.
    fn nearby_players(
        &self,
        position: &Point,
        ignore: Option<&dyn Entity>,
        range: i32,
    ) -> Vec<Arc<dyn Player>>;

    /// Closest player to `entity` within `range` blocks.
    fn nearest_player(&self, entity: &dyn Entity, range: i32) -> Option<Arc<dyn Player>>;
}

/// Anything with an id and a place in a world.
pub trait Entity: Send + Sync {
    fn id(&self) -> i32;

    fn world(&self) -> Option<Arc<dyn World>>;

    /// Current position, or `None` while the entity is not in a loaded region.
    fn position(&self) -> Option<Point>;

    fn is_dead(&self) -> bool {
        false
    }
}

/// A position in a specific world.
#[derive(Clone)]
pub struct Point {
    pub world: Arc<dyn World>,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub fn new(world: Arc<dyn World>, x: f32, y: f32, z: f32) -> Self {
        Self { world, x, y, z }
    }

    /// Squared distance, ignoring which world either point is in.
    pub fn distance_squared(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &Point) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn same_world(&self, other: &Point) -> bool {
        Arc::ptr_eq(&self.world, &other.world) || self.world.name() == other.world.name()
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Point")
            .field("world", &self.world.name())
            .field("x", &self.x)
            .field("y", &self.y)
            .field("z", &self.z)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockWorld;

    #[test]
    fn distance_between_points() {
        let world = MockWorld::new("overworld");
        let a = Point::new(world.clone(), 0.0, 64.0, 0.0);
        let b = Point::new(world, 3.0, 68.0, 0.0);
        assert_eq!(a.distance_squared(&b), 25.0);
        assert_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn same_world_by_name() {
        let a = Point::new(MockWorld::new("overworld"), 0.0, 0.0, 0.0);
        let b = Point::new(MockWorld::new("overworld"), 1.0, 0.0, 0.0);
        let c = Point::new(MockWorld::new("nether"), 0.0, 0.0, 0.0);
        assert!(a.same_world(&b));
        assert!(!a.same_world(&c));
    }

    #[test]
    fn debug_shows_world_name() {
        let p = Point::new(MockWorld::new("overworld"), 1.0, 2.0, 3.0);
        assert!(format!("{p:?}").contains("overworld"));
    }
}
