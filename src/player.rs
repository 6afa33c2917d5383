use crate::physics::{BoundingBox, PhysicsWorld};
use crate::world::WorldPosition;

/// World units walked per second.
pub const STEP_LENGTH: f32 = 10.0;
/// Half the width of the player's square footprint.
pub const PLAYER_HALF_EXTENT: f32 = 0.5;

/// Which movement keys are held this frame.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// First person walker on the floor plane. Moves into anything enabled in the physics world
/// are refused outright rather than slid along.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Player {
    position: WorldPosition,
    azimuth: f32,
    zenith: f32,
}

impl Player {
    pub fn new(position: WorldPosition) -> Player {
        Player {
            position,
            azimuth: 0.0,
            zenith: 0.0,
        }
    }

    #[inline]
    pub fn position(&self) -> WorldPosition {
        self.position
    }

    #[inline]
    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    #[inline]
    pub fn zenith(&self) -> f32 {
        self.zenith
    }

    pub fn rotate(&mut self, delta_azimuth: f32, delta_zenith: f32) {
        self.azimuth += delta_azimuth;
        self.zenith += delta_zenith;
    }

    /// Applies one frame of held keys. Returns true if the player ended up somewhere new.
    pub fn update(&mut self, input: MovementInput, dt: f32, physics_world: &PhysicsWorld) -> bool {
        let step = STEP_LENGTH * dt;
        let start = self.position;
        if input.forward {
            self.move_forward(step, physics_world);
        }
        if input.backward {
            self.move_forward(-step, physics_world);
        }
        if input.left {
            self.move_sideways(-step, physics_world);
        }
        if input.right {
            self.move_sideways(step, physics_world);
        }
        self.position != start
    }

    /// Moves along the looking direction, staying on the floor. Negative lengths walk backwards.
    pub fn move_forward(&mut self, length: f32, physics_world: &PhysicsWorld) -> bool {
        let (sin, cos) = self.azimuth.sin_cos();
        let target = WorldPosition::new(self.position.x - sin * length,
                                        self.position.y,
                                        self.position.z - cos * length);
        self.step_to(target, physics_world)
    }

    /// Moves perpendicular to the looking direction. Positive lengths step right.
    pub fn move_sideways(&mut self, length: f32, physics_world: &PhysicsWorld) -> bool {
        let (sin, cos) = self.azimuth.sin_cos();
        let target = WorldPosition::new(self.position.x + cos * length,
                                        self.position.y,
                                        self.position.z - sin * length);
        self.step_to(target, physics_world)
    }

    pub fn footprint(position: WorldPosition) -> BoundingBox {
        BoundingBox::around(position.x, -position.z, PLAYER_HALF_EXTENT)
    }

    /// Moves straight to `target` unless the player's footprint there would collide.
    pub fn step_to(&mut self, target: WorldPosition, physics_world: &PhysicsWorld) -> bool {
        if physics_world.collides(&Player::footprint(target)) {
            false
        } else {
            self.position = target;
            true
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // A 5 unit wide wall whose near face is at plane y = 10.
    fn wall_ahead() -> PhysicsWorld {
        let mut physics_world = PhysicsWorld::new();
        physics_world.add(BoundingBox::new(0.0, 5.0, 10.0, 15.0));
        physics_world
    }

    #[test]
    fn forward_walks_towards_negative_z() {
        let empty = PhysicsWorld::new();
        let mut player = Player::new(WorldPosition::new(2.5, 0.0, -2.5));
        assert!(player.move_forward(1.0, &empty));
        assert!(close(player.position().z, -3.5));
        assert!(close(player.position().x, 2.5));
        assert_eq!(player.position().y, 0.0);

        player.rotate(FRAC_PI_2, 0.0);
        assert!(player.move_forward(1.0, &empty));
        assert!(close(player.position().x, 1.5));
        assert!(close(player.position().z, -3.5));
    }

    #[test]
    fn sideways_is_perpendicular() {
        let empty = PhysicsWorld::new();
        let mut player = Player::new(WorldPosition::new(0.0, 0.0, 0.0));
        assert!(player.move_sideways(2.0, &empty));
        assert!(close(player.position().x, 2.0));
        assert!(close(player.position().z, 0.0));
    }

    #[test]
    fn walls_block_movement() {
        let physics_world = wall_ahead();
        let mut player = Player::new(WorldPosition::new(2.5, 0.0, -8.0));
        // Footprint would reach plane y = 10.5, into the wall.
        assert!(!player.move_forward(2.0, &physics_world));
        assert_eq!(player.position(), WorldPosition::new(2.5, 0.0, -8.0));
        assert!(player.move_forward(1.0, &physics_world));
        assert!(player.move_sideways(-3.0, &physics_world));
    }

    #[test]
    fn update_uses_step_length() {
        let empty = PhysicsWorld::new();
        let mut player = Player::new(WorldPosition::new(0.0, 0.0, 0.0));
        let input = MovementInput {
            right: true,
            ..MovementInput::default()
        };
        assert!(player.update(input, 0.5, &empty));
        assert!(close(player.position().x, 5.0));
        assert!(!player.update(MovementInput::default(), 0.5, &empty));

        let opposed = MovementInput {
            left: true,
            right: true,
            ..MovementInput::default()
        };
        player.update(opposed, 0.1, &empty);
        assert!(close(player.position().x, 5.0));
    }
}
