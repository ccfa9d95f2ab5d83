// 2D rigid body physics: shapes, narrow and broad phase, impulse solver

pub mod body;
pub mod broad_phase;
pub mod collision;
pub mod debug;
pub mod intersect;
pub mod shape;
pub mod solver;
mod world;

pub use body::{Body, BodyBuilder, BodyHandle, BodyType};
pub use broad_phase::{BroadPhase, BruteForce, CollisionPair, UniformGrid};
pub use collision::{CollisionEvent, CollisionEventQueue, CollisionLayer, Contact};
pub use debug::{DebugLines, DebugVertex};
pub use shape::{Aabb, PlacedShape, Shape};
pub use world::{BroadPhaseMode, PhysicsWorld, RaycastHit, WorldConfig};

/// Physics configuration errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PhysicsError {
    #[error("Invalid timestep: {0} (must be finite and positive)")]
    InvalidTimestep(f32),

    #[error("Invalid grid cell size: {0} (must be finite and positive)")]
    InvalidCellSize(f32),

    #[error("Gravity must be finite")]
    NonFiniteGravity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PhysicsError::InvalidTimestep(-1.0).to_string(),
            "Invalid timestep: -1 (must be finite and positive)"
        );
        assert_eq!(
            PhysicsError::NonFiniteGravity.to_string(),
            "Gravity must be finite"
        );
    }
}
