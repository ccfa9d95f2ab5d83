//! Deterministic 2D rigid-body physics with circle and box collision.

pub mod core;
pub mod engine;

pub use engine::game_loop::GameLoop;
pub use engine::physics::{
    Body, BodyBuilder, BodyHandle, BodyType, CollisionEvent, CollisionLayer, Contact,
    PhysicsError, PhysicsWorld, WorldConfig,
};
