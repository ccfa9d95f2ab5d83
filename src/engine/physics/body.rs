use glam::Vec2;
use slotmap::new_key_type;

use super::collision::CollisionLayer;
use super::shape::{Aabb, PlacedShape, Shape};
use crate::core::math::cross;

new_key_type! {
    /// Handle to a body owned by a `PhysicsWorld`.
    ///
    /// Handles are generational: once a body is removed its handle never
    /// resolves again, even after the slot is reused.
    pub struct BodyHandle;
}

/// How a body takes part in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyType {
    /// Infinite mass, never moves, obstacle only
    Static,
    /// Fully simulated
    Dynamic,
    /// Infinite mass, moved only by the caller, still collides
    Kinematic,
}

/// A simulated rigid body
#[derive(Debug, Clone)]
pub struct Body {
    pub position: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    pub linear_velocity: Vec2,
    /// Angular velocity in radians per second
    pub angular_velocity: f32,

    /// Restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub restitution: f32,
    /// Friction coefficient (0.0 = no friction)
    pub friction: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Suppresses every angular response
    pub fixed_rotation: bool,

    /// Detects overlaps and reports them without any physical response
    pub is_trigger: bool,
    pub layer: CollisionLayer,
    /// Opaque caller data, e.g. a game entity id
    pub user_data: u64,

    body_type: BodyType,
    shape: Shape,
    mass: f32,
    inv_mass: f32,
    inv_inertia: f32,

    force: Vec2,
    torque: f32,
}

impl Body {
    /// Create a body with default material properties
    pub fn new(body_type: BodyType, shape: Shape) -> Self {
        let mut body = Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            restitution: 0.0,
            friction: 0.5,
            linear_damping: 0.0,
            angular_damping: 0.0,
            fixed_rotation: false,
            is_trigger: false,
            layer: CollisionLayer::ALL,
            user_data: 0,
            body_type,
            shape,
            mass: 1.0,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
        };
        body.update_mass_properties();
        body
    }

    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    pub fn is_kinematic(&self) -> bool {
        self.body_type == BodyType::Kinematic
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Replace the shape and recompute inertia
    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
        self.update_mass_properties();
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Set the mass. Not validated: a non-positive mass on a dynamic body
    /// produces non-finite inverse values.
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
        self.update_mass_properties();
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    fn update_mass_properties(&mut self) {
        if self.body_type == BodyType::Dynamic {
            self.inv_mass = 1.0 / self.mass;
            self.inv_inertia = 1.0 / self.shape.moment_of_inertia(self.mass);
        } else {
            self.inv_mass = 0.0;
            self.inv_inertia = 0.0;
        }
    }

    /// Accumulated force for the next step
    pub fn force(&self) -> Vec2 {
        self.force
    }

    /// Accumulated torque for the next step
    pub fn torque(&self) -> f32 {
        self.torque
    }

    /// Add a force through the centre of mass, applied on the next step
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Add a force at a world-space point, producing torque about the centre
    pub fn apply_force_at_point(&mut self, force: Vec2, point: Vec2) {
        self.force += force;
        self.torque += cross(point - self.position, force);
    }

    pub fn apply_torque(&mut self, torque: f32) {
        self.torque += torque;
    }

    pub fn clear_forces(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    /// Apply an instantaneous impulse at a world-space point
    pub fn apply_impulse(&mut self, impulse: Vec2, point: Vec2) {
        self.linear_velocity += impulse * self.inv_mass;
        if !self.fixed_rotation {
            self.angular_velocity += cross(point - self.position, impulse) * self.inv_inertia;
        }
    }

    /// Bounding box of the shape at the current position and rotation
    pub fn aabb(&self) -> Aabb {
        self.shape.aabb(self.position, self.rotation)
    }

    /// The shape as seen by narrow phase and ray casts
    pub fn placed_shape(&self) -> PlacedShape {
        PlacedShape::new(self.shape, self.position)
    }

    pub fn kinetic_energy(&self) -> f32 {
        if self.inv_mass == 0.0 {
            return 0.0;
        }
        let linear = 0.5 * self.mass * self.linear_velocity.length_squared();
        let angular = if self.inv_inertia > 0.0 {
            0.5 * self.angular_velocity * self.angular_velocity / self.inv_inertia
        } else {
            0.0
        };
        linear + angular
    }
}

/// Builder for creating bodies with common configurations
pub struct BodyBuilder {
    body_type: BodyType,
    shape: Shape,
    position: Vec2,
    rotation: f32,
    linvel: Vec2,
    angvel: f32,
    mass: f32,
    restitution: f32,
    friction: f32,
    linear_damping: f32,
    angular_damping: f32,
    fixed_rotation: bool,
    is_trigger: bool,
    layer: CollisionLayer,
    user_data: u64,
}

impl BodyBuilder {
    fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            shape: Shape::default(),
            position: Vec2::ZERO,
            rotation: 0.0,
            linvel: Vec2::ZERO,
            angvel: 0.0,
            mass: 1.0,
            restitution: 0.0,
            friction: 0.5,
            linear_damping: 0.0,
            angular_damping: 0.0,
            fixed_rotation: false,
            is_trigger: false,
            layer: CollisionLayer::ALL,
            user_data: 0,
        }
    }

    /// Create a new dynamic body (affected by forces and collisions)
    pub fn new_dynamic() -> Self {
        Self::new(BodyType::Dynamic)
    }

    /// Create a new kinematic body (moved by the caller, pushes dynamic bodies)
    pub fn new_kinematic() -> Self {
        Self::new(BodyType::Kinematic)
    }

    /// Create a new static body (completely immovable)
    pub fn new_static() -> Self {
        Self::new(BodyType::Static)
    }

    /// Use a circle shape
    pub fn circle(mut self, radius: f32) -> Self {
        self.shape = Shape::circle(radius);
        self
    }

    /// Use a box shape
    pub fn box_shape(mut self, half_width: f32, half_height: f32) -> Self {
        self.shape = Shape::cuboid(half_width, half_height);
        self
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    /// Set the initial position of the body
    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    /// Set the initial rotation (radians)
    pub fn rotation(mut self, angle: f32) -> Self {
        self.rotation = angle;
        self
    }

    /// Set the initial linear velocity
    pub fn linvel(mut self, x: f32, y: f32) -> Self {
        self.linvel = Vec2::new(x, y);
        self
    }

    /// Set the initial angular velocity (radians per second)
    pub fn angvel(mut self, angvel: f32) -> Self {
        self.angvel = angvel;
        self
    }

    /// Set mass directly (ignored by static and kinematic bodies)
    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Set restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub fn restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set friction coefficient (0.0 = no friction, 1.0 = high friction)
    pub fn friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping;
        self
    }

    /// Lock rotation (useful for player characters)
    pub fn lock_rotation(mut self) -> Self {
        self.fixed_rotation = true;
        self
    }

    /// Make this a trigger (detects collisions but doesn't cause physical response)
    pub fn trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    /// Set the collision layer mask for filtering
    pub fn layer(mut self, layer: CollisionLayer) -> Self {
        self.layer = layer;
        self
    }

    pub fn user_data(mut self, data: u64) -> Self {
        self.user_data = data;
        self
    }

    /// Build the body
    pub fn build(self) -> Body {
        let mut body = Body::new(self.body_type, self.shape);
        body.position = self.position;
        body.rotation = self.rotation;
        body.linear_velocity = self.linvel;
        body.angular_velocity = self.angvel;
        body.restitution = self.restitution;
        body.friction = self.friction;
        body.linear_damping = self.linear_damping;
        body.angular_damping = self.angular_damping;
        body.fixed_rotation = self.fixed_rotation;
        body.is_trigger = self.is_trigger;
        body.layer = self.layer;
        body.user_data = self.user_data;
        body.set_mass(self.mass);
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_body_builder_dynamic() {
        let body = BodyBuilder::new_dynamic()
            .position(10.0, 20.0)
            .linvel(5.0, 0.0)
            .mass(4.0)
            .circle(1.0)
            .build();

        assert_eq!(body.body_type(), BodyType::Dynamic);
        assert_eq!(body.position, Vec2::new(10.0, 20.0));
        assert_eq!(body.linear_velocity, Vec2::new(5.0, 0.0));
        assert_relative_eq!(body.inv_mass(), 0.25);
        // I = 0.5 * 4 * 1
        assert_relative_eq!(body.inv_inertia(), 0.5);
    }

    #[test]
    fn test_immovable_bodies_have_zero_inverse_mass() {
        let fixed = BodyBuilder::new_static().mass(10.0).box_shape(5.0, 1.0).build();
        let kinematic = BodyBuilder::new_kinematic().mass(10.0).build();

        for body in [fixed, kinematic] {
            assert_eq!(body.inv_mass(), 0.0);
            assert_eq!(body.inv_inertia(), 0.0);
            assert_eq!(body.kinetic_energy(), 0.0);
        }
    }

    #[test]
    fn test_set_mass_and_shape_keep_inverses_in_sync() {
        let mut body = BodyBuilder::new_dynamic().box_shape(1.0, 1.0).build();
        body.set_mass(2.0);
        assert_relative_eq!(body.inv_mass(), 0.5);
        // I = 2 * (4 + 4) / 12
        assert_relative_eq!(body.inv_inertia(), 0.75);

        body.set_shape(Shape::circle(2.0));
        assert_relative_eq!(body.inv_inertia(), 0.25);
    }

    #[test]
    fn test_force_accumulation() {
        let mut body = BodyBuilder::new_dynamic().position(1.0, 0.0).build();
        body.apply_force(Vec2::new(1.0, 0.0));
        body.apply_force_at_point(Vec2::new(0.0, 2.0), Vec2::new(2.0, 0.0));
        body.apply_torque(0.5);

        assert_eq!(body.force(), Vec2::new(1.0, 2.0));
        assert_relative_eq!(body.torque(), 2.5);

        body.clear_forces();
        assert_eq!(body.force(), Vec2::ZERO);
        assert_eq!(body.torque(), 0.0);
    }

    #[test]
    fn test_apply_impulse_respects_locked_rotation() {
        let mut free = BodyBuilder::new_dynamic().circle(1.0).build();
        free.apply_impulse(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0));
        assert_eq!(free.linear_velocity, Vec2::new(0.0, 1.0));
        assert_relative_eq!(free.angular_velocity, 2.0);

        let mut locked = BodyBuilder::new_dynamic().circle(1.0).lock_rotation().build();
        locked.apply_impulse(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0));
        assert_eq!(locked.angular_velocity, 0.0);
    }

    #[test]
    fn test_trigger_and_layer_flags() {
        let body = BodyBuilder::new_static()
            .trigger(true)
            .layer(CollisionLayer::from_bits(0b100))
            .user_data(42)
            .build();

        assert!(body.is_trigger);
        assert_eq!(body.layer.bits(), 0b100);
        assert_eq!(body.user_data, 42);
    }
}
