use glam::Vec2;
use slotmap::SlotMap;

use super::body::{Body, BodyHandle};
use super::broad_phase::{BroadPhase, BruteForce, CollisionPair, Proxy, UniformGrid};
use super::collision::{CollisionEvent, CollisionEventQueue, Contact};
use super::intersect;
use super::shape::Aabb;
use super::solver;
use super::PhysicsError;
use crate::core::math::{normalize_or, FALLBACK_AXIS};

/// Default number of resolution passes per step
pub const DEFAULT_VELOCITY_ITERATIONS: u32 = 8;

/// Default position iteration count (accepted by `step_with_iterations`, see there)
pub const DEFAULT_POSITION_ITERATIONS: u32 = 3;

/// Which broad phase the world runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BroadPhaseMode {
    /// Pairwise scan over every body
    BruteForce,
    /// Uniform grid with square cells of `cell_size`
    Grid { cell_size: f32 },
}

/// Simulation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    /// Gravity vector (default: -9.81 m/s² in y-axis)
    pub gravity: Vec2,
    /// Fixed timestep used by drivers of the world
    pub timestep: f32,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    pub broad_phase: BroadPhaseMode,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            // Fixed timestep of 1/60 seconds (60 FPS)
            timestep: 1.0 / 60.0,
            velocity_iterations: DEFAULT_VELOCITY_ITERATIONS,
            position_iterations: DEFAULT_POSITION_ITERATIONS,
            broad_phase: BroadPhaseMode::BruteForce,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(PhysicsError::InvalidTimestep(self.timestep));
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::NonFiniteGravity);
        }
        if let BroadPhaseMode::Grid { cell_size } = self.broad_phase {
            if !(cell_size.is_finite() && cell_size > 0.0) {
                return Err(PhysicsError::InvalidCellSize(cell_size));
            }
        }
        Ok(())
    }
}

/// Closest body hit by a world ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub body: BodyHandle,
    pub point: Vec2,
    pub normal: Vec2,
    /// Distance from the ray origin
    pub distance: f32,
}

type ContactHook = Box<dyn FnMut(&Contact)>;
type TriggerHook = Box<dyn FnMut(BodyHandle, BodyHandle)>;

/// Physics world that owns every body and runs the simulation
pub struct PhysicsWorld {
    config: WorldConfig,

    /// Body storage with generational handles
    bodies: SlotMap<BodyHandle, Body>,

    /// Insertion order, drives every iteration so results are reproducible
    order: Vec<BodyHandle>,

    broad_phase: Box<dyn BroadPhase>,

    // Per-step scratch
    proxies: Vec<Proxy>,
    proxy_handles: Vec<BodyHandle>,
    pairs: Vec<CollisionPair>,

    /// Trigger pairs overlapping at the end of the last step
    active_triggers: Vec<(BodyHandle, BodyHandle)>,

    /// Collision events from the last step
    collision_event_queue: CollisionEventQueue,

    on_collision: Option<ContactHook>,
    on_trigger_enter: Option<TriggerHook>,
    on_trigger_exit: Option<TriggerHook>,

    step_count: u64,
}

impl PhysicsWorld {
    /// Create a new physics world with default settings
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self::with_config(WorldConfig {
            gravity,
            ..WorldConfig::default()
        })
    }

    /// Create a world without validating `config`.
    ///
    /// An unusable grid cell size falls back to the pairwise broad phase.
    pub fn with_config(config: WorldConfig) -> Self {
        let broad_phase: Box<dyn BroadPhase> = match config.broad_phase {
            BroadPhaseMode::Grid { cell_size } if cell_size.is_finite() && cell_size > 0.0 => {
                Box::new(UniformGrid::new(cell_size))
            }
            BroadPhaseMode::Grid { cell_size } => {
                log::warn!(
                    "Invalid grid cell size {}, using pairwise broad phase",
                    cell_size
                );
                Box::new(BruteForce)
            }
            BroadPhaseMode::BruteForce => Box::new(BruteForce),
        };

        log::debug!(
            "Physics world created (gravity {:?}, broad phase {:?})",
            config.gravity,
            config.broad_phase
        );

        Self {
            config,
            bodies: SlotMap::with_key(),
            order: Vec::new(),
            broad_phase,
            proxies: Vec::new(),
            proxy_handles: Vec::new(),
            pairs: Vec::new(),
            active_triggers: Vec::new(),
            collision_event_queue: CollisionEventQueue::new(),
            on_collision: None,
            on_trigger_enter: None,
            on_trigger_exit: None,
            step_count: 0,
        }
    }

    /// Create a world after validating `config`
    pub fn try_with_config(config: WorldConfig) -> Result<Self, PhysicsError> {
        if let Err(err) = config.validate() {
            log::warn!("Rejected physics config: {}", err);
            return Err(err);
        }
        Ok(Self::with_config(config))
    }

    /// Step the simulation by `dt` with the configured iteration counts
    pub fn step(&mut self, dt: f32) {
        self.step_with_iterations(
            dt,
            self.config.velocity_iterations,
            self.config.position_iterations,
        );
    }

    /// Step the simulation forward by `dt` seconds.
    ///
    /// Positional correction runs inside each of the `velocity_iterations`
    /// resolution passes; `_position_iterations` does not add passes of its own.
    pub fn step_with_iterations(
        &mut self,
        dt: f32,
        velocity_iterations: u32,
        _position_iterations: u32,
    ) {
        // Clear previous step's collision events
        self.collision_event_queue.clear();

        self.integrate(dt);
        self.update_pairs();

        let mut touching_triggers: Vec<(BodyHandle, BodyHandle)> = Vec::new();

        for _ in 0..velocity_iterations {
            for pair in &self.pairs {
                let handle_a = self.proxy_handles[pair.a];
                let handle_b = self.proxy_handles[pair.b];
                let Some([body_a, body_b]) = self.bodies.get_disjoint_mut([handle_a, handle_b])
                else {
                    continue;
                };

                let Some(hit) = intersect::intersect(&body_a.placed_shape(), &body_b.placed_shape())
                else {
                    continue;
                };

                if body_a.is_trigger || body_b.is_trigger {
                    let key = (handle_a, handle_b);
                    if touching_triggers.contains(&key) {
                        continue;
                    }
                    touching_triggers.push(key);

                    if !self.active_triggers.contains(&key) {
                        self.collision_event_queue.push(CollisionEvent::TriggerEnter {
                            body_a: handle_a,
                            body_b: handle_b,
                        });
                        if let Some(hook) = self.on_trigger_enter.as_mut() {
                            hook(handle_a, handle_b);
                        }
                    }
                    continue;
                }

                let contact = Contact {
                    body_a: handle_a,
                    body_b: handle_b,
                    point: hit.point,
                    normal: hit.normal,
                    depth: hit.depth,
                };
                solver::resolve_contact(body_a, body_b, &contact);

                self.collision_event_queue
                    .push(CollisionEvent::Collision(contact));
                if let Some(hook) = self.on_collision.as_mut() {
                    hook(&contact);
                }
            }
        }

        let previous = std::mem::replace(&mut self.active_triggers, touching_triggers);
        for (body_a, body_b) in previous {
            if self.active_triggers.contains(&(body_a, body_b)) {
                continue;
            }
            self.collision_event_queue
                .push(CollisionEvent::TriggerExit { body_a, body_b });
            if let Some(hook) = self.on_trigger_exit.as_mut() {
                hook(body_a, body_b);
            }
        }

        self.step_count += 1;
        log::trace!(
            "step {}: {} bodies, {} pairs, {} events",
            self.step_count,
            self.order.len(),
            self.pairs.len(),
            self.collision_event_queue.len()
        );
    }

    /// Apply gravity, forces and damping to dynamic bodies and advance them
    fn integrate(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        for body in self.bodies.values_mut() {
            if !body.is_dynamic() {
                continue;
            }

            body.linear_velocity += (gravity + body.force() * body.inv_mass()) * dt;
            if !body.fixed_rotation {
                body.angular_velocity += body.torque() * body.inv_inertia() * dt;
            }

            body.linear_velocity *= 1.0 / (1.0 + body.linear_damping * dt);
            body.angular_velocity *= 1.0 / (1.0 + body.angular_damping * dt);

            body.position += body.linear_velocity * dt;
            body.rotation += body.angular_velocity * dt;

            body.clear_forces();
        }
    }

    fn update_pairs(&mut self) {
        self.proxies.clear();
        self.proxy_handles.clear();
        for &handle in &self.order {
            if let Some(body) = self.bodies.get(handle) {
                self.proxies.push(Proxy {
                    aabb: body.aabb(),
                    is_static: body.is_static(),
                    layer: body.layer,
                });
                self.proxy_handles.push(handle);
            }
        }
        self.broad_phase.find_pairs(&self.proxies, &mut self.pairs);
    }

    /// Add a body to the physics world
    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        let body_type = body.body_type();
        let handle = self.bodies.insert(body);
        self.order.push(handle);
        log::debug!("Added {:?} body {:?}", body_type, handle);
        handle
    }

    /// Remove a body. Unknown or already removed handles are ignored.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        let body = self.bodies.remove(handle)?;
        self.order.retain(|&h| h != handle);
        self.active_triggers
            .retain(|&(a, b)| a != handle && b != handle);
        log::debug!("Removed body {:?}", handle);
        Some(body)
    }

    /// Get a reference to a body
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Get a mutable reference to a body
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// All bodies in insertion order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.order
            .iter()
            .filter_map(move |&handle| self.bodies.get(handle).map(|body| (handle, body)))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Remove every body and forget trigger state
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.order.clear();
        self.active_triggers.clear();
        self.collision_event_queue.clear();
    }

    /// Cast a ray and return the closest hit within `max_distance`
    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RaycastHit> {
        let dir = normalize_or(direction, FALLBACK_AXIS);
        let mut closest: Option<RaycastHit> = None;

        for (handle, body) in self.bodies() {
            let Some(hit) = intersect::raycast(origin, dir, &body.placed_shape(), max_distance)
            else {
                continue;
            };

            if closest.map_or(true, |best| hit.t < best.distance) {
                closest = Some(RaycastHit {
                    body: handle,
                    point: origin + dir * hit.t,
                    normal: hit.normal,
                    distance: hit.t,
                });
            }
        }

        closest
    }

    /// Bodies whose bounding box overlaps `area`, in insertion order
    pub fn query_region(&self, area: &Aabb) -> Vec<BodyHandle> {
        self.bodies()
            .filter(|(_, body)| body.aabb().overlaps(area))
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Time until two circle bodies touch at their current velocities
    pub fn time_of_impact(&self, a: BodyHandle, b: BodyHandle) -> Option<f32> {
        let body_a = self.bodies.get(a)?;
        let body_b = self.bodies.get(b)?;
        intersect::sweep(
            &body_a.placed_shape(),
            body_a.linear_velocity,
            &body_b.placed_shape(),
            body_b.linear_velocity,
        )
    }

    /// Called with every contact resolved during `step`
    pub fn set_on_collision<F>(&mut self, hook: F)
    where
        F: FnMut(&Contact) + 'static,
    {
        self.on_collision = Some(Box::new(hook));
    }

    /// Called when a trigger pair starts overlapping
    pub fn set_on_trigger_enter<F>(&mut self, hook: F)
    where
        F: FnMut(BodyHandle, BodyHandle) + 'static,
    {
        self.on_trigger_enter = Some(Box::new(hook));
    }

    /// Called when a trigger pair stops overlapping
    pub fn set_on_trigger_exit<F>(&mut self, hook: F)
    where
        F: FnMut(BodyHandle, BodyHandle) + 'static,
    {
        self.on_trigger_exit = Some(Box::new(hook));
    }

    pub fn clear_hooks(&mut self) {
        self.on_collision = None;
        self.on_trigger_enter = None;
        self.on_trigger_exit = None;
    }

    /// Get all collision events from the last step
    pub fn collision_events(&self) -> &[CollisionEvent] {
        self.collision_event_queue.events()
    }

    /// Set gravity for the physics world
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config.gravity = gravity;
    }

    /// Get current gravity
    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    /// Set the timestep for physics simulation
    pub fn set_timestep(&mut self, dt: f32) {
        self.config.timestep = dt;
    }

    /// Get the current timestep
    pub fn timestep(&self) -> f32 {
        self.config.timestep
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Number of completed steps
    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
