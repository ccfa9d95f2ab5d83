use glam::Vec2;

use super::body::{Body, BodyType};
use super::collision::CollisionEvent;
use super::shape::{Aabb, Shape};
use super::world::PhysicsWorld;
use crate::core::math::rotate;

const CIRCLE_SEGMENTS: u32 = 16;

/// Length of the drawn contact normals
const NORMAL_LENGTH: f32 = 0.5;

const AABB_COLOR: [f32; 4] = [1.0, 0.0, 1.0, 0.4];
const CONTACT_COLOR: [f32; 4] = [1.0, 0.2, 0.2, 1.0];
const TRIGGER_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 0.6];

/// Vertex layout for line-list debug geometry, ready to upload as-is
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Builds line geometry for the bodies and contacts of a world.
///
/// Output is an indexed line list: every two indices form one segment.
#[derive(Debug, Default)]
pub struct DebugLines {
    vertices: Vec<DebugVertex>,
    indices: Vec<u32>,
    enabled: bool,
    show_aabbs: bool,
    show_contacts: bool,
}

impl DebugLines {
    pub fn new() -> Self {
        Self {
            show_contacts: true,
            ..Self::default()
        }
    }

    /// Enable or disable debug output
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_show_aabbs(&mut self, show: bool) {
        self.show_aabbs = show;
    }

    /// Draw the contacts reported by the last step
    pub fn set_show_contacts(&mut self, show: bool) {
        self.show_contacts = show;
    }

    /// Rebuild the geometry from the current state of `world`
    pub fn prepare(&mut self, world: &PhysicsWorld) {
        self.vertices.clear();
        self.indices.clear();

        if !self.enabled {
            return;
        }

        for (_, body) in world.bodies() {
            self.draw_body(body);
            if self.show_aabbs {
                self.draw_aabb(&body.aabb(), AABB_COLOR);
            }
        }

        if self.show_contacts {
            for event in world.collision_events() {
                if let CollisionEvent::Collision(contact) = event {
                    self.draw_segment(
                        contact.point,
                        contact.point + contact.normal * NORMAL_LENGTH,
                        CONTACT_COLOR,
                    );
                }
            }
        }
    }

    pub fn vertices(&self) -> &[DebugVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Raw vertex bytes for a GPU vertex buffer
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Number of line segments
    pub fn line_count(&self) -> usize {
        self.indices.len() / 2
    }

    fn draw_body(&mut self, body: &Body) {
        let color = body_color(body);
        match *body.shape() {
            Shape::Circle { radius } => {
                self.draw_circle(body.position, radius, color);
                // radius line so spin is visible
                let spoke = rotate(Vec2::new(radius, 0.0), body.rotation);
                self.draw_segment(body.position, body.position + spoke, color);
            }
            Shape::Box { half_extents } => {
                self.draw_box(body.position, half_extents, body.rotation, color);
            }
        }
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        let start_idx = self.vertices.len() as u32;

        for i in 0..CIRCLE_SEGMENTS {
            let angle = (i as f32 / CIRCLE_SEGMENTS as f32) * std::f32::consts::TAU;
            let point = center + Vec2::from_angle(angle) * radius;
            self.push_vertex(point, color);

            let next = (i + 1) % CIRCLE_SEGMENTS;
            self.indices.push(start_idx + i);
            self.indices.push(start_idx + next);
        }
    }

    fn draw_box(&mut self, center: Vec2, half_extents: Vec2, rotation: f32, color: [f32; 4]) {
        let start_idx = self.vertices.len() as u32;

        let corners = [
            Vec2::new(-half_extents.x, -half_extents.y),
            Vec2::new(half_extents.x, -half_extents.y),
            Vec2::new(half_extents.x, half_extents.y),
            Vec2::new(-half_extents.x, half_extents.y),
        ];
        for corner in corners {
            self.push_vertex(center + rotate(corner, rotation), color);
        }

        for i in 0..4 {
            self.indices.push(start_idx + i);
            self.indices.push(start_idx + (i + 1) % 4);
        }
    }

    fn draw_aabb(&mut self, aabb: &Aabb, color: [f32; 4]) {
        self.draw_box(aabb.center(), aabb.half_extents(), 0.0, color);
    }

    fn draw_segment(&mut self, from: Vec2, to: Vec2, color: [f32; 4]) {
        let start_idx = self.vertices.len() as u32;
        self.push_vertex(from, color);
        self.push_vertex(to, color);
        self.indices.push(start_idx);
        self.indices.push(start_idx + 1);
    }

    fn push_vertex(&mut self, point: Vec2, color: [f32; 4]) {
        self.vertices.push(DebugVertex {
            position: point.to_array(),
            color,
        });
    }
}

fn body_color(body: &Body) -> [f32; 4] {
    if body.is_trigger {
        return TRIGGER_COLOR;
    }
    match body.body_type() {
        BodyType::Dynamic => [0.0, 1.0, 0.0, 0.8],   // Green for dynamic
        BodyType::Static => [0.5, 0.5, 0.5, 0.8],    // Gray for static
        BodyType::Kinematic => [0.0, 0.5, 1.0, 0.8], // Blue for kinematic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::body::BodyBuilder;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_disabled_produces_nothing() {
        let mut world = PhysicsWorld::new();
        world.add_body(BodyBuilder::new_dynamic().build());

        let mut lines = DebugLines::new();
        lines.prepare(&world);
        assert!(lines.vertices().is_empty());
        assert_eq!(lines.line_count(), 0);
    }

    #[test]
    fn test_shapes_are_outlined() {
        let mut world = PhysicsWorld::new();
        world.add_body(BodyBuilder::new_dynamic().circle(1.0).build());
        world.add_body(
            BodyBuilder::new_static()
                .position(0.0, -5.0)
                .box_shape(2.0, 1.0)
                .build(),
        );

        let mut lines = DebugLines::new();
        lines.set_enabled(true);
        lines.prepare(&world);

        // circle outline + spoke, then four box edges
        assert_eq!(lines.line_count(), 16 + 1 + 4);
        assert_eq!(lines.vertices().len(), 16 + 2 + 4);
        assert_eq!(lines.vertices()[0].color, [0.0, 1.0, 0.0, 0.8]);
        assert_eq!(lines.vertices()[18].color, [0.5, 0.5, 0.5, 0.8]);
        assert_eq!(lines.vertices()[18].position, [-2.0, -6.0]);
        assert_eq!(
            lines.vertex_bytes().len(),
            lines.vertices().len() * std::mem::size_of::<DebugVertex>()
        );
    }

    #[test]
    fn test_rotated_box_corners() {
        let mut world = PhysicsWorld::new();
        world.add_body(
            BodyBuilder::new_kinematic()
                .box_shape(1.0, 1.0)
                .rotation(std::f32::consts::FRAC_PI_4)
                .build(),
        );

        let mut lines = DebugLines::new();
        lines.set_enabled(true);
        lines.prepare(&world);

        let first = lines.vertices()[0].position;
        assert_abs_diff_eq!(first[0], 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(first[1], -std::f32::consts::SQRT_2, epsilon = 1e-5);
        assert_eq!(lines.vertices()[0].color, [0.0, 0.5, 1.0, 0.8]);
    }

    #[test]
    fn test_aabbs_and_contacts() {
        let mut world = PhysicsWorld::with_gravity(Vec2::ZERO);
        world.add_body(BodyBuilder::new_static().box_shape(5.0, 0.5).build());
        world.add_body(
            BodyBuilder::new_dynamic()
                .position(0.0, 0.9)
                .box_shape(0.5, 0.5)
                .build(),
        );
        world.step_with_iterations(1.0 / 60.0, 1, 1);
        assert_eq!(world.collision_events().len(), 1);

        let mut lines = DebugLines::new();
        lines.set_enabled(true);
        lines.set_show_aabbs(true);
        lines.prepare(&world);

        // two boxes, two bounds, one normal
        assert_eq!(lines.line_count(), 4 * 4 + 1);
        let last = lines.vertices()[lines.vertices().len() - 1];
        assert_eq!(last.color, CONTACT_COLOR);

        lines.set_show_contacts(false);
        lines.set_show_aabbs(false);
        lines.prepare(&world);
        assert_eq!(lines.line_count(), 8);
    }

    #[test]
    fn test_trigger_color() {
        let mut world = PhysicsWorld::new();
        world.add_body(BodyBuilder::new_static().box_shape(1.0, 1.0).trigger(true).build());

        let mut lines = DebugLines::new();
        lines.set_enabled(true);
        lines.prepare(&world);
        assert!(lines.vertices().iter().all(|v| v.color == TRIGGER_COLOR));
    }
}
