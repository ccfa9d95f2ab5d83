use glam::Vec2;

use crate::core::math::rotate;

/// Collision shape of a body, expressed in body-local space.
///
/// A circle is centred on the body position. A box is described by its
/// half-extents; narrow phase treats it as axis-aligned at the body position
/// while the broad phase encloses its rotated corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Box { half_extents: Vec2 },
}

impl Shape {
    /// Create a circle shape
    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    /// Create a box shape from half width and half height
    pub fn cuboid(half_width: f32, half_height: f32) -> Self {
        Shape::Box {
            half_extents: Vec2::new(half_width, half_height),
        }
    }

    /// Moment of inertia about the centre for the given mass
    pub fn moment_of_inertia(&self, mass: f32) -> f32 {
        match *self {
            Shape::Circle { radius } => 0.5 * mass * radius * radius,
            Shape::Box { half_extents } => {
                let size = half_extents * 2.0;
                mass * (size.x * size.x + size.y * size.y) / 12.0
            }
        }
    }

    /// World-space bounding box at the given placement
    pub fn aabb(&self, position: Vec2, rotation: f32) -> Aabb {
        match *self {
            Shape::Circle { radius } => Aabb::from_center_half_extents(position, Vec2::splat(radius)),
            Shape::Box { half_extents } => {
                let corners = [
                    Vec2::new(-half_extents.x, -half_extents.y),
                    Vec2::new(half_extents.x, -half_extents.y),
                    Vec2::new(half_extents.x, half_extents.y),
                    Vec2::new(-half_extents.x, half_extents.y),
                ];

                let mut min = Vec2::splat(f32::MAX);
                let mut max = Vec2::splat(-f32::MAX);
                for corner in corners {
                    let p = position + rotate(corner, rotation);
                    min = min.min(p);
                    max = max.max(p);
                }
                Aabb { min, max }
            }
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Circle { radius: 0.5 }
    }
}

/// A shape placed in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedShape {
    pub shape: Shape,
    pub position: Vec2,
}

impl PlacedShape {
    pub fn new(shape: Shape, position: Vec2) -> Self {
        Self { shape, position }
    }

    pub fn circle(position: Vec2, radius: f32) -> Self {
        Self::new(Shape::circle(radius), position)
    }

    /// Axis-aligned box from its min and max corners
    pub fn from_corners(min: Vec2, max: Vec2) -> Self {
        let aabb = Aabb::new(min, max);
        Self::new(
            Shape::Box {
                half_extents: aabb.half_extents(),
            },
            aabb.center(),
        )
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Inclusive overlap: boxes sharing an edge count as overlapping
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}
