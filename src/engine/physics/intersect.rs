// Overlap, contact, ray and sweep tests for circles and axis-aligned boxes
//
// Everything in here is pure: no body state, no side effects. Normals always
// point from the first shape toward the second.

use glam::Vec2;

use super::shape::{Aabb, PlacedShape, Shape};
use crate::core::math::{normalize_or, EPSILON, FALLBACK_AXIS};

/// Contact data produced by a precise shape test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeContact {
    /// World-space contact point
    pub point: Vec2,
    /// Unit normal from the first shape toward the second
    pub normal: Vec2,
    /// Penetration depth, never negative
    pub depth: f32,
}

/// Result of a ray cast against a single shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the normalized ray direction
    pub t: f32,
    /// Surface normal at the hit point
    pub normal: Vec2,
}

fn box_bounds(placed: &PlacedShape, half_extents: Vec2) -> Aabb {
    Aabb::from_center_half_extents(placed.position, half_extents)
}

/// Strict overlap test between two placed shapes
pub fn test_overlap(a: &PlacedShape, b: &PlacedShape) -> bool {
    match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle_overlap(a.position, ra, b.position, rb)
        }
        (Shape::Box { half_extents: ha }, Shape::Box { half_extents: hb }) => {
            box_box_overlap(&box_bounds(a, ha), &box_bounds(b, hb))
        }
        (Shape::Circle { radius }, Shape::Box { half_extents }) => {
            circle_box_overlap(a.position, radius, &box_bounds(b, half_extents))
        }
        (Shape::Box { half_extents }, Shape::Circle { radius }) => {
            circle_box_overlap(b.position, radius, &box_bounds(a, half_extents))
        }
    }
}

pub fn circle_circle_overlap(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> bool {
    let radius_ab = radius_a + radius_b;
    center_a.distance_squared(center_b) <= radius_ab * radius_ab
}

pub fn box_box_overlap(a: &Aabb, b: &Aabb) -> bool {
    a.max.x > b.min.x && a.min.x < b.max.x && a.max.y > b.min.y && a.min.y < b.max.y
}

pub fn circle_box_overlap(center: Vec2, radius: f32, aabb: &Aabb) -> bool {
    let closest = center.clamp(aabb.min, aabb.max);
    center.distance_squared(closest) < radius * radius
}

/// Precise intersection returning contact point, normal and depth
pub fn intersect(a: &PlacedShape, b: &PlacedShape) -> Option<ShapeContact> {
    match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(a.position, ra, b.position, rb)
        }
        (Shape::Box { half_extents: ha }, Shape::Box { half_extents: hb }) => {
            box_box(&box_bounds(a, ha), &box_bounds(b, hb))
        }
        (Shape::Circle { radius }, Shape::Box { half_extents }) => {
            circle_box(a.position, radius, &box_bounds(b, half_extents))
        }
        (Shape::Box { half_extents }, Shape::Circle { radius }) => {
            circle_box(b.position, radius, &box_bounds(a, half_extents)).map(|contact| {
                ShapeContact {
                    normal: -contact.normal,
                    ..contact
                }
            })
        }
    }
}

pub fn circle_circle(
    center_a: Vec2,
    radius_a: f32,
    center_b: Vec2,
    radius_b: f32,
) -> Option<ShapeContact> {
    let ab = center_b - center_a;
    let radius_ab = radius_a + radius_b;
    let length_squared = ab.length_squared();
    if length_squared > radius_ab * radius_ab {
        return None;
    }

    let normal = normalize_or(ab, FALLBACK_AXIS);
    Some(ShapeContact {
        point: center_a + normal * radius_a,
        normal,
        depth: radius_ab - length_squared.sqrt(),
    })
}

/// Box-box contact along the axis of least overlap.
///
/// The horizontal axis is reported only when its overlap is strictly
/// smaller; equal overlaps resolve vertically.
pub fn box_box(a: &Aabb, b: &Aabb) -> Option<ShapeContact> {
    if !box_box_overlap(a, b) {
        return None;
    }

    let overlap_min = a.min.max(b.min);
    let overlap_max = a.max.min(b.max);
    let overlap = overlap_max - overlap_min;
    let ab = b.center() - a.center();

    let (normal, depth) = if overlap.x < overlap.y {
        let sign = if ab.x < 0.0 { -1.0 } else { 1.0 };
        (Vec2::new(sign, 0.0), overlap.x)
    } else {
        let sign = if ab.y < 0.0 { -1.0 } else { 1.0 };
        (Vec2::new(0.0, sign), overlap.y)
    };

    Some(ShapeContact {
        point: (overlap_min + overlap_max) * 0.5,
        normal,
        depth,
    })
}

/// Circle (first) against box (second)
pub fn circle_box(center: Vec2, radius: f32, aabb: &Aabb) -> Option<ShapeContact> {
    let closest = center.clamp(aabb.min, aabb.max);
    let to_box = closest - center;
    let length_squared = to_box.length_squared();
    if length_squared >= radius * radius {
        return None;
    }

    let distance = length_squared.sqrt();
    if distance > EPSILON {
        return Some(ShapeContact {
            point: closest,
            normal: to_box / distance,
            depth: radius - distance,
        });
    }

    // centre is on or inside the box: push out through the nearest face
    let (normal, face_distance, point) = nearest_face(center, aabb);
    Some(ShapeContact {
        point,
        normal,
        depth: radius + face_distance,
    })
}

/// Nearest face of `aabb` to an interior point, checked left, right, bottom, top.
/// Returns the normal pointing from the point's shape into the box.
fn nearest_face(p: Vec2, aabb: &Aabb) -> (Vec2, f32, Vec2) {
    let faces = [
        (Vec2::X, p.x - aabb.min.x, Vec2::new(aabb.min.x, p.y)),
        (Vec2::NEG_X, aabb.max.x - p.x, Vec2::new(aabb.max.x, p.y)),
        (Vec2::Y, p.y - aabb.min.y, Vec2::new(p.x, aabb.min.y)),
        (Vec2::NEG_Y, aabb.max.y - p.y, Vec2::new(p.x, aabb.max.y)),
    ];

    let mut best = faces[0];
    for face in &faces[1..] {
        if face.1 < best.1 {
            best = *face;
        }
    }
    best
}

/// Cast a ray against a placed shape.
///
/// `direction` is normalized first so `t` is a distance; hits further than
/// `max_distance` are discarded.
pub fn raycast(
    origin: Vec2,
    direction: Vec2,
    shape: &PlacedShape,
    max_distance: f32,
) -> Option<RayHit> {
    let dir = normalize_or(direction, FALLBACK_AXIS);
    let hit = match shape.shape {
        Shape::Circle { radius } => ray_circle(origin, dir, shape.position, radius),
        Shape::Box { half_extents } => ray_aabb(origin, dir, &box_bounds(shape, half_extents)),
    }?;

    if hit.t <= max_distance {
        Some(hit)
    } else {
        None
    }
}

/// Roots of |origin + t * dir - centre| = radius, smallest first
fn ray_circle_roots(origin: Vec2, dir: Vec2, center: Vec2, radius: f32) -> Option<(f32, f32)> {
    let m = origin - center;
    let a = dir.dot(dir);
    if a < EPSILON * EPSILON {
        return None;
    }
    let b = m.dot(dir);
    let c = m.dot(m) - radius * radius;

    let delta = b * b - a * c;
    if delta < 0.0 {
        return None;
    }

    let inv_a = 1.0 / a;
    let delta_root = delta.sqrt();
    Some(((-b - delta_root) * inv_a, (-b + delta_root) * inv_a))
}

/// Ray against circle using the nearest non-negative root
pub fn ray_circle(origin: Vec2, dir: Vec2, center: Vec2, radius: f32) -> Option<RayHit> {
    let (t_near, t_far) = ray_circle_roots(origin, dir, center, radius)?;
    let t = if t_near >= 0.0 {
        t_near
    } else if t_far >= 0.0 {
        t_far
    } else {
        return None;
    };

    let point = origin + dir * t;
    Some(RayHit {
        t,
        normal: normalize_or(point - center, -dir),
    })
}

/// Slab test. A ray starting inside the box hits at `t = 0` facing back along the ray.
pub fn ray_aabb(origin: Vec2, dir: Vec2, aabb: &Aabb) -> Option<RayHit> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut normal = -dir;

    for (axis, unit) in [(0, Vec2::X), (1, Vec2::Y)] {
        let o = origin[axis];
        let d = dir[axis];
        let lo = aabb.min[axis];
        let hi = aabb.max[axis];

        if d.abs() < EPSILON {
            // parallel to this slab
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv_d = 1.0 / d;
        let mut t1 = (lo - o) * inv_d;
        let mut t2 = (hi - o) * inv_d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }

        if t1 > t_min {
            t_min = t1;
            normal = if d > 0.0 { -unit } else { unit };
        }
        t_max = t_max.min(t2);

        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        return None;
    }

    if t_min < 0.0 {
        return Some(RayHit { t: 0.0, normal: -dir });
    }

    Some(RayHit { t: t_min, normal })
}

/// Time of impact between two moving circles.
///
/// B is inflated by A's radius and the relative velocity is cast from A's
/// centre. Returns `Some(0.0)` when already overlapping and `None` for any
/// pair that is not circle-circle.
pub fn sweep(a: &PlacedShape, velocity_a: Vec2, b: &PlacedShape, velocity_b: Vec2) -> Option<f32> {
    let (radius_a, radius_b) = match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => (ra, rb),
        _ => return None,
    };

    if circle_circle_overlap(a.position, radius_a, b.position, radius_b) {
        return Some(0.0);
    }

    let relative_velocity = velocity_a - velocity_b;
    if relative_velocity.length_squared() < EPSILON * EPSILON {
        return None;
    }

    let (t_near, _) = ray_circle_roots(a.position, relative_velocity, b.position, radius_a + radius_b)?;
    if t_near < 0.0 {
        None
    } else {
        Some(t_near)
    }
}
