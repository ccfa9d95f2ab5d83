// Impulse-based contact resolution
//
// One call handles one contact for one pass: positional correction, then a
// normal impulse, then a Coulomb-clamped friction impulse.

use super::body::Body;
use super::collision::Contact;
use crate::core::math::EPSILON;

/// Penetration allowed before positional correction kicks in
pub const PENETRATION_SLOP: f32 = 0.01;

/// Fraction of the remaining penetration removed per pass
pub const CORRECTION_PERCENT: f32 = 0.8;

/// Resolve a single contact between `body_a` and `body_b`.
///
/// Returns `false` without touching either body when both are immovable.
pub fn resolve_contact(body_a: &mut Body, body_b: &mut Body, contact: &Contact) -> bool {
    let total_inv_mass = body_a.inv_mass() + body_b.inv_mass();
    if total_inv_mass <= 0.0 {
        return false;
    }

    let normal = contact.normal;
    let point = contact.point;

    // move the bodies apart in proportion to their inverse mass
    let correction =
        normal * ((contact.depth - PENETRATION_SLOP).max(0.0) * CORRECTION_PERCENT / total_inv_mass);
    body_a.position -= correction * body_a.inv_mass();
    body_b.position += correction * body_b.inv_mass();

    let vab = body_b.linear_velocity - body_a.linear_velocity;
    let velocity_along_normal = vab.dot(normal);
    if velocity_along_normal > 0.0 {
        // already separating
        return true;
    }

    let restitution = body_a.restitution.min(body_b.restitution);
    let impulse_j = -(1.0 + restitution) * velocity_along_normal / total_inv_mass;
    let vec_impulse_j = normal * impulse_j;

    body_a.apply_impulse(-vec_impulse_j, point);
    body_b.apply_impulse(vec_impulse_j, point);

    // friction acts against the tangential part of the new relative velocity
    let vab = body_b.linear_velocity - body_a.linear_velocity;
    let vel_tan = vab - normal * vab.dot(normal);
    if vel_tan.length_squared() < EPSILON * EPSILON {
        return true;
    }
    let tangent = vel_tan.normalize();

    let impulse_t = -vab.dot(tangent) / total_inv_mass;
    let mu = (body_a.friction * body_b.friction).sqrt();
    let impulse_friction = if impulse_t.abs() < impulse_j * mu {
        tangent * impulse_t
    } else {
        tangent * (-impulse_j * mu)
    };

    body_a.apply_impulse(-impulse_friction, point);
    body_b.apply_impulse(impulse_friction, point);

    true
}
