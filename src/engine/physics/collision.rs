use glam::Vec2;
use std::ops::{BitAnd, BitOr};

use super::body::BodyHandle;

/// Bit mask used to filter which bodies can collide with each other
///
/// Two bodies are considered for collision only when their masks share at
/// least one bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionLayer(u32);

impl CollisionLayer {
    /// Interacts with everything
    pub const ALL: CollisionLayer = CollisionLayer(u32::MAX);

    /// Interacts with nothing
    pub const NONE: CollisionLayer = CollisionLayer(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Mask with only bit `index` set (0..32)
    pub const fn bit(index: u32) -> Self {
        Self(1 << index)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether two masks share any bit
    pub const fn interacts_with(self, other: CollisionLayer) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for CollisionLayer {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for CollisionLayer {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for CollisionLayer {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

/// A contact between two bodies, valid for a single resolution pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// World-space contact point
    pub point: Vec2,
    /// Unit normal pointing from `body_a` toward `body_b`
    pub normal: Vec2,
    /// Penetration depth, never negative
    pub depth: f32,
}

/// Collision notification recorded during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionEvent {
    /// A resolution pass handled this contact
    Collision(Contact),

    /// A trigger pair started overlapping
    TriggerEnter { body_a: BodyHandle, body_b: BodyHandle },

    /// A trigger pair stopped overlapping
    TriggerExit { body_a: BodyHandle, body_b: BodyHandle },
}

/// Queue for storing collision events during a physics step
#[derive(Debug, Default)]
pub struct CollisionEventQueue {
    events: Vec<CollisionEvent>,
}

impl CollisionEventQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32), // Pre-allocate for common case
        }
    }

    /// Clear all events (call at start of physics step)
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// All events recorded since the last clear
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    pub(crate) fn push(&mut self, event: CollisionEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
