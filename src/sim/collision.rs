//! Narrow phase: overlap tests and positional response
//!
//! Overlapping shapes are pushed apart along the contact normal, each movable
//! shape taking half the overlap. Mass does not weight the split, and a fixed
//! partner does not hand its half to the other shape.
//!
//! Circle-rectangle contact is approximate: only the vertical distance between
//! the circle centre and the rectangle's centre line is tested against
//! `radius + height / 2`. Horizontal extent is ignored, so a circle anywhere
//! left or right of the rectangle at the same height still collides with it.

use glam::Vec2;
use thiserror::Error;

use super::shape::{Shape, ShapeKind, ShapeTag};
use crate::consts::SEPARATION_EPSILON;

/// Axis used when two circle centres coincide
const DEFAULT_SEPARATION_AXIS: Vec2 = Vec2::X;

/// Axis used when a circle centre sits on a rectangle's centre line (pushes the circle up)
const DEFAULT_VERTICAL_AXIS: Vec2 = Vec2::NEG_Y;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CollisionError {
    #[error("no collision test for {first}-{second} pairs")]
    UnsupportedShapePair { first: ShapeTag, second: ShapeTag },
}

/// Outcome of resolving one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Whether the shapes overlapped
    pub hit: bool,
    /// Unit direction from the second shape toward the first
    pub normal: Vec2,
    /// Overlap before the response was applied
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Test a pair and, if they overlap, push them apart
///
/// Rectangle-circle is handled as circle-rectangle with the arguments
/// swapped. Rectangle-rectangle has no test and fails without touching
/// either shape.
pub fn resolve(a: &mut Shape, b: &mut Shape) -> Result<CollisionResult, CollisionError> {
    match (a.kind, b.kind) {
        (ShapeKind::Circle { radius: ra }, ShapeKind::Circle { radius: rb }) => {
            Ok(circle_circle(a, ra, b, rb))
        }
        (ShapeKind::Circle { radius }, ShapeKind::Rectangle { height, .. }) => {
            Ok(circle_rectangle(a, radius, b, height))
        }
        (ShapeKind::Rectangle { .. }, ShapeKind::Circle { .. }) => {
            let swapped = resolve(b, a)?;
            Ok(CollisionResult {
                normal: -swapped.normal,
                ..swapped
            })
        }
        (ShapeKind::Rectangle { .. }, ShapeKind::Rectangle { .. }) => {
            Err(CollisionError::UnsupportedShapePair {
                first: a.tag(),
                second: b.tag(),
            })
        }
    }
}

fn circle_circle(a: &mut Shape, ra: f32, b: &mut Shape, rb: f32) -> CollisionResult {
    let diff = a.position() - b.position();
    let dist = diff.length();
    let reach = ra + rb;
    if dist >= reach {
        return CollisionResult::miss();
    }

    let normal = if dist > SEPARATION_EPSILON {
        diff / dist
    } else {
        log::debug!("coincident circles {} and {}, separating along x", a.id(), b.id());
        DEFAULT_SEPARATION_AXIS
    };
    let penetration = reach - dist;
    push_apart(a, b, normal, penetration);

    CollisionResult {
        hit: true,
        normal,
        penetration,
    }
}

fn circle_rectangle(circle: &mut Shape, radius: f32, rect: &mut Shape, height: f32) -> CollisionResult {
    let anchor = Vec2::new(circle.position().x, rect.center().y);
    let diff = circle.position() - anchor;
    let dist = diff.length();
    let reach = radius + height / 2.0;
    if dist >= reach {
        return CollisionResult::miss();
    }

    let normal = if dist > SEPARATION_EPSILON {
        diff / dist
    } else {
        log::debug!("circle {} centred on rectangle {}, separating upward", circle.id(), rect.id());
        DEFAULT_VERTICAL_AXIS
    };
    let penetration = reach - dist;
    push_apart(circle, rect, normal, penetration);

    CollisionResult {
        hit: true,
        normal,
        penetration,
    }
}

/// Move each movable shape half the overlap away from the other
#[inline]
fn push_apart(a: &mut Shape, b: &mut Shape, normal: Vec2, overlap: f32) {
    let half = normal * (overlap / 2.0);
    if !a.is_fixed() {
        a.move_by(half);
    }
    if !b.is_fixed() {
        b.move_by(-half);
    }
}
