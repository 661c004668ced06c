//! Arena boundary constraint
//!
//! Movable circles are clamped inside the arena. A clamp also flips the
//! matching component of the shape's stored acceleration, which gives a rough
//! bounce. The implied velocity (position minus previous position) is left
//! alone, so this is not a true reflection.

use serde::{Deserialize, Serialize};

use super::shape::{Shape, ShapeKind};

/// Axis-aligned arena anchored at the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Clamp movable circles into the arena, returning how many clamps fired
///
/// Rectangles and fixed shapes are never touched.
pub fn apply_boundary(shapes: &mut [Shape], arena: Arena) -> usize {
    let mut clamped = 0;

    for shape in shapes.iter_mut() {
        let ShapeKind::Circle { radius } = shape.kind else {
            continue;
        };
        if shape.is_fixed() {
            continue;
        }

        let mut pos = shape.position();
        let mut acc = shape.acceleration();
        let before = clamped;

        // Left
        if pos.x < radius {
            acc.x = -acc.x;
            pos.x = radius;
            clamped += 1;
        }
        // Right
        if pos.x > arena.width - radius {
            acc.x = -acc.x;
            pos.x = arena.width - radius;
            clamped += 1;
        }
        // Bottom
        if pos.y > arena.height - radius {
            acc.y = -acc.y;
            pos.y = arena.height - radius;
            clamped += 1;
        }
        // Top
        if pos.y < radius {
            acc.y = -acc.y;
            pos.y = radius;
            clamped += 1;
        }

        if clamped != before {
            shape.set_position(pos);
            shape.set_acceleration(acc);
        }
    }

    clamped
}
