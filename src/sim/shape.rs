//! Shapes and their positional integration
//!
//! A shape never stores its velocity. It keeps the position it had one tick
//! ago, and the difference between the two is the implied velocity.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::{Cell, GridBounds};
use crate::consts::{DEFAULT_MASS, POINT_MARKER_SIZE};
use crate::renderer::Surface;
use crate::settings::AccelerationReset;

/// World-unique shape identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShapeId(pub u32);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape variant tag used for collision dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeTag {
    Circle,
    Rectangle,
}

impl fmt::Display for ShapeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeTag::Circle => f.write_str("circle"),
            ShapeTag::Rectangle => f.write_str("rectangle"),
        }
    }
}

/// Per-variant geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Positioned by its centre
    Circle { radius: f32 },
    /// Axis-aligned, positioned by its top-left corner
    Rectangle { width: f32, height: f32 },
}

impl ShapeKind {
    pub fn tag(&self) -> ShapeTag {
        match self {
            ShapeKind::Circle { .. } => ShapeTag::Circle,
            ShapeKind::Rectangle { .. } => ShapeTag::Rectangle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("position ({x}, {y}) is not finite")]
    NonFinitePosition { x: f32, y: f32 },
    #[error("radius {0} must be finite and positive")]
    InvalidRadius(f32),
    #[error("rectangle size {width}x{height} must be finite and positive")]
    InvalidSize { width: f32, height: f32 },
    #[error("mass {0} must be finite and non-negative")]
    InvalidMass(f32),
    #[error("acceleration ({x}, {y}) is not finite")]
    NonFiniteAcceleration { x: f32, y: f32 },
}

/// Caller-side description of a shape to insert into a world
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDef {
    pub kind: ShapeKind,
    pub position: Vec2,
    pub fixed: bool,
    pub mass: f32,
    pub name: String,
    /// Initial acceleration, also kept as the shape's baseline
    pub acceleration: Vec2,
}

impl ShapeDef {
    pub fn circle(x: f32, y: f32, radius: f32) -> Self {
        Self::with_kind(ShapeKind::Circle { radius }, Vec2::new(x, y))
    }

    /// Rectangle from its top-left corner
    pub fn rectangle(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::with_kind(ShapeKind::Rectangle { width, height }, Vec2::new(x, y))
    }

    fn with_kind(kind: ShapeKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            fixed: false,
            mass: DEFAULT_MASS,
            name: String::new(),
            acceleration: Vec2::ZERO,
        }
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }

    fn validate(&self) -> Result<(), ShapeError> {
        if !self.position.is_finite() {
            return Err(ShapeError::NonFinitePosition {
                x: self.position.x,
                y: self.position.y,
            });
        }
        match self.kind {
            ShapeKind::Circle { radius } => {
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(ShapeError::InvalidRadius(radius));
                }
            }
            ShapeKind::Rectangle { width, height } => {
                if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
                    return Err(ShapeError::InvalidSize { width, height });
                }
            }
        }
        if !(self.mass.is_finite() && self.mass >= 0.0) {
            return Err(ShapeError::InvalidMass(self.mass));
        }
        if !self.acceleration.is_finite() {
            return Err(ShapeError::NonFiniteAcceleration {
                x: self.acceleration.x,
                y: self.acceleration.y,
            });
        }
        Ok(())
    }
}

/// Integration parameters shared by every shape of a world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integrator {
    /// Per-tick downward bias is `mass / bias_divisor`
    pub bias_divisor: f32,
    pub reset: AccelerationReset,
}

impl Integrator {
    #[inline]
    pub fn bias(&self, mass: f32) -> Vec2 {
        Vec2::new(0.0, mass / self.bias_divisor)
    }
}

/// A simulated shape
#[derive(Debug, Clone)]
pub struct Shape {
    id: ShapeId,
    pub kind: ShapeKind,
    position: Vec2,
    previous_position: Vec2,
    acceleration: Vec2,
    base_acceleration: Vec2,
    fixed: bool,
    mass: f32,
    name: String,
    /// Cells occupied at the last grid rebuild
    cells: Vec<Cell>,
}

impl Shape {
    /// Build a shape; ids come from the owning world
    pub(crate) fn new(id: ShapeId, def: ShapeDef) -> Result<Self, ShapeError> {
        def.validate()?;
        Ok(Self {
            id,
            kind: def.kind,
            position: def.position,
            previous_position: def.position,
            acceleration: def.acceleration,
            base_acceleration: def.acceleration,
            fixed: def.fixed,
            mass: def.mass,
            name: def.name,
            cells: Vec::new(),
        })
    }

    #[inline]
    pub fn id(&self) -> ShapeId {
        self.id
    }

    #[inline]
    pub fn tag(&self) -> ShapeTag {
        self.kind.tag()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn previous_position(&self) -> Vec2 {
        self.previous_position
    }

    /// Implied velocity, in world units per tick
    pub fn velocity(&self) -> Vec2 {
        self.position - self.previous_position
    }

    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    pub fn set_acceleration(&mut self, acceleration: Vec2) {
        self.acceleration = acceleration;
    }

    pub fn base_acceleration(&self) -> Vec2 {
        self.base_acceleration
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }

    /// Translate without touching the previous position
    #[inline]
    pub fn move_by(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Geometric centre
    pub fn center(&self) -> Vec2 {
        match self.kind {
            ShapeKind::Circle { .. } => self.position,
            ShapeKind::Rectangle { width, height } => {
                self.position + Vec2::new(width, height) * 0.5
            }
        }
    }

    /// Inclusive range of grid cells covered by the shape's extent
    pub fn grid_bounds(&self, cell_size: f32) -> GridBounds {
        let (min, max) = match self.kind {
            ShapeKind::Circle { radius } => (
                self.position - Vec2::splat(radius),
                self.position + Vec2::splat(radius),
            ),
            ShapeKind::Rectangle { width, height } => {
                (self.position, self.position + Vec2::new(width, height))
            }
        };
        GridBounds {
            min_col: (min.x / cell_size).floor() as i32,
            max_col: (max.x / cell_size).floor() as i32,
            min_row: (min.y / cell_size).floor() as i32,
            max_row: (max.y / cell_size).floor() as i32,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut Vec<Cell> {
        &mut self.cells
    }

    /// Advance one positional integration step
    ///
    /// `x' = x + (x - x_prev) + a*dt^2 + bias`, after which the acceleration
    /// is consumed according to the integrator's reset policy.
    pub fn update(&mut self, dt: f32, integrator: &Integrator) {
        if self.fixed {
            return;
        }

        let velocity = self.position - self.previous_position;
        self.previous_position = self.position;
        self.position += velocity + self.acceleration * (dt * dt) + integrator.bias(self.mass);
        self.acceleration = match integrator.reset {
            AccelerationReset::Zero => Vec2::ZERO,
            AccelerationReset::Baseline => self.base_acceleration,
        };
    }

    /// Outline the shape, plus its anchor point and label in debug mode
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, debug: bool) {
        let label_width = match self.kind {
            ShapeKind::Circle { radius } => {
                surface.stroke_circle(self.position, radius);
                radius * 2.0
            }
            ShapeKind::Rectangle { width, height } => {
                surface.stroke_rect(self.position, width, height);
                width
            }
        };

        if debug {
            surface.point_marker(self.position, POINT_MARKER_SIZE);
            surface.fill_text(&self.name, self.center(), label_width);
        }
    }
}
