//! Gridfall - deterministic 2D shape physics
//!
//! Core modules:
//! - `sim`: Deterministic simulation (shapes, broad phase, collisions, loop)
//! - `renderer`: Drawing seam consumed by the simulation each tick
//! - `settings`: World configuration

pub mod renderer;
pub mod settings;
pub mod sim;

pub use renderer::{DrawCommand, NullSurface, RecordingSurface, Surface};
pub use settings::{AccelerationReset, SettingsError, WorldSettings};
pub use sim::{
    Arena, CollisionError, CollisionResult, ShapeDef, ShapeError, ShapeId, ShapeKind, ShapeTag,
    SimulationLoop, SpatialGrid, TickReport, World,
};

/// Simulation configuration constants
pub mod consts {
    /// Interval between scheduled ticks, in seconds
    pub const TICK_INTERVAL: f64 = 0.02;

    /// Default arena dimensions
    pub const ARENA_WIDTH: f32 = 500.0;
    pub const ARENA_HEIGHT: f32 = 500.0;

    /// Broad-phase cell edge length
    pub const CELL_SIZE: f32 = 50.0;

    /// Downward bias per tick is `mass / BIAS_DIVISOR`
    pub const BIAS_DIVISOR: f32 = 9.81;

    /// Shape defaults
    pub const DEFAULT_MASS: f32 = 1.0;

    /// Below this centre distance two circles are treated as coincident
    pub const SEPARATION_EPSILON: f32 = 1e-6;

    /// Edge length of the debug point marker
    pub const POINT_MARKER_SIZE: f32 = 10.0;
}
