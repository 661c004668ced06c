//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Time only enters through the `dt` handed to each tick
//! - Stable iteration order (shape insertion order)
//! - No rendering or platform dependencies beyond the `Surface` seam

pub mod collision;
pub mod constraint;
pub mod grid;
pub mod scene;
pub mod scheduler;
pub mod shape;
pub mod world;

pub use collision::{CollisionError, CollisionResult, resolve};
pub use constraint::{Arena, apply_boundary};
pub use grid::{Cell, GridBounds, PairKey, SpatialGrid};
pub use scene::Scene;
pub use scheduler::{Clock, LoopState, ManualClock, ScheduleId, SimulationLoop, SystemClock};
pub use shape::{Integrator, Shape, ShapeDef, ShapeError, ShapeId, ShapeKind, ShapeTag};
pub use world::{Diagnostic, ShapeSnapshot, TickReport, World, WorldSnapshot};
