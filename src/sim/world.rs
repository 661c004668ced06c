//! Simulation world and the per-tick pipeline
//!
//! A tick runs, in order: boundary constraint, grid rebuild, render,
//! integration, then collision resolution over the grid's candidate pairs.
//! Candidates come from cells computed before integration.

use std::collections::HashSet;

use glam::Vec2;
use serde::Serialize;

use super::collision::{self, CollisionError, CollisionResult};
use super::constraint::{self, Arena};
use super::grid::{PairKey, SpatialGrid};
use super::shape::{Integrator, Shape, ShapeDef, ShapeError, ShapeId, ShapeKind};
use crate::renderer::{Surface, Viewport};
use crate::settings::{SettingsError, WorldSettings};

/// Something that went wrong during a tick without stopping it
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The resolver has no test for this pair
    UnsupportedPair {
        tick: u64,
        first: ShapeId,
        second: ShapeId,
        error: CollisionError,
    },
}

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u64,
    pub dt: f32,
    /// Boundary clamps applied
    pub clamped: usize,
    /// Resolver invocations
    pub pairs_tested: usize,
    /// Pairs that overlapped and were pushed apart
    pub contacts: usize,
    /// Pairs the resolver could not handle
    pub unsupported: usize,
}

/// Serializable view of one shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeSnapshot {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub name: String,
    pub fixed: bool,
    pub position: Vec2,
    pub previous_position: Vec2,
}

/// Serializable view of the whole world
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub shapes: Vec<ShapeSnapshot>,
}

/// Owns every shape, the id counter and the broad-phase grid
#[derive(Debug, Clone)]
pub struct World {
    settings: WorldSettings,
    integrator: Integrator,
    /// Insertion order, which is also iteration order every tick
    shapes: Vec<Shape>,
    grid: SpatialGrid,
    next_id: u32,
    tick_count: u64,
    diagnostics: Vec<Diagnostic>,
    /// Unsupported pairs already logged and queued as a diagnostic
    reported: HashSet<PairKey>,
}

impl Default for World {
    fn default() -> Self {
        Self::with_settings(WorldSettings::default())
    }
}

impl World {
    pub fn new(settings: WorldSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self::with_settings(settings))
    }

    fn with_settings(settings: WorldSettings) -> Self {
        log::info!(
            "World {}x{}, cell size {}, acceleration reset: {}",
            settings.arena.width,
            settings.arena.height,
            settings.cell_size,
            settings.acceleration_reset.as_str()
        );
        Self {
            integrator: Integrator {
                bias_divisor: settings.bias_divisor,
                reset: settings.acceleration_reset,
            },
            grid: SpatialGrid::new(settings.cell_size),
            settings,
            shapes: Vec::new(),
            next_id: 1,
            tick_count: 0,
            diagnostics: Vec::new(),
            reported: HashSet::new(),
        }
    }

    /// Allocate a new shape ID
    fn next_shape_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a shape; it is indexed and integrated from the next tick on
    ///
    /// A rejected definition does not consume an id.
    pub fn insert_shape(&mut self, def: ShapeDef) -> Result<ShapeId, ShapeError> {
        let shape = Shape::new(ShapeId(self.next_id), def)?;
        let id = self.next_shape_id();
        log::debug!("Inserted {} {} at {}", shape.tag(), id, shape.position());
        self.shapes.push(shape);
        Ok(id)
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn arena(&self) -> Arena {
        self.settings.arena
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.index_of(id).map(|i| &self.shapes[i])
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.index_of(id).map(move |i| &mut self.shapes[i])
    }

    fn index_of(&self, id: ShapeId) -> Option<usize> {
        // Ids are handed out in increasing order and shapes are never removed
        self.shapes.binary_search_by_key(&id, Shape::id).ok()
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Take the diagnostics collected since the last drain
    ///
    /// Each unsupported pair is queued once, on the first tick it is seen.
    pub fn drain_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Advance the world by one tick
    pub fn step<S: Surface + ?Sized>(&mut self, dt: f32, surface: &mut S) -> TickReport {
        self.tick_count += 1;
        let mut report = TickReport {
            tick: self.tick_count,
            dt,
            ..Default::default()
        };

        report.clamped = constraint::apply_boundary(&mut self.shapes, self.settings.arena);
        self.grid.rebuild(&mut self.shapes);
        self.render(surface);

        for shape in &mut self.shapes {
            shape.update(dt, &self.integrator);
        }

        for (i, j) in self.grid.candidate_pairs(&self.shapes) {
            report.pairs_tested += 1;
            let (a, b) = pair_mut(&mut self.shapes, i, j);
            match collision::resolve(a, b) {
                Ok(result) => {
                    if result.hit {
                        report.contacts += 1;
                    }
                }
                Err(error) => {
                    report.unsupported += 1;
                    let (first, second) = (a.id(), b.id());
                    // Repeats only show up in the report count
                    if self.reported.insert(PairKey::new(first, second)) {
                        log::warn!("Skipping {} and {}: {}", first, second, error);
                        self.diagnostics.push(Diagnostic::UnsupportedPair {
                            tick: self.tick_count,
                            first,
                            second,
                            error,
                        });
                    }
                }
            }
        }

        log::debug!(
            "Tick {}: dt={:.4} clamped={} pairs={} contacts={}",
            report.tick,
            report.dt,
            report.clamped,
            report.pairs_tested,
            report.contacts
        );
        report
    }

    /// Draw the current state, with the grid overlay in debug mode
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        let debug = self.settings.debug;
        surface.clear(Viewport {
            width: self.settings.arena.width,
            height: self.settings.arena.height,
        });
        for shape in &self.shapes {
            shape.draw(surface, debug);
        }
        if debug {
            self.grid.draw_overlay(surface);
        }
    }

    /// Resolve two shapes directly, outside of a tick
    ///
    /// Returns `None` if either id is unknown or both are the same shape.
    pub fn resolve_pair(
        &mut self,
        a: ShapeId,
        b: ShapeId,
    ) -> Option<Result<CollisionResult, CollisionError>> {
        let (i, j) = (self.index_of(a)?, self.index_of(b)?);
        if i == j {
            return None;
        }
        let (a, b) = pair_mut(&mut self.shapes, i, j);
        Some(collision::resolve(a, b))
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick_count,
            shapes: self
                .shapes
                .iter()
                .map(|s| ShapeSnapshot {
                    id: s.id(),
                    kind: s.kind,
                    name: s.name().to_string(),
                    fixed: s.is_fixed(),
                    position: s.position(),
                    previous_position: s.previous_position(),
                })
                .collect(),
        }
    }
}

/// Two distinct mutable elements of a slice, in the order asked for
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = items.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, NullSurface, RecordingSurface};
    use crate::sim::grid::Cell;
    use proptest::prelude::*;

    const DT: f32 = 0.02;

    #[test]
    fn test_ids_are_monotonic_per_world() {
        let mut world = World::default();
        let a = world.insert_shape(ShapeDef::circle(10.0, 10.0, 5.0)).unwrap();
        assert!(world.insert_shape(ShapeDef::circle(10.0, 10.0, -5.0)).is_err());
        let b = world.insert_shape(ShapeDef::rectangle(0.0, 0.0, 5.0, 5.0)).unwrap();
        assert_eq!((a, b), (ShapeId(1), ShapeId(2)));

        // A second world has its own counter
        let mut other = World::default();
        assert_eq!(other.insert_shape(ShapeDef::circle(1.0, 1.0, 1.0)).unwrap(), ShapeId(1));
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let settings = WorldSettings {
            cell_size: -1.0,
            ..Default::default()
        };
        assert!(World::new(settings).is_err());
    }

    #[test]
    fn test_shape_lookup_by_id() {
        let mut world = World::default();
        let ids: Vec<ShapeId> = (0..5)
            .map(|i| world.insert_shape(ShapeDef::circle(50.0 * i as f32 + 20.0, 20.0, 5.0)).unwrap())
            .collect();
        assert_eq!(world.shape(ids[3]).unwrap().position(), Vec2::new(170.0, 20.0));
        assert!(world.shape(ShapeId(99)).is_none());
    }

    #[test]
    fn test_two_overlapping_circles_resolve_to_contact() {
        let mut world = World::default();
        let a = world.insert_shape(ShapeDef::circle(100.0, 100.0, 10.0)).unwrap();
        let b = world.insert_shape(ShapeDef::circle(115.0, 100.0, 10.0)).unwrap();

        let result = world.resolve_pair(a, b).unwrap().unwrap();
        assert!(result.hit);
        let pa = world.shape(a).unwrap().position();
        let pb = world.shape(b).unwrap().position();
        assert_eq!(pa, Vec2::new(97.5, 100.0));
        assert_eq!(pb, Vec2::new(117.5, 100.0));
        assert!(world.resolve_pair(a, a).is_none());
    }

    #[test]
    fn test_fixed_rectangle_survives_falling_circle() {
        let mut world = World::default();
        let rect = world
            .insert_shape(ShapeDef::rectangle(50.0, 350.0, 400.0, 50.0).fixed().name("Fix"))
            .unwrap();
        let ball = world.insert_shape(ShapeDef::circle(250.0, 240.0, 25.0)).unwrap();

        let mut contacts = 0;
        for _ in 0..1000 {
            contacts += world.step(DT, &mut NullSurface).contacts;
        }

        assert!(contacts > 0);
        let rect = world.shape(rect).unwrap();
        assert_eq!(rect.position(), Vec2::new(50.0, 350.0));
        assert_eq!(rect.previous_position(), Vec2::new(50.0, 350.0));
        // The circle ends up resting on top of the rectangle
        assert!(world.shape(ball).unwrap().position().y < 350.0);
    }

    #[test]
    fn test_inserted_shape_joins_next_tick() {
        let mut world = World::default();
        world.insert_shape(ShapeDef::circle(100.0, 100.0, 10.0)).unwrap();
        world.step(DT, &mut NullSurface);
        world.step(DT, &mut NullSurface);

        let id = world.insert_shape(ShapeDef::circle(320.0, 120.0, 10.0)).unwrap();
        assert!(world.shape(id).unwrap().cells().is_empty());

        world.step(DT, &mut NullSurface);
        let shape = world.shape(id).unwrap();
        assert_eq!(shape.cells(), &[Cell { col: 6, row: 2 }]);
        assert_eq!(world.grid().bucket(Cell { col: 6, row: 2 }), &[1]);
        // Integrated once: previous is the insertion point, position moved by the bias
        assert_eq!(shape.previous_position(), Vec2::new(320.0, 120.0));
        assert!(shape.position().y > 120.0);
    }

    #[test]
    fn test_coincident_insert_stays_finite() {
        let mut world = World::default();
        world.insert_shape(ShapeDef::circle(250.0, 250.0, 10.0)).unwrap();
        world.step(DT, &mut NullSurface);
        let existing = world.shapes()[0].position();
        world.insert_shape(ShapeDef::circle(existing.x, existing.y, 10.0)).unwrap();

        for _ in 0..5 {
            world.step(DT, &mut NullSurface);
        }
        assert!(world.shapes().iter().all(|s| s.position().is_finite()));
    }

    #[test]
    fn test_mutually_overlapping_circles_each_pair_once() {
        let n = 5;
        let mut world = World::default();
        for i in 0..n {
            world.insert_shape(ShapeDef::circle(20.0 + i as f32, 20.0, 4.0)).unwrap();
        }
        let report = world.step(DT, &mut NullSurface);
        assert_eq!(report.pairs_tested, n * (n - 1) / 2);
    }

    #[test]
    fn test_rectangle_pair_reported_and_tick_completes() {
        let mut world = World::default();
        let a = world.insert_shape(ShapeDef::rectangle(100.0, 100.0, 40.0, 40.0)).unwrap();
        let b = world.insert_shape(ShapeDef::rectangle(110.0, 110.0, 40.0, 40.0)).unwrap();
        let c = world.insert_shape(ShapeDef::circle(400.0, 100.0, 10.0)).unwrap();

        let report = world.step(DT, &mut NullSurface);
        assert_eq!(report.unsupported, 1);
        // Integration still ran for everything
        assert!(world.shape(c).unwrap().position().y > 100.0);
        assert!(world.shape(a).unwrap().position().y > 100.0);

        let diagnostics = world.drain_diagnostics();
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnsupportedPair {
                tick: 1,
                first: a,
                second: b,
                error: CollisionError::UnsupportedShapePair {
                    first: crate::sim::ShapeTag::Rectangle,
                    second: crate::sim::ShapeTag::Rectangle,
                },
            }]
        );
        assert!(world.drain_diagnostics().is_empty());
    }

    #[test]
    fn test_undrained_diagnostics_stay_bounded() {
        let mut world = World::default();
        world.insert_shape(ShapeDef::rectangle(100.0, 100.0, 40.0, 40.0).fixed()).unwrap();
        world.insert_shape(ShapeDef::rectangle(110.0, 110.0, 40.0, 40.0).fixed()).unwrap();

        for _ in 0..5_000 {
            let report = world.step(DT, &mut NullSurface);
            assert_eq!(report.unsupported, 1);
        }

        let diagnostics = world.drain_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0], Diagnostic::UnsupportedPair { tick: 1, .. }));
    }

    #[test]
    fn test_render_order_and_debug_overlay() {
        let settings = WorldSettings {
            debug: true,
            ..Default::default()
        };
        let mut world = World::new(settings).unwrap();
        world.insert_shape(ShapeDef::circle(45.0, 45.0, 10.0).name("S1")).unwrap();

        let mut surface = RecordingSurface::new();
        world.step(DT, &mut surface);

        assert!(matches!(surface.commands[0], DrawCommand::Clear { width: 500.0, height: 500.0 }));
        assert!(matches!(surface.commands[1], DrawCommand::StrokeCircle { .. }));
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::GridCell { .. })), 4);
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::FillText { .. })), 1);
    }

    #[test]
    fn test_render_without_debug_draws_outlines_only() {
        let mut world = World::default();
        world.insert_shape(ShapeDef::circle(45.0, 45.0, 10.0)).unwrap();
        world.insert_shape(ShapeDef::rectangle(100.0, 100.0, 10.0, 10.0)).unwrap();

        let mut surface = RecordingSurface::new();
        world.render(&mut surface);
        assert_eq!(surface.commands.len(), 3);
    }

    #[test]
    fn test_boundary_clamp_on_detecting_tick() {
        let mut world = World::default();
        let id = world.insert_shape(ShapeDef::circle(250.0, 250.0, 10.0)).unwrap();
        world.shape_mut(id).unwrap().set_position(Vec2::new(495.0, 250.0));

        let report = world.step(0.0, &mut NullSurface);
        assert_eq!(report.clamped, 1);
        // Clamped to 490 before integration, then integration carries the implied velocity
        assert_eq!(world.shape(id).unwrap().previous_position().x, 490.0);
    }

    fn build_scene(world: &mut World, circles: &[(f32, f32, f32)]) {
        world
            .insert_shape(ShapeDef::rectangle(50.0, 350.0, 400.0, 50.0).fixed())
            .unwrap();
        for &(x, y, r) in circles {
            world.insert_shape(ShapeDef::circle(x, y, r)).unwrap();
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_identical_runs_are_bit_identical(
            circles in prop::collection::vec((20.0f32..480.0, 20.0f32..300.0, 3.0f32..30.0), 1..12),
            dts in prop::collection::vec(0.0f32..0.05, 1..60),
        ) {
            let mut first = World::default();
            let mut second = World::default();
            build_scene(&mut first, &circles);
            build_scene(&mut second, &circles);

            for &dt in &dts {
                first.step(dt, &mut NullSurface);
                second.step(dt, &mut NullSurface);
            }

            for (a, b) in first.shapes().iter().zip(second.shapes()) {
                prop_assert_eq!(a.position().x.to_bits(), b.position().x.to_bits());
                prop_assert_eq!(a.position().y.to_bits(), b.position().y.to_bits());
            }
        }

        #[test]
        fn prop_fixed_shapes_never_move(
            circles in prop::collection::vec((20.0f32..480.0, 20.0f32..480.0, 3.0f32..40.0), 1..12),
            ticks in 1usize..200,
        ) {
            let mut world = World::default();
            let anchor = world
                .insert_shape(ShapeDef::circle(250.0, 250.0, 60.0).fixed())
                .unwrap();
            build_scene(&mut world, &circles);

            for _ in 0..ticks {
                world.step(DT, &mut NullSurface);
            }

            prop_assert_eq!(world.shape(anchor).unwrap().position(), Vec2::new(250.0, 250.0));
            prop_assert_eq!(world.shapes()[1].position(), Vec2::new(50.0, 350.0));
        }
    }
}
