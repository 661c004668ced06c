//! Drawing seam
//!
//! The simulation never rasterizes anything itself. Each tick it hands its
//! current state to a [`Surface`], which a host backs with a canvas, a GPU
//! pipeline, or nothing at all.

pub mod recording;

use glam::Vec2;

use crate::sim::Cell;

pub use recording::{DrawCommand, RecordingSurface};

/// Visible region of the world, in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// A 2D drawing target
pub trait Surface {
    /// Wipe the whole viewport
    fn clear(&mut self, viewport: Viewport);

    /// Outline a circle
    fn stroke_circle(&mut self, center: Vec2, radius: f32);

    /// Outline an axis-aligned rectangle from its top-left corner
    fn stroke_rect(&mut self, origin: Vec2, width: f32, height: f32);

    /// Centered label, shrunk to fit `max_width`
    fn fill_text(&mut self, text: &str, position: Vec2, max_width: f32);

    /// Small square marking a point (debug)
    fn point_marker(&mut self, position: Vec2, size: f32);

    /// Outline of an occupied broad-phase cell labelled with its shape count (debug)
    fn grid_cell(&mut self, cell: Cell, cell_size: f32, count: usize);
}

/// Surface that draws nothing, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn clear(&mut self, _viewport: Viewport) {}
    fn stroke_circle(&mut self, _center: Vec2, _radius: f32) {}
    fn stroke_rect(&mut self, _origin: Vec2, _width: f32, _height: f32) {}
    fn fill_text(&mut self, _text: &str, _position: Vec2, _max_width: f32) {}
    fn point_marker(&mut self, _position: Vec2, _size: f32) {}
    fn grid_cell(&mut self, _cell: Cell, _cell_size: f32, _count: usize) {}
}
