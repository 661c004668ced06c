//! Surface that records draw calls instead of executing them

use glam::Vec2;
use serde::Serialize;

use super::{Surface, Viewport};
use crate::sim::Cell;

/// One recorded draw call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear { width: f32, height: f32 },
    StrokeCircle { center: Vec2, radius: f32 },
    StrokeRect { origin: Vec2, width: f32, height: f32 },
    FillText { text: String, position: Vec2, max_width: f32 },
    PointMarker { position: Vec2, size: f32 },
    GridCell { col: i32, row: i32, cell_size: f32, count: usize },
}

/// Collects every draw call of a frame
///
/// A `clear` starts a new frame, so after a tick the surface holds exactly
/// what that tick drew.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded commands matching a predicate
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, viewport: Viewport) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear {
            width: viewport.width,
            height: viewport.height,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32) {
        self.commands.push(DrawCommand::StrokeCircle { center, radius });
    }

    fn stroke_rect(&mut self, origin: Vec2, width: f32, height: f32) {
        self.commands.push(DrawCommand::StrokeRect {
            origin,
            width,
            height,
        });
    }

    fn fill_text(&mut self, text: &str, position: Vec2, max_width: f32) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            position,
            max_width,
        });
    }

    fn point_marker(&mut self, position: Vec2, size: f32) {
        self.commands.push(DrawCommand::PointMarker { position, size });
    }

    fn grid_cell(&mut self, cell: Cell, cell_size: f32, count: usize) {
        self.commands.push(DrawCommand::GridCell {
            col: cell.col,
            row: cell.row,
            cell_size,
            count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_starts_new_frame() {
        let mut surface = RecordingSurface::new();
        surface.stroke_circle(Vec2::new(1.0, 2.0), 3.0);
        surface.clear(Viewport {
            width: 10.0,
            height: 20.0,
        });
        surface.stroke_rect(Vec2::ZERO, 4.0, 5.0);

        assert_eq!(surface.commands.len(), 2);
        assert!(matches!(surface.commands[0], DrawCommand::Clear { .. }));
        assert_eq!(
            surface.count(|c| matches!(c, DrawCommand::StrokeCircle { .. })),
            0
        );
    }

    #[test]
    fn test_commands_serialize_with_op_tag() {
        let mut surface = RecordingSurface::new();
        surface.grid_cell(Cell { col: 1, row: -2 }, 50.0, 3);

        let json = serde_json::to_string(&surface.commands).unwrap();
        assert!(json.contains("\"op\":\"grid_cell\""));
        assert!(json.contains("\"row\":-2"));
    }
}
