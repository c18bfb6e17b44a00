//! Renderable motion segments

use glam::Vec3;
use printpath_core::Color4;

/// One motion command's renderable geometry.
///
/// Positions are copies of the interpreter cursor in the render frame:
/// input X maps to x, input Z drives y (the render height axis), and
/// input Y drives z (depth). `start` is the cursor before the producing
/// command, `end` the cursor immediately after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
    /// Snapshot of the active color at emission time. Later `T`/`M567`
    /// commands never retroactively recolor emitted segments.
    pub color: Color4,
    pub extruding: bool,
    /// Byte offset of the start of the input line that produced this
    /// segment. Strictly increasing across the emitted sequence, which is
    /// what lets the progress tracker binary-search sealed chunks.
    pub source_line: u64,
}

impl Segment {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn midpoint(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    /// Render height at the end of the move.
    pub fn height(&self) -> f32 {
        self.end.y
    }
}
