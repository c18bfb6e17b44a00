//! Progress-driven recoloring of sealed chunks
//!
//! The external print-progress signal arrives as a monotonically non-decreasing
//! file byte offset. Each recolor pass binary-searches every sealed
//! chunk's ascending source-line index for the printed and look-ahead
//! boundaries and repaints from the chunk's base colors, so applying the
//! same cursor twice yields an identical result.

use std::time::{Duration, Instant};

use printpath_core::Color4;
use tracing::debug;

use super::chunk::SealedChunk;

#[derive(Debug, Clone)]
pub struct ProgressTracker {
    progress_color: Color4,
    /// Look-ahead window in file bytes.
    lookahead: u64,
    /// Ghost untracked primitives instead of hiding them.
    show_solid: bool,
    /// Alpha for ghosted primitives.
    solid_transparency: f32,
    refresh_interval: Duration,
    cursor: u64,
    tracking: bool,
    last_pass: Option<Instant>,
    /// Set when the final pass has painted; tracking shuts off one
    /// refresh interval later so the update loop cannot run forever.
    final_pass_at: Option<Instant>,
}

impl ProgressTracker {
    pub fn new(
        progress_color: Color4,
        lookahead: u64,
        show_solid: bool,
        solid_transparency: f32,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            progress_color,
            lookahead,
            show_solid,
            solid_transparency,
            refresh_interval,
            cursor: 0,
            tracking: false,
            last_pass: None,
            final_pass_at: None,
        }
    }

    pub fn set_tracking(&mut self, enabled: bool) {
        self.tracking = enabled;
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Advance the external position cursor. Regressions are ignored;
    /// the signal is monotonic by contract. `u64::MAX` requests the
    /// final pass.
    pub fn update_cursor(&mut self, position: u64) {
        if position > self.cursor {
            self.cursor = position;
        }
    }

    /// Run one recolor pass if due. `now` comes from the caller's frame
    /// callback so the throttle is under test control. Returns whether a
    /// pass ran.
    pub fn on_render_tick(&mut self, now: Instant, chunks: &mut [SealedChunk]) -> bool {
        if !self.tracking {
            return false;
        }
        if let Some(painted_at) = self.final_pass_at {
            if now.duration_since(painted_at) >= self.refresh_interval {
                debug!("final pass settled, disabling live tracking");
                self.tracking = false;
            }
            return false;
        }

        let final_pass = self.cursor == u64::MAX;
        if !final_pass {
            if let Some(last) = self.last_pass {
                if now.duration_since(last) < self.refresh_interval {
                    return false;
                }
            }
        }
        self.last_pass = Some(now);

        for chunk in chunks.iter_mut() {
            self.restyle(chunk);
        }
        if final_pass {
            self.final_pass_at = Some(now);
        }
        true
    }

    /// Repaint one sealed chunk for the current cursor. Only the color
    /// buffer is touched; geometry stays frozen.
    fn restyle(&self, chunk: &mut SealedChunk) {
        let printed_end = chunk.source_lines().partition_point(|&line| line <= self.cursor);
        let ahead_cursor = self.cursor.saturating_add(self.lookahead);
        let ahead_end = chunk
            .source_lines()
            .partition_point(|&line| line <= ahead_cursor);

        for primitive in 0..printed_end {
            chunk.paint_primitive(primitive, self.progress_color);
        }
        for primitive in printed_end..ahead_end {
            let base = chunk.base_color(primitive);
            chunk.paint_primitive(primitive, base);
        }
        let hidden_alpha = if self.show_solid {
            self.solid_transparency
        } else {
            0.0
        };
        for primitive in ahead_end..chunk.primitive_count() {
            let base = chunk.base_color(primitive).with_alpha(hidden_alpha);
            chunk.paint_primitive(primitive, base);
        }
    }
}
