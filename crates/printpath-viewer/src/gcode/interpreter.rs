//! Modal G-code interpreter
//!
//! Folds one comment-stripped input line into the running modal state and
//! produces at most one renderable segment. The policy is best-effort and
//! non-throwing: a malformed numeric field skips only that field, an
//! unrecognized command is ignored silently, and nothing on the hot path
//! logs or allocates beyond the upper-cased line.

use glam::Vec3;
use printpath_core::{default_palette, Color4, ColorMode};

use super::segment::Segment;

/// Recognized parameter letters on a move line. Everything else falls to
/// `Ignored` so a junk word never aborts the rest of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveWord {
    X,
    Y,
    Z,
    E,
    F,
    Ignored,
}

impl MoveWord {
    fn from_byte(byte: u8) -> Self {
        match byte {
            b'X' => Self::X,
            b'Y' => Self::Y,
            b'Z' => Self::Z,
            b'E' => Self::E,
            b'F' => Self::F,
            _ => Self::Ignored,
        }
    }
}

/// Modal interpreter state
///
/// Created once per load and mutated by every recognized command. The
/// render frame follows the axis convention of the segment type: input Z
/// drives `position.y` (height), input Y drives `position.z`.
#[derive(Debug, Clone)]
pub struct InterpreterState {
    pub position: Vec3,
    /// G90 absolute (default) vs. G91 relative positioning.
    pub absolute: bool,
    pub feed_rate: f32,
    pub min_feed_seen: f32,
    pub max_feed_seen: f32,
    pub active_color: Color4,
    pub tool_index: usize,
    /// High-water mark of the render height axis.
    pub max_height: f32,
    /// G2/G3 commands recognized for bookkeeping; arcs are not expanded.
    pub arcs_seen: u64,
    color_mode: ColorMode,
    palette: Vec<Color4>,
    min_feed_color: Color4,
    max_feed_color: Color4,
}

impl Default for InterpreterState {
    fn default() -> Self {
        Self::new(
            default_palette(),
            ColorMode::Tool,
            Color4::new(0.0, 0.0, 1.0, 1.0),
            Color4::new(1.0, 0.0, 0.0, 1.0),
        )
    }
}

impl InterpreterState {
    pub fn new(
        palette: Vec<Color4>,
        color_mode: ColorMode,
        min_feed_color: Color4,
        max_feed_color: Color4,
    ) -> Self {
        let palette = if palette.is_empty() {
            default_palette()
        } else {
            palette
        };
        Self {
            position: Vec3::ZERO,
            absolute: true,
            feed_rate: 0.0,
            min_feed_seen: f32::MAX,
            max_feed_seen: 0.0,
            active_color: palette[0],
            tool_index: 0,
            max_height: 0.0,
            arcs_seen: 0,
            color_mode,
            palette,
            min_feed_color,
            max_feed_color,
        }
    }

    /// Interpret one raw input line. `offset` is the byte offset of the
    /// line start within the source and becomes the segment's
    /// `source_line`. Returns the emitted segment for `G0`/`G1` moves
    /// that carry at least one parameter word.
    pub fn apply_line(&mut self, raw: &str, offset: u64) -> Option<Segment> {
        let line = match raw.find(';') {
            Some(idx) => &raw[..idx],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let upper = line.to_ascii_uppercase();
        let mut words = upper.split_ascii_whitespace();
        let head = words.next()?;

        match head {
            "G0" | "G1" => self.apply_move(words, offset),
            "G2" | "G3" => {
                // Arc moves are tracked but not geometrically expanded.
                self.arcs_seen += 1;
                None
            }
            "G28" => {
                // Home resets position only; feed rate and color persist.
                self.position = Vec3::ZERO;
                None
            }
            "G90" => {
                self.absolute = true;
                None
            }
            "G91" => {
                self.absolute = false;
                None
            }
            "G92" => {
                // Coordinate offsets are parsed but intentionally not
                // applied; files that rely on G92 keep a positional
                // offset, matching the long-standing viewer behavior.
                None
            }
            "M567" => {
                self.apply_color_mix(words);
                None
            }
            _ => {
                // Tool selection is only honored as a bare single-token
                // line ("T2"), matching the wire protocol in the field.
                if head.starts_with('T') && words.next().is_none() {
                    self.select_tool(&head[1..]);
                }
                None
            }
        }
    }

    fn apply_move<'a>(
        &mut self,
        words: impl Iterator<Item = &'a str>,
        offset: u64,
    ) -> Option<Segment> {
        let start = self.position;
        let mut extruding = false;
        let mut saw_word = false;

        for word in words {
            saw_word = true;
            let Some(&letter) = word.as_bytes().first() else {
                continue;
            };
            match MoveWord::from_byte(letter) {
                MoveWord::X => {
                    if let Ok(value) = word[1..].parse::<f32>() {
                        self.position.x = if self.absolute {
                            value
                        } else {
                            self.position.x + value
                        };
                    }
                }
                MoveWord::Y => {
                    // Input Y drives render depth.
                    if let Ok(value) = word[1..].parse::<f32>() {
                        self.position.z = if self.absolute {
                            value
                        } else {
                            self.position.z + value
                        };
                    }
                }
                MoveWord::Z => {
                    // Input Z drives the render height axis.
                    if let Ok(value) = word[1..].parse::<f32>() {
                        self.position.y = if self.absolute {
                            value
                        } else {
                            self.position.y + value
                        };
                        self.max_height = self.max_height.max(self.position.y);
                    }
                }
                MoveWord::E => extruding = true,
                MoveWord::F => {
                    if let Ok(value) = word[1..].parse::<f32>() {
                        self.set_feed_rate(value);
                    }
                }
                MoveWord::Ignored => {}
            }
        }

        if !saw_word {
            return None;
        }
        Some(Segment {
            start,
            end: self.position,
            color: self.active_color,
            extruding,
            source_line: offset,
        })
    }

    fn set_feed_rate(&mut self, feed: f32) {
        self.feed_rate = feed;
        self.min_feed_seen = self.min_feed_seen.min(feed);
        self.max_feed_seen = self.max_feed_seen.max(feed);
        if self.color_mode == ColorMode::FeedRate {
            let span = self.max_feed_seen - self.min_feed_seen;
            let t = if span > 0.0 {
                (feed - self.min_feed_seen) / span
            } else {
                0.0
            };
            self.active_color = Color4::lerp(self.min_feed_color, self.max_feed_color, t);
        }
    }

    fn select_tool(&mut self, digits: &str) {
        if self.color_mode == ColorMode::FeedRate {
            return;
        }
        let Ok(tool) = digits.parse::<i64>() else {
            return;
        };
        // Map to the available extruder slots; negative tool numbers
        // (deselect) clamp to extruder 0.
        let index = (tool % self.palette.len() as i64).max(0) as usize;
        self.tool_index = index;
        self.active_color = self.palette[index];
    }

    /// `M567 E<p0>:<p1>:...` extruder color mix. The blend subtracts each
    /// extruder's color deficit scaled by its percentage from white, one
    /// extruder after another. This reproduces the device response
    /// byte-for-byte; it is deliberately not a weighted average.
    fn apply_color_mix<'a>(&mut self, words: impl Iterator<Item = &'a str>) {
        if self.color_mode == ColorMode::FeedRate {
            return;
        }
        let mut percentages: Vec<f32> = Vec::new();
        for word in words {
            if let Some(list) = word.strip_prefix('E') {
                // A malformed percentage drops only that entry's
                // contribution, keeping the remaining slots aligned.
                percentages = list
                    .split(':')
                    .map(|p| p.parse::<f32>().unwrap_or(0.0))
                    .collect();
            }
        }
        if percentages.is_empty() {
            return;
        }

        let mut rgb = [1.0f32; 3];
        for (index, pct) in percentages.iter().take(4).enumerate() {
            let Some(color) = self.palette.get(index) else {
                break;
            };
            rgb[0] -= (1.0 - color.r) * pct;
            rgb[1] -= (1.0 - color.g) * pct;
            rgb[2] -= (1.0 - color.b) * pct;
        }
        self.active_color = Color4::new(rgb[0], rgb[1], rgb[2], 1.0);
    }
}
