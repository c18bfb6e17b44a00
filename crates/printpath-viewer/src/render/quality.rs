//! Performance-budget quality selection
//!
//! Picks a geometric representation and decimation divisor from the input
//! size and the device's quality tier, so the projected primitive count
//! stays under a per-tier ceiling. The selection is a pure function of
//! its inputs; device detection and persisted preferences are the host's
//! concern and arrive here only as the tier.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use printpath_core::QualityTier;

/// Default per-chunk segment limit.
pub const DEFAULT_MESH_BREAK_POINT: usize = 20_000;

/// Largest decimation divisor the search will try per mode.
const MAX_DIVISOR: u32 = 256;

/// Divisor used when no (mode, divisor) pair fits under the ceiling.
const FALLBACK_DIVISOR: u32 = 256;

/// Candidate representations, richest first.
const MODE_ORDER: [RenderMode; 3] = [RenderMode::Surface, RenderMode::Line, RenderMode::Point];

/// Geometric representation of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// One extruded box per segment.
    Surface,
    /// Paired line endpoints per segment.
    Line,
    /// One point sample per segment.
    Point,
}

impl RenderMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Surface => "Surface Rendering",
            Self::Line => "Line Rendering",
            Self::Point => "Point Cloud",
        }
    }

    /// Relative vertex cost used when projecting the primitive budget.
    pub fn vertex_multiplier(&self) -> u64 {
        match self {
            Self::Surface => 24,
            Self::Line => 2,
            Self::Point => 1,
        }
    }

    /// Vertices emitted into the position/color buffers per primitive.
    pub fn vertices_per_primitive(&self) -> usize {
        match self {
            Self::Surface => 8,
            Self::Line => 2,
            Self::Point => 1,
        }
    }
}

/// Quality profile derived once per load, immutable for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityProfile {
    pub render_mode: RenderMode,
    /// Decimation divisor; 1 disables decimation.
    pub every_nth_row: u32,
    /// Minimum delay between live recolor passes.
    pub refresh_interval: Duration,
    /// Segments per sealed chunk.
    pub mesh_break_point: usize,
}

fn tier_ceiling(level: u8) -> u64 {
    match level {
        1 => 250_000,
        2 => 500_000,
        3 => 1_000_000,
        4 => 2_000_000,
        _ => 4_000_000,
    }
}

fn tier_start_mode(level: u8) -> usize {
    // Weaker tiers never attempt surface rendering.
    if level >= 4 {
        0
    } else {
        1
    }
}

fn tier_refresh(level: u8) -> Duration {
    match level {
        1 => Duration::from_secs(10),
        2 => Duration::from_secs(5),
        3 => Duration::from_secs(2),
        4 => Duration::from_secs(1),
        _ => Duration::from_millis(500),
    }
}

/// Select a quality profile for the given input size and tier.
pub fn select_quality(line_count: u64, tier: QualityTier) -> QualityProfile {
    let level = match tier {
        QualityTier::Max => {
            return QualityProfile {
                render_mode: RenderMode::Surface,
                every_nth_row: 1,
                refresh_interval: Duration::from_millis(500),
                mesh_break_point: DEFAULT_MESH_BREAK_POINT,
            }
        }
        QualityTier::Level(level) => level.clamp(1, 5),
    };

    let ceiling = tier_ceiling(level);
    for mode in &MODE_ORDER[tier_start_mode(level)..] {
        let mut divisor = 1u32;
        while divisor <= MAX_DIVISOR {
            let projected =
                line_count.saturating_mul(mode.vertex_multiplier()) / u64::from(divisor);
            if projected <= ceiling {
                debug!(
                    mode = mode.name(),
                    divisor, projected, ceiling, "quality selected"
                );
                return QualityProfile {
                    render_mode: *mode,
                    every_nth_row: divisor,
                    refresh_interval: tier_refresh(level),
                    mesh_break_point: DEFAULT_MESH_BREAK_POINT,
                };
            }
            divisor *= 2;
        }
    }

    // Nothing fit under the ceiling: fall back to heavily decimated line
    // rendering rather than refusing to draw.
    QualityProfile {
        render_mode: RenderMode::Line,
        every_nth_row: FALLBACK_DIVISOR,
        refresh_interval: tier_refresh(level),
        mesh_break_point: DEFAULT_MESH_BREAK_POINT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projected(profile: &QualityProfile, line_count: u64) -> u64 {
        line_count.saturating_mul(profile.render_mode.vertex_multiplier())
            / u64::from(profile.every_nth_row)
    }

    #[test]
    fn max_tier_forces_full_detail_surface() {
        let profile = select_quality(50_000_000, QualityTier::Max);
        assert_eq!(profile.render_mode, RenderMode::Surface);
        assert_eq!(profile.every_nth_row, 1);
    }

    #[test]
    fn small_input_gets_undecimated_profile() {
        let profile = select_quality(25_000, QualityTier::Level(1));
        assert_eq!(profile.every_nth_row, 1);
        assert!(projected(&profile, 25_000) <= tier_ceiling(1));
    }

    #[test]
    fn tier_one_budget_holds_up_to_fifty_million_lines() {
        let mut lines = 0u64;
        while lines <= 50_000_000 {
            let profile = select_quality(lines, QualityTier::Level(1));
            assert!(
                projected(&profile, lines) <= tier_ceiling(1),
                "budget exceeded at {lines} lines: {profile:?}"
            );
            lines = lines * 2 + 1;
        }
        let profile = select_quality(50_000_000, QualityTier::Level(1));
        assert!(projected(&profile, 50_000_000) <= tier_ceiling(1));
    }

    #[test]
    fn high_tier_prefers_surface_mode() {
        let profile = select_quality(10_000, QualityTier::Level(5));
        assert_eq!(profile.render_mode, RenderMode::Surface);
    }

    #[test]
    fn mode_degrades_before_divisor_exhausts() {
        // 40M lines at tier 1: line mode cannot fit even at the deepest
        // divisor (80M / 256 > 250k), so the search lands on points.
        let profile = select_quality(40_000_000, QualityTier::Level(1));
        assert_eq!(profile.render_mode, RenderMode::Point);
    }

    #[test]
    fn refresh_interval_coarsens_at_low_tiers() {
        let low = select_quality(1000, QualityTier::Level(1));
        let high = select_quality(1000, QualityTier::Level(5));
        assert!(low.refresh_interval > high.refresh_interval);
    }
}
