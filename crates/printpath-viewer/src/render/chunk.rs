//! Chunk accumulation and primitive-set building
//!
//! Segments are buffered until the break point, then sealed into one
//! renderable primitive set. A sealed chunk's structure is frozen for the
//! rest of the session; only its per-vertex colors may change, and the
//! progress tracker is the only writer after sealing.

use glam::Vec3;
use printpath_core::Color4;
use tracing::debug;

use super::quality::RenderMode;
use crate::gcode::Segment;

/// Layer heights are probed only near the bed; tall primes and purge
/// moves above this height would skew the detected layer thickness.
const LAYER_PROBE_CEILING: f32 = 20.0;

/// Box cross-section fallback when no layer change was observed.
const DEFAULT_LAYER_HEIGHT: f32 = 0.2;

/// A sealed, size-bounded batch of segments converted to one renderable
/// primitive set plus the parallel source-line index used for progress
/// mapping.
#[derive(Debug, Clone)]
pub struct SealedChunk {
    pub id: usize,
    pub mode: RenderMode,
    /// Interleaved xyz per vertex. Frozen.
    pub positions: Vec<f32>,
    /// Triangle list indices; empty outside Surface mode. Frozen.
    pub indices: Vec<u32>,
    /// Interleaved rgba per vertex. The only mutable buffer.
    pub colors: Vec<f32>,
    /// Per-primitive source byte offsets, ascending.
    source_lines: Vec<u64>,
    /// Per-primitive colors as emitted, for idempotent restyling.
    base_colors: Vec<Color4>,
    /// Render-height span covered by this chunk.
    pub min_height: f32,
    pub max_height: f32,
}

impl SealedChunk {
    pub fn primitive_count(&self) -> usize {
        self.source_lines.len()
    }

    pub fn source_lines(&self) -> &[u64] {
        &self.source_lines
    }

    pub fn base_color(&self, primitive: usize) -> Color4 {
        self.base_colors[primitive]
    }

    /// Current color of a primitive (first vertex).
    pub fn primitive_color(&self, primitive: usize) -> Color4 {
        let at = primitive * self.mode.vertices_per_primitive() * 4;
        Color4::new(
            self.colors[at],
            self.colors[at + 1],
            self.colors[at + 2],
            self.colors[at + 3],
        )
    }

    /// Overwrite every vertex color of one primitive.
    pub(crate) fn paint_primitive(&mut self, primitive: usize, color: Color4) {
        let per = self.mode.vertices_per_primitive();
        let base = primitive * per * 4;
        for vertex in 0..per {
            let at = base + vertex * 4;
            self.colors[at] = color.r;
            self.colors[at + 1] = color.g;
            self.colors[at + 2] = color.b;
            self.colors[at + 3] = color.a;
        }
    }
}

/// Buffers segments and seals them into chunks at the break point.
#[derive(Debug, Clone)]
pub struct ChunkAccumulator {
    mode: RenderMode,
    break_point: usize,
    live: Vec<Segment>,
    next_id: usize,
    previous_layer: f32,
    current_layer: f32,
}

impl ChunkAccumulator {
    pub fn new(mode: RenderMode, break_point: usize) -> Self {
        Self {
            mode,
            break_point: break_point.max(1),
            live: Vec::new(),
            next_id: 0,
            previous_layer: 0.0,
            current_layer: 0.0,
        }
    }

    /// Buffer one segment; returns the sealed chunk when the buffer just
    /// reached the break point.
    pub fn push(&mut self, segment: Segment) -> Option<SealedChunk> {
        let height = segment.height();
        if height > self.current_layer && height < LAYER_PROBE_CEILING {
            self.previous_layer = self.current_layer;
            self.current_layer = height;
        }
        self.live.push(segment);
        if self.live.len() >= self.break_point {
            Some(self.seal())
        } else {
            None
        }
    }

    /// Seal whatever is buffered at end of input.
    pub fn seal_remainder(&mut self) -> Option<SealedChunk> {
        if self.live.is_empty() {
            None
        } else {
            Some(self.seal())
        }
    }

    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    /// Layer thickness derived from the last two observed layer heights,
    /// truncated to 2 decimals the way slicers round it.
    fn layer_height(&self) -> f32 {
        let height = ((self.current_layer - self.previous_layer) * 100.0).floor() / 100.0;
        if height > 0.0 {
            height
        } else {
            DEFAULT_LAYER_HEIGHT
        }
    }

    fn seal(&mut self) -> SealedChunk {
        let segments = std::mem::take(&mut self.live);
        let id = self.next_id;
        self.next_id += 1;
        debug!(chunk = id, segments = segments.len(), mode = self.mode.name(), "sealing chunk");
        build_chunk(id, self.mode, self.layer_height(), &segments)
    }
}

fn build_chunk(id: usize, mode: RenderMode, layer_height: f32, segments: &[Segment]) -> SealedChunk {
    let per = mode.vertices_per_primitive();
    let mut positions = Vec::with_capacity(segments.len() * per * 3);
    let mut colors = Vec::with_capacity(segments.len() * per * 4);
    let mut indices = Vec::new();
    if mode == RenderMode::Surface {
        indices.reserve(segments.len() * 36);
    }
    let mut source_lines = Vec::with_capacity(segments.len());
    let mut base_colors = Vec::with_capacity(segments.len());
    let mut min_height = f32::INFINITY;
    let mut max_height = f32::NEG_INFINITY;

    for segment in segments {
        match mode {
            RenderMode::Line => {
                push_vertex(&mut positions, segment.start);
                push_vertex(&mut positions, segment.end);
            }
            RenderMode::Point => {
                push_vertex(&mut positions, segment.midpoint());
            }
            RenderMode::Surface => {
                emit_box(&mut positions, &mut indices, segment, layer_height);
            }
        }
        for _ in 0..per {
            colors.extend_from_slice(&[
                segment.color.r,
                segment.color.g,
                segment.color.b,
                segment.color.a,
            ]);
        }
        source_lines.push(segment.source_line);
        base_colors.push(segment.color);
        min_height = min_height.min(segment.start.y).min(segment.end.y);
        max_height = max_height.max(segment.start.y).max(segment.end.y);
    }

    if segments.is_empty() {
        min_height = 0.0;
        max_height = 0.0;
    }

    SealedChunk {
        id,
        mode,
        positions,
        indices,
        colors,
        source_lines,
        base_colors,
        min_height,
        max_height,
    }
}

fn push_vertex(positions: &mut Vec<f32>, point: Vec3) {
    positions.extend_from_slice(&[point.x, point.y, point.z]);
}

/// One box extruded along the segment, cross-section sized from the
/// detected layer height (depth is 1.2x the height, like the printed
/// bead it stands in for).
fn emit_box(positions: &mut Vec<f32>, indices: &mut Vec<u32>, segment: &Segment, layer_height: f32) {
    let axis = segment.end - segment.start;
    let dir = if axis.length_squared() > f32::EPSILON {
        axis.normalize()
    } else {
        Vec3::X
    };
    let mut up = Vec3::Y;
    if dir.dot(up).abs() > 0.99 {
        up = Vec3::X;
    }
    let side = dir.cross(up).normalize();
    let up = side.cross(dir);

    let half_h = layer_height * 0.5;
    let half_d = layer_height * 1.2 * 0.5;

    let base = (positions.len() / 3) as u32;
    for anchor in [segment.start, segment.end] {
        push_vertex(positions, anchor + up * half_h + side * half_d);
        push_vertex(positions, anchor + up * half_h - side * half_d);
        push_vertex(positions, anchor - up * half_h - side * half_d);
        push_vertex(positions, anchor - up * half_h + side * half_d);
    }

    // Two caps and four sides over the 8-vertex ring pair.
    const BOX_INDICES: [u32; 36] = [
        0, 1, 2, 0, 2, 3, // start cap
        4, 6, 5, 4, 7, 6, // end cap
        0, 4, 5, 0, 5, 1, // top/side quads
        1, 5, 6, 1, 6, 2, //
        2, 6, 7, 2, 7, 3, //
        3, 7, 4, 3, 4, 0, //
    ];
    indices.extend(BOX_INDICES.iter().map(|i| base + i));
}

#[cfg(test)]
mod tests {
    use super::*;
    use printpath_core::default_palette;

    fn segment(x: f32, line: u64) -> Segment {
        Segment {
            start: Vec3::new(x, 0.2, 0.0),
            end: Vec3::new(x + 1.0, 0.2, 0.0),
            color: default_palette()[0],
            extruding: true,
            source_line: line,
        }
    }

    #[test]
    fn seals_exactly_at_break_point() {
        let mut acc = ChunkAccumulator::new(RenderMode::Line, 3);
        assert!(acc.push(segment(0.0, 0)).is_none());
        assert!(acc.push(segment(1.0, 10)).is_none());
        let chunk = acc.push(segment(2.0, 20)).unwrap();
        assert_eq!(chunk.primitive_count(), 3);
        assert_eq!(acc.live_len(), 0);
        assert_eq!(chunk.source_lines(), &[0, 10, 20]);
    }

    #[test]
    fn remainder_seal_covers_partial_chunk() {
        let mut acc = ChunkAccumulator::new(RenderMode::Line, 100);
        acc.push(segment(0.0, 0));
        let chunk = acc.seal_remainder().unwrap();
        assert_eq!(chunk.primitive_count(), 1);
        assert!(acc.seal_remainder().is_none());
    }

    #[test]
    fn line_mode_pairs_endpoints() {
        let mut acc = ChunkAccumulator::new(RenderMode::Line, 1);
        let chunk = acc.push(segment(3.0, 0)).unwrap();
        assert_eq!(chunk.positions, vec![3.0, 0.2, 0.0, 4.0, 0.2, 0.0]);
        assert!(chunk.indices.is_empty());
        assert_eq!(chunk.colors.len(), 8);
    }

    #[test]
    fn point_mode_samples_midpoint() {
        let mut acc = ChunkAccumulator::new(RenderMode::Point, 1);
        let chunk = acc.push(segment(3.0, 0)).unwrap();
        assert_eq!(chunk.positions, vec![3.5, 0.2, 0.0]);
    }

    #[test]
    fn surface_mode_emits_boxes() {
        let mut acc = ChunkAccumulator::new(RenderMode::Surface, 2);
        acc.push(segment(0.0, 0));
        let chunk = acc.push(segment(1.0, 1)).unwrap();
        assert_eq!(chunk.positions.len(), 2 * 8 * 3);
        assert_eq!(chunk.indices.len(), 2 * 36);
        // Second box indexes its own vertex ring.
        assert!(chunk.indices[36..].iter().all(|&i| i >= 8));
    }

    #[test]
    fn chunk_ids_are_sequential() {
        let mut acc = ChunkAccumulator::new(RenderMode::Line, 1);
        let a = acc.push(segment(0.0, 0)).unwrap();
        let b = acc.push(segment(1.0, 1)).unwrap();
        assert_eq!((a.id, b.id), (0, 1));
    }

    #[test]
    fn height_span_tracks_segment_extents() {
        let mut acc = ChunkAccumulator::new(RenderMode::Line, 2);
        let mut low = segment(0.0, 0);
        low.start.y = 0.2;
        low.end.y = 0.2;
        let mut high = segment(1.0, 1);
        high.start.y = 0.2;
        high.end.y = 1.4;
        acc.push(low);
        let chunk = acc.push(high).unwrap();
        assert_eq!(chunk.min_height, 0.2);
        assert_eq!(chunk.max_height, 1.4);
    }
}
