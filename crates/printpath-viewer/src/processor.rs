//! Incremental G-code processing driver
//!
//! Single-threaded, cooperative: the host's interactive loop calls
//! [`GcodeProcessor::step`] with its time budget and the processor
//! suspends after the elapsed quantum or as soon as a chunk seals,
//! preserving interpreter state, the live segment buffer, and the byte
//! cursor exactly across calls. The periodic recolor pass runs through
//! [`GcodeProcessor::on_render_tick`] and only ever touches sealed
//! chunks, never the live buffer.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use printpath_core::{Color4, ColorMode, LoadMarker, QualityTier, Result, ViewerConfig};

use crate::gcode::{Decimator, InterpreterState, Segment};
use crate::render::{
    select_quality, ChunkAccumulator, ProgressTracker, QualityProfile, SealedChunk,
};

/// Default cooperative time slice per [`GcodeProcessor::step`] call.
pub const DEFAULT_TIME_SLICE: Duration = Duration::from_millis(100);

/// Deadline checks happen once per this many lines; a per-line clock
/// read would dominate small-line parsing.
const TIME_CHECK_STRIDE: u32 = 512;

/// Outcome of one cooperative parse slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Time budget elapsed; call again to continue.
    Yielded,
    /// A chunk sealed (its id); the processor suspended immediately so
    /// the host can hand the chunk to the scene before parsing resumes.
    ChunkSealed(usize),
    /// End of input; the final partial chunk, if any, was sealed on an
    /// earlier call.
    Complete,
}

/// Stateful G-code processor
///
/// Owns the interpreter, decimation gate, chunk accumulator, sealed-chunk
/// collection, and progress tracker for one loaded file.
pub struct GcodeProcessor {
    // Config-resolved, constant across loads.
    palette: Vec<Color4>,
    progress_color: Color4,
    min_feed_color: Color4,
    max_feed_color: Color4,
    color_mode: ColorMode,
    quality_tier: QualityTier,
    lookahead_bytes: u64,
    show_solid: bool,
    solid_transparency: f32,
    render_travels: bool,
    min_segment_length: f32,
    mesh_break_point: Option<usize>,
    marker: LoadMarker,

    // Per-load state.
    profile: QualityProfile,
    state: InterpreterState,
    decimator: Decimator,
    accumulator: ChunkAccumulator,
    tracker: ProgressTracker,
    chunks: Vec<SealedChunk>,
    travels: Vec<Segment>,
    byte_cursor: usize,
    line_count: u64,
    finished: bool,
}

impl GcodeProcessor {
    /// Build a processor from a validated configuration. Color parsing
    /// is the only fallible part; it happens here, never on the hot path.
    pub fn new(config: &ViewerConfig) -> Result<Self> {
        config.validate()?;
        let palette = config.palette()?;
        let progress_color = Color4::from_hex(&config.progress_color)?;
        let min_feed_color = Color4::from_hex(&config.min_feed_color)?;
        let max_feed_color = Color4::from_hex(&config.max_feed_color)?;

        let profile = select_quality(0, config.quality_tier);
        let processor = Self {
            state: InterpreterState::new(
                palette.clone(),
                config.color_mode,
                min_feed_color,
                max_feed_color,
            ),
            palette,
            progress_color,
            min_feed_color,
            max_feed_color,
            color_mode: config.color_mode,
            quality_tier: config.quality_tier,
            lookahead_bytes: config.lookahead_bytes,
            show_solid: config.show_solid_while_tracking,
            solid_transparency: config.solid_transparency,
            render_travels: config.render_travels,
            min_segment_length: config.min_segment_length,
            mesh_break_point: config.mesh_break_point,
            marker: LoadMarker::new(config.failed_load_marker.clone()),
            profile,
            decimator: Decimator::new(1),
            accumulator: ChunkAccumulator::new(profile.render_mode, profile.mesh_break_point),
            tracker: ProgressTracker::new(
                progress_color,
                config.lookahead_bytes,
                config.show_solid_while_tracking,
                config.solid_transparency,
                profile.refresh_interval,
            ),
            chunks: Vec::new(),
            travels: Vec::new(),
            byte_cursor: 0,
            line_count: 0,
            finished: true,
        };
        Ok(processor)
    }

    /// Start a new load over `source`. Any previous load is cancelled
    /// first: the tracker is replaced and the sealed-chunk collection
    /// discarded before interpreter state resets, so a stale periodic
    /// callback can never recolor disposed geometry.
    pub fn begin(&mut self, source: &str) {
        self.chunks.clear();
        self.travels.clear();

        let mut tier = self.quality_tier;
        if self.marker.was_tripped() {
            warn!("previous load did not complete; forcing lowest quality tier");
            tier = QualityTier::Level(1);
        }

        self.line_count = count_lines(source);
        self.profile = select_quality(self.line_count, tier);
        debug!(
            lines = self.line_count,
            mode = self.profile.render_mode.name(),
            every_nth_row = self.profile.every_nth_row,
            "beginning load"
        );

        self.rearm();
        self.byte_cursor = 0;
        self.finished = source.is_empty();
        if self.finished {
            // Empty or null input is a no-op, not an error.
            return;
        }
        self.marker.arm();
    }

    fn rearm(&mut self) {
        self.state = InterpreterState::new(
            self.palette.clone(),
            self.color_mode,
            self.min_feed_color,
            self.max_feed_color,
        );
        self.decimator = Decimator::new(self.profile.every_nth_row);
        let break_point = self.mesh_break_point.unwrap_or(self.profile.mesh_break_point);
        self.accumulator = ChunkAccumulator::new(self.profile.render_mode, break_point);
        self.tracker = ProgressTracker::new(
            self.progress_color,
            self.lookahead_bytes,
            self.show_solid,
            self.solid_transparency,
            self.profile.refresh_interval,
        );
    }

    /// Run one cooperative slice over the caller-held source. The byte
    /// cursor resumes exactly where the previous call suspended.
    pub fn step(&mut self, source: &str, budget: Duration) -> StepOutcome {
        if self.finished {
            return StepOutcome::Complete;
        }
        let deadline = Instant::now() + budget;
        let mut since_check = 0u32;

        while self.byte_cursor < source.len() {
            let rest = &source[self.byte_cursor..];
            let (line, consumed) = match rest.find('\n') {
                Some(idx) => (&rest[..idx], idx + 1),
                None => (rest, rest.len()),
            };
            let offset = self.byte_cursor as u64;
            self.byte_cursor += consumed;

            if let Some(chunk) = self.consume_line(line, offset) {
                let id = chunk.id;
                self.chunks.push(chunk);
                return StepOutcome::ChunkSealed(id);
            }

            since_check += 1;
            if since_check >= TIME_CHECK_STRIDE {
                since_check = 0;
                if Instant::now() >= deadline {
                    return StepOutcome::Yielded;
                }
            }
        }

        if let Some(chunk) = self.accumulator.seal_remainder() {
            let id = chunk.id;
            self.chunks.push(chunk);
            return StepOutcome::ChunkSealed(id);
        }
        self.finished = true;
        self.marker.disarm();
        debug!(
            lines = self.line_count,
            chunks = self.chunks.len(),
            max_height = self.state.max_height,
            "parse complete"
        );
        StepOutcome::Complete
    }

    /// Drive [`Self::step`] until the input is exhausted.
    pub fn run_to_end(&mut self, source: &str) {
        while self.step(source, DEFAULT_TIME_SLICE) != StepOutcome::Complete {}
    }

    fn consume_line(&mut self, line: &str, offset: u64) -> Option<SealedChunk> {
        let segment = self.state.apply_line(line, offset)?;
        if !segment.extruding {
            if self.render_travels {
                self.travels.push(segment);
            }
            return None;
        }
        if !self.decimator.admit(segment.height()) {
            return None;
        }
        if segment.length() < self.min_segment_length {
            return None;
        }
        self.accumulator.push(segment)
    }

    // Progress tracking -----------------------------------------------

    pub fn set_live_tracking(&mut self, enabled: bool) {
        self.tracker.set_tracking(enabled);
    }

    pub fn is_live_tracking(&self) -> bool {
        self.tracker.is_tracking()
    }

    /// Feed the external print position (file byte offset).
    pub fn update_file_position(&mut self, position: u64) {
        self.tracker.update_cursor(position);
    }

    /// Request the final pass: every primitive is marked printed on the
    /// next tick and tracking shuts off one refresh interval later.
    pub fn request_final_pass(&mut self) {
        self.tracker.update_cursor(u64::MAX);
    }

    /// Throttled recolor pass; call from the host's frame callback with
    /// its current instant. Returns whether a pass ran.
    pub fn on_render_tick(&mut self, now: Instant) -> bool {
        self.tracker.on_render_tick(now, &mut self.chunks)
    }

    // Queries ----------------------------------------------------------

    pub fn chunks(&self) -> &[SealedChunk] {
        &self.chunks
    }

    pub fn travels(&self) -> &[Segment] {
        &self.travels
    }

    /// Running high-water mark of printed height.
    pub fn max_height(&self) -> f32 {
        self.state.max_height
    }

    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    pub fn is_complete(&self) -> bool {
        self.finished
    }

    /// Human-readable name of the active representation mode.
    pub fn render_mode(&self) -> &'static str {
        self.profile.render_mode.name()
    }

    pub fn profile(&self) -> &QualityProfile {
        &self.profile
    }
}

fn count_lines(source: &str) -> u64 {
    if source.is_empty() {
        return 0;
    }
    let newlines = source.bytes().filter(|&b| b == b'\n').count() as u64;
    newlines + 1
}
