//! # Printpath Viewer
//!
//! Converts textual machine toolpaths (G-code) into an incrementally
//! built, memory-bounded stream of renderable geometry chunks, with live
//! recoloring driven by an external print-progress signal.
//!
//! The processing core is a modal interpreter over the line protocol:
//! raw text is consumed line by line through a cooperative time-sliced
//! driver, extruding moves are decimated per the active quality profile,
//! buffered into size-bounded chunks, and each sealed chunk becomes one
//! frozen primitive set whose colors alone stay mutable for progress
//! tracking. Scene, camera, and mesh lifecycle belong to the host.

pub mod gcode;
pub mod processor;
pub mod render;

pub use gcode::{Decimator, InterpreterState, Segment};
pub use processor::{GcodeProcessor, StepOutcome, DEFAULT_TIME_SLICE};
pub use render::{
    select_quality, ChunkAccumulator, ProgressTracker, QualityProfile, RenderMode, SealedChunk,
    DEFAULT_MESH_BREAK_POINT,
};
