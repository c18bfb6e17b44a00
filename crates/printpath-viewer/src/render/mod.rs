//! Geometry building and live restyling
//!
//! This module provides:
//! - Performance-budget quality selection (quality)
//! - Chunk accumulation and primitive-set building (chunk)
//! - Progress-driven recoloring of sealed chunks (progress)

pub mod chunk;
pub mod progress;
pub mod quality;

pub use chunk::{ChunkAccumulator, SealedChunk};
pub use progress::ProgressTracker;
pub use quality::{select_quality, QualityProfile, RenderMode, DEFAULT_MESH_BREAK_POINT};
