//! G-code interpretation
//!
//! This module provides:
//! - Renderable motion segments (segment)
//! - The modal line interpreter (interpreter)
//! - Row-based decimation of extruding segments (decimator)

pub mod decimator;
pub mod interpreter;
pub mod segment;

pub use decimator::Decimator;
pub use interpreter::InterpreterState;
pub use segment::Segment;
