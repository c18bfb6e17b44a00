//! # Printpath Core
//!
//! Core types and ambient services shared by the printpath viewer:
//! RGBA colors with hex parsing, viewer configuration, error types,
//! and the load-failure marker used for crash-safe quality downgrades.

pub mod color;
pub mod config;
pub mod error;
pub mod marker;

pub use color::{default_palette, Color4, DEFAULT_PALETTE_HEX};
pub use config::{ColorMode, QualityTier, ViewerConfig};
pub use error::{Result, ViewerError};
pub use marker::LoadMarker;
