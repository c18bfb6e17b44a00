//! Load-failure marker
//!
//! A marker file armed before a parse starts and cleared only when it
//! completes. If the marker survives to the next launch, the previous load
//! exhausted the device mid-parse and the supervising layer should force
//! the lowest quality tier. The marker is advisory: I/O problems are
//! logged and otherwise ignored.

use std::fs;
use std::path::PathBuf;

use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct LoadMarker {
    path: Option<PathBuf>,
}

impl LoadMarker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// A marker that never touches the filesystem.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Whether a previous load left its marker behind.
    pub fn was_tripped(&self) -> bool {
        self.path.as_ref().map(|p| p.exists()).unwrap_or(false)
    }

    /// Set the marker. Called before the first line is consumed.
    pub fn arm(&self) {
        if let Some(path) = &self.path {
            if let Err(err) = fs::write(path, b"loading") {
                warn!(path = %path.display(), %err, "failed to arm load marker");
            }
        }
    }

    /// Clear the marker. Called only after a load completes.
    pub fn disarm(&self) {
        if let Some(path) = &self.path {
            if !path.exists() {
                return;
            }
            if let Err(err) = fs::remove_file(path) {
                warn!(path = %path.display(), %err, "failed to clear load marker");
            }
        }
    }
}
