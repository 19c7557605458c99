//! Error taxonomy for the search pipeline.
//!
//! Spec validation fails synchronously at `submit`; launch failures travel
//! down the event stream as a terminal error. Parsing and highlighting
//! problems are always recovered locally and never surface here.

use std::path::PathBuf;

/// Rejected search request, reported before any process starts.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("search pattern is empty")]
    EmptyPattern,
    #[error("search directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),
}

/// The external search tool could not be started.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("stdout pipe not available")]
    StdoutUnavailable,
    #[error("stderr pipe not available")]
    StderrUnavailable,
}
