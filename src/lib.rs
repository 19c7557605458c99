//! rgview - streaming frontend core for an external line-oriented search tool
//!
//! The crate owns the search execution and result-streaming pipeline: it
//! launches a cancellable ripgrep process, incrementally parses its
//! mixed-format output into structured records, re-derives match spans for
//! highlighting, and delivers everything to a consumer as a typed event
//! stream. The presentation shell (see `main.rs`) only builds search specs
//! and renders events.

pub mod cli;
pub mod error;
pub mod search;
pub mod tool;
pub mod types;

// 公開API
pub use error::{LaunchError, SpecError};
pub use search::highlight::{compute_spans, segments};
pub use search::parser::OutputParser;
pub use search::runner::{ProcessEvent, ProcessExit, ProcessRunner, KILL_GRACE};
pub use search::session::{build_command_args, SearchSession};
pub use types::{
    MatchSpan, ResultRecord, SearchEvent, SearchMode, SearchOutcome, SearchSpec, SessionState,
};
