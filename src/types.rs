//! Shared data types for the search pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::SpecError;

/// Pattern interpretation for a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    /// Literal string search (exact match)
    Literal,
    /// Regular expression search
    Regexp,
}

/// User-supplied parameters describing one search request.
///
/// Immutable once a search starts. [`SearchSpec::validate`] runs before any
/// process is spawned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSpec {
    pub pattern: String,
    pub root: PathBuf,
    pub case_sensitive: bool,
    pub include_hidden: bool,
    pub mode: SearchMode,
}

impl SearchSpec {
    /// Create a spec with the default flags: case-insensitive literal search,
    /// hidden files excluded.
    pub fn new(pattern: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            root: root.into(),
            case_sensitive: false,
            include_hidden: false,
            mode: SearchMode::Literal,
        }
    }

    /// Reject specs that must never reach the process boundary.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.pattern.is_empty() {
            return Err(SpecError::EmptyPattern);
        }
        if !self.root.is_dir() {
            return Err(SpecError::MissingDirectory(self.root.clone()));
        }
        Ok(())
    }
}

/// One parsed line of search tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultRecord {
    /// A line naming a file; establishes context for subsequent match lines.
    FileHeader { path: String },
    /// A `lineno:content` line grouped under the most recent file header.
    MatchLine {
        file: String,
        line: u32,
        content: String,
    },
    /// A line with no parseable leading line number.
    PlainLine { file: String, content: String },
    /// A line starting with a known error marker.
    ErrorLine { message: String },
}

/// A highlighted sub-range of a content string, in byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub len: usize,
}

/// Terminal result of one submitted search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The process exited normally. A nonzero code usually just means the
    /// tool found no matches and is not a failure.
    Completed { exit_code: Option<i32> },
    /// Launch failure or abnormal (signal) termination.
    Errored { message: String },
    Cancelled,
}

/// Event stream element delivered to the session consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    Record(ResultRecord),
    /// Text seen on the error stream while the process is otherwise healthy.
    StderrNotice(String),
    /// Exactly one per submitted search.
    Finished(SearchOutcome),
}

/// Lifecycle of a [`crate::SearchSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Errored,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let spec = SearchSpec::new("", dir.path());
        assert!(matches!(spec.validate(), Err(SpecError::EmptyPattern)));
    }

    #[test]
    fn validate_rejects_missing_directory() {
        let spec = SearchSpec::new("needle", "/definitely/not/a/real/dir");
        assert!(matches!(
            spec.validate(),
            Err(SpecError::MissingDirectory(_))
        ));
    }

    #[test]
    fn validate_accepts_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let spec = SearchSpec::new("needle", dir.path());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn result_records_serialize_with_kind_tag() {
        let record = ResultRecord::MatchLine {
            file: "src/a.rs".to_string(),
            line: 12,
            content: "let x = 1;".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"kind\":\"match_line\""));
        assert!(json.contains("\"line\":12"));

        let parsed: ResultRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
