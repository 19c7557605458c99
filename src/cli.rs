//! CLI argument parsing for the presentation shell.

use clap::Parser;
use std::path::PathBuf;

use crate::types::{SearchMode, SearchSpec};

/// rgview - stream ripgrep matches with highlighting
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Search pattern
    pub pattern: String,

    /// Directory to search (defaults to the current directory)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Match case-sensitively (searches are case-insensitive by default)
    #[arg(short = 's', long)]
    pub case_sensitive: bool,

    /// Search hidden files and directories
    #[arg(long)]
    pub hidden: bool,

    /// Interpret the pattern as a regular expression
    #[arg(short = 'e', long)]
    pub regex: bool,

    /// Emit records as JSON lines instead of highlighted text
    #[arg(long)]
    pub json: bool,

    /// Disable match highlighting
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    pub fn to_spec(&self) -> SearchSpec {
        SearchSpec {
            pattern: self.pattern.trim().to_string(),
            root: self
                .directory
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
            case_sensitive: self.case_sensitive,
            include_hidden: self.hidden,
            mode: if self.regex {
                SearchMode::Regexp
            } else {
                SearchMode::Literal
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_a_case_insensitive_literal_spec() {
        let cli = Cli::parse_from(["rgview", "needle"]);
        let spec = cli.to_spec();
        assert_eq!(spec.pattern, "needle");
        assert_eq!(spec.root, PathBuf::from("."));
        assert!(!spec.case_sensitive);
        assert!(!spec.include_hidden);
        assert_eq!(spec.mode, SearchMode::Literal);
    }

    #[test]
    fn flags_map_onto_the_spec() {
        let cli = Cli::parse_from([
            "rgview",
            "-s",
            "--hidden",
            "-e",
            "-d",
            "/srv/code",
            "fn \\w+",
        ]);
        let spec = cli.to_spec();
        assert_eq!(spec.pattern, "fn \\w+");
        assert_eq!(spec.root, PathBuf::from("/srv/code"));
        assert!(spec.case_sensitive);
        assert!(spec.include_hidden);
        assert_eq!(spec.mode, SearchMode::Regexp);
    }

    #[test]
    fn pattern_is_trimmed_like_the_input_field() {
        let cli = Cli::parse_from(["rgview", "  padded  "]);
        assert_eq!(cli.to_spec().pattern, "padded");
    }
}
