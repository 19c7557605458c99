//! Incremental line reassembly and classification of search tool output.
//!
//! The external tool groups matches under a file path line followed by
//! `lineNumber:content` lines. The parser carries one piece of state across
//! lines, the current file, and reassembles logical lines from
//! arbitrary-sized chunks. A file header with zero following match lines is
//! valid input.

use crate::types::ResultRecord;

/// Lines starting with one of these are error reports, not results.
const ERROR_MARKERS: [&str; 2] = ["Error:", "错误:"];

/// Stateful chunk-to-record parser. One instance per search session.
#[derive(Debug, Default)]
pub struct OutputParser {
    current_file: String,
    /// Incomplete trailing line carried over to the next chunk.
    partial: String,
}

impl OutputParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore session-start state.
    pub fn reset(&mut self) {
        self.current_file.clear();
        self.partial.clear();
    }

    /// Feed one raw chunk, returning the records for every complete line in
    /// it. A line split across chunk boundaries is buffered until its
    /// terminator arrives in a later chunk.
    pub fn push_chunk(&mut self, chunk: &str) -> Vec<ResultRecord> {
        let buffered = std::mem::take(&mut self.partial) + chunk;
        let mut records = Vec::new();
        let mut rest = buffered.as_str();
        while let Some(index) = rest.find('\n') {
            let (line, tail) = rest.split_at(index);
            records.extend(self.classify(line));
            rest = &tail[1..];
        }
        self.partial = rest.to_string();
        records
    }

    /// Flush the buffered trailing line at end of stream.
    pub fn finish(&mut self) -> Vec<ResultRecord> {
        let tail = std::mem::take(&mut self.partial);
        self.classify(&tail).into_iter().collect()
    }

    fn classify(&mut self, line: &str) -> Option<ResultRecord> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if ERROR_MARKERS.iter().any(|marker| line.starts_with(marker)) {
            return Some(ResultRecord::ErrorLine {
                message: line.to_string(),
            });
        }
        let Some((head, content)) = line.split_once(':') else {
            // File path line: context for the match lines that follow.
            self.current_file = line.to_string();
            return Some(ResultRecord::FileHeader {
                path: self.current_file.clone(),
            });
        };
        if !head.is_empty() && head.bytes().all(|byte| byte.is_ascii_digit()) {
            if let Ok(number) = head.parse::<u32>() {
                return Some(ResultRecord::MatchLine {
                    file: self.current_file.clone(),
                    line: number,
                    content: content.to_string(),
                });
            }
        }
        Some(ResultRecord::PlainLine {
            file: self.current_file.clone(),
            content: line.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_lines(parser: &mut OutputParser, lines: &[&str]) -> Vec<ResultRecord> {
        let mut records = Vec::new();
        for line in lines {
            records.extend(parser.push_chunk(&format!("{}\n", line)));
        }
        records.extend(parser.finish());
        records
    }

    #[test]
    fn classifies_headers_matches_and_plain_lines() {
        let mut parser = OutputParser::new();
        let records = feed_lines(
            &mut parser,
            &[
                "src/a.rs",
                "12:let x = 1;",
                "README.md",
                "no colon here: wait",
                "3:plain text",
            ],
        );
        assert_eq!(
            records,
            vec![
                ResultRecord::FileHeader {
                    path: "src/a.rs".to_string()
                },
                ResultRecord::MatchLine {
                    file: "src/a.rs".to_string(),
                    line: 12,
                    content: "let x = 1;".to_string()
                },
                ResultRecord::FileHeader {
                    path: "README.md".to_string()
                },
                ResultRecord::PlainLine {
                    file: "README.md".to_string(),
                    content: "no colon here: wait".to_string()
                },
                ResultRecord::MatchLine {
                    file: "README.md".to_string(),
                    line: 3,
                    content: "plain text".to_string()
                },
            ]
        );
    }

    #[test]
    fn match_line_before_any_header_gets_empty_file() {
        let mut parser = OutputParser::new();
        let records = parser.push_chunk("7:orphan match\n");
        assert_eq!(
            records,
            vec![ResultRecord::MatchLine {
                file: String::new(),
                line: 7,
                content: "orphan match".to_string()
            }]
        );
    }

    #[test]
    fn error_markers_classify_as_error_lines() {
        let mut parser = OutputParser::new();
        let records = parser.push_chunk("Error: permission denied\n错误: 拒绝访问\n");
        assert_eq!(
            records,
            vec![
                ResultRecord::ErrorLine {
                    message: "Error: permission denied".to_string()
                },
                ResultRecord::ErrorLine {
                    message: "错误: 拒绝访问".to_string()
                },
            ]
        );
    }

    #[test]
    fn line_split_across_chunks_is_reassembled() {
        let mut parser = OutputParser::new();
        let first = parser.push_chunk("src/a.rs\n12:let x");
        assert_eq!(
            first,
            vec![ResultRecord::FileHeader {
                path: "src/a.rs".to_string()
            }]
        );
        let second = parser.push_chunk(" = 1;\n");
        assert_eq!(
            second,
            vec![ResultRecord::MatchLine {
                file: "src/a.rs".to_string(),
                line: 12,
                content: "let x = 1;".to_string()
            }]
        );
    }

    #[test]
    fn consecutive_separators_produce_no_empty_records() {
        let mut parser = OutputParser::new();
        let records = parser.push_chunk("src/a.rs\n\n\n1:x\n");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn trailing_carriage_return_is_stripped() {
        let mut parser = OutputParser::new();
        let records = parser.push_chunk("src\\win.rs\r\n4:dos line\r\n");
        assert_eq!(
            records,
            vec![
                ResultRecord::FileHeader {
                    path: "src\\win.rs".to_string()
                },
                ResultRecord::MatchLine {
                    file: "src\\win.rs".to_string(),
                    line: 4,
                    content: "dos line".to_string()
                },
            ]
        );
    }

    #[test]
    fn oversized_line_number_falls_back_to_plain_line() {
        let mut parser = OutputParser::new();
        let records = parser.push_chunk("99999999999999999999:huge\n");
        assert_eq!(
            records,
            vec![ResultRecord::PlainLine {
                file: String::new(),
                content: "99999999999999999999:huge".to_string()
            }]
        );
    }

    #[test]
    fn colon_prefixed_line_is_plain() {
        let mut parser = OutputParser::new();
        parser.push_chunk("lib.rs\n");
        let records = parser.push_chunk(":leading colon\n");
        assert_eq!(
            records,
            vec![ResultRecord::PlainLine {
                file: "lib.rs".to_string(),
                content: ":leading colon".to_string()
            }]
        );
    }

    #[test]
    fn reset_clears_current_file_context() {
        let mut parser = OutputParser::new();
        parser.push_chunk("src/a.rs\n1:x\n");
        parser.reset();
        let records = parser.push_chunk("5:after reset\n");
        assert_eq!(
            records,
            vec![ResultRecord::MatchLine {
                file: String::new(),
                line: 5,
                content: "after reset".to_string()
            }]
        );
    }

    #[test]
    fn finish_flushes_unterminated_tail() {
        let mut parser = OutputParser::new();
        let records = parser.push_chunk("a.rs\n9:tail without newline");
        assert_eq!(
            records,
            vec![ResultRecord::FileHeader {
                path: "a.rs".to_string()
            }]
        );
        assert_eq!(
            parser.finish(),
            vec![ResultRecord::MatchLine {
                file: "a.rs".to_string(),
                line: 9,
                content: "tail without newline".to_string()
            }]
        );
        assert!(parser.finish().is_empty());
    }
}
