//! Match span computation for rendering search results.
//!
//! Spans are re-derived from the search pattern rather than taken from the
//! tool's own output, so every record shape can be highlighted the same way.

use regex::{Regex, RegexBuilder};

use crate::types::{MatchSpan, SearchMode};

/// Compute the non-overlapping match spans of `pattern` over `content`,
/// ascending by start, as byte offsets.
///
/// An invalid regex silently degrades to a literal match of the raw pattern
/// text. Zero-length matches never stall the scan and produce no spans.
pub fn compute_spans(
    content: &str,
    pattern: &str,
    case_sensitive: bool,
    mode: SearchMode,
) -> Vec<MatchSpan> {
    if pattern.is_empty() {
        return Vec::new();
    }
    let Some(matcher) = build_matcher(pattern, case_sensitive, mode) else {
        return Vec::new();
    };
    matcher
        .find_iter(content)
        .filter(|found| found.end() > found.start())
        .map(|found| MatchSpan {
            start: found.start(),
            len: found.end() - found.start(),
        })
        .collect()
}

fn build_matcher(pattern: &str, case_sensitive: bool, mode: SearchMode) -> Option<Regex> {
    let compile = |source: &str| {
        RegexBuilder::new(source)
            .case_insensitive(!case_sensitive)
            .build()
    };
    match mode {
        SearchMode::Regexp => match compile(pattern) {
            Ok(regex) => Some(regex),
            Err(error) => {
                log::debug!("invalid search regex, falling back to literal: {}", error);
                compile(&regex::escape(pattern)).ok()
            }
        },
        SearchMode::Literal => compile(&regex::escape(pattern)).ok(),
    }
}

/// Split `content` into alternating plain/highlighted pieces per `spans`.
///
/// Renderers emit the pieces in order; the bool marks a highlighted piece.
/// `spans` must be ascending and non-overlapping, as produced by
/// [`compute_spans`].
pub fn segments<'a>(content: &'a str, spans: &[MatchSpan]) -> Vec<(bool, &'a str)> {
    let mut pieces = Vec::new();
    let mut cursor = 0;
    for span in spans {
        if span.start > cursor {
            pieces.push((false, &content[cursor..span.start]));
        }
        pieces.push((true, &content[span.start..span.start + span.len]));
        cursor = span.start + span.len;
    }
    if cursor < content.len() {
        pieces.push((false, &content[cursor..]));
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, len: usize) -> MatchSpan {
        MatchSpan { start, len }
    }

    #[test]
    fn literal_case_insensitive_matches() {
        let spans = compute_spans("FooBar Foo", "foo", false, SearchMode::Literal);
        assert_eq!(spans, vec![span(0, 3), span(7, 3)]);
    }

    #[test]
    fn literal_case_sensitive_skips_other_cases() {
        let spans = compute_spans("FooBar foo", "foo", true, SearchMode::Literal);
        assert_eq!(spans, vec![span(7, 3)]);
    }

    #[test]
    fn literal_mode_escapes_metacharacters() {
        let spans = compute_spans("price is $4.20", "$4.20", false, SearchMode::Literal);
        assert_eq!(spans, vec![span(9, 5)]);
    }

    #[test]
    fn regex_mode_matches_pattern() {
        let spans = compute_spans("cat hat", "[ch]at", false, SearchMode::Regexp);
        assert_eq!(spans, vec![span(0, 3), span(4, 3)]);
    }

    #[test]
    fn regex_respects_case_flag() {
        let sensitive = compute_spans("Foo1 foo2", "foo\\d", true, SearchMode::Regexp);
        assert_eq!(sensitive, vec![span(5, 4)]);
        let insensitive = compute_spans("Foo1 foo2", "foo\\d", false, SearchMode::Regexp);
        assert_eq!(insensitive, vec![span(0, 4), span(5, 4)]);
    }

    #[test]
    fn invalid_regex_falls_back_to_literal() {
        let spans = compute_spans("offset (a{2 here", "(a{2", false, SearchMode::Regexp);
        assert_eq!(spans, vec![span(7, 4)]);
    }

    #[test]
    fn zero_length_matches_terminate_without_spans() {
        let spans = compute_spans("bbb", "a*", false, SearchMode::Regexp);
        assert!(spans.is_empty());
    }

    #[test]
    fn zero_length_capable_pattern_still_yields_real_matches() {
        let spans = compute_spans("baab", "a*", false, SearchMode::Regexp);
        assert_eq!(spans, vec![span(1, 2)]);
    }

    #[test]
    fn empty_pattern_yields_no_spans() {
        assert!(compute_spans("anything", "", false, SearchMode::Literal).is_empty());
    }

    #[test]
    fn segments_alternate_plain_and_highlighted() {
        let spans = compute_spans("FooBar Foo", "foo", false, SearchMode::Literal);
        assert_eq!(
            segments("FooBar Foo", &spans),
            vec![(true, "Foo"), (false, "Bar "), (true, "Foo")]
        );
    }

    #[test]
    fn segments_with_no_spans_is_whole_content() {
        assert_eq!(segments("abc", &[]), vec![(false, "abc")]);
    }
}
