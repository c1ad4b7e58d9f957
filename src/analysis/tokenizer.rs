//! Script-aware tokenizer producing classified segments.

use regex::Regex;

use crate::error::{Result, TesseraError};
use crate::segment::Segment;

/// Pattern matching tokens that may be joined into Latin runs.
///
/// Covers ASCII alphanumerics, the Latin-1 Supplement and Latin Extended-A/B
/// blocks, and the literal characters `.`, `:`, `-` and backtick. Anchored on
/// both ends so a token must consist entirely of these characters.
const JOINABLE_PATTERN: &str =
    r"^[A-Za-z0-9\u{00C0}-\u{00FF}\u{0100}-\u{017F}\u{0180}-\u{024F}.:\-`]+$";

/// A tokenizer that splits text on whitespace and classifies the pieces by
/// script.
///
/// Consecutive tokens that fully match the joinable pattern are coalesced
/// into a single Latin element weighted by its word count; everything else
/// becomes an Other element weighted by its character count. Runs that
/// strictly alternate between the two classes are grouped into single Mix
/// segments carrying the summed weight.
#[derive(Clone, Debug)]
pub struct SegmentTokenizer {
    /// The compiled joinable pattern
    pattern: Regex,
}

impl SegmentTokenizer {
    /// Create a new tokenizer with the default joinable pattern.
    pub fn new() -> Result<Self> {
        Self::with_pattern(JOINABLE_PATTERN)
    }

    /// Create a new tokenizer with a custom joinable pattern.
    ///
    /// The pattern decides which whitespace-delimited tokens count as Latin;
    /// it should be anchored so that only full tokens match.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| TesseraError::pattern(format!("invalid joinable pattern: {e}")))?;

        Ok(SegmentTokenizer { pattern: regex })
    }

    /// Get the joinable pattern used by this tokenizer.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Tokenize `text` into an ordered list of classified segments.
    ///
    /// Whitespace of any kind separates tokens; empty input yields an empty
    /// list. Joining the returned segment texts with single spaces
    /// reproduces the whitespace-normalized input.
    pub fn tokenize(&self, text: &str) -> Vec<Segment> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let joined = self.join_runs(&words);
        let classified = self.classify(joined);
        group_alternating(classified)
    }

    fn is_joinable(&self, token: &str) -> bool {
        self.pattern.is_match(token)
    }

    /// Coalesce runs of two or more consecutive joinable tokens into single
    /// space-joined elements. Lone joinable tokens pass through unchanged.
    fn join_runs(&self, words: &[&str]) -> Vec<String> {
        let mut joined = Vec::new();
        let mut i = 0;
        while i < words.len() {
            if self.is_joinable(words[i]) {
                let mut j = i + 1;
                while j < words.len() && self.is_joinable(words[j]) {
                    j += 1;
                }
                if j > i + 1 {
                    joined.push(words[i..j].join(" "));
                } else {
                    joined.push(words[i].to_string());
                }
                i = j;
            } else {
                joined.push(words[i].to_string());
                i += 1;
            }
        }
        joined
    }

    /// Classify each element as Latin or Other and assign its weight.
    ///
    /// Classification strips internal spaces first, so a joined run like
    /// `"hello world"` is checked as `"helloworld"`.
    fn classify(&self, elements: Vec<String>) -> Vec<Segment> {
        elements
            .into_iter()
            .map(|element| {
                let compact: String = element.chars().filter(|&c| c != ' ').collect();
                if !compact.is_empty() && self.pattern.is_match(&compact) {
                    Segment::latin(element)
                } else {
                    Segment::other(element)
                }
            })
            .collect()
    }
}

impl Default for SegmentTokenizer {
    fn default() -> Self {
        Self::new().expect("Default joinable pattern should be valid")
    }
}

/// Group runs of two or more segments whose kinds strictly alternate into
/// single Mix segments. At this point only Latin and Other kinds occur, so
/// alternation is simply "consecutive kinds differ".
fn group_alternating(classified: Vec<Segment>) -> Vec<Segment> {
    let n = classified.len();
    let mut grouped = Vec::with_capacity(n);
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && classified[j].kind != classified[j + 1].kind {
            j += 1;
        }
        if j > i {
            grouped.push(Segment::merged(&classified[i..=j]));
        } else {
            grouped.push(classified[i].clone());
        }
        i = j + 1;
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentKind;

    #[test]
    fn test_empty_input() {
        let tokenizer = SegmentTokenizer::new().unwrap();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("   \t\n  ").is_empty());
    }

    #[test]
    fn test_latin_run_is_joined() {
        let tokenizer = SegmentTokenizer::new().unwrap();
        let segments = tokenizer.tokenize("hello brave world");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "hello brave world");
        assert_eq!(segments[0].kind, SegmentKind::Latin);
        assert_eq!(segments[0].length, 3);
    }

    #[test]
    fn test_alternating_run_becomes_mix() {
        let tokenizer = SegmentTokenizer::new().unwrap();
        let segments = tokenizer.tokenize("hello world 測試 123");

        // "hello world" and "123" join into Latin elements around the Other
        // element, and the alternating run collapses into one Mix segment.
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "hello world 測試 123");
        assert_eq!(segments[0].kind, SegmentKind::Mix);
        assert_eq!(segments[0].length, 5);
    }

    #[test]
    fn test_same_kind_neighbors_break_alternation() {
        let tokenizer = SegmentTokenizer::new().unwrap();
        let segments = tokenizer.tokenize("測試 一二 hello");

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "測試");
        assert_eq!(segments[0].kind, SegmentKind::Other);
        assert_eq!(segments[1].text, "一二 hello");
        assert_eq!(segments[1].kind, SegmentKind::Mix);
        assert_eq!(segments[1].length, 3);
    }

    #[test]
    fn test_punctuation_in_joinable_tokens() {
        let tokenizer = SegmentTokenizer::new().unwrap();

        let segments = tokenizer.tokenize("v1.2-rc:3");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Latin);
        assert_eq!(segments[0].length, 1);

        // '+' is outside the joinable set, so the token classifies as Other
        // and is weighted by characters.
        let segments = tokenizer.tokenize("C++");
        assert_eq!(segments[0].kind, SegmentKind::Other);
        assert_eq!(segments[0].length, 3);
    }

    #[test]
    fn test_latin_extended_characters_join() {
        let tokenizer = SegmentTokenizer::new().unwrap();
        let segments = tokenizer.tokenize("naïve café");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Latin);
        assert_eq!(segments[0].length, 2);
    }

    #[test]
    fn test_full_alternation() {
        let tokenizer = SegmentTokenizer::new().unwrap();
        let segments = tokenizer.tokenize("hello 測試 world 一二");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Mix);
        // 1 word + 2 chars + 1 word + 2 chars
        assert_eq!(segments[0].length, 6);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = SegmentTokenizer::with_pattern("[");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_and_pattern_accessor() {
        let tokenizer = SegmentTokenizer::default();
        assert!(tokenizer.pattern().starts_with('^'));
    }
}
