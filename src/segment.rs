//! Segment types for script-aware text balancing.
//!
//! This module defines the core data structures for representing text
//! segments, which are the fundamental units that flow through the balancing
//! pipeline.
//!
//! # Core Types
//!
//! - [`Segment`] - A piece of text with a script classification and a weight
//! - [`SegmentKind`] - Classification of segment content (Latin, other, mixed)
//!
//! # Length Semantics
//!
//! A segment's `length` is not the byte or character length of its text:
//!
//! ```text
//! Latin  "hello world"        length 2   (words)
//! Other  "สวัสดี"                 length 6   (characters)
//! Mix    "hello world สวัสดี"    length 8   (sum of the merged parts)
//! ```
//!
//! Mixed lengths are carried forward from the merged constituents and are
//! never recomputed from the joined text.
//!
//! # Examples
//!
//! ```
//! use tessera::segment::{Segment, SegmentKind};
//!
//! let latin = Segment::latin("hello world");
//! assert_eq!(latin.kind, SegmentKind::Latin);
//! assert_eq!(latin.length, 2);
//!
//! let other = Segment::other("測試");
//! assert_eq!(other.length, 2);
//!
//! let merged = Segment::merged([&latin, &other]);
//! assert_eq!(merged.kind, SegmentKind::Mix);
//! assert_eq!(merged.text, "hello world 測試");
//! assert_eq!(merged.length, 4);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a segment's script content.
///
/// `Latin` and `Other` are terminal classifications assigned during
/// tokenization. `Mix` is produced only by merging; once a segment is `Mix`
/// it stays `Mix`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SegmentKind {
    /// Latin-script content, weighted by word count
    Latin,
    /// Non-Latin content, weighted by character count
    Other,
    /// Merged content spanning both classes
    Mix,
}

impl SegmentKind {
    /// Get the uppercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Latin => "LATIN",
            SegmentKind::Other => "OTHER",
            SegmentKind::Mix => "MIX",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A contiguous piece of the input text with a script class and a weight.
///
/// Segments are created by the tokenizer (`Latin`/`Other`) or by merging
/// (`Mix`). Their texts, concatenated in order with single spaces, always
/// reproduce the whitespace-normalized input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// The text content, sub-tokens joined by single spaces
    pub text: String,
    /// Script classification
    pub kind: SegmentKind,
    /// Weight used by the balancing stages
    pub length: usize,
}

impl Segment {
    /// Create a Latin segment; the weight is the word count of `text`.
    pub fn latin<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        let length = text.split_whitespace().count();
        Segment {
            text,
            kind: SegmentKind::Latin,
            length,
        }
    }

    /// Create an Other segment; the weight is the character count of `text`,
    /// internal spaces included.
    pub fn other<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Segment {
            text,
            kind: SegmentKind::Other,
            length,
        }
    }

    /// Create a Mix segment with an explicit weight.
    pub fn mix<S: Into<String>>(text: S, length: usize) -> Self {
        Segment {
            text: text.into(),
            kind: SegmentKind::Mix,
            length,
        }
    }

    /// Merge a run of segments into a single Mix segment.
    ///
    /// Texts are joined with single spaces and weights are summed; the
    /// weight is never recomputed from the joined text.
    pub fn merged<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a Segment>,
    {
        let mut text = String::new();
        let mut length = 0;
        for part in parts {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&part.text);
            length += part.length;
        }
        Segment {
            text,
            kind: SegmentKind::Mix,
            length,
        }
    }

    /// Absorb `other` into this segment in place.
    ///
    /// The text is appended after a single space, the weights are summed,
    /// and the result is always `Mix`.
    pub fn absorb(&mut self, other: Segment) {
        self.text.push(' ');
        self.text.push_str(&other.text);
        self.length += other.length;
        self.kind = SegmentKind::Mix;
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
