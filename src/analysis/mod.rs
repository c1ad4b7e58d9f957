//! Text analysis: splitting raw input into classified segments.
//!
//! The entry point is [`SegmentTokenizer`], which turns a raw string into an
//! ordered list of [`Segment`](crate::segment::Segment)s ready for the
//! balancing pipeline. Tokenization runs in four steps:
//!
//! 1. Split on whitespace.
//! 2. Join consecutive runs of "joinable" tokens (Latin letters, digits, and
//!    a small set of punctuation) into single elements.
//! 3. Classify each element as Latin (weighted by words) or Other (weighted
//!    by characters).
//! 4. Group strictly alternating Latin/Other runs into single Mix segments.

pub mod tokenizer;

pub use tokenizer::SegmentTokenizer;
