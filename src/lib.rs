//! # Tessera
//!
//! Statistically balanced segmentation for mixed-script text.
//!
//! ## Features
//!
//! - Whitespace tokenization with Latin-run joining
//! - Per-script length semantics (word count vs character count)
//! - Percentile and Tukey-fence length statistics
//! - Fixed-point merge engine with pluggable policies
//! - Four-stage balancing pipeline with revert protection

pub mod analysis;
pub mod cli;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod report;
pub mod segment;
pub mod stats;

pub mod prelude {
    pub use crate::error::{Result, TesseraError};
    pub use crate::merge::{MergeEngine, MergePolicy};
    pub use crate::pipeline::{BalanceConfig, BalancePipeline, LoopOutcome};
    pub use crate::segment::{Segment, SegmentKind};
    pub use crate::stats::LengthStats;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
