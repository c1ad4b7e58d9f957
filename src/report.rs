//! Presentation of balancing results.
//!
//! [`BalanceReport`] bundles the final segments with their length
//! statistics for JSON output. The free functions build the human
//! rendering: segments prefixed with random single-letter labels, and a
//! line-per-field statistics summary.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::segment::Segment;
use crate::stats::LengthStats;

/// Display labels, drawn with no adjacent repeats.
const LABEL_POOL: [char; 10] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];

/// Serializable result of a balancing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReport {
    pub segments: Vec<Segment>,
    pub stats: Option<LengthStats>,
}

impl BalanceReport {
    /// Build a report from a final segment list, computing its statistics.
    pub fn new(segments: Vec<Segment>) -> Self {
        let stats = LengthStats::from_segments(&segments);
        BalanceReport { segments, stats }
    }
}

/// Assign one display label per segment.
///
/// The first label is drawn uniformly from the pool; each later draw
/// excludes the label immediately before it.
pub fn assign_labels<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<char> {
    let mut labels = Vec::with_capacity(count);
    let mut last: Option<char> = None;

    for _ in 0..count {
        let choices: Vec<char> = LABEL_POOL
            .iter()
            .copied()
            .filter(|&c| Some(c) != last)
            .collect();
        let label = choices[rng.random_range(0..choices.len())];
        labels.push(label);
        last = Some(label);
    }

    labels
}

/// Render segments one per line as `(X) text`, wrapped in braces.
pub fn render_labeled(segments: &[Segment], labels: &[char]) -> String {
    debug_assert_eq!(segments.len(), labels.len());

    let mut out = String::from("{\n");
    for (segment, label) in segments.iter().zip(labels) {
        out.push_str(&format!("({label}) {}\n", segment.text));
    }
    out.push('}');
    out
}

/// Render the statistics summary as `Name: value` lines.
pub fn render_stats(stats: &LengthStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("Count: {}\n", stats.count));
    out.push_str(&format!("Min: {}\n", stats.min));
    out.push_str(&format!("Max: {}\n", stats.max));
    out.push_str(&format!("Mean: {:.2}\n", stats.mean));
    out.push_str(&format!("Median: {:.2}\n", stats.median));
    out.push_str(&format!("IQR: {:.2}\n", stats.iqr));
    out.push_str(&format!("P10: {:.2}\n", stats.p10));
    out.push_str(&format!("Q1: {:.2}\n", stats.q1));
    out.push_str(&format!("Q3: {:.2}\n", stats.q3));
    out.push_str(&format!("P90: {:.2}\n", stats.p90));
    out.push_str(&format!(
        "Fences: [{:.2}, {:.2}]\n",
        stats.lower_fence, stats.upper_fence
    ));
    if stats.outliers.is_empty() {
        out.push_str("Outliers: none\n");
    } else {
        let values: Vec<String> = stats.outliers.iter().map(|v| v.to_string()).collect();
        out.push_str(&format!("Outliers: {}\n", values.join(", ")));
    }
    out
}

/// Serialize a report value to JSON, pretty-printed on request.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
