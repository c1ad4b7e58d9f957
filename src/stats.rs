//! Length statistics over segment lists.
//!
//! This module provides the distribution summary that drives the balancing
//! stages: quartiles, deciles, Tukey fences, and the outlier set over the
//! `length` weights of a segment list.
//!
//! Percentiles use linear interpolation between the two nearest ranks, so a
//! percentile of a four-element list generally falls between data points.
//!
//! # Examples
//!
//! ```
//! use tessera::segment::Segment;
//! use tessera::stats::LengthStats;
//!
//! let segments = vec![Segment::mix("a", 1), Segment::mix("b", 3)];
//! let stats = LengthStats::from_segments(&segments).unwrap();
//!
//! assert_eq!(stats.count, 2);
//! assert_eq!(stats.median, 2.0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::segment::Segment;

/// Descriptive statistics over the weights of a segment list.
///
/// All percentile fields are linearly interpolated. `outliers` holds the
/// sorted unique weight values falling outside the Tukey fences
/// `q1 - 1.5 * iqr` and `q3 + 1.5 * iqr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthStats {
    /// Number of segments measured.
    pub count: usize,
    /// Smallest weight.
    pub min: usize,
    /// Largest weight.
    pub max: usize,
    /// Arithmetic mean of the weights.
    pub mean: f64,
    /// 50th percentile.
    pub median: f64,
    /// Interquartile range (`q3 - q1`).
    pub iqr: f64,
    /// 10th percentile.
    pub p10: f64,
    /// 25th percentile.
    pub q1: f64,
    /// 75th percentile.
    pub q3: f64,
    /// 90th percentile.
    pub p90: f64,
    /// Lower Tukey fence (`q1 - 1.5 * iqr`).
    pub lower_fence: f64,
    /// Upper Tukey fence (`q3 + 1.5 * iqr`).
    pub upper_fence: f64,
    /// Sorted unique weight values outside the fences.
    pub outliers: Vec<usize>,
}

impl LengthStats {
    /// Compute the distribution summary for a segment list.
    ///
    /// Returns `None` when the list is empty; a single segment yields a
    /// degenerate summary where every percentile equals its weight.
    pub fn from_segments(segments: &[Segment]) -> Option<LengthStats> {
        if segments.is_empty() {
            return None;
        }

        let lengths: Vec<usize> = segments.iter().map(|s| s.length).collect();
        let mut sorted: Vec<f64> = lengths.iter().map(|&l| l as f64).collect();
        sorted.sort_by(f64::total_cmp);

        let count = lengths.len();
        let min = lengths.iter().copied().min()?;
        let max = lengths.iter().copied().max()?;
        let mean = sorted.iter().sum::<f64>() / count as f64;

        let p10 = percentile(&sorted, 10.0);
        let q1 = percentile(&sorted, 25.0);
        let median = percentile(&sorted, 50.0);
        let q3 = percentile(&sorted, 75.0);
        let p90 = percentile(&sorted, 90.0);

        let iqr = q3 - q1;
        let lower_fence = q1 - 1.5 * iqr;
        let upper_fence = q3 + 1.5 * iqr;

        let mut outliers: Vec<usize> = lengths
            .iter()
            .copied()
            .filter(|&l| (l as f64) < lower_fence || (l as f64) > upper_fence)
            .collect();
        outliers.sort_unstable();
        outliers.dedup();

        Some(LengthStats {
            count,
            min,
            max,
            mean,
            median,
            iqr,
            p10,
            q1,
            q3,
            p90,
            lower_fence,
            upper_fence,
            outliers,
        })
    }
}

impl fmt::Display for LengthStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count={} min={} max={} mean={:.2} median={:.2} iqr={:.2} p90={:.2}",
            self.count, self.min, self.max, self.mean, self.median, self.iqr, self.p90
        )
    }
}

/// Linearly interpolated percentile of a sorted, non-empty sample.
///
/// The rank is `p / 100 * (n - 1)`; fractional ranks interpolate between
/// the two neighboring data points.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
