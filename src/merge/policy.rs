//! Merge policies: who may merge, into whom, and in what order.

use crate::segment::Segment;

/// A merge policy decides which segments are candidates, which neighbors may
/// absorb them, which eligible neighbor the candidate targets, and the order
/// candidates are processed in within a pass.
///
/// Thresholds are compared against segment weights as floats, since they
/// come from interpolated percentiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MergePolicy {
    /// Fold short segments into their immediate predecessor.
    ///
    /// Candidates are segments past the first whose weight does not exceed
    /// `threshold`; any neighbor is eligible, but the target is always the
    /// predecessor. Candidates are processed in list order.
    Preliminary {
        /// Maximum weight of a foldable segment
        threshold: f64,
    },

    /// Merge short segments into their shortest short-enough neighbor.
    ///
    /// Candidates are segments with weight at most `candidate_max`; a
    /// neighbor is eligible when its weight is at most `neighbor_max`. The
    /// target is the eligible neighbor with the smallest weight, ties going
    /// to the lower index. Shorter candidates are processed first.
    Threshold {
        /// Maximum weight of a merge candidate
        candidate_max: f64,
        /// Maximum weight of an absorbing neighbor
        neighbor_max: f64,
    },
}

impl MergePolicy {
    /// Check whether the segment at `index` is a merge candidate.
    pub fn is_candidate(&self, segment: &Segment, index: usize) -> bool {
        match self {
            MergePolicy::Preliminary { threshold } => {
                index > 0 && (segment.length as f64) <= *threshold
            }
            MergePolicy::Threshold { candidate_max, .. } => {
                (segment.length as f64) <= *candidate_max
            }
        }
    }

    /// Check whether a neighbor may absorb a candidate.
    pub fn is_eligible_neighbor(&self, neighbor: &Segment) -> bool {
        match self {
            MergePolicy::Preliminary { .. } => true,
            MergePolicy::Threshold { neighbor_max, .. } => {
                (neighbor.length as f64) <= *neighbor_max
            }
        }
    }

    /// Choose the target among the eligible `(index, length)` neighbors of
    /// the candidate at `candidate`; `None` means no merge this pass.
    pub fn choose_target(&self, candidate: usize, eligible: &[(usize, usize)]) -> Option<usize> {
        match self {
            MergePolicy::Preliminary { .. } => {
                let predecessor = candidate.checked_sub(1)?;
                eligible
                    .iter()
                    .any(|&(index, _)| index == predecessor)
                    .then_some(predecessor)
            }
            MergePolicy::Threshold { .. } => eligible
                .iter()
                .min_by_key(|&&(index, length)| (length, index))
                .map(|&(index, _)| index),
        }
    }

    /// Ordering key for processing candidates within a pass.
    pub fn sort_key(&self, index: usize, length: usize) -> (usize, usize) {
        match self {
            MergePolicy::Preliminary { .. } => (index, 0),
            MergePolicy::Threshold { .. } => (length, index),
        }
    }
}
