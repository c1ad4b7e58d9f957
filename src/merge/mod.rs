//! Policy-driven fixed-point merge engine.
//!
//! The engine repeatedly runs merge passes over a segment list until a pass
//! produces no merges. Each pass scans for candidates, orders them by the
//! policy's sort key, resolves each candidate to an adjacent target, and
//! rebuilds the list with the merged results in place.
//!
//! Within a single pass no segment takes part in more than one merge:
//! indices consumed as a candidate or a target are skipped for the rest of
//! the pass, so chains only form across passes.

pub mod policy;

pub use policy::MergePolicy;

use ahash::{AHashMap, AHashSet};

use crate::segment::Segment;

/// Fixed-point merge driver.
///
/// The engine carries no state of its own; all merge behavior comes from the
/// [`MergePolicy`] passed to [`run`](MergeEngine::run).
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeEngine;

impl MergeEngine {
    /// Create a new merge engine.
    pub fn new() -> Self {
        MergeEngine
    }

    /// Run merge passes under `policy` until the list is stable.
    ///
    /// Lists with fewer than two segments are returned unchanged. `label`
    /// names the invocation in logs.
    pub fn run(&self, segments: Vec<Segment>, policy: &MergePolicy, label: &str) -> Vec<Segment> {
        if segments.len() < 2 {
            return segments;
        }

        let before = segments.len();
        let mut current = segments;
        let mut passes = 0usize;

        loop {
            if current.len() < 2 {
                break;
            }
            match self.run_pass(&current, policy) {
                Some(next) => {
                    current = next;
                    passes += 1;
                }
                None => break,
            }
        }

        if passes > 0 {
            log::debug!(
                "{label}: {before} -> {} segments in {passes} passes",
                current.len()
            );
        }
        current
    }

    /// Execute one pass; `None` means the pass found nothing to merge.
    fn run_pass(&self, segments: &[Segment], policy: &MergePolicy) -> Option<Vec<Segment>> {
        let n = segments.len();

        let mut candidates: Vec<(usize, usize)> = segments
            .iter()
            .enumerate()
            .filter(|(index, segment)| policy.is_candidate(segment, *index))
            .map(|(index, segment)| (index, segment.length))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_unstable_by_key(|&(index, length)| policy.sort_key(index, length));

        // Resolve candidates to targets. `consumed` holds every index already
        // involved in a merge this pass, as candidate or target.
        let mut instructions: AHashMap<usize, usize> = AHashMap::new();
        let mut consumed: AHashSet<usize> = AHashSet::new();

        for &(index, _) in &candidates {
            if consumed.contains(&index) {
                continue;
            }

            let mut eligible: Vec<(usize, usize)> = Vec::with_capacity(2);
            if let Some(prev) = index.checked_sub(1)
                && !consumed.contains(&prev)
                && policy.is_eligible_neighbor(&segments[prev])
            {
                eligible.push((prev, segments[prev].length));
            }
            let next = index + 1;
            if next < n && !consumed.contains(&next) && policy.is_eligible_neighbor(&segments[next])
            {
                eligible.push((next, segments[next].length));
            }

            if let Some(target) = policy.choose_target(index, &eligible) {
                debug_assert!(
                    !consumed.contains(&target),
                    "policy chose an already-consumed target"
                );
                instructions.insert(index, target);
                consumed.insert(index);
                consumed.insert(target);
            }
        }

        if instructions.is_empty() {
            return None;
        }

        // Group candidates by target and rebuild in original order, joining
        // each merge group ascending by index.
        let mut absorbs: AHashMap<usize, Vec<usize>> = AHashMap::new();
        for (&candidate, &target) in &instructions {
            absorbs.entry(target).or_default().push(candidate);
        }

        let mut next_pass = Vec::with_capacity(n - instructions.len());
        for index in 0..n {
            if let Some(group) = absorbs.get(&index) {
                let mut involved = Vec::with_capacity(group.len() + 1);
                involved.push(index);
                involved.extend_from_slice(group);
                involved.sort_unstable();

                next_pass.push(Segment::merged(involved.iter().map(|&i| &segments[i])));
            } else if instructions.contains_key(&index) {
                // Absorbed into its target; emitted when the target was built.
                debug_assert!(consumed.contains(&index));
            } else {
                next_pass.push(segments[index].clone());
            }
        }

        Some(next_pass)
    }
}
