//! The four-stage balancing pipeline.
//!
//! [`BalancePipeline`] drives tokenized segments through four ordered
//! stages, each feeding the next:
//!
//! 1. **Preliminary merge** folds short segments into their predecessors,
//!    using whichever of P10/Q1 sits closest to the configured reference.
//! 2. **Quartile loop** repeatedly merges at (Q1, Q3) until the list is
//!    stable, a P90 ceiling is breached (reverting the last merge), or the
//!    round cap is hit.
//! 3. **Median merge** runs one engine application with the median as both
//!    candidate and neighbor threshold.
//! 4. **Outlier absorption** sweeps backward once, folding low-outlier
//!    segments into their predecessors in place.
//!
//! Every stage treats lists with fewer than two segments, or lists without
//! usable statistics, as no-ops.

use ahash::AHashSet;

use crate::analysis::SegmentTokenizer;
use crate::error::{Result, TesseraError};
use crate::merge::{MergeEngine, MergePolicy};
use crate::segment::Segment;
use crate::stats::LengthStats;

/// Tuning values for the balancing stages.
///
/// The defaults reproduce the reference balancing behavior; custom values
/// must pass [`validate`](BalanceConfig::validate), which pipeline
/// construction enforces.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceConfig {
    /// Quartile loop stops and reverts when P90 exceeds this value.
    pub p90_ceiling: f64,

    /// The preliminary stage picks whichever of P10/Q1 is closest to this.
    pub prelim_reference: f64,

    /// Preliminary threshold when statistics are unusable or over the cap.
    pub default_prelim_threshold: f64,

    /// Largest statistic the preliminary stage accepts as its threshold.
    pub max_prelim_threshold: f64,

    /// Round cap for the quartile loop.
    pub max_balance_rounds: usize,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        BalanceConfig {
            p90_ceiling: 10.0,
            prelim_reference: 10.0,
            default_prelim_threshold: 10.0,
            max_prelim_threshold: 20.0,
            max_balance_rounds: 50,
        }
    }
}

impl BalanceConfig {
    /// Check the configuration for unusable values.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("p90_ceiling", self.p90_ceiling),
            ("prelim_reference", self.prelim_reference),
            ("default_prelim_threshold", self.default_prelim_threshold),
            ("max_prelim_threshold", self.max_prelim_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TesseraError::config(format!(
                    "{name} must be finite and non-negative"
                )));
            }
        }
        if self.max_balance_rounds == 0 {
            return Err(TesseraError::config("max_balance_rounds must be at least 1"));
        }
        Ok(())
    }
}

/// Terminal state of the quartile convergence loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopOutcome {
    /// A round left the segment count unchanged.
    Stable {
        /// Round in which stability was detected
        rounds: usize,
    },
    /// Statistics were unavailable or P90 exceeded the ceiling; the list was
    /// restored to the snapshot taken before the previous round's merge.
    Reverted {
        /// Round in which the check fired
        rounds: usize,
    },
    /// Fewer than two segments remained to merge.
    Exhausted {
        /// Round in which the loop ran out of segments (0 when the input
        /// was already too small)
        rounds: usize,
    },
    /// The round cap ended the loop with merges still occurring.
    MaxRounds,
}

/// The full tokenize-and-balance pipeline.
///
/// # Examples
///
/// ```
/// use tessera::pipeline::BalancePipeline;
///
/// let pipeline = BalancePipeline::new().unwrap();
/// let segments = pipeline.run("hello world 測試 123");
///
/// assert_eq!(segments.len(), 1);
/// assert_eq!(segments[0].length, 5);
/// ```
#[derive(Debug, Clone)]
pub struct BalancePipeline {
    tokenizer: SegmentTokenizer,
    engine: MergeEngine,
    config: BalanceConfig,
}

impl BalancePipeline {
    /// Create a pipeline with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(BalanceConfig::default())
    }

    /// Create a pipeline with a custom configuration.
    pub fn with_config(config: BalanceConfig) -> Result<Self> {
        config.validate()?;
        Ok(BalancePipeline {
            tokenizer: SegmentTokenizer::new()?,
            engine: MergeEngine::new(),
            config,
        })
    }

    /// Get the configuration in effect.
    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// Get the tokenizer used by this pipeline.
    pub fn tokenizer(&self) -> &SegmentTokenizer {
        &self.tokenizer
    }

    /// Tokenize `text` and balance the resulting segments.
    pub fn run(&self, text: &str) -> Vec<Segment> {
        self.balance(self.tokenizer.tokenize(text))
    }

    /// Run the four balancing stages over an existing segment list.
    pub fn balance(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let initial = segments.len();

        let segments = self.preliminary_merge(segments);
        let (segments, outcome) = self.convergence_loop(segments);
        log::debug!("quartile loop finished: {outcome:?}");
        let segments = self.median_merge(segments);
        let segments = self.absorb_outliers(segments);

        log::info!("balanced {initial} segments into {}", segments.len());
        segments
    }

    /// Stage 1: fold short segments into their predecessors.
    pub fn preliminary_merge(&self, segments: Vec<Segment>) -> Vec<Segment> {
        if segments.len() < 2 {
            return segments;
        }
        let threshold = self.preliminary_threshold(&segments);
        self.engine.run(
            segments,
            &MergePolicy::Preliminary { threshold },
            "preliminary merge",
        )
    }

    /// Pick the preliminary threshold: whichever of P10/Q1 is closest to the
    /// reference (ties prefer P10), capped; otherwise the default.
    fn preliminary_threshold(&self, segments: &[Segment]) -> f64 {
        let config = &self.config;
        let Some(stats) = LengthStats::from_segments(segments) else {
            log::debug!(
                "preliminary threshold {:.2} (no statistics, using default)",
                config.default_prelim_threshold
            );
            return config.default_prelim_threshold;
        };

        let p10_gap = (stats.p10 - config.prelim_reference).abs();
        let q1_gap = (stats.q1 - config.prelim_reference).abs();
        let (value, source) = if p10_gap <= q1_gap {
            (stats.p10, "p10")
        } else {
            (stats.q1, "q1")
        };

        if value <= config.max_prelim_threshold {
            log::debug!("preliminary threshold {value:.2} (from {source})");
            value
        } else {
            log::debug!(
                "preliminary threshold {:.2} ({source} {value:.2} exceeds cap)",
                config.default_prelim_threshold
            );
            config.default_prelim_threshold
        }
    }

    /// Stage 2: merge at (Q1, Q3) until stable, reverted, or capped.
    ///
    /// Each round snapshots the list before merging; when a later round
    /// finds the distribution unusable or P90 over the ceiling, that
    /// snapshot is restored.
    pub fn convergence_loop(&self, segments: Vec<Segment>) -> (Vec<Segment>, LoopOutcome) {
        if segments.len() < 2 {
            return (segments, LoopOutcome::Exhausted { rounds: 0 });
        }

        let mut current = segments;
        let mut snapshot = current.clone();

        for round in 1..=self.config.max_balance_rounds {
            let Some(stats) = LengthStats::from_segments(&current) else {
                log::debug!("quartile round {round}: statistics unavailable, reverting");
                return (snapshot, LoopOutcome::Reverted { rounds: round });
            };
            log::debug!("quartile round {round}: {stats}");

            if stats.p90 > self.config.p90_ceiling {
                log::debug!(
                    "quartile round {round}: p90 {:.2} over ceiling {:.2}, reverting",
                    stats.p90,
                    self.config.p90_ceiling
                );
                return (snapshot, LoopOutcome::Reverted { rounds: round });
            }
            if current.len() < 2 {
                return (current, LoopOutcome::Exhausted { rounds: round });
            }

            snapshot = current.clone();
            let before = current.len();
            current = self.engine.run(
                current,
                &MergePolicy::Threshold {
                    candidate_max: stats.q1,
                    neighbor_max: stats.q3,
                },
                "quartile merge",
            );

            if current.len() == before {
                return (current, LoopOutcome::Stable { rounds: round });
            }
        }

        (current, LoopOutcome::MaxRounds)
    }

    /// Stage 3: one engine application with the median as both thresholds.
    pub fn median_merge(&self, segments: Vec<Segment>) -> Vec<Segment> {
        if segments.len() < 2 {
            return segments;
        }
        let Some(stats) = LengthStats::from_segments(&segments) else {
            return segments;
        };

        self.engine.run(
            segments,
            &MergePolicy::Threshold {
                candidate_max: stats.median,
                neighbor_max: stats.median,
            },
            "median merge",
        )
    }

    /// Stage 4: sweep backward once, folding low-outlier segments into their
    /// predecessors.
    ///
    /// The outlier set is computed once at entry; a predecessor grown by an
    /// absorption is re-examined against that same stale set, so chains only
    /// form when the grown weight happens to land in it. The first segment
    /// has no predecessor and is never absorbed.
    pub fn absorb_outliers(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let n = segments.len();
        if n < 2 {
            return segments;
        }
        let Some(stats) = LengthStats::from_segments(&segments) else {
            return segments;
        };

        let low_outliers: AHashSet<usize> = stats
            .outliers
            .iter()
            .copied()
            .filter(|&value| (value as f64) < stats.p10)
            .collect();
        if low_outliers.is_empty() {
            return segments;
        }

        let mut segments = segments;
        let mut absorbed = 0usize;
        for i in (1..n).rev() {
            // Deletions so far all happened above i, so i is still in range.
            debug_assert!(i < segments.len());
            if low_outliers.contains(&segments[i].length) {
                let tail = segments.remove(i);
                segments[i - 1].absorb(tail);
                absorbed += 1;
            }
        }

        if absorbed > 0 {
            log::debug!("outlier sweep absorbed {absorbed} segments");
        }
        segments
    }
}

impl Default for BalancePipeline {
    fn default() -> Self {
        Self::new().expect("Default balance configuration should be valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentKind;

    fn segments(lengths: &[usize]) -> Vec<Segment> {
        let names = ["a", "b", "c", "d", "e", "f", "g", "h", "i"];
        lengths
            .iter()
            .enumerate()
            .map(|(i, &l)| Segment::mix(names[i], l))
            .collect()
    }

    fn lengths(segments: &[Segment]) -> Vec<usize> {
        segments.iter().map(|s| s.length).collect()
    }

    #[test]
    fn test_config_validation() {
        assert!(BalanceConfig::default().validate().is_ok());

        let config = BalanceConfig {
            max_balance_rounds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BalanceConfig {
            p90_ceiling: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BalanceConfig {
            max_prelim_threshold: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(BalancePipeline::with_config(config).is_err());
    }

    #[test]
    fn test_preliminary_threshold_picks_closest_statistic() {
        let pipeline = BalancePipeline::new().unwrap();

        // P10 = 1.3, Q1 = 1.75: Q1 is closer to the reference 10.
        let threshold = pipeline.preliminary_threshold(&segments(&[1, 2, 3, 4]));
        assert_eq!(threshold, 1.75);

        // Equal statistics tie toward P10, same value either way.
        let threshold = pipeline.preliminary_threshold(&segments(&[7, 7, 7]));
        assert_eq!(threshold, 7.0);
    }

    #[test]
    fn test_preliminary_threshold_falls_back_over_cap() {
        let pipeline = BalancePipeline::new().unwrap();

        // P10 = 32 wins on proximity but exceeds the cap of 20.
        let threshold = pipeline.preliminary_threshold(&segments(&[30, 40, 50]));
        assert_eq!(threshold, 10.0);

        // No statistics at all.
        let threshold = pipeline.preliminary_threshold(&[]);
        assert_eq!(threshold, 10.0);
    }

    #[test]
    fn test_stages_pass_small_lists_through() {
        let pipeline = BalancePipeline::new().unwrap();

        assert!(pipeline.preliminary_merge(Vec::new()).is_empty());
        assert!(pipeline.median_merge(Vec::new()).is_empty());
        assert!(pipeline.absorb_outliers(Vec::new()).is_empty());
        assert!(pipeline.balance(Vec::new()).is_empty());

        let single = segments(&[4]);
        assert_eq!(pipeline.balance(single.clone()), single);
    }

    #[test]
    fn test_convergence_loop_skips_small_input() {
        let pipeline = BalancePipeline::new().unwrap();

        let (result, outcome) = pipeline.convergence_loop(segments(&[4]));
        assert_eq!(lengths(&result), vec![4]);
        assert_eq!(outcome, LoopOutcome::Exhausted { rounds: 0 });
    }

    #[test]
    fn test_convergence_loop_reaches_stability() {
        let pipeline = BalancePipeline::new().unwrap();

        // Round 1 merges the trailing 2 into its 5-neighbor; round 2 finds
        // nothing mergeable under the new quartiles.
        let (result, outcome) = pipeline.convergence_loop(segments(&[5, 5, 2]));

        assert_eq!(lengths(&result), vec![5, 7]);
        assert_eq!(result[1].text, "b c");
        assert_eq!(outcome, LoopOutcome::Stable { rounds: 2 });
    }

    #[test]
    fn test_convergence_loop_reverts_when_p90_breaches_ceiling() {
        let pipeline = BalancePipeline::new().unwrap();

        // Round 1 merges 5 into 6 giving [11, 9]; round 2 sees P90 = 10.8
        // over the ceiling and restores the pre-merge snapshot exactly.
        let input = segments(&[6, 5, 9]);
        let (result, outcome) = pipeline.convergence_loop(input.clone());

        assert_eq!(result, input);
        assert_eq!(outcome, LoopOutcome::Reverted { rounds: 2 });
    }

    #[test]
    fn test_convergence_loop_exhausts_after_collapse() {
        let pipeline = BalancePipeline::new().unwrap();

        // The pair merges into one segment of weight 10, which stays at the
        // ceiling, so the next round stops on list size rather than P90.
        let (result, outcome) = pipeline.convergence_loop(segments(&[5, 5]));

        assert_eq!(lengths(&result), vec![10]);
        assert_eq!(outcome, LoopOutcome::Exhausted { rounds: 2 });
    }

    #[test]
    fn test_convergence_loop_honors_round_cap() {
        let config = BalanceConfig {
            max_balance_rounds: 1,
            ..Default::default()
        };
        let pipeline = BalancePipeline::with_config(config).unwrap();

        let (result, outcome) = pipeline.convergence_loop(segments(&[5, 5, 2]));

        assert_eq!(lengths(&result), vec![5, 7]);
        assert_eq!(outcome, LoopOutcome::MaxRounds);
    }

    #[test]
    fn test_median_merge_on_uniform_lengths() {
        let pipeline = BalancePipeline::new().unwrap();

        // All weights equal the median, so pairs merge until the grown
        // segments exceed it; the engine terminates on a zero-merge pass.
        let result = pipeline.median_merge(segments(&[5, 5, 5]));

        assert_eq!(lengths(&result), vec![10, 5]);
        assert_eq!(result[0].text, "a b");
        assert_eq!(result[0].kind, SegmentKind::Mix);
    }

    #[test]
    fn test_absorb_outliers_folds_backward() {
        let pipeline = BalancePipeline::new().unwrap();

        let result = pipeline.absorb_outliers(segments(&[10, 10, 10, 10, 10, 10, 10, 10, 1]));

        assert_eq!(lengths(&result), vec![10, 10, 10, 10, 10, 10, 10, 11]);
        assert_eq!(result[7].text, "h i");
        assert_eq!(result[7].kind, SegmentKind::Mix);
    }

    #[test]
    fn test_absorb_outliers_ignores_high_outliers() {
        let pipeline = BalancePipeline::new().unwrap();

        let input = segments(&[10, 10, 10, 10, 10, 10, 10, 10, 100]);
        let result = pipeline.absorb_outliers(input.clone());

        assert_eq!(result, input);
    }

    #[test]
    fn test_absorb_outliers_chains_through_stale_set() {
        let pipeline = BalancePipeline::new().unwrap();

        // 1 and 2 are both low outliers at entry. The two trailing 1s merge
        // to weight 2, which is still in the stale set, so the grown segment
        // chains into its 10-neighbor. The leading 2 has no predecessor and
        // survives untouched.
        let mut input = vec![Segment::mix("w0", 2)];
        for i in 1..=28 {
            input.push(Segment::mix(format!("w{i}"), 10));
        }
        input.push(Segment::mix("w29", 1));
        input.push(Segment::mix("w30", 1));

        let result = pipeline.absorb_outliers(input);

        assert_eq!(result.len(), 29);
        assert_eq!(result[0].length, 2);
        assert_eq!(result[28].length, 12);
        assert_eq!(result[28].text, "w28 w29 w30");
        assert!(result[1..28].iter().all(|s| s.length == 10));
    }

    #[test]
    fn test_run_collapses_alternating_scenario() {
        let pipeline = BalancePipeline::new().unwrap();

        let result = pipeline.run("hello world 測試 123");

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "hello world 測試 123");
        assert_eq!(result[0].kind, SegmentKind::Mix);
        assert_eq!(result[0].length, 5);
    }
}
