//! # Scale Policy
//!
//! The per-service scaling parameters: message-count thresholds, the
//! worker count for each threshold, the cooldown between two scaling
//! decisions, and the consumer formation to scale.
//!
//! ## Invariants
//!
//! A [`ScalePolicy`] can only be obtained through [`ScalePolicy::new`],
//! which enforces:
//!
//! - `intervals` and `workers` have the same, non-zero length,
//! - the first interval is `0`,
//! - intervals are ascending,
//! - every interval and worker count is a non-negative whole number that
//!   fits in a `u64`,
//! - the cooldown is non-negative.
//!
//! Together these make [`ScalePolicy::target_workers`] total: every
//! message count falls in exactly one bucket.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::PolicyViolation;

/// 2^64: the smallest `f64` past `u64::MAX`.
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

/// A number as read from a configuration document.
///
/// Unsigned integers stay exact; everything else (negatives, fractions,
/// values past `u64::MAX`) is kept as a float so the policy rules can
/// report it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawNumber {
    /// An exact unsigned integer.
    Whole(u64),
    /// Any other number.
    Float(f64),
}

impl RawNumber {
    /// The number as a float, rounding integers past 2^53.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Whole(n) => n as f64,
            Self::Float(f) => f,
        }
    }

    /// The exact count, if this is a non-negative whole number below 2^64.
    pub fn to_count(self) -> Option<u64> {
        match self {
            Self::Whole(n) => Some(n),
            Self::Float(f) if (0.0..U64_BOUND).contains(&f) && f.fract() == 0.0 => Some(f as u64),
            Self::Float(_) => None,
        }
    }

    fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }

    fn greater_than(self, other: Self) -> bool {
        match (self, other) {
            (Self::Whole(a), Self::Whole(b)) => a > b,
            (a, b) => a.as_f64() > b.as_f64(),
        }
    }
}

impl From<u64> for RawNumber {
    fn from(n: u64) -> Self {
        Self::Whole(n)
    }
}

impl From<f64> for RawNumber {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl fmt::Display for RawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Whole(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Validated scaling parameters for one service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalePolicy {
    #[serde(skip)]
    queue_name: String,
    intervals: Vec<u64>,
    workers: Vec<u64>,
    #[serde(rename = "cooldown")]
    cooldown_secs: f64,
    consumers_formation_name: String,
}

impl ScalePolicy {
    /// Build a policy from raw document numbers.
    ///
    /// Every rule is checked; all failures are returned together so the
    /// caller can report them in one pass.
    pub fn new<N>(
        queue_name: impl Into<String>,
        intervals: &[N],
        workers: &[N],
        cooldown: f64,
        consumers_formation_name: impl Into<String>,
    ) -> Result<Self, Vec<PolicyViolation>>
    where
        N: Copy + Into<RawNumber>,
    {
        let intervals: Vec<RawNumber> = intervals.iter().map(|&n| n.into()).collect();
        let workers: Vec<RawNumber> = workers.iter().map(|&n| n.into()).collect();

        let violations = check_policy(&intervals, &workers, cooldown);
        // Every entry without a count is reported by `check_policy`.
        match (counts(&intervals), counts(&workers)) {
            (Some(intervals), Some(workers)) if violations.is_empty() => Ok(Self {
                queue_name: queue_name.into(),
                intervals,
                workers,
                cooldown_secs: cooldown,
                consumers_formation_name: consumers_formation_name.into(),
            }),
            _ => Err(violations),
        }
    }

    /// Name of the queue (the service key in the document).
    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Message-count thresholds, ascending, starting at 0.
    pub fn intervals(&self) -> &[u64] {
        &self.intervals
    }

    /// Worker count for each threshold.
    pub fn workers(&self) -> &[u64] {
        &self.workers
    }

    /// Minimum time between two scaling decisions for this queue.
    pub fn cooldown(&self) -> Duration {
        Duration::try_from_secs_f64(self.cooldown_secs).unwrap_or(Duration::MAX)
    }

    /// Formation (process type) whose size is adjusted.
    pub fn consumers_formation_name(&self) -> &str {
        &self.consumers_formation_name
    }

    /// Worker count for a queue currently holding `messages` messages.
    ///
    /// Picks the last interval whose threshold is at most `messages`.
    pub fn target_workers(&self, messages: u64) -> u64 {
        let bucket = self.intervals.partition_point(|&t| t <= messages);
        self.workers
            .get(bucket.saturating_sub(1))
            .copied()
            .unwrap_or_default()
    }
}

/// Apply the semantic rules to raw policy numbers.
///
/// Returns an empty vector when the numbers form a usable policy.
pub fn check_policy(
    intervals: &[RawNumber],
    workers: &[RawNumber],
    cooldown: f64,
) -> Vec<PolicyViolation> {
    let mut violations = Vec::new();

    if intervals.len() != workers.len() {
        violations.push(PolicyViolation::LengthMismatch {
            intervals: intervals.len(),
            workers: workers.len(),
        });
    }

    match intervals.first() {
        None => violations.push(PolicyViolation::EmptyIntervals),
        Some(&first) if !first.is_zero() => {
            violations.push(PolicyViolation::FirstIntervalNotZero(first))
        }
        Some(_) => {}
    }

    for interval in intervals.iter().map(|n| n.as_f64()) {
        if interval < 0.0 {
            violations.push(PolicyViolation::NegativeInterval(interval));
        }
    }

    for count in workers.iter().map(|n| n.as_f64()) {
        if count < 0.0 {
            violations.push(PolicyViolation::NegativeWorkers(count));
        }
    }

    if cooldown < 0.0 {
        violations.push(PolicyViolation::NegativeCooldown(cooldown));
    }

    if intervals.windows(2).any(|pair| pair[0].greater_than(pair[1])) {
        violations.push(PolicyViolation::UnsortedIntervals);
    }

    for (field, values) in [("intervals", intervals), ("workers", workers)] {
        for &value in values {
            let RawNumber::Float(value) = value else {
                continue;
            };
            // Negative entries are already reported above.
            if value < 0.0 {
                continue;
            }
            if value >= U64_BOUND {
                violations.push(PolicyViolation::OutOfRange { field, value });
            } else if value.fract() != 0.0 {
                violations.push(PolicyViolation::NotWholeNumber { field, value });
            }
        }
    }

    violations
}

fn counts(values: &[RawNumber]) -> Option<Vec<u64>> {
    values.iter().map(|n| n.to_count()).collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Ascending thresholds starting at 0, paired with worker counts.
    fn valid_policy() -> impl Strategy<Value = ScalePolicy> {
        prop::collection::vec((0u32..1000, 0u32..100), 0..8).prop_map(|steps| {
            let mut intervals = vec![0.0];
            let mut workers = vec![1.0];
            let mut threshold = 0.0;
            for (step, count) in steps {
                threshold += f64::from(step);
                intervals.push(threshold);
                workers.push(f64::from(count));
            }
            ScalePolicy::new("q", &intervals, &workers, 0.0, "w").unwrap()
        })
    }

    proptest! {
        /// The selected count is always one of the configured counts.
        #[test]
        fn target_workers_is_configured(policy in valid_policy(), messages in any::<u64>()) {
            let target = policy.target_workers(messages);
            prop_assert!(policy.workers().contains(&target));
        }

        /// The bucket threshold never exceeds the message count, and the next one does.
        #[test]
        fn target_workers_bucket_bounds(policy in valid_policy(), messages in 0u64..10_000) {
            let intervals = policy.intervals();
            let bucket = intervals.iter().rposition(|&t| t <= messages).unwrap();
            prop_assert_eq!(policy.target_workers(messages), policy.workers()[bucket]);
            if let Some(&next) = intervals.get(bucket + 1) {
                prop_assert!(next > messages);
            }
        }
    }
}
