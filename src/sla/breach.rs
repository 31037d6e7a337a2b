//! Breach classification and SLA tracking.
//!
//! # Classification
//!
//! | Status | Condition |
//! |--------|-----------|
//! | Breached | `now > target` |
//! | AtRisk | remaining ≤ `at_risk_fraction` × window |
//! | OnTrack | otherwise |
//!
//! The window is `target - start`, where start is the instant the target
//! was computed from (creation or reopen).
//!
//! # Latching
//! `SlaTracker` never un-breaches an open job, and freezes the status
//! once the milestone is reached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deadline::SlaTargets;
use crate::models::Job;

/// Compliance status of a single SLA target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    OnTrack,
    AtRisk,
    Breached,
}

impl SlaStatus {
    /// Whether this status counts as compliant.
    pub fn is_compliant(&self) -> bool {
        !matches!(self, SlaStatus::Breached)
    }
}

/// Default at-risk threshold: last quarter of the window.
pub const DEFAULT_AT_RISK_FRACTION: f64 = 0.25;

/// Classifies SLA targets against a clock.
#[derive(Debug, Clone, Copy)]
pub struct BreachClassifier {
    at_risk_fraction: f64,
}

impl Default for BreachClassifier {
    fn default() -> Self {
        Self {
            at_risk_fraction: DEFAULT_AT_RISK_FRACTION,
        }
    }
}

impl BreachClassifier {
    /// Creates a classifier with the default threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the at-risk fraction (clamped to 0.0..=1.0).
    pub fn with_at_risk_fraction(mut self, fraction: f64) -> Self {
        self.at_risk_fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            DEFAULT_AT_RISK_FRACTION
        };
        self
    }

    /// Status of an open target at `now`.
    pub fn status(&self, start: DateTime<Utc>, target: DateTime<Utc>, now: DateTime<Utc>) -> SlaStatus {
        if now > target {
            return SlaStatus::Breached;
        }
        let window_ms = (target - start).num_milliseconds() as f64;
        let remaining_ms = (target - now).num_milliseconds() as f64;
        if remaining_ms <= self.at_risk_fraction * window_ms.max(0.0) {
            SlaStatus::AtRisk
        } else {
            SlaStatus::OnTrack
        }
    }

    /// Final status of a target whose milestone was reached at `reached_at`.
    pub fn terminal_status(&self, target: DateTime<Utc>, reached_at: DateTime<Utc>) -> SlaStatus {
        if reached_at > target {
            SlaStatus::Breached
        } else {
            SlaStatus::OnTrack
        }
    }
}

/// Compliance ratio as a percentage.
///
/// Returns 100.0 for an empty set (nothing to breach).
pub fn compliance_percentage<'a, I>(statuses: I) -> f64
where
    I: IntoIterator<Item = &'a SlaStatus>,
{
    let mut total = 0usize;
    let mut compliant = 0usize;
    for status in statuses {
        total += 1;
        if status.is_compliant() {
            compliant += 1;
        }
    }
    if total == 0 {
        100.0
    } else {
        compliant as f64 / total as f64 * 100.0
    }
}

/// Tracks one SLA target over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaTracker {
    start: DateTime<Utc>,
    target: DateTime<Utc>,
    last: Option<SlaStatus>,
    frozen: bool,
}

impl SlaTracker {
    /// Creates a tracker for a target window.
    pub fn new(start: DateTime<Utc>, target: DateTime<Utc>) -> Self {
        Self {
            start,
            target,
            last: None,
            frozen: false,
        }
    }

    /// Target instant.
    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    /// Last computed status, if any.
    pub fn status(&self) -> Option<SlaStatus> {
        self.last
    }

    /// Whether the status has been fixed by a terminal transition.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Evaluates the target at `now`.
    ///
    /// Frozen trackers return their fixed status. A breach is sticky.
    pub fn evaluate(&mut self, classifier: &BreachClassifier, now: DateTime<Utc>) -> SlaStatus {
        if let (true, Some(fixed)) = (self.frozen, self.last) {
            return fixed;
        }
        let status = match self.last {
            Some(SlaStatus::Breached) => SlaStatus::Breached,
            _ => classifier.status(self.start, self.target, now),
        };
        self.last = Some(status);
        status
    }

    /// Fixes the status at the instant the milestone was reached.
    ///
    /// Later calls are ignored; the first freeze wins.
    pub fn freeze(&mut self, classifier: &BreachClassifier, reached_at: DateTime<Utc>) -> SlaStatus {
        if let (true, Some(fixed)) = (self.frozen, self.last) {
            return fixed;
        }
        let status = match self.last {
            Some(SlaStatus::Breached) => SlaStatus::Breached,
            _ => classifier.terminal_status(self.target, reached_at),
        };
        self.last = Some(status);
        self.frozen = true;
        status
    }
}

/// Response and resolution tracking for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSlaState {
    pub response: SlaTracker,
    pub resolution: SlaTracker,
}

impl JobSlaState {
    /// Starts tracking a job's targets.
    pub fn new(targets: &SlaTargets) -> Self {
        Self {
            response: SlaTracker::new(targets.computed_at, targets.first_response_target),
            resolution: SlaTracker::new(targets.computed_at, targets.resolution_target),
        }
    }

    /// Brings both trackers up to date with the job at `now`.
    ///
    /// A recorded first response freezes the response tracker. A terminal
    /// job freezes both trackers: the response at its first response, or
    /// at its end time if it never got one, and the resolution at its end
    /// time. `now` stands in for a missing end time.
    pub fn update(&mut self, job: &Job, classifier: &BreachClassifier, now: DateTime<Utc>) {
        let terminal = job.status.is_terminal();
        let ended_at = job.actual_end.unwrap_or(now);

        match (job.first_response_at, terminal) {
            (Some(responded), _) => {
                self.response.freeze(classifier, responded);
            }
            (None, true) => {
                self.response.freeze(classifier, ended_at);
            }
            (None, false) => {
                self.response.evaluate(classifier, now);
            }
        }

        if terminal {
            self.resolution.freeze(classifier, ended_at);
        } else {
            self.resolution.evaluate(classifier, now);
        }
    }

    /// Whether either target is breached.
    pub fn is_breached(&self) -> bool {
        self.response.status() == Some(SlaStatus::Breached)
            || self.resolution.status() == Some(SlaStatus::Breached)
    }
}
