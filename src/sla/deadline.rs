//! Deadline calculation.
//!
//! Turns resolved SLA terms and a start instant into absolute target
//! timestamps. Targets are computed at job creation and recomputed on a
//! priority change or a reopen.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::policy::{SlaTerms, MAX_SLA_MINUTES};
use crate::models::Priority;

/// How policy minutes are added to a start instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineMode {
    /// Minutes are wall-clock minutes, nights and weekends included.
    #[default]
    WallClock,
    /// Minutes count only inside the policy's business hours.
    /// Policies without business hours fall back to wall-clock.
    BusinessHours,
}

/// Absolute SLA target timestamps for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaTargets {
    /// Instant the targets were computed from (creation or reopen).
    pub computed_at: DateTime<Utc>,
    /// Priority the targets were computed for.
    pub priority: Priority,
    pub first_response_target: DateTime<Utc>,
    pub next_update_target: DateTime<Utc>,
    pub resolution_target: DateTime<Utc>,
}

/// Computes SLA targets from resolved terms.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadlineCalculator {
    mode: DeadlineMode,
}

impl DeadlineCalculator {
    /// Creates a wall-clock calculator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deadline mode.
    pub fn with_mode(mut self, mode: DeadlineMode) -> Self {
        self.mode = mode;
        self
    }

    /// Current deadline mode.
    pub fn mode(&self) -> DeadlineMode {
        self.mode
    }

    /// Computes targets as `start + policy minutes`.
    pub fn compute(&self, start: DateTime<Utc>, priority: Priority, terms: &SlaTerms) -> SlaTargets {
        SlaTargets {
            computed_at: start,
            priority,
            first_response_target: self.offset(start, terms.times.response_minutes, terms),
            next_update_target: self.offset(start, terms.times.update_interval_minutes(), terms),
            resolution_target: self.offset(start, terms.times.resolution_minutes, terms),
        }
    }

    fn offset(&self, start: DateTime<Utc>, minutes: i64, terms: &SlaTerms) -> DateTime<Utc> {
        // Saturates at the end of representable time.
        let wall_clock = TimeDelta::try_minutes(minutes)
            .and_then(|delta| start.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        match (self.mode, &terms.business_hours) {
            (DeadlineMode::BusinessHours, Some(hours)) if minutes <= MAX_SLA_MINUTES => {
                hours.add_working_minutes(start, minutes).unwrap_or_else(|| {
                    warn!(
                        start_hour = hours.start_hour,
                        end_hour = hours.end_hour,
                        minutes,
                        "no business-hours deadline; using wall-clock deadline"
                    );
                    wall_clock
                })
            }
            _ => wall_clock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessHours, JobType};
    use crate::sla::{DefaultSlaTable, PolicySource, SlaPolicy, SlaPolicyResolver, SlaTimes};
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn terms(response: i64, resolution: i64) -> SlaTerms {
        SlaTerms {
            times: SlaTimes::new(response, resolution),
            business_hours: None,
            source: PolicySource::Global,
        }
    }

    #[test]
    fn test_wall_clock_targets() {
        let created = at(2024, 3, 4, 10, 0);
        let targets = DeadlineCalculator::new().compute(created, Priority::Critical, &terms(15, 240));

        assert_eq!(targets.computed_at, created);
        assert_eq!(targets.priority, Priority::Critical);
        assert_eq!(targets.first_response_target, at(2024, 3, 4, 10, 15));
        assert_eq!(targets.next_update_target, at(2024, 3, 4, 10, 15));
        assert_eq!(targets.resolution_target, at(2024, 3, 4, 14, 0));
    }

    #[test]
    fn test_explicit_update_interval() {
        let mut t = terms(15, 240);
        t.times = t.times.with_update_minutes(60);
        let targets = DeadlineCalculator::new().compute(at(2024, 3, 4, 10, 0), Priority::High, &t);
        assert_eq!(targets.next_update_target, at(2024, 3, 4, 11, 0));
    }

    #[test]
    fn test_wall_clock_ignores_business_hours() {
        let mut t = terms(60, 240);
        t.business_hours = Some(BusinessHours::default());
        // Friday 16:00, wall-clock mode: resolution lands Friday 20:00
        let targets = DeadlineCalculator::new().compute(at(2024, 3, 8, 16, 0), Priority::High, &t);
        assert_eq!(targets.resolution_target, at(2024, 3, 8, 20, 0));
    }

    #[test]
    fn test_business_hours_mode() {
        let mut t = terms(60, 240);
        t.business_hours = Some(BusinessHours::default());
        let calc = DeadlineCalculator::new().with_mode(DeadlineMode::BusinessHours);
        let targets = calc.compute(at(2024, 3, 8, 16, 0), Priority::High, &t);

        assert_eq!(targets.first_response_target, at(2024, 3, 8, 17, 0));
        assert_eq!(targets.resolution_target, at(2024, 3, 11, 12, 0));
    }

    #[test]
    fn test_business_hours_mode_without_hours_is_wall_clock() {
        let calc = DeadlineCalculator::new().with_mode(DeadlineMode::BusinessHours);
        let targets = calc.compute(at(2024, 3, 8, 16, 0), Priority::High, &terms(60, 240));
        assert_eq!(targets.resolution_target, at(2024, 3, 8, 20, 0));
    }

    #[test]
    fn test_with_resolver() {
        let resolver = SlaPolicyResolver::new(
            vec![SlaPolicy::new(JobType::Repair, Priority::Critical, SlaTimes::new(10, 120))],
            Some(DefaultSlaTable::standard()),
        )
        .unwrap();
        let created = at(2024, 3, 4, 10, 0);
        let calc = DeadlineCalculator::new();

        let exact = calc.compute(
            created,
            Priority::Critical,
            &resolver.resolve(JobType::Repair, Priority::Critical),
        );
        assert_eq!(exact.resolution_target, at(2024, 3, 4, 12, 0));

        let fallback = calc.compute(
            created,
            Priority::Critical,
            &resolver.resolve(JobType::Maintenance, Priority::Critical),
        );
        assert_eq!(fallback.resolution_target, at(2024, 3, 4, 14, 0));
        assert_eq!(fallback.resolution_target - fallback.computed_at, Duration::minutes(240));
    }

    #[test]
    fn test_out_of_range_minutes_saturate() {
        let created = at(2024, 3, 4, 10, 0);
        let huge = terms(15, 9_000_000_000_000_000);
        let targets = DeadlineCalculator::new().compute(created, Priority::Low, &huge);
        assert_eq!(targets.first_response_target, at(2024, 3, 4, 10, 15));
        assert_eq!(targets.resolution_target, DateTime::<Utc>::MAX_UTC);

        let mut with_hours = terms(60, i64::MAX);
        with_hours.business_hours = Some(BusinessHours::default());
        let calc = DeadlineCalculator::new().with_mode(DeadlineMode::BusinessHours);
        let targets = calc.compute(at(2024, 3, 8, 16, 0), Priority::Low, &with_hours);
        assert_eq!(targets.first_response_target, at(2024, 3, 8, 17, 0));
        assert_eq!(targets.resolution_target, DateTime::<Utc>::MAX_UTC);
    }
}
