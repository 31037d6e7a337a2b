//! SLA policy model and resolver.
//!
//! # Resolution Order
//!
//! 1. Active policy for the exact `(job_type, priority)` key.
//! 2. Active type-level default (`priority` absent) for the job type.
//! 3. Global default table entry for the priority.
//!
//! Configuration problems (missing global defaults, ambiguous duplicates)
//! are rejected when the resolver is built, so `resolve` never fails.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PolicyConfigurationError;
use crate::models::{BusinessHours, JobType, Priority};

/// Largest accepted SLA interval: ten years of minutes.
pub const MAX_SLA_MINUTES: i64 = 10 * 366 * 24 * 60;

/// Response and resolution time targets (minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaTimes {
    /// Minutes until first response is due.
    pub response_minutes: i64,
    /// Minutes until resolution is due.
    pub resolution_minutes: i64,
    /// Minutes until the next status update is due.
    /// `None` = same as `response_minutes`.
    #[serde(default)]
    pub update_minutes: Option<i64>,
}

impl SlaTimes {
    /// Creates time targets.
    pub const fn new(response_minutes: i64, resolution_minutes: i64) -> Self {
        Self {
            response_minutes,
            resolution_minutes,
            update_minutes: None,
        }
    }

    /// Sets an explicit update interval.
    pub fn with_update_minutes(mut self, minutes: i64) -> Self {
        self.update_minutes = Some(minutes);
        self
    }

    /// Effective update interval (minutes).
    pub fn update_interval_minutes(&self) -> i64 {
        self.update_minutes.unwrap_or(self.response_minutes)
    }

    fn problem(&self) -> Option<String> {
        let fields = [
            ("response_minutes", Some(self.response_minutes)),
            ("resolution_minutes", Some(self.resolution_minutes)),
            ("update_minutes", self.update_minutes),
        ];
        fields.into_iter().find_map(|(name, minutes)| match minutes {
            Some(m) if m <= 0 => Some(format!("{name} must be positive, got {m}")),
            Some(m) if m > MAX_SLA_MINUTES => {
                Some(format!("{name} must be at most {MAX_SLA_MINUTES}, got {m}"))
            }
            _ => None,
        })
    }
}

/// Global fallback targets, one entry per priority.
///
/// Passed explicitly into the resolver; there is no process-wide table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSlaTable {
    #[serde(default)]
    pub critical: Option<SlaTimes>,
    #[serde(default)]
    pub high: Option<SlaTimes>,
    #[serde(default)]
    pub medium: Option<SlaTimes>,
    #[serde(default)]
    pub low: Option<SlaTimes>,
}

impl DefaultSlaTable {
    /// The built-in table.
    ///
    /// | Priority | Response | Resolution |
    /// |----------|----------|------------|
    /// | Critical | 15 | 240 |
    /// | High | 60 | 480 |
    /// | Medium | 240 | 1440 |
    /// | Low | 480 | 2880 |
    pub fn standard() -> Self {
        let g = GlobalDefaults::standard();
        Self {
            critical: Some(g.critical),
            high: Some(g.high),
            medium: Some(g.medium),
            low: Some(g.low),
        }
    }

    /// Sets the entry for a priority.
    pub fn with_entry(mut self, priority: Priority, times: SlaTimes) -> Self {
        *self.slot_mut(priority) = Some(times);
        self
    }

    /// Entry for a priority, if configured.
    pub fn get(&self, priority: Priority) -> Option<&SlaTimes> {
        match priority {
            Priority::Critical => self.critical.as_ref(),
            Priority::High => self.high.as_ref(),
            Priority::Medium => self.medium.as_ref(),
            Priority::Low => self.low.as_ref(),
        }
    }

    fn slot_mut(&mut self, priority: Priority) -> &mut Option<SlaTimes> {
        match priority {
            Priority::Critical => &mut self.critical,
            Priority::High => &mut self.high,
            Priority::Medium => &mut self.medium,
            Priority::Low => &mut self.low,
        }
    }
}

fn default_active() -> bool {
    true
}

/// An SLA policy keyed by job type and (optionally) priority.
///
/// A policy without a priority is the type-level default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaPolicy {
    /// Job type this policy applies to.
    pub job_type: JobType,
    /// Priority this policy applies to. `None` = any priority of the type.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Minutes until first response is due.
    pub response_minutes: i64,
    /// Minutes until resolution is due.
    pub resolution_minutes: i64,
    /// Minutes until the next status update is due.
    #[serde(default)]
    pub update_minutes: Option<i64>,
    /// Inactive policies are ignored by the resolver.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Working hours, consulted only in business-hours deadline mode.
    #[serde(default)]
    pub business_hours: Option<BusinessHours>,
}

impl SlaPolicy {
    /// Creates an active policy for an exact `(job_type, priority)` key.
    pub fn new(job_type: JobType, priority: Priority, times: SlaTimes) -> Self {
        Self {
            job_type,
            priority: Some(priority),
            response_minutes: times.response_minutes,
            resolution_minutes: times.resolution_minutes,
            update_minutes: times.update_minutes,
            is_active: true,
            business_hours: None,
        }
    }

    /// Creates an active type-level default policy.
    pub fn type_default(job_type: JobType, times: SlaTimes) -> Self {
        Self {
            priority: None,
            ..Self::new(job_type, Priority::Low, times)
        }
    }

    /// Marks the policy inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Attaches business hours.
    pub fn with_business_hours(mut self, hours: BusinessHours) -> Self {
        self.business_hours = Some(hours);
        self
    }

    /// Time targets carried by this policy.
    pub fn times(&self) -> SlaTimes {
        SlaTimes {
            response_minutes: self.response_minutes,
            resolution_minutes: self.resolution_minutes,
            update_minutes: self.update_minutes,
        }
    }

    fn terms(&self, source: PolicySource) -> SlaTerms {
        SlaTerms {
            times: self.times(),
            business_hours: self.business_hours.clone(),
            source,
        }
    }
}

/// Which layer of the resolution order produced the terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySource {
    /// Exact `(job_type, priority)` policy.
    Exact,
    /// Type-level default policy.
    TypeDefault,
    /// Global default table.
    Global,
}

/// Resolved SLA terms for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaTerms {
    pub times: SlaTimes,
    pub business_hours: Option<BusinessHours>,
    pub source: PolicySource,
}

/// SLA configuration document.
///
/// ```toml
/// [defaults]
/// critical = { response_minutes = 15, resolution_minutes = 240 }
/// high = { response_minutes = 60, resolution_minutes = 480 }
/// medium = { response_minutes = 240, resolution_minutes = 1440 }
/// low = { response_minutes = 480, resolution_minutes = 2880 }
///
/// [[policies]]
/// job_type = "repair"
/// priority = "critical"
/// response_minutes = 10
/// resolution_minutes = 120
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlaConfig {
    /// Global fallback table. Required.
    #[serde(default)]
    pub defaults: Option<DefaultSlaTable>,
    /// Type and exact policies.
    #[serde(default)]
    pub policies: Vec<SlaPolicy>,
}

impl SlaConfig {
    /// Parses a TOML configuration document.
    pub fn from_toml_str(source: &str) -> Result<Self, PolicyConfigurationError> {
        Ok(toml::from_str(source)?)
    }

    /// Builds a resolver, validating the configuration.
    pub fn into_resolver(self) -> Result<SlaPolicyResolver, PolicyConfigurationError> {
        SlaPolicyResolver::new(self.policies, self.defaults)
    }
}

/// Maps `(job_type, priority)` to SLA terms.
#[derive(Debug, Clone)]
pub struct SlaPolicyResolver {
    exact: HashMap<(JobType, Priority), SlaPolicy>,
    type_defaults: HashMap<JobType, SlaPolicy>,
    defaults: GlobalDefaults,
}

/// A validated default table with an entry for every priority.
#[derive(Debug, Clone, Copy)]
struct GlobalDefaults {
    critical: SlaTimes,
    high: SlaTimes,
    medium: SlaTimes,
    low: SlaTimes,
}

impl GlobalDefaults {
    fn standard() -> Self {
        Self {
            critical: SlaTimes::new(15, 240),
            high: SlaTimes::new(60, 480),
            medium: SlaTimes::new(240, 1440),
            low: SlaTimes::new(480, 2880),
        }
    }

    fn from_table(table: &DefaultSlaTable) -> Result<Self, PolicyConfigurationError> {
        let entry = |priority: Priority| -> Result<SlaTimes, PolicyConfigurationError> {
            let times = table
                .get(priority)
                .copied()
                .ok_or(PolicyConfigurationError::IncompleteGlobalDefaults { priority })?;
            match times.problem() {
                Some(reason) => Err(PolicyConfigurationError::InvalidGlobalDefault { priority, reason }),
                None => Ok(times),
            }
        };
        Ok(Self {
            critical: entry(Priority::Critical)?,
            high: entry(Priority::High)?,
            medium: entry(Priority::Medium)?,
            low: entry(Priority::Low)?,
        })
    }

    fn get(&self, priority: Priority) -> SlaTimes {
        match priority {
            Priority::Critical => self.critical,
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }
}

impl SlaPolicyResolver {
    /// Builds a resolver from a policy set and the global default table.
    ///
    /// # Errors
    /// - `MissingGlobalDefaults` if `defaults` is `None`.
    /// - `IncompleteGlobalDefaults` if any priority lacks a default entry.
    /// - `DuplicatePolicy` if two active policies share a key.
    /// - `InvalidPolicy` for minutes outside `1..=MAX_SLA_MINUTES` or
    ///   unusable business hours.
    pub fn new(
        policies: Vec<SlaPolicy>,
        defaults: Option<DefaultSlaTable>,
    ) -> Result<Self, PolicyConfigurationError> {
        let defaults = defaults.ok_or(PolicyConfigurationError::MissingGlobalDefaults)?;
        let defaults = GlobalDefaults::from_table(&defaults)?;

        let mut exact = HashMap::new();
        let mut type_defaults = HashMap::new();
        let mut ignored = 0usize;

        for policy in policies {
            if !policy.is_active {
                ignored += 1;
                continue;
            }
            if let Some(reason) = policy.times().problem() {
                return Err(PolicyConfigurationError::InvalidPolicy {
                    job_type: policy.job_type,
                    reason,
                });
            }
            if let Some(hours) = &policy.business_hours {
                if !hours.is_valid() {
                    return Err(PolicyConfigurationError::InvalidPolicy {
                        job_type: policy.job_type,
                        reason: format!(
                            "business hours {}..{} on {} days is not a usable window",
                            hours.start_hour,
                            hours.end_hour,
                            hours.working_days.len()
                        ),
                    });
                }
            }

            let job_type = policy.job_type;
            match policy.priority {
                Some(priority) => match exact.entry((job_type, priority)) {
                    Entry::Occupied(_) => {
                        return Err(PolicyConfigurationError::DuplicatePolicy {
                            job_type,
                            priority: Some(priority),
                        })
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(policy);
                    }
                },
                None => match type_defaults.entry(job_type) {
                    Entry::Occupied(_) => {
                        return Err(PolicyConfigurationError::DuplicatePolicy {
                            job_type,
                            priority: None,
                        })
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(policy);
                    }
                },
            }
        }

        if ignored > 0 {
            debug!(ignored, "skipped inactive SLA policies");
        }

        Ok(Self {
            exact,
            type_defaults,
            defaults,
        })
    }

    /// Resolves SLA terms for a job type and priority.
    pub fn resolve(&self, job_type: JobType, priority: Priority) -> SlaTerms {
        if let Some(policy) = self.exact.get(&(job_type, priority)) {
            return policy.terms(PolicySource::Exact);
        }
        if let Some(policy) = self.type_defaults.get(&job_type) {
            return policy.terms(PolicySource::TypeDefault);
        }

        let times = self.defaults.get(priority);
        SlaTerms {
            times,
            business_hours: None,
            source: PolicySource::Global,
        }
    }

    /// Number of active policies held.
    pub fn policy_count(&self) -> usize {
        self.exact.len() + self.type_defaults.len()
    }
}

impl Default for SlaPolicyResolver {
    /// A resolver with no policies and the standard default table.
    fn default() -> Self {
        Self {
            exact: HashMap::new(),
            type_defaults: HashMap::new(),
            defaults: GlobalDefaults::standard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Weekday;

    #[test]
    fn test_global_fallback() {
        let resolver = SlaPolicyResolver::new(vec![], Some(DefaultSlaTable::standard())).unwrap();
        let terms = resolver.resolve(JobType::Repair, Priority::Critical);
        assert_eq!(terms.source, PolicySource::Global);
        assert_eq!(terms.times.resolution_minutes, 240);
        assert_eq!(terms.times.response_minutes, 15);

        assert_eq!(resolver.resolve(JobType::Repair, Priority::High).times.resolution_minutes, 480);
        assert_eq!(resolver.resolve(JobType::Repair, Priority::Medium).times.resolution_minutes, 1440);
        assert_eq!(resolver.resolve(JobType::Repair, Priority::Low).times.resolution_minutes, 2880);
    }

    #[test]
    fn test_exact_beats_type_default() {
        let resolver = SlaPolicyResolver::new(
            vec![
                SlaPolicy::type_default(JobType::Installation, SlaTimes::new(120, 2000)),
                SlaPolicy::new(JobType::Installation, Priority::High, SlaTimes::new(30, 300)),
            ],
            Some(DefaultSlaTable::standard()),
        )
        .unwrap();

        let exact = resolver.resolve(JobType::Installation, Priority::High);
        assert_eq!(exact.source, PolicySource::Exact);
        assert_eq!(exact.times.resolution_minutes, 300);

        let typed = resolver.resolve(JobType::Installation, Priority::Low);
        assert_eq!(typed.source, PolicySource::TypeDefault);
        assert_eq!(typed.times.resolution_minutes, 2000);

        let global = resolver.resolve(JobType::Maintenance, Priority::High);
        assert_eq!(global.source, PolicySource::Global);
    }

    #[test]
    fn test_inactive_policy_ignored() {
        let resolver = SlaPolicyResolver::new(
            vec![SlaPolicy::new(JobType::Repair, Priority::Low, SlaTimes::new(5, 10)).inactive()],
            Some(DefaultSlaTable::standard()),
        )
        .unwrap();
        assert_eq!(resolver.policy_count(), 0);
        assert_eq!(
            resolver.resolve(JobType::Repair, Priority::Low).source,
            PolicySource::Global
        );
    }

    #[test]
    fn test_inactive_duplicate_is_not_ambiguous() {
        let result = SlaPolicyResolver::new(
            vec![
                SlaPolicy::new(JobType::Repair, Priority::Low, SlaTimes::new(5, 10)),
                SlaPolicy::new(JobType::Repair, Priority::Low, SlaTimes::new(6, 12)).inactive(),
            ],
            Some(DefaultSlaTable::standard()),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_duplicate_active_policy_rejected() {
        let result = SlaPolicyResolver::new(
            vec![
                SlaPolicy::new(JobType::Repair, Priority::Low, SlaTimes::new(5, 10)),
                SlaPolicy::new(JobType::Repair, Priority::Low, SlaTimes::new(6, 12)),
            ],
            Some(DefaultSlaTable::standard()),
        );
        assert_matches!(
            result,
            Err(PolicyConfigurationError::DuplicatePolicy {
                job_type: JobType::Repair,
                priority: Some(Priority::Low)
            })
        );
    }

    #[test]
    fn test_duplicate_type_default_rejected() {
        let result = SlaPolicyResolver::new(
            vec![
                SlaPolicy::type_default(JobType::Inspection, SlaTimes::new(5, 10)),
                SlaPolicy::type_default(JobType::Inspection, SlaTimes::new(5, 10)),
            ],
            Some(DefaultSlaTable::standard()),
        );
        assert_matches!(
            result,
            Err(PolicyConfigurationError::DuplicatePolicy { priority: None, .. })
        );
    }

    #[test]
    fn test_missing_global_defaults() {
        assert_matches!(
            SlaPolicyResolver::new(vec![], None),
            Err(PolicyConfigurationError::MissingGlobalDefaults)
        );
    }

    #[test]
    fn test_incomplete_global_defaults() {
        let table = DefaultSlaTable::default()
            .with_entry(Priority::Critical, SlaTimes::new(15, 240))
            .with_entry(Priority::High, SlaTimes::new(60, 480));
        assert_matches!(
            SlaPolicyResolver::new(vec![], Some(table)),
            Err(PolicyConfigurationError::IncompleteGlobalDefaults {
                priority: Priority::Medium
            })
        );
    }

    #[test]
    fn test_non_positive_minutes_rejected() {
        let result = SlaPolicyResolver::new(
            vec![SlaPolicy::new(JobType::Repair, Priority::Low, SlaTimes::new(0, 10))],
            Some(DefaultSlaTable::standard()),
        );
        assert_matches!(result, Err(PolicyConfigurationError::InvalidPolicy { .. }));
    }

    #[test]
    fn test_invalid_business_hours_rejected() {
        let result = SlaPolicyResolver::new(
            vec![SlaPolicy::new(JobType::Repair, Priority::Low, SlaTimes::new(10, 100))
                .with_business_hours(BusinessHours::new(18, 8, vec![Weekday::Mon]))],
            Some(DefaultSlaTable::standard()),
        );
        assert_matches!(result, Err(PolicyConfigurationError::InvalidPolicy { .. }));
    }

    #[test]
    fn test_update_interval_fallback() {
        assert_eq!(SlaTimes::new(30, 300).update_interval_minutes(), 30);
        assert_eq!(
            SlaTimes::new(30, 300).with_update_minutes(90).update_interval_minutes(),
            90
        );
    }

    #[test]
    fn test_toml_config() {
        let source = r#"
            [defaults]
            critical = { response_minutes = 15, resolution_minutes = 240 }
            high = { response_minutes = 60, resolution_minutes = 480 }
            medium = { response_minutes = 240, resolution_minutes = 1440 }
            low = { response_minutes = 480, resolution_minutes = 2880 }

            [[policies]]
            job_type = "repair"
            priority = "critical"
            response_minutes = 10
            resolution_minutes = 120
            update_minutes = 30

            [[policies]]
            job_type = "installation"
            response_minutes = 120
            resolution_minutes = 4320
            business_hours = { start_hour = 8, end_hour = 18, working_days = ["Mon", "Tue", "Wed", "Thu", "Fri"] }

            [[policies]]
            job_type = "inspection"
            priority = "low"
            response_minutes = 1
            resolution_minutes = 2
            is_active = false
        "#;

        let config = SlaConfig::from_toml_str(source).unwrap();
        assert_eq!(config.policies.len(), 3);

        let resolver = config.into_resolver().unwrap();
        assert_eq!(resolver.policy_count(), 2);

        let repair = resolver.resolve(JobType::Repair, Priority::Critical);
        assert_eq!(repair.source, PolicySource::Exact);
        assert_eq!(repair.times.update_interval_minutes(), 30);

        let install = resolver.resolve(JobType::Installation, Priority::Medium);
        assert_eq!(install.source, PolicySource::TypeDefault);
        let hours = install.business_hours.unwrap();
        assert_eq!(hours.start_hour, 8);
        assert_eq!(hours.working_days.len(), 5);
    }

    #[test]
    fn test_toml_without_defaults_fails_at_load() {
        let config = SlaConfig::from_toml_str("policies = []").unwrap();
        assert_matches!(
            config.into_resolver(),
            Err(PolicyConfigurationError::MissingGlobalDefaults)
        );
    }

    #[test]
    fn test_toml_parse_error() {
        assert_matches!(
            SlaConfig::from_toml_str("[defaults\n"),
            Err(PolicyConfigurationError::Parse(_))
        );
    }

    #[test]
    fn test_oversized_minutes_rejected() {
        let result = SlaPolicyResolver::new(
            vec![SlaPolicy::new(
                JobType::Repair,
                Priority::Low,
                SlaTimes::new(10, MAX_SLA_MINUTES + 1),
            )],
            Some(DefaultSlaTable::standard()),
        );
        assert_matches!(result, Err(PolicyConfigurationError::InvalidPolicy { .. }));

        let table = DefaultSlaTable::standard()
            .with_entry(Priority::High, SlaTimes::new(60, 480).with_update_minutes(i64::MAX));
        assert_matches!(
            SlaPolicyResolver::new(vec![], Some(table)),
            Err(PolicyConfigurationError::InvalidGlobalDefault {
                priority: Priority::High,
                ..
            })
        );

        let longest = SlaPolicyResolver::new(
            vec![SlaPolicy::new(JobType::Repair, Priority::Low, SlaTimes::new(10, MAX_SLA_MINUTES))],
            Some(DefaultSlaTable::standard()),
        );
        assert!(longest.is_ok());
    }

    #[test]
    fn test_toml_oversized_minutes_fails_at_load() {
        let source = r#"
            [defaults]
            critical = { response_minutes = 15, resolution_minutes = 240 }
            high = { response_minutes = 60, resolution_minutes = 480 }
            medium = { response_minutes = 240, resolution_minutes = 1440 }
            low = { response_minutes = 480, resolution_minutes = 2880 }

            [[policies]]
            job_type = "repair"
            priority = "low"
            response_minutes = 60
            resolution_minutes = 9000000000000000
        "#;
        let config = SlaConfig::from_toml_str(source).unwrap();
        assert_matches!(
            config.into_resolver(),
            Err(PolicyConfigurationError::InvalidPolicy {
                job_type: JobType::Repair,
                ..
            })
        );
    }
}
