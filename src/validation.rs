//! Input validation for dispatch batches.
//!
//! Checks structural integrity of jobs, technicians and configuration
//! before the optimizer runs. Detects:
//! - Empty and duplicate IDs
//! - Missing or out-of-range coordinates
//! - Non-positive durations and capacities
//! - Pre-assignments to unknown technicians or beyond capacity
//! - Unusable optimizer settings
//!
//! Every problem is collected; one bad record never hides another.

use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;

use crate::geo::Location;
use crate::optimizer::{JobDescriptor, OptimizationConfig, TechnicianDescriptor};

/// Validation result.
pub type ValidationResult = Result<(), ValidationErrors>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Offending job or technician id (empty for config problems).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A job or technician has an empty ID.
    EmptyId,
    /// Two entities share the same ID.
    DuplicateId,
    /// A job has a zero duration.
    NonPositiveDuration,
    /// A job or technician has no location.
    MissingLocation,
    /// Coordinates are non-finite or out of range.
    InvalidLocation,
    /// A technician has a zero daily cap.
    NonPositiveCapacity,
    /// A job is pre-assigned to a technician not in the batch.
    UnknownTechnician,
    /// Pre-assigned jobs alone exceed a technician's cap.
    CapacityExceeded,
    /// An optimizer setting is unusable.
    InvalidConfig,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, entity_id: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            entity_id: entity_id.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Every problem found in a batch.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} validation error(s): {}", .0.len(), summarize(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// The collected errors.
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Whether any error has the given kind.
    pub fn has_kind(&self, kind: ValidationErrorKind) -> bool {
        self.0.iter().any(|e| e.kind == kind)
    }

    /// Errors naming an entity.
    pub fn for_entity<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.0.iter().filter(move |e| e.entity_id == id)
    }
}

fn check_location(
    errors: &mut Vec<ValidationError>,
    what: &str,
    id: &str,
    location: Option<&Location>,
) {
    match location {
        None => errors.push(ValidationError::new(
            ValidationErrorKind::MissingLocation,
            id,
            format!("{what} '{id}' has no location"),
        )),
        Some(loc) if !loc.is_valid() => errors.push(ValidationError::new(
            ValidationErrorKind::InvalidLocation,
            id,
            format!("{what} '{id}' has invalid coordinates ({}, {})", loc.lat, loc.lon),
        )),
        Some(_) => {}
    }
}

/// Validates a dispatch batch.
///
/// Checks:
/// 1. No empty or duplicate technician IDs
/// 2. Technician caps are positive and locations usable
/// 3. No empty or duplicate job IDs
/// 4. Job durations are positive and locations usable
/// 5. Pre-assigned technicians exist and are not overloaded
/// 6. The travel budget and speed are positive
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_batch(
    technicians: &[TechnicianDescriptor],
    jobs: &[JobDescriptor],
    config: &OptimizationConfig,
) -> ValidationResult {
    let mut errors = Vec::new();

    // Technicians
    let mut capacity: HashMap<&str, u32> = HashMap::new();
    for t in technicians {
        if t.id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "",
                "technician with empty ID",
            ));
            continue;
        }
        if capacity.insert(t.id.as_str(), t.max_jobs_per_day).is_some() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                &t.id,
                format!("duplicate technician ID: {}", t.id),
            ));
        }
        if t.max_jobs_per_day == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveCapacity,
                &t.id,
                format!("technician '{}' has max_jobs_per_day of 0", t.id),
            ));
        }
        check_location(&mut errors, "technician", &t.id, t.current_location.as_ref());
    }

    // Jobs
    let mut job_ids = HashSet::new();
    let mut pinned: HashMap<&str, u32> = HashMap::new();
    for j in jobs {
        if j.id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "",
                "job with empty ID",
            ));
            continue;
        }
        if !job_ids.insert(j.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                &j.id,
                format!("duplicate job ID: {}", j.id),
            ));
        }
        if j.estimated_duration_minutes == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveDuration,
                &j.id,
                format!("job '{}' has a zero estimated duration", j.id),
            ));
        }
        check_location(&mut errors, "job", &j.id, j.location.as_ref());

        if let Some(tech_id) = &j.pre_assigned_technician_id {
            if capacity.contains_key(tech_id.as_str()) {
                *pinned.entry(tech_id.as_str()).or_insert(0) += 1;
            } else {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTechnician,
                    &j.id,
                    format!("job '{}' is pre-assigned to unknown technician '{}'", j.id, tech_id),
                ));
            }
        }
    }

    let mut overloaded: Vec<(&str, u32)> = pinned
        .into_iter()
        .filter(|(id, count)| capacity.get(id).is_some_and(|cap| count > cap))
        .collect();
    overloaded.sort_unstable();
    for (tech_id, count) in overloaded {
        errors.push(ValidationError::new(
            ValidationErrorKind::CapacityExceeded,
            tech_id,
            format!(
                "technician '{}' has {} pre-assigned jobs, above max_jobs_per_day {}",
                tech_id,
                count,
                capacity.get(tech_id).copied().unwrap_or(0)
            ),
        ));
    }

    // Config
    if config.max_travel_time_minutes == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidConfig,
            "",
            "max_travel_time_minutes must be positive",
        ));
    }
    if !config.average_speed_kmh.is_finite() || config.average_speed_kmh <= 0.0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidConfig,
            "",
            format!("average_speed_kmh must be positive, got {}", config.average_speed_kmh),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}
