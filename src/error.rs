//! Error types.
//!
//! Constraint-driven non-assignment is never an error: it is reported
//! through `OptimizationResult::unassigned_job_ids`. Errors here are
//! malformed input, broken policy configuration, and illegal lifecycle moves.

use thiserror::Error;

use crate::models::{JobStatus, JobType, Priority};
use crate::validation::ValidationErrors;

/// Errors returned by the assignment optimizer.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The batch input failed validation; nothing was assigned.
    #[error("invalid dispatch batch: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Fatal SLA policy configuration problems, raised when policies are loaded.
#[derive(Debug, Error)]
pub enum PolicyConfigurationError {
    /// No global default SLA table was supplied.
    #[error("no global default SLA table configured")]
    MissingGlobalDefaults,

    /// The global default table lacks an entry for a priority.
    #[error("global default SLA table has no entry for priority {priority}")]
    IncompleteGlobalDefaults { priority: Priority },

    /// A global default entry carries unusable values.
    #[error("invalid global default SLA for priority {priority}: {reason}")]
    InvalidGlobalDefault { priority: Priority, reason: String },

    /// More than one active policy matches the same key.
    #[error("ambiguous SLA configuration: multiple active policies for {job_type}/{}", .priority.map(|p| p.to_string()).unwrap_or_else(|| "*".to_string()))]
    DuplicatePolicy {
        job_type: JobType,
        priority: Option<Priority>,
    },

    /// A policy carries unusable values.
    #[error("invalid SLA policy for {job_type}: {reason}")]
    InvalidPolicy { job_type: JobType, reason: String },

    /// The configuration document could not be parsed.
    #[error("failed to parse SLA configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// An illegal job status transition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("job '{job_id}' cannot move from {from} to {to}")]
pub struct TransitionError {
    pub job_id: String,
    pub from: JobStatus,
    pub to: JobStatus,
}
