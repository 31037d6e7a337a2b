//! Completed-job records and report windows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Job, JobStatus, JobType, Priority};
use crate::sla::{BreachClassifier, SlaStatus, SlaTargets};

/// Inclusive reporting period `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// Creates a window.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether `time` falls inside the window, both ends included.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Outcome of one finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedJobRecord {
    pub job_id: String,
    pub job_type: JobType,
    pub priority: Priority,
    /// Technician who did the work.
    pub technician_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub first_response_at: Option<DateTime<Utc>>,
    pub resolved_at: DateTime<Utc>,
    pub targets: Option<SlaTargets>,
    /// Final resolution status. `None` for jobs without SLA targets.
    pub sla_status: Option<SlaStatus>,
}

impl CompletedJobRecord {
    /// Builds the record for a finished job.
    ///
    /// Returns `None` unless the job is resolved, completed or closed
    /// with an end time. Cancelled jobs are not reported.
    pub fn from_job(job: &Job, classifier: &BreachClassifier) -> Option<Self> {
        if !matches!(
            job.status,
            JobStatus::Resolved | JobStatus::Completed | JobStatus::Closed
        ) {
            return None;
        }
        let resolved_at = job.actual_end?;

        Some(Self {
            job_id: job.id.clone(),
            job_type: job.job_type,
            priority: job.priority,
            technician_id: job.assigned_technician_id.clone(),
            created_at: job.created_at,
            first_response_at: job.first_response_at,
            resolved_at,
            targets: job.sla,
            sla_status: job
                .sla
                .map(|t| classifier.terminal_status(t.resolution_target, resolved_at)),
        })
    }

    /// Minutes from creation to first response.
    pub fn response_minutes(&self) -> Option<f64> {
        self.first_response_at
            .map(|at| (at - self.created_at).num_seconds().max(0) as f64 / 60.0)
    }

    /// Minutes from creation to resolution.
    pub fn resolution_minutes(&self) -> f64 {
        (self.resolved_at - self.created_at).num_seconds().max(0) as f64 / 60.0
    }
}
