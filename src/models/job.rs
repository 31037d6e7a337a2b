//! Job (work order) model.
//!
//! A job is a unit of field work: a location, a duration estimate, the
//! skills and equipment it needs, and SLA targets.
//!
//! # Lifecycle
//!
//! ```text
//! Pending → Assigned → InProgress → Resolved → Completed → Closed
//!    ↑          │                       │           │         │
//!    └──────────┘ (unassign)            └───────────┴─────────┘ (reopen → Pending)
//! ```
//!
//! Any non-terminal job may be cancelled. The assigned technician is held
//! by id only; a job never owns a technician.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TimeWindow;
use crate::error::TransitionError;
use crate::geo::Location;
use crate::optimizer::JobDescriptor;
use crate::sla::{DeadlineCalculator, SlaPolicyResolver, SlaTargets};

/// Job priority, ordered `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// All priorities, highest first.
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    /// Dispatch weight used by candidate scoring (0.0..=1.0).
    pub fn weight(&self) -> f64 {
        match self {
            Priority::Critical => 1.0,
            Priority::High => 0.8,
            Priority::Medium => 0.5,
            Priority::Low => 0.2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Job classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Installation,
    Repair,
    Maintenance,
    Inspection,
    Emergency,
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobType::Installation => "installation",
            JobType::Repair => "repair",
            JobType::Maintenance => "maintenance",
            JobType::Inspection => "inspection",
            JobType::Emergency => "emergency",
        };
        f.write_str(s)
    }
}

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Assigned,
    InProgress,
    Resolved,
    Completed,
    Closed,
    Cancelled,
}

impl JobStatus {
    /// Whether the resolution milestone has been reached (or abandoned).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Resolved | JobStatus::Completed | JobStatus::Closed | JobStatus::Cancelled
        )
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (*self, next),
            (Pending, Assigned)
                | (Assigned, Pending)
                | (Assigned, InProgress)
                | (InProgress, Resolved)
                | (InProgress, Completed)
                | (Resolved, Completed)
                | (Resolved, Closed)
                | (Completed, Closed)
                | (Resolved, Pending)
                | (Completed, Pending)
                | (Closed, Pending)
                | (Pending, Cancelled)
                | (Assigned, Cancelled)
                | (InProgress, Cancelled)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Assigned => "assigned",
            JobStatus::InProgress => "in_progress",
            JobStatus::Resolved => "resolved",
            JobStatus::Completed => "completed",
            JobStatus::Closed => "closed",
            JobStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A field job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    pub job_type: JobType,
    pub priority: Priority,
    pub status: JobStatus,
    /// Skills a technician needs for this job.
    pub required_skills: BTreeSet<String>,
    /// Equipment a technician must carry for this job.
    pub required_equipment: BTreeSet<String>,
    /// On-site work estimate (minutes, > 0).
    pub estimated_duration_minutes: u32,
    pub location: Location,
    /// Customer-agreed visit window.
    pub scheduled_window: Option<TimeWindow>,
    /// SLA targets. `None` until computed.
    pub sla: Option<SlaTargets>,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    /// First customer-visible response.
    pub first_response_at: Option<DateTime<Utc>>,
    /// Assigned technician id (reference only).
    pub assigned_technician_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Creates a pending job with a 60-minute estimate.
    pub fn new(
        id: impl Into<String>,
        job_type: JobType,
        priority: Priority,
        location: Location,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            job_type,
            priority,
            status: JobStatus::Pending,
            required_skills: BTreeSet::new(),
            required_equipment: BTreeSet::new(),
            estimated_duration_minutes: 60,
            location,
            scheduled_window: None,
            sla: None,
            actual_start: None,
            actual_end: None,
            first_response_at: None,
            assigned_technician_id: None,
            created_at,
        }
    }

    /// Adds a required skill.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skills.insert(skill.into());
        self
    }

    /// Adds required equipment.
    pub fn with_equipment(mut self, item: impl Into<String>) -> Self {
        self.required_equipment.insert(item.into());
        self
    }

    /// Sets the duration estimate (minutes).
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration_minutes = minutes;
        self
    }

    /// Sets the scheduled visit window.
    pub fn with_scheduled_window(mut self, window: TimeWindow) -> Self {
        self.scheduled_window = Some(window);
        self
    }

    /// Computes SLA targets from `created_at`.
    ///
    /// Call once at creation; later recomputation goes through
    /// `change_priority` or `reopen`.
    pub fn with_sla(mut self, resolver: &SlaPolicyResolver, calculator: &DeadlineCalculator) -> Self {
        self.sla = Some(self.compute_targets(self.created_at, resolver, calculator));
        self
    }

    fn compute_targets(
        &self,
        from: DateTime<Utc>,
        resolver: &SlaPolicyResolver,
        calculator: &DeadlineCalculator,
    ) -> SlaTargets {
        let terms = resolver.resolve(self.job_type, self.priority);
        calculator.compute(from, self.priority, &terms)
    }

    fn transition(&mut self, next: JobStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                job_id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Assigns a technician.
    pub fn assign(&mut self, technician_id: impl Into<String>) -> Result<(), TransitionError> {
        self.transition(JobStatus::Assigned)?;
        self.assigned_technician_id = Some(technician_id.into());
        Ok(())
    }

    /// Returns an assigned job to the pending pool.
    pub fn unassign(&mut self) -> Result<(), TransitionError> {
        self.transition(JobStatus::Pending)?;
        self.assigned_technician_id = None;
        Ok(())
    }

    /// Records the first response, if none is recorded yet.
    pub fn record_response(&mut self, at: DateTime<Utc>) {
        self.first_response_at.get_or_insert(at);
    }

    /// Starts work on site. Counts as a response if none was recorded.
    pub fn start(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobStatus::InProgress)?;
        self.actual_start = Some(at);
        self.record_response(at);
        Ok(())
    }

    /// Marks the job resolved.
    pub fn resolve(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobStatus::Resolved)?;
        self.actual_end = Some(at);
        Ok(())
    }

    /// Marks the job completed.
    ///
    /// A job completed directly from `InProgress` ends at `at`; a resolved
    /// job keeps its resolution time.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobStatus::Completed)?;
        self.actual_end.get_or_insert(at);
        Ok(())
    }

    /// Closes a resolved or completed job.
    pub fn close(&mut self) -> Result<(), TransitionError> {
        self.transition(JobStatus::Closed)
    }

    /// Cancels a non-terminal job.
    pub fn cancel(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobStatus::Cancelled)?;
        self.actual_end = Some(at);
        self.assigned_technician_id = None;
        Ok(())
    }

    /// Reopens a finished job.
    ///
    /// Clears assignment and actual times, and recomputes SLA targets from
    /// the reopen instant.
    pub fn reopen(
        &mut self,
        at: DateTime<Utc>,
        resolver: &SlaPolicyResolver,
        calculator: &DeadlineCalculator,
    ) -> Result<(), TransitionError> {
        self.transition(JobStatus::Pending)?;
        self.assigned_technician_id = None;
        self.actual_start = None;
        self.actual_end = None;
        self.first_response_at = None;
        self.sla = Some(self.compute_targets(at, resolver, calculator));
        Ok(())
    }

    /// Changes priority and recomputes SLA targets.
    ///
    /// Targets are recomputed from the instant the current ones were
    /// computed from: creation, or the last reopen.
    ///
    /// Terminal jobs keep their targets; the change only records the new
    /// priority. Returns whether targets were recomputed.
    pub fn change_priority(
        &mut self,
        priority: Priority,
        resolver: &SlaPolicyResolver,
        calculator: &DeadlineCalculator,
    ) -> bool {
        if priority == self.priority {
            return false;
        }
        self.priority = priority;
        if self.status.is_terminal() {
            return false;
        }
        let from = self.sla.map(|t| t.computed_at).unwrap_or(self.created_at);
        self.sla = Some(self.compute_targets(from, resolver, calculator));
        true
    }

    /// Optimizer input for this job.
    ///
    /// An assigned job carries its technician as a pre-assignment.
    pub fn to_descriptor(&self) -> JobDescriptor {
        JobDescriptor {
            id: self.id.clone(),
            priority: self.priority,
            required_skills: self.required_skills.clone(),
            required_equipment: self.required_equipment.clone(),
            estimated_duration_minutes: self.estimated_duration_minutes,
            location: Some(self.location),
            pre_assigned_technician_id: self.assigned_technician_id.clone(),
        }
    }
}
