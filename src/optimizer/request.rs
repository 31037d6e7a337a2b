//! Optimizer inputs and outputs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geo::{Location, DEFAULT_SPEED_KMH};
use crate::models::Priority;

/// A job as seen by the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub id: String,
    pub priority: Priority,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    #[serde(default)]
    pub required_equipment: BTreeSet<String>,
    /// Expected on-site time (minutes, > 0).
    pub estimated_duration_minutes: u32,
    /// Job site. `None` fails validation.
    pub location: Option<Location>,
    /// Technician the job is already committed to. Such jobs bypass scoring.
    #[serde(default)]
    pub pre_assigned_technician_id: Option<String>,
}

impl JobDescriptor {
    /// Creates a job descriptor with no requirements.
    pub fn new(
        id: impl Into<String>,
        priority: Priority,
        location: Location,
        estimated_duration_minutes: u32,
    ) -> Self {
        Self {
            id: id.into(),
            priority,
            required_skills: BTreeSet::new(),
            required_equipment: BTreeSet::new(),
            estimated_duration_minutes,
            location: Some(location),
            pre_assigned_technician_id: None,
        }
    }

    /// Adds a required skill.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skills.insert(skill.into());
        self
    }

    /// Adds a required equipment item.
    pub fn with_equipment(mut self, item: impl Into<String>) -> Self {
        self.required_equipment.insert(item.into());
        self
    }

    /// Pins the job to a technician.
    pub fn with_pre_assigned(mut self, technician_id: impl Into<String>) -> Self {
        self.pre_assigned_technician_id = Some(technician_id.into());
        self
    }
}

/// A technician as seen by the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicianDescriptor {
    pub id: String,
    #[serde(default)]
    pub skills: BTreeSet<String>,
    #[serde(default)]
    pub equipment: BTreeSet<String>,
    /// Daily job cap (> 0).
    pub max_jobs_per_day: u32,
    /// Route start. `None` fails validation.
    pub current_location: Option<Location>,
}

impl TechnicianDescriptor {
    /// Creates a technician descriptor with no skills.
    pub fn new(id: impl Into<String>, max_jobs_per_day: u32, current_location: Location) -> Self {
        Self {
            id: id.into(),
            skills: BTreeSet::new(),
            equipment: BTreeSet::new(),
            max_jobs_per_day,
            current_location: Some(current_location),
        }
    }

    /// Adds a skill.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.insert(skill.into());
        self
    }

    /// Adds an equipment item.
    pub fn with_equipment(mut self, item: impl Into<String>) -> Self {
        self.equipment.insert(item.into());
        self
    }
}

/// Batch optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Exclude technicians with zero skill match.
    pub consider_skills: bool,
    /// Exclude technicians missing required equipment.
    pub consider_equipment: bool,
    /// Order jobs by priority and weight scores by it.
    pub consider_priority: bool,
    /// Longest acceptable leg (minutes, > 0).
    pub max_travel_time_minutes: u32,
    /// Speed used to turn distance into travel time.
    pub average_speed_kmh: f64,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            consider_skills: true,
            consider_equipment: true,
            consider_priority: true,
            max_travel_time_minutes: 120,
            average_speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl OptimizationConfig {
    /// Sets skill filtering.
    pub fn with_skills(mut self, on: bool) -> Self {
        self.consider_skills = on;
        self
    }

    /// Sets equipment filtering.
    pub fn with_equipment(mut self, on: bool) -> Self {
        self.consider_equipment = on;
        self
    }

    /// Sets priority ordering and weighting.
    pub fn with_priority(mut self, on: bool) -> Self {
        self.consider_priority = on;
        self
    }

    /// Sets the per-leg travel budget.
    pub fn with_max_travel_time(mut self, minutes: u32) -> Self {
        self.max_travel_time_minutes = minutes;
        self
    }

    /// Sets the average travel speed.
    pub fn with_average_speed(mut self, kmh: f64) -> Self {
        self.average_speed_kmh = kmh;
        self
    }
}

/// One technician's route for the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub technician_id: String,
    /// Visit order, pre-assigned jobs first.
    pub job_ids: Vec<String>,
    /// Subset of `job_ids` that arrived pre-assigned.
    pub pre_assigned_job_ids: Vec<String>,
    pub total_travel_time_minutes: f64,
    pub total_distance_km: f64,
    pub total_job_time_minutes: f64,
    /// Running mean of skill match over scored jobs.
    pub skill_match_score: f64,
    /// Running mean of priority score over scored jobs.
    pub priority_score: f64,
    /// `job_time / (job_time + travel_time)`, 0 with no jobs.
    pub efficiency_score: f64,
}

impl RouteResult {
    /// Number of jobs on the route.
    pub fn job_count(&self) -> usize {
        self.job_ids.len()
    }

    /// Jobs placed by scoring in this batch.
    pub fn scored_job_count(&self) -> usize {
        self.job_ids.len() - self.pre_assigned_job_ids.len()
    }

    /// Whether the route has no jobs.
    pub fn is_empty(&self) -> bool {
        self.job_ids.is_empty()
    }
}

/// Result of one optimizer batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// One route per technician, in technician id order.
    pub routes: Vec<RouteResult>,
    /// Jobs no technician could take, in processing order.
    pub unassigned_job_ids: Vec<String>,
    /// Batch quality (0..=100).
    pub optimization_score: f64,
}

impl OptimizationResult {
    /// Route of a technician.
    pub fn route_for(&self, technician_id: &str) -> Option<&RouteResult> {
        self.routes.iter().find(|r| r.technician_id == technician_id)
    }

    /// Technician a job ended up with.
    pub fn technician_for_job(&self, job_id: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|r| r.job_ids.iter().any(|j| j == job_id))
            .map(|r| r.technician_id.as_str())
    }

    /// Total jobs across all routes.
    pub fn assigned_job_count(&self) -> usize {
        self.routes.iter().map(RouteResult::job_count).sum()
    }

    /// Whether every job was placed.
    pub fn is_complete(&self) -> bool {
        self.unassigned_job_ids.is_empty()
    }
}
