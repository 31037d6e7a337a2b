//! Scoring context and candidate pairings.

use crate::optimizer::{JobDescriptor, OptimizationConfig, TechnicianDescriptor};

/// Batch-wide settings passed to scoring rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchContext {
    /// Travel budget per leg (minutes); normalizes travel scores.
    pub max_travel_time_minutes: f64,
    /// Whether job priority contributes to the score.
    pub consider_priority: bool,
}

impl DispatchContext {
    /// Creates a context with a travel budget, priority weighting on.
    pub fn new(max_travel_time_minutes: f64) -> Self {
        Self {
            max_travel_time_minutes,
            consider_priority: true,
        }
    }

    /// Enables or disables priority weighting.
    pub fn with_priority(mut self, consider_priority: bool) -> Self {
        self.consider_priority = consider_priority;
        self
    }

    /// Derives the context from an optimizer configuration.
    pub fn from_config(config: &OptimizationConfig) -> Self {
        Self::new(config.max_travel_time_minutes as f64).with_priority(config.consider_priority)
    }
}

/// A (job, technician) pairing under evaluation.
///
/// Carries the technician's state at this point of the batch: jobs already
/// taken and the leg from the current route tip to the job.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub job: &'a JobDescriptor,
    pub technician: &'a TechnicianDescriptor,
    /// Jobs already on this technician's route in the batch.
    pub assigned_count: u32,
    /// Leg distance from the route tip (km).
    pub distance_km: f64,
    /// Leg travel time from the route tip (minutes).
    pub travel_time_minutes: f64,
}
