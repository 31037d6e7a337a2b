//! Per-technician workload summary from dispatch results.

use serde::{Deserialize, Serialize};

use crate::optimizer::{OptimizationResult, TechnicianDescriptor};

/// A technician's load for one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicianWorkload {
    pub technician_id: String,
    pub job_count: usize,
    pub travel_minutes: f64,
    pub job_minutes: f64,
    pub distance_km: f64,
    pub efficiency_score: f64,
    /// `job_count / max_jobs_per_day`, when the cap is known.
    pub utilization: Option<f64>,
}

impl TechnicianWorkload {
    /// Summarizes every route of a batch.
    ///
    /// `technicians` supplies daily caps for utilization; technicians not
    /// listed get `None`.
    pub fn from_routes(result: &OptimizationResult, technicians: &[TechnicianDescriptor]) -> Vec<Self> {
        result
            .routes
            .iter()
            .map(|route| {
                let utilization = technicians
                    .iter()
                    .find(|t| t.id == route.technician_id)
                    .filter(|t| t.max_jobs_per_day > 0)
                    .map(|t| route.job_count() as f64 / t.max_jobs_per_day as f64);

                Self {
                    technician_id: route.technician_id.clone(),
                    job_count: route.job_count(),
                    travel_minutes: route.total_travel_time_minutes,
                    job_minutes: route.total_job_time_minutes,
                    distance_km: route.total_distance_km,
                    efficiency_score: route.efficiency_score,
                    utilization,
                }
            })
            .collect()
    }
}
