//! Batch quality metrics.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Distribution | `1 / (1 + var(job counts))` over all technicians |
//! | Travel | mean of `1 - (travel / jobs) / max_travel` over busy routes |
//! | Skill | mean route `skill_match_score` over routes with scored jobs |
//! | Priority | mean route `priority_score` over routes with scored jobs |
//!
//! `optimization_score = 100 * (0.3 D + 0.3 T + 0.2 S + 0.2 P)`, or 0
//! when nothing was assigned.

use serde::{Deserialize, Serialize};

use super::{OptimizationConfig, RouteResult};

const DISTRIBUTION_WEIGHT: f64 = 0.3;
const TRAVEL_WEIGHT: f64 = 0.3;
const SKILL_WEIGHT: f64 = 0.2;
const PRIORITY_WEIGHT: f64 = 0.2;

/// Dispatch batch performance indicators. Component scores are in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchKpi {
    /// Evenness of job counts across technicians.
    pub distribution_score: f64,
    /// Average travel-per-job efficiency.
    pub travel_score: f64,
    /// Average skill match.
    pub skill_score: f64,
    /// Average priority score.
    pub priority_score: f64,
    /// Weighted total (0..=100).
    pub optimization_score: f64,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

impl DispatchKpi {
    /// Computes KPIs from a batch's routes.
    pub fn calculate(routes: &[RouteResult], config: &OptimizationConfig) -> Self {
        let assigned: usize = routes.iter().map(RouteResult::job_count).sum();
        if assigned == 0 {
            return Self {
                distribution_score: 0.0,
                travel_score: 0.0,
                skill_score: 0.0,
                priority_score: 0.0,
                optimization_score: 0.0,
            };
        }

        // Population variance of job counts
        let counts: Vec<f64> = routes.iter().map(|r| r.job_count() as f64).collect();
        let avg = mean(counts.iter().copied());
        let variance = mean(counts.iter().map(|c| (c - avg).powi(2)));
        let distribution_score = 1.0 / (1.0 + variance);

        let max_travel = config.max_travel_time_minutes as f64;
        let travel_score = mean(routes.iter().filter(|r| !r.is_empty()).map(|r| {
            if max_travel <= 0.0 {
                return 0.0;
            }
            let per_job = r.total_travel_time_minutes / r.job_count() as f64;
            (1.0 - per_job / max_travel).clamp(0.0, 1.0)
        }));

        let scored = || routes.iter().filter(|r| r.scored_job_count() > 0);
        let skill_score = mean(scored().map(|r| r.skill_match_score));
        let priority_score = mean(scored().map(|r| r.priority_score));

        let optimization_score = 100.0
            * (DISTRIBUTION_WEIGHT * distribution_score
                + TRAVEL_WEIGHT * travel_score
                + SKILL_WEIGHT * skill_score
                + PRIORITY_WEIGHT * priority_score);

        Self {
            distribution_score,
            travel_score,
            skill_score,
            priority_score,
            optimization_score: optimization_score.clamp(0.0, 100.0),
        }
    }
}
