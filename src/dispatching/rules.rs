//! Built-in scoring rules.
//!
//! # Rules
//!
//! | Rule | Score |
//! |------|-------|
//! | SKILL | fraction of required skills the technician has |
//! | TRAVEL | `1 - travel / max_travel` |
//! | PRIORITY | priority weight (1.0 / 0.8 / 0.5 / 0.2), or 1.0 when priority is ignored |
//! | WORKLOAD | `1 - assigned / max_jobs_per_day` |
//!
//! All rules return values in `0.0..=1.0`; higher is better.

use super::{Candidate, DispatchContext, RuleScore, ScoringRule};
use crate::optimizer::{JobDescriptor, TechnicianDescriptor};

/// Fraction of a job's required skills the technician has.
///
/// A job requiring no skills matches everyone (1.0).
pub fn skill_match(job: &JobDescriptor, technician: &TechnicianDescriptor) -> f64 {
    if job.required_skills.is_empty() {
        return 1.0;
    }
    let matched = job
        .required_skills
        .iter()
        .filter(|s| technician.skills.contains(*s))
        .count();
    matched as f64 / job.required_skills.len() as f64
}

/// Whether the technician carries every item the job requires.
pub fn has_equipment(job: &JobDescriptor, technician: &TechnicianDescriptor) -> bool {
    job.required_equipment.is_subset(&technician.equipment)
}

/// Skill coverage.
#[derive(Debug, Clone, Copy)]
pub struct SkillMatch;

impl ScoringRule for SkillMatch {
    fn name(&self) -> &'static str {
        "SKILL"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, _context: &DispatchContext) -> RuleScore {
        skill_match(candidate.job, candidate.technician)
    }

    fn description(&self) -> &'static str {
        "Required Skill Coverage"
    }
}

/// Travel efficiency relative to the travel budget.
#[derive(Debug, Clone, Copy)]
pub struct TravelEfficiency;

impl ScoringRule for TravelEfficiency {
    fn name(&self) -> &'static str {
        "TRAVEL"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, context: &DispatchContext) -> RuleScore {
        if context.max_travel_time_minutes <= 0.0 {
            return 0.0;
        }
        (1.0 - candidate.travel_time_minutes / context.max_travel_time_minutes).clamp(0.0, 1.0)
    }

    fn description(&self) -> &'static str {
        "Travel Time Efficiency"
    }
}

/// Job priority weight.
#[derive(Debug, Clone, Copy)]
pub struct PriorityWeight;

impl ScoringRule for PriorityWeight {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, context: &DispatchContext) -> RuleScore {
        if context.consider_priority {
            candidate.job.priority.weight()
        } else {
            1.0
        }
    }

    fn description(&self) -> &'static str {
        "Job Priority Weight"
    }
}

/// Remaining daily capacity.
///
/// Favors technicians with fewer jobs so far, spreading work evenly.
#[derive(Debug, Clone, Copy)]
pub struct WorkloadBalance;

impl ScoringRule for WorkloadBalance {
    fn name(&self) -> &'static str {
        "WORKLOAD"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, _context: &DispatchContext) -> RuleScore {
        let cap = candidate.technician.max_jobs_per_day;
        if cap == 0 {
            return 0.0;
        }
        (1.0 - candidate.assigned_count as f64 / cap as f64).clamp(0.0, 1.0)
    }

    fn description(&self) -> &'static str {
        "Workload Balance"
    }
}
