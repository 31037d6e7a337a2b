//! Greedy batch dispatcher.
//!
//! # Algorithm
//!
//! 1. Validate the batch; any malformed record fails the whole batch.
//! 2. Append pre-assigned jobs to their technicians' routes, unscored.
//! 3. Order remaining jobs by priority (descending, then job id) when
//!    priority is considered; otherwise keep input order.
//! 4. For each job, score every eligible technician from its current
//!    route tip and give the job to the best one.
//! 5. Jobs with no eligible technician go to the unassigned list.
//!
//! Eligibility: spare capacity, required equipment (if considered), a
//! non-zero skill match (if considered), and a leg within the travel budget.
//!
//! # Complexity
//! O(j * t) where j=jobs, t=technicians.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use tracing::{debug, info, trace, warn};

use super::score::DispatchKpi;
use super::{JobDescriptor, OptimizationConfig, OptimizationResult, RouteResult, TechnicianDescriptor};
use crate::dispatching::{rules, Candidate, DispatchContext, ScoringEngine};
use crate::error::DispatchError;
use crate::geo::{travel_time_minutes, Location};
use crate::validation::validate_batch;

/// One technician's route while the batch is being built.
#[derive(Debug, Clone)]
struct RouteState<'a> {
    technician: &'a TechnicianDescriptor,
    tip: Location,
    job_ids: Vec<String>,
    pre_assigned_job_ids: Vec<String>,
    travel_minutes: f64,
    distance_km: f64,
    job_minutes: f64,
    skill_mean: f64,
    priority_mean: f64,
    scored: u32,
}

impl<'a> RouteState<'a> {
    fn new(technician: &'a TechnicianDescriptor, origin: Location) -> Self {
        Self {
            technician,
            tip: origin,
            job_ids: Vec::new(),
            pre_assigned_job_ids: Vec::new(),
            travel_minutes: 0.0,
            distance_km: 0.0,
            job_minutes: 0.0,
            skill_mean: 0.0,
            priority_mean: 0.0,
            scored: 0,
        }
    }

    fn assigned_count(&self) -> u32 {
        self.job_ids.len() as u32
    }

    fn has_capacity(&self) -> bool {
        self.assigned_count() < self.technician.max_jobs_per_day
    }

    /// Moves the route tip to the job site and accumulates totals.
    fn visit(&mut self, job: &JobDescriptor, site: Location, distance_km: f64, travel_minutes: f64) {
        self.job_ids.push(job.id.clone());
        self.tip = site;
        self.distance_km += distance_km;
        self.travel_minutes += travel_minutes;
        self.job_minutes += job.estimated_duration_minutes as f64;
    }

    /// Folds a scored job into the running means.
    fn record_scores(&mut self, skill_match: f64, priority: f64) {
        self.scored += 1;
        let n = self.scored as f64;
        self.skill_mean += (skill_match - self.skill_mean) / n;
        self.priority_mean += (priority - self.priority_mean) / n;
    }

    fn into_result(self) -> RouteResult {
        let busy = self.job_minutes + self.travel_minutes;
        let efficiency_score = if self.job_ids.is_empty() || busy <= 0.0 {
            0.0
        } else {
            self.job_minutes / busy
        };

        RouteResult {
            technician_id: self.technician.id.clone(),
            job_ids: self.job_ids,
            pre_assigned_job_ids: self.pre_assigned_job_ids,
            total_travel_time_minutes: self.travel_minutes,
            total_distance_km: self.distance_km,
            total_job_time_minutes: self.job_minutes,
            skill_match_score: self.skill_mean,
            priority_score: self.priority_mean,
            efficiency_score,
        }
    }
}

/// Accumulator threaded through the assignment fold.
#[derive(Debug, Clone)]
struct BatchState<'a> {
    routes: Vec<RouteState<'a>>,
    unassigned: Vec<String>,
}

/// Greedy multi-constraint dispatcher.
///
/// A pure function of its inputs: no I/O, no state carried between
/// calls, identical inputs give identical results.
///
/// # Example
///
/// ```
/// use u_dispatch::geo::Location;
/// use u_dispatch::models::Priority;
/// use u_dispatch::optimizer::{Dispatcher, JobDescriptor, OptimizationConfig, TechnicianDescriptor};
///
/// let depot = Location::new(37.50, 127.00);
/// let technicians = vec![TechnicianDescriptor::new("T1", 3, depot).with_skill("fiber")];
/// let jobs = vec![
///     JobDescriptor::new("J1", Priority::High, Location::new(37.51, 127.01), 45).with_skill("fiber"),
///     JobDescriptor::new("J2", Priority::Low, Location::new(37.52, 127.00), 30).with_skill("hvac"),
/// ];
///
/// let result = Dispatcher::new()
///     .optimize(&technicians, &jobs, &OptimizationConfig::default())
///     .unwrap();
/// assert_eq!(result.technician_for_job("J1"), Some("T1"));
/// assert_eq!(result.unassigned_job_ids, vec!["J2"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    engine: ScoringEngine,
}

impl Dispatcher {
    /// Creates a dispatcher with the standard scoring weights.
    pub fn new() -> Self {
        Self {
            engine: ScoringEngine::standard(),
        }
    }

    /// Replaces the scoring engine.
    pub fn with_engine(mut self, engine: ScoringEngine) -> Self {
        self.engine = engine;
        self
    }

    /// The scoring engine in use.
    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Assigns a batch of jobs to technicians.
    ///
    /// # Errors
    /// [`DispatchError::Validation`] if any descriptor or setting is
    /// malformed. Jobs that simply cannot be placed are not errors; they
    /// are reported in `unassigned_job_ids`.
    pub fn optimize(
        &self,
        technicians: &[TechnicianDescriptor],
        jobs: &[JobDescriptor],
        config: &OptimizationConfig,
    ) -> Result<OptimizationResult, DispatchError> {
        validate_batch(technicians, jobs, config)?;

        let context = DispatchContext::from_config(config);

        let mut ordered: Vec<&TechnicianDescriptor> = technicians.iter().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));
        let mut state = BatchState {
            routes: ordered
                .into_iter()
                .filter_map(|t| t.current_location.map(|origin| RouteState::new(t, origin)))
                .collect(),
            unassigned: Vec::new(),
        };

        // Pre-assigned jobs, input order
        for job in jobs {
            let (Some(tech_id), Some(site)) = (&job.pre_assigned_technician_id, job.location) else {
                continue;
            };
            if let Some(route) = state.routes.iter_mut().find(|r| &r.technician.id == tech_id) {
                let distance = route.tip.distance_km(&site);
                let travel = travel_time_minutes(distance, config.average_speed_kmh);
                route.visit(job, site, distance, travel);
                route.pre_assigned_job_ids.push(job.id.clone());
                trace!(job = %job.id, technician = %tech_id, "pre-assigned job appended");
            }
        }

        let mut queue: Vec<&JobDescriptor> = jobs
            .iter()
            .filter(|j| j.pre_assigned_technician_id.is_none())
            .collect();
        if config.consider_priority {
            queue.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
        }

        let state = queue
            .into_iter()
            .fold(state, |state, job| self.assign_next(state, job, config, &context));

        let routes: Vec<RouteResult> = state.routes.into_iter().map(RouteState::into_result).collect();
        let kpi = DispatchKpi::calculate(&routes, config);

        info!(
            jobs = jobs.len(),
            technicians = technicians.len(),
            assigned = jobs.len() - state.unassigned.len(),
            unassigned = state.unassigned.len(),
            score = kpi.optimization_score,
            "dispatch batch complete"
        );

        Ok(OptimizationResult {
            routes,
            unassigned_job_ids: state.unassigned,
            optimization_score: kpi.optimization_score,
        })
    }

    /// One step of the fold: places `job` or marks it unassigned.
    fn assign_next<'a>(
        &self,
        mut state: BatchState<'a>,
        job: &'a JobDescriptor,
        config: &OptimizationConfig,
        context: &DispatchContext,
    ) -> BatchState<'a> {
        let Some(site) = job.location else {
            state.unassigned.push(job.id.clone());
            return state;
        };

        let mut candidates: Vec<Candidate<'a>> = Vec::new();
        let mut route_indices: Vec<usize> = Vec::new();

        for (idx, route) in state.routes.iter().enumerate() {
            let tech = route.technician;
            if !route.has_capacity() {
                trace!(job = %job.id, technician = %tech.id, "excluded: at capacity");
                continue;
            }
            if config.consider_equipment && !rules::has_equipment(job, tech) {
                trace!(job = %job.id, technician = %tech.id, "excluded: missing equipment");
                continue;
            }
            if config.consider_skills && rules::skill_match(job, tech) <= 0.0 {
                trace!(job = %job.id, technician = %tech.id, "excluded: no matching skills");
                continue;
            }
            let distance_km = route.tip.distance_km(&site);
            let travel_time_minutes = travel_time_minutes(distance_km, config.average_speed_kmh);
            if travel_time_minutes > context.max_travel_time_minutes {
                trace!(
                    job = %job.id,
                    technician = %tech.id,
                    travel = travel_time_minutes,
                    "excluded: beyond travel budget"
                );
                continue;
            }

            candidates.push(Candidate {
                job,
                technician: tech,
                assigned_count: route.assigned_count(),
                distance_km,
                travel_time_minutes,
            });
            route_indices.push(idx);
        }

        match self.engine.select_best(&candidates, context) {
            Some((best, score)) => {
                let chosen = candidates[best];
                let skill = rules::skill_match(job, chosen.technician);
                let priority = if context.consider_priority {
                    job.priority.weight()
                } else {
                    1.0
                };
                debug!(
                    job = %job.id,
                    technician = %chosen.technician.id,
                    score,
                    travel = chosen.travel_time_minutes,
                    "job assigned"
                );

                let route = &mut state.routes[route_indices[best]];
                route.visit(job, site, chosen.distance_km, chosen.travel_time_minutes);
                route.record_scores(skill, priority);
            }
            None => {
                warn!(job = %job.id, priority = %job.priority, "no eligible technician; job left unassigned");
                state.unassigned.push(job.id.clone());
            }
        }

        state
    }
}

/// Runs a batch with the standard dispatcher.
pub fn optimize(
    technicians: &[TechnicianDescriptor],
    jobs: &[JobDescriptor],
    config: &OptimizationConfig,
) -> Result<OptimizationResult, DispatchError> {
    Dispatcher::new().optimize(technicians, jobs, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use crate::validation::ValidationErrorKind;
    use assert_matches::assert_matches;
    use std::collections::HashSet;

    fn depot() -> Location {
        Location::new(37.50, 127.00)
    }

    fn make_tech(id: &str, cap: u32, skills: &[&str]) -> TechnicianDescriptor {
        skills
            .iter()
            .fold(TechnicianDescriptor::new(id, cap, depot()), |t, s| t.with_skill(*s))
    }

    fn make_job(id: &str, priority: Priority, skills: &[&str]) -> JobDescriptor {
        skills
            .iter()
            .fold(JobDescriptor::new(id, priority, depot(), 60), |j, s| j.with_skill(*s))
    }

    fn assert_partition(result: &OptimizationResult, jobs: &[JobDescriptor]) {
        let mut seen = HashSet::new();
        for id in result
            .routes
            .iter()
            .flat_map(|r| r.job_ids.iter())
            .chain(result.unassigned_job_ids.iter())
        {
            assert!(seen.insert(id.clone()), "job {id} appears twice");
        }
        assert_eq!(seen.len(), jobs.len());
    }

    #[test]
    fn test_two_technician_scenario() {
        let techs = vec![
            make_tech("T1", 3, &["fiber", "copper"]),
            make_tech("T2", 3, &["fiber", "copper"]),
        ];
        let jobs = vec![
            make_job("J1", Priority::Critical, &["fiber"]),
            make_job("J2", Priority::Low, &["copper"]),
            make_job("J3", Priority::Medium, &[]),
            make_job("J4", Priority::High, &["fiber", "copper"]),
        ];

        let result = optimize(&techs, &jobs, &OptimizationConfig::default()).unwrap();

        // Processing order J1, J4, J3, J2. All legs are zero, so workload
        // decides and equal workloads fall to the lowest id.
        assert_eq!(result.route_for("T1").unwrap().job_ids, vec!["J1", "J3"]);
        assert_eq!(result.route_for("T2").unwrap().job_ids, vec!["J4", "J2"]);
        assert!(result.is_complete());
        assert_partition(&result, &jobs);

        let t1 = result.route_for("T1").unwrap();
        assert!((t1.skill_match_score - 1.0).abs() < 1e-10);
        assert!((t1.priority_score - 0.75).abs() < 1e-10); // (1.0 + 0.5) / 2
        assert!((t1.efficiency_score - 1.0).abs() < 1e-10);
        assert!((t1.total_job_time_minutes - 120.0).abs() < 1e-10);
    }

    #[test]
    fn test_idempotent() {
        let techs = vec![
            make_tech("T1", 2, &["fiber"]),
            make_tech("T2", 2, &["copper"]),
        ];
        let jobs = vec![
            JobDescriptor::new("J1", Priority::High, Location::new(37.52, 127.01), 30).with_skill("fiber"),
            JobDescriptor::new("J2", Priority::High, Location::new(37.48, 126.98), 45).with_skill("copper"),
            JobDescriptor::new("J3", Priority::Low, Location::new(37.55, 127.05), 20),
        ];
        let config = OptimizationConfig::default();
        let a = optimize(&techs, &jobs, &config).unwrap();
        let b = optimize(&techs, &jobs, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_capacity_bound() {
        let techs = vec![make_tech("T1", 2, &[]), make_tech("T2", 2, &[])];
        let jobs: Vec<_> = (0..5)
            .map(|i| make_job(&format!("J{i}"), Priority::Medium, &[]))
            .collect();

        let result = optimize(&techs, &jobs, &OptimizationConfig::default()).unwrap();
        for route in &result.routes {
            assert!(route.job_count() <= 2);
        }
        assert_eq!(result.assigned_job_count(), 4);
        assert_eq!(result.unassigned_job_ids, vec!["J4"]);
        assert_partition(&result, &jobs);
    }

    #[test]
    fn test_skill_exclusion() {
        let techs = vec![make_tech("T1", 3, &["fiber"])];
        let jobs = vec![make_job("J1", Priority::High, &["hvac"])];

        let strict = optimize(&techs, &jobs, &OptimizationConfig::default()).unwrap();
        assert_eq!(strict.unassigned_job_ids, vec!["J1"]);

        let lax = optimize(&techs, &jobs, &OptimizationConfig::default().with_skills(false)).unwrap();
        assert_eq!(lax.technician_for_job("J1"), Some("T1"));
        assert!((lax.route_for("T1").unwrap().skill_match_score - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_partial_skill_match_is_eligible() {
        let techs = vec![make_tech("T1", 3, &["fiber"]), make_tech("T2", 3, &["fiber", "copper"])];
        let jobs = vec![make_job("J1", Priority::High, &["fiber", "copper"])];
        let result = optimize(&techs, &jobs, &OptimizationConfig::default()).unwrap();
        assert_eq!(result.technician_for_job("J1"), Some("T2"));
    }

    #[test]
    fn test_equipment_exclusion() {
        let techs = vec![
            make_tech("T1", 3, &[]),
            make_tech("T2", 3, &[]).with_equipment("bucket_truck"),
        ];
        let jobs = vec![make_job("J1", Priority::Medium, &[]).with_equipment("bucket_truck")];

        let result = optimize(&techs, &jobs, &OptimizationConfig::default()).unwrap();
        assert_eq!(result.technician_for_job("J1"), Some("T2"));

        let no_t2 = optimize(&techs[..1], &jobs, &OptimizationConfig::default()).unwrap();
        assert_eq!(no_t2.unassigned_job_ids, vec!["J1"]);

        let ignored = optimize(&techs[..1], &jobs, &OptimizationConfig::default().with_equipment(false)).unwrap();
        assert_eq!(ignored.technician_for_job("J1"), Some("T1"));
    }

    #[test]
    fn test_nearest_technician_wins() {
        let far = Location::new(38.00, 127.00); // ~55.6 km north of the depot
        let techs = vec![
            make_tech("T1", 3, &[]),
            TechnicianDescriptor::new("T2", 3, far),
        ];
        let jobs = vec![JobDescriptor::new("J1", Priority::Medium, far, 30)];

        let result = optimize(&techs, &jobs, &OptimizationConfig::default()).unwrap();
        assert_eq!(result.technician_for_job("J1"), Some("T2"));
        assert!((result.route_for("T2").unwrap().total_travel_time_minutes - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_travel_budget_exclusion() {
        let techs = vec![make_tech("T1", 3, &[])];
        // ~55.6 km at 40 km/h is ~83 minutes
        let jobs = vec![JobDescriptor::new("J1", Priority::Critical, Location::new(38.00, 127.00), 30)];

        let tight = OptimizationConfig::default().with_max_travel_time(60);
        assert_eq!(optimize(&techs, &jobs, &tight).unwrap().unassigned_job_ids, vec!["J1"]);

        let result = optimize(&techs, &jobs, &OptimizationConfig::default()).unwrap();
        let route = result.route_for("T1").unwrap();
        assert!((route.total_distance_km - 55.6).abs() < 0.1);
        assert!((route.total_travel_time_minutes - route.total_distance_km * 1.5).abs() < 1e-9);
        let expected = 30.0 / (30.0 + route.total_travel_time_minutes);
        assert!((route.efficiency_score - expected).abs() < 1e-10);
    }

    #[test]
    fn test_route_tip_threads_through_jobs() {
        let techs = vec![make_tech("T1", 3, &[])];
        let a = Location::new(37.60, 127.00);
        // J1 first (critical), J2 sits at the same site so its leg is zero.
        let jobs = vec![
            JobDescriptor::new("J2", Priority::Low, a, 30),
            JobDescriptor::new("J1", Priority::Critical, a, 30),
        ];
        let result = optimize(&techs, &jobs, &OptimizationConfig::default()).unwrap();
        let route = result.route_for("T1").unwrap();
        assert_eq!(route.job_ids, vec!["J1", "J2"]);
        let first_leg = depot().distance_km(&a);
        assert!((route.total_distance_km - first_leg).abs() < 1e-9);
    }

    #[test]
    fn test_input_order_without_priority() {
        let techs = vec![make_tech("T1", 1, &[])];
        let jobs = vec![
            make_job("J-low", Priority::Low, &[]),
            make_job("J-crit", Priority::Critical, &[]),
        ];

        let by_priority = optimize(&techs, &jobs, &OptimizationConfig::default()).unwrap();
        assert_eq!(by_priority.unassigned_job_ids, vec!["J-low"]);

        let flat = optimize(&techs, &jobs, &OptimizationConfig::default().with_priority(false)).unwrap();
        assert_eq!(flat.unassigned_job_ids, vec!["J-crit"]);
        assert!((flat.route_for("T1").unwrap().priority_score - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_tie_break_ignores_input_order() {
        let techs = vec![make_tech("T-B", 3, &[]), make_tech("T-A", 3, &[])];
        let jobs = vec![make_job("J1", Priority::Medium, &[])];
        let result = optimize(&techs, &jobs, &OptimizationConfig::default()).unwrap();
        assert_eq!(result.technician_for_job("J1"), Some("T-A"));
        // Routes come back in id order
        assert_eq!(result.routes[0].technician_id, "T-A");
        assert_eq!(result.routes[1].technician_id, "T-B");
    }

    #[test]
    fn test_pre_assigned_jobs() {
        let techs = vec![make_tech("T1", 2, &[]), make_tech("T2", 2, &["fiber"])];
        let jobs = vec![
            make_job("J0", Priority::Low, &["hvac"]).with_pre_assigned("T2"),
            make_job("J1", Priority::High, &[]),
            make_job("J2", Priority::High, &[]),
            make_job("J3", Priority::High, &[]),
        ];

        let result = optimize(&techs, &jobs, &OptimizationConfig::default()).unwrap();
        let t2 = result.route_for("T2").unwrap();
        assert_eq!(t2.job_ids[0], "J0");
        assert_eq!(t2.pre_assigned_job_ids, vec!["J0"]);
        // Pre-assigned load counts toward capacity
        assert!(t2.job_count() <= 2);
        assert_eq!(result.assigned_job_count(), 4);
        assert_partition(&result, &jobs);
        // ...but not toward the running means (the hvac job would score 0)
        assert!((t2.skill_match_score - 1.0).abs() < 1e-10);
        assert!((t2.priority_score - 0.8).abs() < 1e-10);
    }

    #[test]
    fn test_empty_batch() {
        let result = optimize(&[make_tech("T1", 2, &[])], &[], &OptimizationConfig::default()).unwrap();
        assert_eq!(result.routes.len(), 1);
        assert!(result.routes[0].is_empty());
        assert!((result.routes[0].efficiency_score - 0.0).abs() < 1e-10);
        assert!((result.optimization_score - 0.0).abs() < 1e-10);

        let no_techs = optimize(&[], &[make_job("J1", Priority::Low, &[])], &OptimizationConfig::default()).unwrap();
        assert_eq!(no_techs.unassigned_job_ids, vec!["J1"]);
    }

    #[test]
    fn test_validation_failure() {
        let jobs = vec![
            make_job("J1", Priority::Low, &[]),
            JobDescriptor::new("J-bad", Priority::Low, depot(), 0),
        ];
        let err = optimize(&[make_tech("T1", 2, &[])], &jobs, &OptimizationConfig::default()).unwrap_err();
        assert_matches!(err, DispatchError::Validation(ref errs) if errs.has_kind(ValidationErrorKind::NonPositiveDuration));
        assert!(err.to_string().contains("J-bad"));
    }

    #[test]
    fn test_custom_engine() {
        use crate::dispatching::rules::TravelEfficiency;

        let near = Location::new(37.51, 127.00);
        let techs = vec![
            make_tech("T1", 5, &[]),
            TechnicianDescriptor::new("T2", 5, near),
        ];
        // T1 already carries more work; only travel matters to this engine.
        let jobs = vec![
            make_job("J1", Priority::High, &[]).with_pre_assigned("T1"),
            JobDescriptor::new("J2", Priority::High, near, 30),
        ];
        let dispatcher = Dispatcher::new().with_engine(ScoringEngine::new().with_rule(TravelEfficiency));
        assert_eq!(dispatcher.engine().rule_count(), 1);
        let result = dispatcher.optimize(&techs, &jobs, &OptimizationConfig::default()).unwrap();
        assert_eq!(result.technician_for_job("J2"), Some("T2"));
    }
}
