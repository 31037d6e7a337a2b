//! Candidate scoring rules and rule engine for dispatching.
//!
//! Each rule scores one (job, technician) pairing; the engine combines
//! rule scores into a composite and selects the best technician.
//!
//! # Usage
//!
//! ```
//! use u_dispatch::dispatching::{rules, ScoringEngine, TieBreaker};
//!
//! let engine = ScoringEngine::new()
//!     .with_weighted_rule(rules::SkillMatch, 0.5)
//!     .with_weighted_rule(rules::TravelEfficiency, 0.5)
//!     .with_tie_breaker(TieBreaker::ById);
//! assert_eq!(engine.rule_count(), 2);
//! ```
//!
//! # Score Convention
//! **Higher score = better candidate.** Built-in rules return values in
//! `0.0..=1.0`, so a weighted sum with weights summing to 1.0 is also
//! in `0.0..=1.0`.

mod context;
mod engine;
pub mod rules;

pub use context::{Candidate, DispatchContext};
pub use engine::{ScoringEngine, TieBreaker};

use std::fmt::Debug;

/// Score returned by a scoring rule (higher = better).
pub type RuleScore = f64;

/// A rule that scores how well a technician suits a job.
pub trait ScoringRule: Send + Sync + Debug {
    /// Rule name (e.g., "SKILL", "TRAVEL").
    fn name(&self) -> &'static str;

    /// Scores a candidate pairing. Higher = better.
    fn evaluate(&self, candidate: &Candidate<'_>, context: &DispatchContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
