//! Rule engine for candidate selection.
//!
//! Combines weighted scoring rules into a composite score and picks the
//! best candidate with a configurable tie-breaking strategy.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, Candidate, DispatchContext, RuleScore, ScoringRule};

/// How equal composite scores are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Lowest technician id wins (lexicographic). Deterministic
    /// regardless of candidate order.
    #[default]
    ById,
    /// First candidate in evaluation order wins.
    FirstSeen,
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn ScoringRule>,
    weight: f64,
}

/// A composable scoring engine.
///
/// # Example
/// ```
/// use u_dispatch::dispatching::ScoringEngine;
///
/// // 0.3·skill + 0.3·travel + 0.2·priority + 0.2·workload
/// let engine = ScoringEngine::standard();
/// assert_eq!(engine.rule_count(), 4);
/// ```
#[derive(Clone)]
pub struct ScoringEngine {
    rules: Vec<WeightedRule>,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl ScoringEngine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::ById,
            epsilon: 1e-9,
        }
    }

    /// The standard dispatch composite:
    /// `0.3·skill + 0.3·travel + 0.2·priority + 0.2·workload`.
    pub fn standard() -> Self {
        Self::new()
            .with_weighted_rule(rules::SkillMatch, 0.3)
            .with_weighted_rule(rules::TravelEfficiency, 0.3)
            .with_weighted_rule(rules::PriorityWeight, 0.2)
            .with_weighted_rule(rules::WorkloadBalance, 0.2)
    }

    /// Adds a rule with weight 1.0.
    pub fn with_rule<R: ScoringRule + 'static>(self, rule: R) -> Self {
        self.with_weighted_rule(rule, 1.0)
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: ScoringRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Sets the tie-breaking strategy.
    pub fn with_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Number of rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Composite (weighted sum) score for a candidate.
    pub fn score(&self, candidate: &Candidate<'_>, context: &DispatchContext) -> f64 {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(candidate, context) * wr.weight)
            .sum()
    }

    /// Per-rule weighted scores, in rule order.
    pub fn evaluate(&self, candidate: &Candidate<'_>, context: &DispatchContext) -> Vec<(&'static str, RuleScore)> {
        self.rules
            .iter()
            .map(|wr| (wr.rule.name(), wr.rule.evaluate(candidate, context) * wr.weight))
            .collect()
    }

    /// Index of the best candidate, with its composite score.
    ///
    /// Returns `None` for an empty slice.
    pub fn select_best(
        &self,
        candidates: &[Candidate<'_>],
        context: &DispatchContext,
    ) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;

        for (idx, candidate) in candidates.iter().enumerate() {
            let score = self.score(candidate, context);
            best = match best {
                None => Some((idx, score)),
                Some((best_idx, best_score)) => {
                    if self.compare(candidate, score, &candidates[best_idx], best_score)
                        == Ordering::Greater
                    {
                        Some((idx, score))
                    } else {
                        Some((best_idx, best_score))
                    }
                }
            };
        }

        best
    }

    /// Orders `a` against the incumbent `b`; `Greater` means `a` wins.
    fn compare(
        &self,
        a: &Candidate<'_>,
        score_a: f64,
        b: &Candidate<'_>,
        score_b: f64,
    ) -> Ordering {
        if (score_a - score_b).abs() > self.epsilon {
            return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
        }

        // Scores tied → final tie-breaker
        match self.tie_breaker {
            TieBreaker::ById => b.technician.id.cmp(&a.technician.id),
            TieBreaker::FirstSeen => Ordering::Less,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
