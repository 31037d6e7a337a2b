//! SLA policy resolution, deadline calculation, and breach tracking.
//!
//! Every function here is pure given its inputs; resolvers and calculators
//! are immutable after construction and safe to share across threads.
//!
//! # Usage
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use u_dispatch::models::{JobType, Priority};
//! use u_dispatch::sla::{
//!     BreachClassifier, DeadlineCalculator, DefaultSlaTable, SlaPolicyResolver, SlaStatus,
//! };
//!
//! let resolver = SlaPolicyResolver::new(vec![], Some(DefaultSlaTable::standard())).unwrap();
//! let created = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
//! let terms = resolver.resolve(JobType::Repair, Priority::Critical);
//! let targets = DeadlineCalculator::new().compute(created, Priority::Critical, &terms);
//!
//! let status = BreachClassifier::new().status(
//!     targets.computed_at,
//!     targets.resolution_target,
//!     created + Duration::minutes(241),
//! );
//! assert_eq!(status, SlaStatus::Breached);
//! ```

mod breach;
mod deadline;
mod policy;

pub use breach::{
    compliance_percentage, BreachClassifier, JobSlaState, SlaStatus, SlaTracker,
    DEFAULT_AT_RISK_FRACTION,
};
pub use deadline::{DeadlineCalculator, DeadlineMode, SlaTargets};
pub use policy::{
    DefaultSlaTable, PolicySource, SlaConfig, SlaPolicy, SlaPolicyResolver, SlaTerms, SlaTimes,
    MAX_SLA_MINUTES,
};
