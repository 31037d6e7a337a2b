//! Field-service dispatching for the U-Engine ecosystem.
//!
//! Assigns batches of field jobs to technicians with a multi-constraint
//! greedy heuristic, and tracks SLA deadlines, breaches and compliance.
//! Persistence, transport and notification are left to the caller: this
//! crate takes snapshots in and hands results back.
//!
//! # Modules
//!
//! - **`geo`**: Haversine distance and travel-time estimation
//! - **`models`**: Domain types: `Job`, `Technician`, `TimeWindow`, `BusinessHours`
//! - **`dispatching`**: Candidate scoring rules and the weighted rule engine
//! - **`optimizer`**: Batch assignment (`Dispatcher`), descriptors, routes, KPIs
//! - **`sla`**: Policy resolution, deadline calculation, breach tracking
//! - **`reporting`**: Compliance and workload aggregation
//! - **`validation`**: Batch integrity checks (IDs, locations, capacities)
//! - **`error`**: Error types
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use u_dispatch::geo::Location;
//! use u_dispatch::models::{Job, JobType, Priority, Technician};
//! use u_dispatch::optimizer::{optimize, OptimizationConfig};
//! use u_dispatch::sla::{DeadlineCalculator, SlaPolicyResolver};
//! use u_dispatch::models::dispatchable_descriptors;
//!
//! let now = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
//! let resolver = SlaPolicyResolver::default();
//! let calculator = DeadlineCalculator::new();
//!
//! let job = Job::new("J1", JobType::Repair, Priority::High, Location::new(37.51, 127.01), now)
//!     .with_skill("fiber")
//!     .with_sla(&resolver, &calculator);
//! let tech = Technician::new("T1", Location::new(37.50, 127.00)).with_skill("fiber");
//!
//! let result = optimize(
//!     &dispatchable_descriptors(&[tech]),
//!     &[job.to_descriptor()],
//!     &OptimizationConfig::default(),
//! )
//! .unwrap();
//! assert_eq!(result.technician_for_job("J1"), Some("T1"));
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Toth & Vigo (2014), "Vehicle Routing: Problems, Methods, and Applications"

pub mod dispatching;
pub mod error;
pub mod geo;
pub mod models;
pub mod optimizer;
pub mod reporting;
pub mod sla;
pub mod validation;

pub use error::{DispatchError, PolicyConfigurationError, TransitionError};
