//! Batch assignment optimizer.
//!
//! Assigns a batch of jobs to technicians with a single-pass greedy
//! heuristic. Not a global optimum: each job takes the best technician
//! available when its turn comes.
//!
//! # Usage
//!
//! ```
//! use u_dispatch::geo::Location;
//! use u_dispatch::models::Priority;
//! use u_dispatch::optimizer::{optimize, JobDescriptor, OptimizationConfig, TechnicianDescriptor};
//!
//! let technicians = vec![
//!     TechnicianDescriptor::new("T1", 4, Location::new(37.50, 127.00)),
//!     TechnicianDescriptor::new("T2", 4, Location::new(37.60, 127.10)),
//! ];
//! let jobs = vec![JobDescriptor::new("J1", Priority::Critical, Location::new(37.59, 127.09), 60)];
//!
//! let result = optimize(&technicians, &jobs, &OptimizationConfig::default()).unwrap();
//! assert_eq!(result.technician_for_job("J1"), Some("T2"));
//! ```
//!
//! # Concurrency
//! Runs to completion on the calling thread and touches only local
//! state. Two concurrent batches over the same technicians can each fill
//! the same capacity; callers must serialize per (technician, day).

mod greedy;
mod request;
mod score;

pub use greedy::{optimize, Dispatcher};
pub use request::{
    JobDescriptor, OptimizationConfig, OptimizationResult, RouteResult, TechnicianDescriptor,
};
pub use score::DispatchKpi;
