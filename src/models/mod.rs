//! Dispatch domain models.
//!
//! Provides the core data types for field-service dispatching: jobs,
//! technicians, time windows and business hours. Optimizer inputs and
//! outputs live in [`crate::optimizer`].
//!
//! # Domain Mappings
//!
//! | u-dispatch | Telecom | Utilities | Facilities |
//! |------------|---------|-----------|------------|
//! | Job | Install/Fault Ticket | Meter Visit | Work Order |
//! | Technician | Field Engineer | Line Crew | Maintenance Tech |
//! | Skill | Fiber/Copper | HV/LV | HVAC/Electrical |
//! | Route | Daily Run | Crew Schedule | Round |

mod calendar;
mod job;
mod technician;

pub use calendar::{BusinessHours, TimeWindow};
pub use job::{Job, JobStatus, JobType, Priority};
pub use technician::{dispatchable_descriptors, Technician, TechnicianStatus};
