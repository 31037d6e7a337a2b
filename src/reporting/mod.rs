//! Reporting over dispatch and SLA outcomes.
//!
//! Mechanical grouping of finished jobs: compliance percentage, mean
//! response and resolution times, broken down by job type, priority and
//! technician. Records are selected by resolution time within an
//! inclusive window; group maps are `BTreeMap`s for stable output.

mod aggregate;
mod record;
mod workload;

pub use aggregate::{compliance_by, GroupBy, GroupStats, SlaReport, UNASSIGNED_KEY};
pub use record::{CompletedJobRecord, ReportWindow};
pub use workload::TechnicianWorkload;
