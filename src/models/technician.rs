//! Technician model.
//!
//! Technicians are the resources jobs are dispatched to. Status is
//! informational and supplied by the caller; this crate never mutates it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geo::Location;
use crate::optimizer::TechnicianDescriptor;

/// Technician availability status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicianStatus {
    Active,
    Inactive,
    OnLeave,
    Busy,
    Available,
}

/// A field technician.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technician {
    /// Unique technician identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub skills: BTreeSet<String>,
    /// Equipment carried on the vehicle.
    pub equipment: BTreeSet<String>,
    pub status: TechnicianStatus,
    /// Daily job cap (> 0).
    pub max_jobs_per_day: u32,
    pub home_location: Location,
    /// Last known position. `None` = at home.
    pub current_location: Option<Location>,
}

impl Technician {
    /// Creates an active technician at home with a cap of 8 jobs.
    pub fn new(id: impl Into<String>, home_location: Location) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            skills: BTreeSet::new(),
            equipment: BTreeSet::new(),
            status: TechnicianStatus::Active,
            max_jobs_per_day: 8,
            home_location,
            current_location: None,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a skill.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.insert(skill.into());
        self
    }

    /// Adds an equipment item.
    pub fn with_equipment(mut self, item: impl Into<String>) -> Self {
        self.equipment.insert(item.into());
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: TechnicianStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the daily job cap.
    pub fn with_max_jobs(mut self, max_jobs_per_day: u32) -> Self {
        self.max_jobs_per_day = max_jobs_per_day;
        self
    }

    /// Sets the current location.
    pub fn with_current_location(mut self, location: Location) -> Self {
        self.current_location = Some(location);
        self
    }

    /// Whether this technician has a given skill.
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }

    /// Whether this technician can take new work.
    pub fn is_dispatchable(&self) -> bool {
        matches!(
            self.status,
            TechnicianStatus::Active | TechnicianStatus::Available
        )
    }

    /// Where a route for this technician starts.
    pub fn route_origin(&self) -> Location {
        self.current_location.unwrap_or(self.home_location)
    }

    /// Optimizer input for this technician.
    pub fn to_descriptor(&self) -> TechnicianDescriptor {
        TechnicianDescriptor {
            id: self.id.clone(),
            skills: self.skills.clone(),
            equipment: self.equipment.clone(),
            max_jobs_per_day: self.max_jobs_per_day,
            current_location: Some(self.route_origin()),
        }
    }
}

/// Descriptors for every dispatchable technician, in input order.
pub fn dispatchable_descriptors(technicians: &[Technician]) -> Vec<TechnicianDescriptor> {
    technicians
        .iter()
        .filter(|t| t.is_dispatchable())
        .map(Technician::to_descriptor)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_technician_builder() {
        let t = Technician::new("T1", Location::new(37.5, 127.0))
            .with_name("Kim")
            .with_skill("fiber")
            .with_skill("copper")
            .with_equipment("ladder")
            .with_max_jobs(5);

        assert_eq!(t.id, "T1");
        assert_eq!(t.name, "Kim");
        assert!(t.has_skill("fiber"));
        assert!(!t.has_skill("hvac"));
        assert!(t.equipment.contains("ladder"));
        assert_eq!(t.max_jobs_per_day, 5);
        assert_eq!(t.status, TechnicianStatus::Active);
    }

    #[test]
    fn test_route_origin() {
        let home = Location::new(37.5, 127.0);
        let t = Technician::new("T1", home);
        assert_eq!(t.route_origin(), home);

        let there = Location::new(35.1, 129.0);
        let t = t.with_current_location(there);
        assert_eq!(t.route_origin(), there);
        assert_eq!(t.to_descriptor().current_location, Some(there));
    }

    #[test]
    fn test_dispatchable() {
        let home = Location::new(0.0, 0.0);
        let techs = vec![
            Technician::new("T1", home),
            Technician::new("T2", home).with_status(TechnicianStatus::OnLeave),
            Technician::new("T3", home).with_status(TechnicianStatus::Available),
            Technician::new("T4", home).with_status(TechnicianStatus::Inactive),
            Technician::new("T5", home).with_status(TechnicianStatus::Busy),
        ];
        let ids: Vec<String> = dispatchable_descriptors(&techs)
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["T1", "T3"]);
    }
}
