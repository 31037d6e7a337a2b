//! SLA compliance aggregation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::record::{CompletedJobRecord, ReportWindow};
use crate::sla::compliance_percentage;

/// Dimension to break a report down by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    JobType,
    Priority,
    Technician,
}

/// Label used for jobs with no technician.
pub const UNASSIGNED_KEY: &str = "unassigned";

impl GroupBy {
    /// Group key of a record.
    pub fn key(&self, record: &CompletedJobRecord) -> String {
        match self {
            GroupBy::JobType => record.job_type.to_string(),
            GroupBy::Priority => record.priority.to_string(),
            GroupBy::Technician => record
                .technician_id
                .clone()
                .unwrap_or_else(|| UNASSIGNED_KEY.to_string()),
        }
    }
}

/// Aggregates for one group of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    /// Records in the group.
    pub total: usize,
    /// Records carrying an SLA status.
    pub with_sla: usize,
    pub breached: usize,
    /// `compliant / with_sla * 100`; 100 when no record has an SLA.
    pub compliance_percentage: f64,
    /// Mean minutes to first response over records that have one.
    pub avg_response_minutes: Option<f64>,
    /// Mean minutes to resolution.
    pub avg_resolution_minutes: Option<f64>,
}

impl GroupStats {
    fn from_records(records: &[&CompletedJobRecord]) -> Self {
        let statuses: Vec<_> = records.iter().filter_map(|r| r.sla_status).collect();
        let breached = statuses.iter().filter(|s| !s.is_compliant()).count();

        let responses: Vec<f64> = records.iter().filter_map(|r| r.response_minutes()).collect();
        let resolutions: Vec<f64> = records.iter().map(|r| r.resolution_minutes()).collect();

        Self {
            total: records.len(),
            with_sla: statuses.len(),
            breached,
            compliance_percentage: compliance_percentage(&statuses),
            avg_response_minutes: average(&responses),
            avg_resolution_minutes: average(&resolutions),
        }
    }
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn in_window(
    records: &[CompletedJobRecord],
    window: ReportWindow,
) -> impl Iterator<Item = &CompletedJobRecord> {
    records.iter().filter(move |r| window.contains(r.resolved_at))
}

fn group<'a>(
    records: &[&'a CompletedJobRecord],
    group_by: GroupBy,
) -> BTreeMap<String, Vec<&'a CompletedJobRecord>> {
    let mut groups: BTreeMap<String, Vec<&'a CompletedJobRecord>> = BTreeMap::new();
    for &record in records {
        groups.entry(group_by.key(record)).or_default().push(record);
    }
    groups
}

fn stats_by(
    records: &[&CompletedJobRecord],
    group_by: GroupBy,
) -> BTreeMap<String, GroupStats> {
    group(records, group_by)
        .into_iter()
        .map(|(key, members)| (key, GroupStats::from_records(&members)))
        .collect()
}

/// Compliance percentage per group for records resolved inside `window`.
///
/// Groups with no SLA-bearing records report 100.
pub fn compliance_by(
    records: &[CompletedJobRecord],
    window: &ReportWindow,
    group_by: GroupBy,
) -> BTreeMap<String, f64> {
    let selected: Vec<_> = in_window(records, *window).collect();
    stats_by(&selected, group_by)
        .into_iter()
        .map(|(key, stats)| (key, stats.compliance_percentage))
        .collect()
}

/// SLA report over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaReport {
    pub window: ReportWindow,
    /// Totals across all selected records.
    pub overall: GroupStats,
    pub by_job_type: BTreeMap<String, GroupStats>,
    pub by_priority: BTreeMap<String, GroupStats>,
    pub by_technician: BTreeMap<String, GroupStats>,
}

impl SlaReport {
    /// Builds a report from records resolved inside `window`.
    pub fn build(records: &[CompletedJobRecord], window: ReportWindow) -> Self {
        let selected: Vec<_> = in_window(records, window).collect();
        debug!(
            records = records.len(),
            selected = selected.len(),
            "building SLA report"
        );

        Self {
            window,
            overall: GroupStats::from_records(&selected),
            by_job_type: stats_by(&selected, GroupBy::JobType),
            by_priority: stats_by(&selected, GroupBy::Priority),
            by_technician: stats_by(&selected, GroupBy::Technician),
        }
    }

    /// Breakdown for one dimension.
    pub fn breakdown(&self, group_by: GroupBy) -> &BTreeMap<String, GroupStats> {
        match group_by {
            GroupBy::JobType => &self.by_job_type,
            GroupBy::Priority => &self.by_priority,
            GroupBy::Technician => &self.by_technician,
        }
    }
}
