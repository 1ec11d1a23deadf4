use crate::exam::{ExamSummaryRule, OverallStatus};
use crate::persistence::Stored;
use crate::record::HealthExamRecord;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored status next to the status the record has as of the refresh date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStatus {
    pub id: i64,
    pub personnel_name: String,
    pub stored_status: OverallStatus,
    pub current_status: OverallStatus,
    pub next_check_date: Option<NaiveDate>,
}

impl RecordStatus {
    pub fn drifted(&self) -> bool {
        self.stored_status != self.current_status
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub record_count: usize,
    pub planned_count: usize,
    pub risky_count: usize,
    pub valid_count: usize,
    pub overdue_count: usize,
    pub drifted_count: usize,
    pub earliest_next_check: Option<NaiveDate>,
}

impl RefreshSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("records={}", self.record_count));
        if self.planned_count > 0 {
            parts.push(format!("planned={}", self.planned_count));
        }
        if self.risky_count > 0 {
            parts.push(format!("risky={}", self.risky_count));
        }
        if self.valid_count > 0 {
            parts.push(format!("valid={}", self.valid_count));
        }
        if self.overdue_count > 0 {
            parts.push(format!("overdue={}", self.overdue_count));
        }
        if self.drifted_count > 0 {
            parts.push(format!("changed={}", self.drifted_count));
        }
        if let Some(date) = self.earliest_next_check {
            parts.push(format!("next_check={}", date));
        }
        parts.join(", ")
    }

    fn tally(&mut self, status: &RecordStatus) {
        self.record_count += 1;
        match status.current_status {
            OverallStatus::Planned => self.planned_count += 1,
            OverallStatus::Risky => self.risky_count += 1,
            OverallStatus::Valid => self.valid_count += 1,
            OverallStatus::Overdue => self.overdue_count += 1,
        }
        if status.drifted() {
            self.drifted_count += 1;
        }
        if let Some(due) = status.next_check_date {
            self.earliest_next_check = Some(match self.earliest_next_check {
                Some(current) => current.min(due),
                None => due,
            });
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshReport {
    pub statuses: Vec<RecordStatus>,
    pub summary: RefreshSummary,
}

/// Re-derive every record's status as of `today`.
///
/// Stored summaries are left untouched; the report only shows where they
/// have gone stale.
pub fn refresh_statuses(records: &[Stored<HealthExamRecord>], today: NaiveDate) -> RefreshReport {
    let statuses: Vec<RecordStatus> = records
        .par_iter()
        .map(|stored| {
            let current = ExamSummaryRule::summarize(&stored.value.exams, today);
            RecordStatus {
                id: stored.id,
                personnel_name: stored.value.personnel_name.clone(),
                stored_status: stored.value.summary.overall_status,
                current_status: current.overall_status,
                next_check_date: current.next_check_date,
            }
        })
        .collect();

    let mut summary = RefreshSummary::default();
    for status in &statuses {
        summary.tally(status);
    }
    tracing::info!(
        records = summary.record_count,
        overdue = summary.overdue_count,
        changed = summary.drifted_count,
        "refreshed exam statuses"
    );

    RefreshReport { statuses, summary }
}
