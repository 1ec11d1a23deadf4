use crate::calendar::{self, format_date};
use crate::exam::{
    ExamCategory, ExamEntry, ExamResult, ExamSet, ExamSummary, ExamSummaryRule, OverallStatus,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("personnel name is required")]
    MissingPersonnelName,
    #[error("at least one examination result is required")]
    EmptyExamSet,
    #[error("field '{field}' has unreadable value '{value}'")]
    InvalidField { field: String, value: String },
}

/// Raw values gathered from an exam form before a record is saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub personnel_name: String,
    #[serde(default)]
    pub registration_no: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub exams: ExamSet,
}

impl RecordDraft {
    pub fn new(personnel_name: impl Into<String>) -> Self {
        Self {
            personnel_name: personnel_name.into(),
            ..Self::default()
        }
    }

    /// Record one category from form text.
    pub fn set_exam(&mut self, category: ExamCategory, date_text: &str, result_text: &str) {
        self.exams
            .set(ExamEntry::from_form(category, date_text, result_text));
    }
}

impl From<&HealthExamRecord> for RecordDraft {
    fn from(record: &HealthExamRecord) -> Self {
        Self {
            personnel_name: record.personnel_name.clone(),
            registration_no: record.registration_no.clone(),
            department: record.department.clone(),
            notes: record.notes.clone(),
            exams: record.exams,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthExamRecord {
    pub personnel_name: String,
    #[serde(default)]
    pub registration_no: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub exams: ExamSet,
    pub summary: ExamSummary,
    pub recorded_on: NaiveDate,
}

impl HealthExamRecord {
    /// Snapshot a draft into a record, computing its summary as of `today`.
    pub fn build(draft: RecordDraft, today: NaiveDate) -> Result<Self, RecordError> {
        let personnel_name = draft.personnel_name.trim().to_string();
        if personnel_name.is_empty() {
            return Err(RecordError::MissingPersonnelName);
        }
        if draft.exams.is_empty() {
            return Err(RecordError::EmptyExamSet);
        }

        let summary = ExamSummaryRule::summarize(&draft.exams, today);
        tracing::debug!(
            personnel = %personnel_name,
            status = %summary.overall_status,
            "computed exam summary"
        );

        Ok(Self {
            personnel_name,
            registration_no: non_blank(draft.registration_no),
            department: non_blank(draft.department),
            notes: non_blank(draft.notes),
            exams: draft.exams,
            summary,
            recorded_on: today,
        })
    }

    /// Field-name to value mapping handed to flat stores and CSV export.
    pub fn to_flat_record(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert("personnel_name".to_string(), self.personnel_name.clone());
        fields.insert(
            "registration_no".to_string(),
            self.registration_no.clone().unwrap_or_default(),
        );
        fields.insert(
            "department".to_string(),
            self.department.clone().unwrap_or_default(),
        );
        fields.insert("notes".to_string(), self.notes.clone().unwrap_or_default());
        for entry in self.exams.iter() {
            let key = entry.category().key();
            fields.insert(format!("{key}_date"), format_date(entry.date()));
            fields.insert(
                format!("{key}_result"),
                entry.result().map(|r| r.label().to_string()).unwrap_or_default(),
            );
        }
        fields.insert(
            "latest_exam_date".to_string(),
            format_date(self.summary.latest_date),
        );
        fields.insert(
            "next_check_date".to_string(),
            format_date(self.summary.next_check_date),
        );
        fields.insert(
            "overall_result".to_string(),
            self.summary
                .overall_result
                .map(|r| r.label().to_string())
                .unwrap_or_default(),
        );
        fields.insert(
            "overall_status".to_string(),
            self.summary.overall_status.label().to_string(),
        );
        fields.insert(
            "recorded_on".to_string(),
            format_date(Some(self.recorded_on)),
        );
        fields
    }

    /// Inverse of [`to_flat_record`](Self::to_flat_record). The stored
    /// summary is taken as written rather than recomputed.
    pub fn from_flat_record(fields: &BTreeMap<String, String>) -> Result<Self, RecordError> {
        let text = |name: &str| field_text(fields, name);

        let personnel_name = text("personnel_name").trim().to_string();
        if personnel_name.is_empty() {
            return Err(RecordError::MissingPersonnelName);
        }

        let mut exams = ExamSet::new();
        for category in ExamCategory::ALL {
            let key = category.key();
            exams.set(ExamEntry::from_form(
                category,
                text(&format!("{key}_date")),
                text(&format!("{key}_result")),
            ));
        }

        let overall_result = optional_label(
            text("overall_result"),
            "overall_result",
            ExamResult::parse_label,
        )?;
        let overall_status = OverallStatus::parse_label(text("overall_status")).ok_or_else(|| {
            RecordError::InvalidField {
                field: "overall_status".to_string(),
                value: text("overall_status").to_string(),
            }
        })?;
        let recorded_on = calendar::parse_date(text("recorded_on")).ok_or_else(|| {
            RecordError::InvalidField {
                field: "recorded_on".to_string(),
                value: text("recorded_on").to_string(),
            }
        })?;

        Ok(Self {
            personnel_name,
            registration_no: non_blank(Some(text("registration_no").to_string())),
            department: non_blank(Some(text("department").to_string())),
            notes: non_blank(Some(text("notes").to_string())),
            exams,
            summary: ExamSummary {
                latest_date: calendar::parse_date(text("latest_exam_date")),
                next_check_date: calendar::parse_date(text("next_check_date")),
                overall_result,
                overall_status,
            },
            recorded_on,
        })
    }

    /// Status this record would carry if it were summarized on `today`.
    pub fn status_as_of(&self, today: NaiveDate) -> OverallStatus {
        ExamSummaryRule::summarize(&self.exams, today).overall_status
    }
}

/// Column order of the flat record.
pub fn flat_record_columns() -> Vec<String> {
    let mut columns = vec![
        "personnel_name".to_string(),
        "registration_no".to_string(),
        "department".to_string(),
    ];
    for category in ExamCategory::ALL {
        columns.push(format!("{}_date", category.key()));
        columns.push(format!("{}_result", category.key()));
    }
    columns.extend(
        [
            "latest_exam_date",
            "next_check_date",
            "overall_result",
            "overall_status",
            "recorded_on",
            "notes",
        ]
        .map(String::from),
    );
    columns
}

fn optional_label<T>(
    text: &str,
    field: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, RecordError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    parse(text).map(Some).ok_or_else(|| RecordError::InvalidField {
        field: field.to_string(),
        value: text.to_string(),
    })
}

fn field_text<'a>(fields: &'a BTreeMap<String, String>, name: &str) -> &'a str {
    fields.get(name).map(String::as_str).unwrap_or("")
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
