//! Periodic health examination outcomes and the rule that rolls the four
//! per-category outcomes up into a single summary.

use crate::calendar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamCategory {
    General,
    ChestXray,
    BloodCount,
    Audiometry,
}

impl ExamCategory {
    pub const ALL: [ExamCategory; 4] = [
        ExamCategory::General,
        ExamCategory::ChestXray,
        ExamCategory::BloodCount,
        ExamCategory::Audiometry,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            ExamCategory::General => "general",
            ExamCategory::ChestXray => "chest_xray",
            ExamCategory::BloodCount => "blood_count",
            ExamCategory::Audiometry => "audiometry",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExamCategory::General => "Genel Muayene",
            ExamCategory::ChestXray => "Akciğer Grafisi",
            ExamCategory::BloodCount => "Hemogram",
            ExamCategory::Audiometry => "Odyometri",
        }
    }

    /// Accepts either the key or the display label.
    pub fn parse(text: &str) -> Option<Self> {
        let folded = fold(text);
        Self::ALL
            .into_iter()
            .find(|c| folded == fold(c.key()) || folded == fold(c.label()))
    }
}

impl fmt::Display for ExamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamResult {
    #[serde(rename = "Uygun")]
    Fit,
    #[serde(rename = "Şartlı Uygun")]
    ConditionallyFit,
    #[serde(rename = "Uygun Değil")]
    Unfit,
}

impl ExamResult {
    pub fn label(self) -> &'static str {
        match self {
            ExamResult::Fit => "Uygun",
            ExamResult::ConditionallyFit => "Şartlı Uygun",
            ExamResult::Unfit => "Uygun Değil",
        }
    }

    /// Lenient parse of a form value. Unknown or blank text is `None`.
    pub fn parse_label(text: &str) -> Option<Self> {
        match fold(text).as_str() {
            "uygun" | "fit" => Some(ExamResult::Fit),
            "sartli uygun" | "conditional" | "conditionally fit" => {
                Some(ExamResult::ConditionallyFit)
            }
            "uygun degil" | "unfit" => Some(ExamResult::Unfit),
            _ => None,
        }
    }
}

impl fmt::Display for ExamResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverallStatus {
    #[serde(rename = "Planlandı")]
    Planned,
    #[serde(rename = "Riskli")]
    Risky,
    #[serde(rename = "Gecerli")]
    Valid,
    #[serde(rename = "Gecikmis")]
    Overdue,
}

impl OverallStatus {
    pub const ALL: [OverallStatus; 4] = [
        OverallStatus::Planned,
        OverallStatus::Risky,
        OverallStatus::Valid,
        OverallStatus::Overdue,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OverallStatus::Planned => "Planlandı",
            OverallStatus::Risky => "Riskli",
            OverallStatus::Valid => "Gecerli",
            OverallStatus::Overdue => "Gecikmis",
        }
    }

    pub fn parse_label(text: &str) -> Option<Self> {
        let folded = fold(text);
        Self::ALL
            .into_iter()
            .find(|status| fold(status.label()) == folded)
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one examination category.
///
/// An entry carries a date exactly when it carries a result. The fields are
/// private so every entry goes through [`ExamEntry::empty`],
/// [`ExamEntry::recorded`], [`ExamEntry::from_form`] or the checked
/// deserializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExamEntryFields")]
pub struct ExamEntry {
    category: ExamCategory,
    date: Option<NaiveDate>,
    result: Option<ExamResult>,
}

#[derive(Deserialize)]
struct ExamEntryFields {
    category: ExamCategory,
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    result: Option<ExamResult>,
}

impl TryFrom<ExamEntryFields> for ExamEntry {
    type Error = ExamSetError;

    fn try_from(fields: ExamEntryFields) -> Result<Self, Self::Error> {
        match (fields.date, fields.result) {
            (Some(date), Some(result)) => Ok(Self::recorded(fields.category, date, result)),
            (None, None) => Ok(Self::empty(fields.category)),
            (Some(_), None) => Err(ExamSetError::DateWithoutResult(fields.category.key())),
            (None, Some(_)) => Err(ExamSetError::ResultWithoutDate(fields.category.key())),
        }
    }
}

impl ExamEntry {
    pub fn empty(category: ExamCategory) -> Self {
        Self {
            category,
            date: None,
            result: None,
        }
    }

    pub fn recorded(category: ExamCategory, date: NaiveDate, result: ExamResult) -> Self {
        Self {
            category,
            date: Some(date),
            result: Some(result),
        }
    }

    /// Build an entry from raw form text.
    ///
    /// The entry is recorded only when both the result and the date read
    /// cleanly. Anything else leaves the category empty.
    pub fn from_form(category: ExamCategory, date_text: &str, result_text: &str) -> Self {
        match (
            ExamResult::parse_label(result_text),
            calendar::parse_date(date_text),
        ) {
            (Some(result), Some(date)) => Self::recorded(category, date, result),
            _ => Self::empty(category),
        }
    }

    pub fn category(&self) -> ExamCategory {
        self.category
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn result(&self) -> Option<ExamResult> {
        self.result
    }

    pub fn is_recorded(&self) -> bool {
        self.result.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExamSetError {
    #[error("examination category '{0}' appears more than once")]
    DuplicateCategory(&'static str),
    #[error("examination category '{0}' has a date but no result")]
    DateWithoutResult(&'static str),
    #[error("examination category '{0}' has a result but no date")]
    ResultWithoutDate(&'static str),
}

/// The four examination entries of one cycle, one slot per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ExamEntry>", into = "Vec<ExamEntry>")]
pub struct ExamSet {
    entries: [ExamEntry; 4],
}

impl Default for ExamSet {
    fn default() -> Self {
        Self {
            entries: ExamCategory::ALL.map(ExamEntry::empty),
        }
    }
}

impl ExamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: ExamCategory) -> &ExamEntry {
        &self.entries[category.index()]
    }

    pub fn set(&mut self, entry: ExamEntry) {
        self.entries[entry.category.index()] = entry;
    }

    pub fn clear(&mut self, category: ExamCategory) {
        self.entries[category.index()] = ExamEntry::empty(category);
    }

    pub fn with(mut self, entry: ExamEntry) -> Self {
        self.set(entry);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExamEntry> {
        self.entries.iter()
    }

    /// True when no category has a result.
    pub fn is_empty(&self) -> bool {
        !self.entries.iter().any(ExamEntry::is_recorded)
    }
}

impl TryFrom<Vec<ExamEntry>> for ExamSet {
    type Error = ExamSetError;

    fn try_from(entries: Vec<ExamEntry>) -> Result<Self, Self::Error> {
        let mut set = ExamSet::default();
        let mut seen = [false; 4];
        for entry in entries {
            let slot = entry.category.index();
            if seen[slot] {
                return Err(ExamSetError::DuplicateCategory(entry.category.key()));
            }
            seen[slot] = true;
            set.set(entry);
        }
        Ok(set)
    }
}

impl From<ExamSet> for Vec<ExamEntry> {
    fn from(set: ExamSet) -> Self {
        set.entries.to_vec()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSummary {
    pub latest_date: Option<NaiveDate>,
    pub next_check_date: Option<NaiveDate>,
    pub overall_result: Option<ExamResult>,
    pub overall_status: OverallStatus,
}

/// Results from most to least severe. The first one present in a set is the
/// overall result.
const SEVERITY_ORDER: [ExamResult; 3] = [
    ExamResult::Unfit,
    ExamResult::ConditionallyFit,
    ExamResult::Fit,
];

pub struct ExamSummaryRule;

impl ExamSummaryRule {
    pub fn summarize(exams: &ExamSet, today: NaiveDate) -> ExamSummary {
        let latest_date = exams
            .iter()
            .filter(|entry| entry.is_recorded())
            .filter_map(|entry| entry.date)
            .max();
        let next_check_date = latest_date.and_then(calendar::add_one_year);

        let results: Vec<ExamResult> = exams.iter().filter_map(|entry| entry.result).collect();
        let overall_result = SEVERITY_ORDER
            .into_iter()
            .find(|severity| results.contains(severity));

        ExamSummary {
            latest_date,
            next_check_date,
            overall_result,
            overall_status: Self::status_for(overall_result, next_check_date, today),
        }
    }

    /// Summarize against the local calendar date.
    pub fn summarize_today(exams: &ExamSet) -> ExamSummary {
        Self::summarize(exams, calendar::today())
    }

    fn status_for(
        overall: Option<ExamResult>,
        next_check_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> OverallStatus {
        match overall {
            Some(ExamResult::Unfit) => OverallStatus::Risky,
            Some(ExamResult::ConditionallyFit) => OverallStatus::Valid,
            Some(ExamResult::Fit) if next_check_date.is_some_and(|due| due < today) => {
                OverallStatus::Overdue
            }
            Some(ExamResult::Fit) => OverallStatus::Valid,
            None => OverallStatus::Planned,
        }
    }
}

/// Case- and diacritic-insensitive comparison key for Turkish form labels.
fn fold(text: &str) -> String {
    let folded: String = text
        .chars()
        .map(|c| match c {
            'ş' | 'Ş' => 's',
            'ğ' | 'Ğ' => 'g',
            'ı' | 'İ' => 'i',
            'ü' | 'Ü' => 'u',
            'ö' | 'Ö' => 'o',
            'ç' | 'Ç' => 'c',
            '_' | '-' => ' ',
            other => other.to_ascii_lowercase(),
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
