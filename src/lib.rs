pub mod calendar;
pub mod calibration;
pub mod config;
pub mod exam;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod persistence;
pub mod record;
pub mod refresh;

pub use calibration::{CalibrationError, DeviceCalibration};
pub use config::{AppConfig, ConfigError};
pub use exam::{
    ExamCategory, ExamEntry, ExamResult, ExamSet, ExamSetError, ExamSummary, ExamSummaryRule,
    OverallStatus,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    Collection, MemoryStore, PersistenceError, PersistenceResult, Repository, Stored,
    load_records_from_csv, load_records_from_json, save_records_to_csv, save_records_to_json,
};
pub use record::{HealthExamRecord, RecordDraft, RecordError};
pub use refresh::{RecordStatus, RefreshReport, RefreshSummary, refresh_statuses};
