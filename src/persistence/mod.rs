use crate::{CalibrationError, DeviceCalibration, HealthExamRecord, RecordError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid record: {0}")]
    Invalid(#[from] RecordError),
    #[error("invalid device: {0}")]
    InvalidDevice(#[from] CalibrationError),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("no {collection} record with id {id}")]
    NotFound { collection: &'static str, id: i64 },
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// A value type that can be kept in a [`Repository`].
pub trait Collection: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name the values are grouped under in a shared store.
    const NAME: &'static str;

    /// Checked before every insert and update.
    fn validate(&self) -> PersistenceResult<()> {
        Ok(())
    }
}

impl Collection for HealthExamRecord {
    const NAME: &'static str = "health_exams";

    fn validate(&self) -> PersistenceResult<()> {
        if self.personnel_name.trim().is_empty() {
            return Err(RecordError::MissingPersonnelName.into());
        }
        if self.exams.is_empty() {
            return Err(RecordError::EmptyExamSet.into());
        }
        Ok(())
    }
}

impl Collection for DeviceCalibration {
    const NAME: &'static str = "device_calibrations";

    fn validate(&self) -> PersistenceResult<()> {
        Ok(DeviceCalibration::validate(self)?)
    }
}

/// A value together with the id its store assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: i64,
    #[serde(flatten)]
    pub value: T,
}

pub trait Repository<T: Collection> {
    fn insert(&self, value: &T) -> PersistenceResult<i64>;
    fn update(&self, id: i64, value: &T) -> PersistenceResult<()>;
    fn get_by_id(&self, id: i64) -> PersistenceResult<Option<T>>;
    fn get_all(&self) -> PersistenceResult<Vec<Stored<T>>>;
}

/// Insert every value as a new row, returning the assigned ids in order.
pub fn import_into<T, R>(repository: &R, values: &[T]) -> PersistenceResult<Vec<i64>>
where
    T: Collection,
    R: Repository<T> + ?Sized,
{
    values.iter().map(|value| repository.insert(value)).collect()
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_records_from_csv, load_records_from_json, save_records_to_csv, save_records_to_json,
};
pub use memory::MemoryStore;
