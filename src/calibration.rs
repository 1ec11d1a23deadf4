use crate::calendar;
use crate::exam::OverallStatus;
use crate::record::non_blank;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalibrationError {
    #[error("device name is required")]
    MissingDeviceName,
    #[error("calibration interval must be at least one month")]
    InvalidInterval,
}

/// Calibration schedule of one medical device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCalibration {
    pub device_name: String,
    #[serde(default)]
    pub serial_no: Option<String>,
    #[serde(default)]
    pub last_calibrated: Option<NaiveDate>,
    pub interval_months: u32,
}

impl DeviceCalibration {
    pub fn new(
        device_name: impl Into<String>,
        serial_no: Option<String>,
        last_calibrated: Option<NaiveDate>,
        interval_months: u32,
    ) -> Result<Self, CalibrationError> {
        let device = Self {
            device_name: device_name.into().trim().to_string(),
            serial_no: non_blank(serial_no),
            last_calibrated,
            interval_months,
        };
        device.validate()?;
        Ok(device)
    }

    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.device_name.trim().is_empty() {
            return Err(CalibrationError::MissingDeviceName);
        }
        if self.interval_months == 0 {
            return Err(CalibrationError::InvalidInterval);
        }
        Ok(())
    }

    /// Next inspection date, or `None` if the device was never calibrated.
    pub fn next_due(&self) -> Option<NaiveDate> {
        self.last_calibrated
            .and_then(|last| calendar::add_months(last, self.interval_months))
    }

    pub fn status_as_of(&self, today: NaiveDate) -> OverallStatus {
        match self.next_due() {
            None => OverallStatus::Planned,
            Some(due) if due < today => OverallStatus::Overdue,
            Some(_) => OverallStatus::Valid,
        }
    }
}
