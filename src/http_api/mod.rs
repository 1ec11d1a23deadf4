use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

use crate::{
    CalibrationError, DeviceCalibration, ExamSet, ExamSummary, ExamSummaryRule, HealthExamRecord,
    OverallStatus, PersistenceError, RecordDraft, RecordError, RefreshReport, Repository, Stored,
    calendar, refresh_statuses,
};

pub type SharedRepository<T> = Arc<dyn Repository<T> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    exams: SharedRepository<HealthExamRecord>,
    devices: SharedRepository<DeviceCalibration>,
}

impl AppState {
    pub fn new(
        exams: SharedRepository<HealthExamRecord>,
        devices: SharedRepository<DeviceCalibration>,
    ) -> Self {
        Self { exams, devices }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

impl From<RecordError> for ApiError {
    fn from(value: RecordError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<CalibrationError> for ApiError {
    fn from(value: CalibrationError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::NotFound { .. } => ApiError::NotFound(value.to_string()),
            PersistenceError::Invalid(err) => ApiError::Invalid(err.to_string()),
            PersistenceError::InvalidDevice(err) => ApiError::Invalid(err.to_string()),
            other => {
                tracing::error!(error = %other, "storage failure");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Serialize)]
struct DeviceView {
    id: i64,
    #[serde(flatten)]
    device: DeviceCalibration,
    next_due: Option<NaiveDate>,
    status: OverallStatus,
}

impl DeviceView {
    fn new(stored: Stored<DeviceCalibration>, today: NaiveDate) -> Self {
        Self {
            id: stored.id,
            next_due: stored.value.next_due(),
            status: stored.value.status_as_of(today),
            device: stored.value,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/exams", get(list_exams).post(create_exam))
        .route("/exams/summary", post(preview_summary))
        .route("/exams/refresh", post(refresh_exams))
        .route("/exams/:id", get(get_exam).put(update_exam))
        .route("/devices", get(list_devices).post(create_device))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_exams(
    State(state): State<AppState>,
) -> Result<Json<Vec<Stored<HealthExamRecord>>>, ApiError> {
    Ok(Json(state.exams.get_all()?))
}

async fn get_exam(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Stored<HealthExamRecord>>, ApiError> {
    match state.exams.get_by_id(id)? {
        Some(value) => Ok(Json(Stored { id, value })),
        None => Err(ApiError::not_found(format!("exam record {id} not found"))),
    }
}

async fn create_exam(
    State(state): State<AppState>,
    Json(draft): Json<RecordDraft>,
) -> Result<(StatusCode, Json<Stored<HealthExamRecord>>), ApiError> {
    let value = HealthExamRecord::build(draft, calendar::today())?;
    let id = state.exams.insert(&value)?;
    Ok((StatusCode::CREATED, Json(Stored { id, value })))
}

async fn update_exam(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<RecordDraft>,
) -> Result<Json<Stored<HealthExamRecord>>, ApiError> {
    let value = HealthExamRecord::build(draft, calendar::today())?;
    state.exams.update(id, &value)?;
    Ok(Json(Stored { id, value }))
}

async fn preview_summary(Json(exams): Json<ExamSet>) -> Json<ExamSummary> {
    Json(ExamSummaryRule::summarize_today(&exams))
}

async fn refresh_exams(State(state): State<AppState>) -> Result<Json<RefreshReport>, ApiError> {
    let records = state.exams.get_all()?;
    Ok(Json(refresh_statuses(&records, calendar::today())))
}

async fn list_devices(State(state): State<AppState>) -> Result<Json<Vec<DeviceView>>, ApiError> {
    let today = calendar::today();
    let devices = state
        .devices
        .get_all()?
        .into_iter()
        .map(|stored| DeviceView::new(stored, today))
        .collect();
    Ok(Json(devices))
}

async fn create_device(
    State(state): State<AppState>,
    Json(device): Json<DeviceCalibration>,
) -> Result<(StatusCode, Json<DeviceView>), ApiError> {
    device.validate()?;
    let id = state.devices.insert(&device)?;
    let view = DeviceView::new(Stored { id, value: device }, calendar::today());
    Ok((StatusCode::CREATED, Json(view)))
}
