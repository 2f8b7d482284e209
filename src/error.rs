use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failures of the pure scheduling/ledger operations. Returned before any state changes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Invalid time format: {0:?} (expected HH:MM)")]
    InvalidTimeFormat(String),

    #[error("Invalid session range: end {end} is not after start {start}")]
    InvalidSessionRange { start: String, end: String },

    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Student {student_id} is not enrolled in course {course_id}")]
    StudentNotEnrolled { course_id: String, student_id: String },

    #[error("Invalid grade value: {0}")]
    InvalidGradeValue(f64),

    #[error("Session {0} already exists in this course")]
    DuplicateSession(String),

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scheduling service error: {0}")]
    Upstream(String),

    #[error("Scheduling request was rejected for course {0}")]
    SchedulingRejected(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Engine(e) => match e {
                EngineError::InvalidTimeFormat(_)
                | EngineError::InvalidSessionRange { .. }
                | EngineError::InvalidGradeValue(_)
                | EngineError::DateOutOfRange(_) => StatusCode::BAD_REQUEST,
                EngineError::CourseNotFound(_) | EngineError::SessionNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                EngineError::StudentNotEnrolled { .. } | EngineError::DuplicateSession(_) => {
                    StatusCode::CONFLICT
                }
            },
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::SchedulingRejected(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Upstream(msg) => {
                error!("scheduling service error: {}", msg);
                self.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
