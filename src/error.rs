use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Reasons a batch is rejected before any artifact is written.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no employees could be recovered from the employee file")]
    EmptyDirectory,

    #[error("no valid attendance records found in the attendance file")]
    NoPunchEvents,

    #[error("attendance data produced no employee-day records")]
    NoRecords,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("output storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("report generation failed: {0}")]
    Report(#[from] ReportError),

    #[error("artifact could not be published: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl ResponseError for PipelineError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        tracing::error!(error = %self, "Output store failure");
        HttpResponse::build(self.status_code()).json(json!({
            "error": "Failed to store attendance report"
        }))
    }
}

/// Anything that stops an uploaded batch from being published.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for BatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            BatchError::Pipeline(e) => e.status_code(),
            BatchError::Store(e) => e.status_code(),
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            BatchError::Pipeline(e) => e.error_response(),
            BatchError::Store(e) => e.error_response(),
        }
    }
}
