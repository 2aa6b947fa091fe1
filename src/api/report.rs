use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::model::summary::AttendanceSummary;
use crate::utils::dataset_cache::DatasetCache;

use super::attendance::NO_DATA_MESSAGE;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    pub data_available: bool,
    #[schema(example = "attendance_20240201_101500_123_1a2b3c4d")]
    pub artifact: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub generated_at: Option<DateTime<Utc>>,
    pub summary: Option<AttendanceSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub dataset_available: bool,
    pub record_count: usize,
    pub artifact: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub generated_at: Option<DateTime<Utc>>,
}

/// Aggregate metrics for the latest batch
#[utoipa::path(
    get,
    path = "/api/summary",
    responses(
        (status = 200, description = "Overview, per-employee stats, rankings and trends", body = SummaryResponse)
    ),
    tag = "Reports"
)]
pub async fn get_summary(cache: web::Data<DatasetCache>) -> actix_web::Result<HttpResponse> {
    let response = match cache.current().await? {
        Some(dataset) => SummaryResponse {
            data_available: true,
            artifact: Some(dataset.artifact.clone()),
            generated_at: Some(dataset.generated_at),
            summary: Some(dataset.summary.clone()),
        },
        None => SummaryResponse {
            data_available: false,
            artifact: None,
            generated_at: None,
            summary: None,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Download the most recent workbook
#[utoipa::path(
    get,
    path = "/api/report/latest",
    responses(
        (status = 200, description = "Excel workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 404, description = "No report has been generated")
    ),
    tag = "Reports"
)]
#[instrument(skip_all)]
pub async fn download_latest(cache: web::Data<DatasetCache>) -> actix_web::Result<HttpResponse> {
    let store = cache.store().clone();
    let latest = web::block(move || -> Result<_, crate::error::StoreError> {
        match store.latest_workbook_path()? {
            Some(path) => Ok(Some((std::fs::read(&path)?, path))),
            None => Ok(None),
        }
    })
    .await??;

    let Some((bytes, path)) = latest else {
        return Ok(HttpResponse::NotFound().json(json!({ "error": NO_DATA_MESSAGE })));
    };
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("attendance.xlsx")
        .to_string();
    debug!(file = %file_name, bytes = bytes.len(), "Serving workbook");

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, XLSX_MIME))
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(bytes))
}

/// Service liveness and dataset status
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health(cache: web::Data<DatasetCache>) -> actix_web::Result<HttpResponse> {
    let response = match cache.current().await? {
        Some(dataset) => HealthResponse {
            status: "ok".to_string(),
            dataset_available: true,
            record_count: dataset.records.len(),
            artifact: Some(dataset.artifact.clone()),
            generated_at: Some(dataset.generated_at),
        },
        None => HealthResponse {
            status: "ok".to_string(),
            dataset_available: false,
            record_count: 0,
            artifact: None,
            generated_at: None,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}
