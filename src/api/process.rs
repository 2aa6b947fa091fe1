use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::BatchError;
use crate::model::summary::BatchOverview;
use crate::pipeline::run_batch;
use crate::utils::dataset_cache::DatasetCache;

pub const ROSTER_FIELD: &str = "employee_file";
pub const ATTENDANCE_FIELD: &str = "attendance_file";

/// Multipart form accepted by the process endpoint.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct ProcessUpload {
    /// Binary employee roster exported by the device
    #[schema(value_type = String, format = Binary)]
    pub employee_file: Vec<u8>,
    /// Tab-separated punch log, `id<TAB>YYYY-MM-DD HH:MM:SS` per line
    #[schema(value_type = String, format = Binary)]
    pub attendance_file: Vec<u8>,
}

#[derive(Serialize, ToSchema)]
pub struct ProcessResponse {
    #[schema(example = "Attendance report generated successfully")]
    pub message: String,
    #[schema(example = "attendance_20240201_101500_123_1a2b3c4d")]
    pub artifact: String,
    #[schema(example = "attendance_20240201_101500_123_1a2b3c4d.xlsx")]
    pub report_file: String,
    pub overview: BatchOverview,
}

/// Process an uploaded roster and attendance log
#[utoipa::path(
    post,
    path = "/api/process",
    request_body(content = ProcessUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Batch reconciled and report published", body = ProcessResponse),
        (status = 400, description = "A required file is missing", body = Object, example = json!({
            "error": "Both employee_file and attendance_file are required"
        })),
        (status = 413, description = "Upload too large"),
        (status = 422, description = "No employees or attendance could be recovered", body = Object, example = json!({
            "error": "no employees could be recovered from the employee file"
        })),
        (status = 500, description = "Report could not be stored")
    ),
    tag = "Processing"
)]
#[instrument(skip_all)]
pub async fn process_upload(
    mut payload: Multipart,
    config: web::Data<Config>,
    cache: web::Data<DatasetCache>,
) -> actix_web::Result<HttpResponse> {
    let mut roster: Option<Vec<u8>> = None;
    let mut attendance_log: Option<Vec<u8>> = None;

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().map(str::to_owned);
        let mut bytes = Vec::new();

        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > config.max_upload_bytes {
                warn!(field = ?name, limit = config.max_upload_bytes, "Upload exceeds size limit");
                return Ok(HttpResponse::PayloadTooLarge().json(json!({
                    "error": format!("Upload exceeds {} bytes", config.max_upload_bytes)
                })));
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_deref() {
            Some(ROSTER_FIELD) => roster = Some(bytes),
            Some(ATTENDANCE_FIELD) => attendance_log = Some(bytes),
            other => debug!(field = ?other, "Ignoring unexpected multipart field"),
        }
    }

    let (Some(roster), Some(attendance_log)) = (roster, attendance_log) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Both employee_file and attendance_file are required"
        })));
    };

    info!(roster_bytes = roster.len(), log_bytes = attendance_log.len(), "Processing uploaded batch");

    // each upload gets its own buffers; the store names artifacts uniquely
    let store = cache.store().clone();
    let top_n = cache.top_n();
    let (artifact, overview) = web::block(move || -> Result<_, BatchError> {
        let batch = run_batch(&roster, &attendance_log, top_n)?;
        let artifact = store.publish(&batch)?;
        Ok((artifact, batch.summary.overview))
    })
    .await??;

    let report_file = artifact
        .workbook
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    Ok(HttpResponse::Ok().json(ProcessResponse {
        message: "Attendance report generated successfully".to_string(),
        artifact: artifact.name,
        report_file,
        overview,
    }))
}
