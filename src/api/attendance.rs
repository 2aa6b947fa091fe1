use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::pipeline::query::{RecordFilter, filter_records};
use crate::pipeline::summary::{distinct_employees, employee_dashboard};
use crate::utils::dataset_cache::DatasetCache;

pub const NO_DATA_MESSAGE: &str = "No data available. Upload an employee file and attendance file first.";

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Exact employee id, case-insensitive
    #[schema(example = "007")]
    pub employee_id: Option<String>,
    /// Inclusive lower bound, `YYYY-MM-DD`
    #[schema(example = "2024-01-01")]
    pub from_date: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`
    #[schema(example = "2024-01-31")]
    pub to_date: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SearchResponse {
    /// False when no batch has been processed yet
    pub data_available: bool,
    pub records: Vec<AttendanceRecord>,
    #[schema(nullable = true)]
    pub message: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data_available: bool,
    pub employees: Vec<Employee>,
}

/// `Err` carries the message for a 400 response.
fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("{field} must be YYYY-MM-DD")),
    }
}

impl SearchQuery {
    fn to_filter(&self) -> Result<RecordFilter, String> {
        let filter = match self.employee_id.as_deref() {
            Some(id) => RecordFilter::for_employee(id),
            None => RecordFilter::default(),
        };
        Ok(filter.between(
            parse_date("from_date", self.from_date.as_deref())?,
            parse_date("to_date", self.to_date.as_deref())?,
        ))
    }
}

/// Search attendance records
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching records; empty when nothing matches or no data is loaded", body = SearchResponse),
        (status = 400, description = "Malformed date", body = Object, example = json!({
            "error": "from_date must be YYYY-MM-DD"
        })),
        (status = 500, description = "Stored dataset unreadable")
    ),
    tag = "Attendance"
)]
#[instrument(skip(cache))]
pub async fn search_records(
    query: web::Query<SearchQuery>,
    cache: web::Data<DatasetCache>,
) -> actix_web::Result<HttpResponse> {
    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(message) => return Ok(HttpResponse::BadRequest().json(json!({ "error": message }))),
    };

    let Some(dataset) = cache.current().await? else {
        return Ok(HttpResponse::Ok().json(SearchResponse {
            data_available: false,
            records: Vec::new(),
            message: Some(NO_DATA_MESSAGE.to_string()),
        }));
    };

    let records: Vec<AttendanceRecord> = filter_records(&dataset.records, &filter)
        .into_iter()
        .cloned()
        .collect();
    debug!(matches = records.len(), artifact = %dataset.artifact, "Search complete");

    let message = records.is_empty().then(|| {
        format!(
            "No records found for Employee_ID: {}, From_Date: {}, To_Date: {}",
            query.employee_id.as_deref().unwrap_or_default(),
            query.from_date.as_deref().unwrap_or_default(),
            query.to_date.as_deref().unwrap_or_default(),
        )
    });

    Ok(HttpResponse::Ok().json(SearchResponse {
        data_available: true,
        records,
        message,
    }))
}

/// List employees in the current dataset
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "Distinct employees", body = EmployeeListResponse)
    ),
    tag = "Attendance"
)]
pub async fn list_employees(cache: web::Data<DatasetCache>) -> actix_web::Result<HttpResponse> {
    let response = match cache.current().await? {
        Some(dataset) => EmployeeListResponse {
            data_available: true,
            employees: distinct_employees(&dataset.records),
        },
        None => EmployeeListResponse {
            data_available: false,
            employees: Vec::new(),
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Dashboard metrics for one employee
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}/dashboard",
    params(
        ("employee_id", description = "Employee id, case-insensitive")
    ),
    responses(
        (status = 200, description = "Employee dashboard", body = crate::model::summary::EmployeeDashboard),
        (status = 404, description = "No data loaded, or employee not in the dataset")
    ),
    tag = "Attendance"
)]
pub async fn get_dashboard(
    path: web::Path<String>,
    cache: web::Data<DatasetCache>,
) -> actix_web::Result<HttpResponse> {
    let employee_id = path.into_inner();
    let Some(dataset) = cache.current().await? else {
        return Ok(HttpResponse::NotFound().json(json!({ "error": NO_DATA_MESSAGE })));
    };

    match employee_dashboard(&dataset.records, &employee_id) {
        Some(dashboard) => Ok(HttpResponse::Ok().json(dashboard)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "error": format!("Employee {employee_id} not found")
        }))),
    }
}
