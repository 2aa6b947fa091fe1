use crate::api::attendance::{EmployeeListResponse, SearchQuery, SearchResponse};
use crate::api::process::{ProcessResponse, ProcessUpload};
use crate::api::report::{HealthResponse, SummaryResponse};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, LateFlag};
use crate::model::employee::{Employee, EmployeeId};
use crate::model::summary::{
    AttendanceSummary, BatchOverview, DailyHours, EmployeeDashboard, EmployeeStats, MonthlyTrend,
    RankedEmployee, Rankings, StatusCount, WeeklyPunctuality,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Reconciliation API",
        version = "1.0.0",
        description = r#"
## Biometric Attendance Reconciliation

Turns a biometric device export into a reconciled attendance dataset and an Excel report.

### 🔹 Workflow
- **Process**
  - Upload the binary employee roster and the tab-separated punch log
  - Every upload produces a timestamped workbook and JSON dataset
- **Query**
  - Search records by employee and date range
  - Per-employee dashboards, batch summary, rankings and trends
- **Download**
  - Fetch the most recent Excel workbook

### 📏 Rules
- Office starts at **09:30**; any later first punch is late
- **7h** or more is a full day, **4h** to 7h is a half day

### 📦 Response Format
- JSON responses; `data_available` is false until a batch has been processed

---
Built with **Rust**, **Actix Web**, **rust_xlsxwriter**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::process::process_upload,

        crate::api::attendance::search_records,
        crate::api::attendance::list_employees,
        crate::api::attendance::get_dashboard,

        crate::api::report::get_summary,
        crate::api::report::download_latest,
        crate::api::report::health
    ),
    components(
        schemas(
            ProcessUpload,
            ProcessResponse,
            SearchQuery,
            SearchResponse,
            EmployeeListResponse,
            SummaryResponse,
            HealthResponse,
            EmployeeId,
            Employee,
            AttendanceRecord,
            AttendanceStatus,
            LateFlag,
            AttendanceSummary,
            BatchOverview,
            EmployeeStats,
            RankedEmployee,
            Rankings,
            MonthlyTrend,
            WeeklyPunctuality,
            StatusCount,
            DailyHours,
            EmployeeDashboard
        )
    ),
    tags(
        (name = "Processing", description = "Batch upload and report generation"),
        (name = "Attendance", description = "Record search and employee dashboards"),
        (name = "Reports", description = "Batch summary and workbook download"),
        (name = "Health", description = "Service status"),
    )
)]
pub struct ApiDoc;
