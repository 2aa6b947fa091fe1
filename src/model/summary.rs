use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::attendance::AttendanceStatus;
use super::employee::EmployeeId;

/// Per-employee totals over the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeStats {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub avg_hours: f64,
    pub total_hours: f64,
    pub days_count: u32,
    pub late_count: u32,
    pub present_days: u32,
    /// `(present_days - late_count) / present_days`, 0 without present days.
    pub punctuality_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchOverview {
    pub total_employees: u32,
    pub total_records: u32,
    pub attended_records: u32,
    pub late_records: u32,
    /// Attended employee-days over all distinct employee-days.
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RankedEmployee {
    pub rank: u32,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Rankings {
    pub by_avg_hours: Vec<RankedEmployee>,
    pub by_punctuality: Vec<RankedEmployee>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyTrend {
    pub employee_id: EmployeeId,
    #[schema(example = "2024-01")]
    pub month: String,
    pub total_days: u32,
    pub present_days: u32,
    pub late_days: u32,
    pub avg_hours: f64,
    pub punctuality_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeeklyPunctuality {
    pub employee_id: EmployeeId,
    #[schema(example = "2024-W02")]
    pub week: String,
    pub on_time: u32,
    pub late: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: AttendanceStatus,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyHours {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub working_hours: f64,
    pub status: AttendanceStatus,
    pub is_late: bool,
}

/// Precomputed view of one employee, replacing the dropdown-driven sheet formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeDashboard {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub total_records: u32,
    pub present_days: u32,
    pub late_days: u32,
    pub avg_hours: f64,
    pub punctuality_rate: f64,
    #[schema(value_type = Option<String>, example = "09:15:00")]
    pub last_check_in: Option<NaiveTime>,
    pub status_distribution: Vec<StatusCount>,
    pub recent_days: Vec<DailyHours>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceSummary {
    pub overview: BatchOverview,
    pub employees: Vec<EmployeeStats>,
    pub rankings: Rankings,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub weekly_punctuality: Vec<WeeklyPunctuality>,
}
