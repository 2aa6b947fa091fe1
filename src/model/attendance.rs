use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use super::employee::EmployeeId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
}

impl AttendanceStatus {
    /// Present and half days both count as attended.
    pub fn is_attended(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::HalfDay)
    }
}

/// Same spelling in JSON and in the workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LateFlag {
    Absent,
    Late,
    OnTime,
}

/// One employee's reconciled attendance for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "employee_id": "007",
    "employee_name": "Jane Doe",
    "date": "2024-01-10",
    "check_in": "09:15:00",
    "check_out": "17:20:00",
    "working_hours": 8.08,
    "late_minutes": 0,
    "status": "PRESENT",
    "late_flag": "ON_TIME",
    "is_late": false
}))]
pub struct AttendanceRecord {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, example = "09:15:00")]
    pub check_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "17:20:00")]
    pub check_out: Option<NaiveTime>,
    pub working_hours: f64,
    pub late_minutes: u32,
    pub status: AttendanceStatus,
    pub late_flag: LateFlag,
    pub is_late: bool,
}
