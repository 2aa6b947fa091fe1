//! Report tables built from reconciled records and their summary.

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::summary::{
    AttendanceSummary, EmployeeDashboard, EmployeeStats, MonthlyTrend, RankedEmployee, WeeklyPunctuality,
};

use super::cell::{CellValue, DataTable};

/// Ranking charts truncate names to this many characters.
const CHART_NAME_LEN: usize = 15;

pub const RECORD_HEADERS: [&str; 10] = [
    "Employee_ID",
    "Employee_Name",
    "Date",
    "Check_In",
    "Check_Out",
    "Working_Hours",
    "Late_Minutes",
    "Status",
    "Late_Flag",
    "Is_Late",
];

fn percent(rate: f64) -> CellValue {
    CellValue::Number((rate * 1000.0).round() / 10.0)
}

pub fn record_row(record: &AttendanceRecord) -> Vec<CellValue> {
    vec![
        record.employee_id.to_string().into(),
        record.employee_name.as_str().into(),
        record.date.into(),
        record.check_in.into(),
        record.check_out.into(),
        record.working_hours.into(),
        record.late_minutes.into(),
        record.status.to_string().into(),
        record.late_flag.to_string().into(),
        record.is_late.into(),
    ]
}

pub fn records_table(records: &[AttendanceRecord]) -> DataTable {
    let mut table = DataTable::new("Attendance Records", &RECORD_HEADERS);
    for record in records {
        table.push_row(record_row(record));
    }
    table
}

pub fn overview_table(summary: &AttendanceSummary) -> DataTable {
    let o = &summary.overview;
    let mut table = DataTable::new("Batch Overview", &["Metric", "Value"]);
    table.push_row(vec!["Total Employees".into(), o.total_employees.into()]);
    table.push_row(vec!["Total Records".into(), o.total_records.into()]);
    table.push_row(vec!["Present/Half-Day Records".into(), o.attended_records.into()]);
    table.push_row(vec!["Late Records".into(), o.late_records.into()]);
    table.push_row(vec!["Attendance Rate (%)".into(), percent(o.attendance_rate)]);
    table
}

pub fn dashboard_table(dashboards: &[EmployeeDashboard]) -> DataTable {
    let mut table = DataTable::new(
        "Employee Metrics",
        &[
            "Employee_ID",
            "Employee_Name",
            "Total_Records",
            "Present_Days",
            "Late_Days",
            "Avg_Hours",
            "Punctuality_Rate (%)",
            "Last_Check_In",
            "Present",
            "Absent",
            "Half_Day",
        ],
    );

    for d in dashboards {
        let status_count = |status: AttendanceStatus| {
            d.status_distribution
                .iter()
                .find(|s| s.status == status)
                .map_or(0, |s| s.count)
        };
        table.push_row(vec![
            d.employee_id.to_string().into(),
            d.employee_name.as_str().into(),
            d.total_records.into(),
            d.present_days.into(),
            d.late_days.into(),
            d.avg_hours.into(),
            percent(d.punctuality_rate),
            d.last_check_in.into(),
            status_count(AttendanceStatus::Present).into(),
            status_count(AttendanceStatus::Absent).into(),
            status_count(AttendanceStatus::HalfDay).into(),
        ]);
    }
    table
}

pub fn employee_stats_table(stats: &[EmployeeStats]) -> DataTable {
    let mut table = DataTable::new(
        "Employee Performance Comparison",
        &[
            "Employee_ID",
            "Employee_Name",
            "Avg_Hours",
            "Total_Hours",
            "Days_Count",
            "Present_Days",
            "Late_Count",
            "Punctuality_Rate (%)",
        ],
    );
    for s in stats {
        table.push_row(vec![
            s.employee_id.to_string().into(),
            s.employee_name.as_str().into(),
            s.avg_hours.into(),
            s.total_hours.into(),
            s.days_count.into(),
            s.present_days.into(),
            s.late_count.into(),
            percent(s.punctuality_rate),
        ]);
    }
    table
}

/// Two-column table feeding a ranking chart; `as_percent` scales rates to 0-100.
pub fn ranking_table(title: &str, value_header: &'static str, ranked: &[RankedEmployee], as_percent: bool) -> DataTable {
    let mut table = DataTable::new(title, &["Employee", value_header]);
    for r in ranked {
        let name: String = r.employee_name.chars().take(CHART_NAME_LEN).collect();
        let value = if as_percent { percent(r.value) } else { r.value.into() };
        table.push_row(vec![name.into(), value]);
    }
    table
}

pub fn monthly_trends_table(trends: &[MonthlyTrend]) -> DataTable {
    let mut table = DataTable::new(
        "Monthly Trends",
        &[
            "Employee_ID",
            "Month",
            "Total Days",
            "Present Days",
            "Late Days",
            "Avg Hours",
            "Punctuality %",
        ],
    );
    for t in trends {
        table.push_row(vec![
            t.employee_id.to_string().into(),
            t.month.as_str().into(),
            t.total_days.into(),
            t.present_days.into(),
            t.late_days.into(),
            t.avg_hours.into(),
            percent(t.punctuality_rate),
        ]);
    }
    table
}

pub fn weekly_punctuality_table(weeks: &[WeeklyPunctuality]) -> DataTable {
    let mut table = DataTable::new("Punctuality Analysis", &["Employee_ID", "Week", "On Time", "Late"]);
    for w in weeks {
        table.push_row(vec![
            w.employee_id.to_string().into(),
            w.week.as_str().into(),
            w.on_time.into(),
            w.late.into(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::Directory;
    use crate::pipeline::punches::parse_punch_log;
    use crate::pipeline::reconcile::reconcile;
    use crate::pipeline::summary::{summarize, DEFAULT_TOP_N};

    fn records() -> Vec<AttendanceRecord> {
        let log = "007\t2024-01-10 09:15:00\n007\t2024-01-10 17:20:00\n042\t2024-02-01 10:00:00\n";
        let directory: Directory = [("007", "Jane Doe")].into_iter().collect();
        reconcile(&parse_punch_log(log), &directory)
    }

    #[test]
    fn record_rows_mark_missing_check_out() {
        let table = records_table(&records());

        assert_eq!(table.width(), RECORD_HEADERS.len());
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][3].display(), "09:15:00");
        assert_eq!(table.rows[0][5], CellValue::Number(8.08));
        assert_eq!(table.rows[1][4], CellValue::Empty);
        assert_eq!(table.rows[1][4].display(), "N/A");
        assert_eq!(table.rows[1][7].display(), "PRESENT");
        assert_eq!(table.rows[1][8].display(), "LATE");
        assert_eq!(table.rows[0][8].display(), "ON_TIME");
        assert_eq!(table.rows[1][9], CellValue::Bool(true));
    }

    #[test]
    fn rates_render_as_percentages() {
        let summary = summarize(&records(), DEFAULT_TOP_N);

        let overview = overview_table(&summary);
        assert_eq!(overview.rows[4][1], CellValue::Number(100.0));

        let stats = employee_stats_table(&summary.employees);
        let unknown = stats.rows.iter().find(|r| r[0].display() == "042").unwrap();
        assert_eq!(unknown[7], CellValue::Number(0.0));

        // hours are rounded once, in the summary
        let jane = stats.rows.iter().find(|r| r[0].display() == "007").unwrap();
        assert_eq!(jane[3], CellValue::Number(summary.employees[0].total_hours));
        assert_eq!(jane[3], CellValue::Number(8.08));
    }

    #[test]
    fn ranking_names_are_truncated() {
        let ranked = vec![RankedEmployee {
            rank: 1,
            employee_id: "1".into(),
            employee_name: "Maximilian Alexander".to_string(),
            value: 0.875,
        }];

        let table = ranking_table("Top", "Punctuality Rate (%)", &ranked, true);

        assert_eq!(table.rows[0][0].display(), "Maximilian Alex");
        assert_eq!(table.rows[0][1], CellValue::Number(87.5));
    }
}
