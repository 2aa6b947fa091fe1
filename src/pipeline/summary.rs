use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use strum::IntoEnumIterator;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::{Employee, EmployeeId};
use crate::model::summary::{
    AttendanceSummary, BatchOverview, DailyHours, EmployeeDashboard, EmployeeStats, MonthlyTrend,
    RankedEmployee, Rankings, StatusCount, WeeklyPunctuality,
};
use crate::pipeline::reconcile::round2;

pub const DEFAULT_TOP_N: usize = 10;
/// Days shown in an employee dashboard's hours series.
pub const DASHBOARD_DAYS: usize = 30;

/// Every table the report and the summary endpoint expose.
pub fn summarize(records: &[AttendanceRecord], top_n: usize) -> AttendanceSummary {
    let employees = employee_stats(records);
    let rankings = rankings(&employees, top_n);

    AttendanceSummary {
        overview: overview(records),
        rankings,
        employees,
        monthly_trends: monthly_trends(records),
        weekly_punctuality: weekly_punctuality(records),
    }
}

fn by_employee(records: &[AttendanceRecord]) -> BTreeMap<&EmployeeId, Vec<&AttendanceRecord>> {
    let mut groups: BTreeMap<&EmployeeId, Vec<&AttendanceRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(&record.employee_id).or_default().push(record);
    }
    groups
}

/// `(present - late) / present`. Late half days count against PRESENT-only
/// totals, so the rate can drop below zero.
fn punctuality(present: u32, late: u32) -> f64 {
    if present == 0 {
        0.0
    } else {
        (f64::from(present) - f64::from(late)) / f64::from(present)
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

fn count(records: &[&AttendanceRecord], pred: impl Fn(&AttendanceRecord) -> bool) -> u32 {
    records.iter().filter(|r| pred(r)).count() as u32
}

/// Mean over days with recorded hours; single-punch days do not drag it down.
fn mean_worked_hours(records: &[&AttendanceRecord]) -> f64 {
    let worked: Vec<f64> = records
        .iter()
        .map(|r| r.working_hours)
        .filter(|h| *h > 0.0)
        .collect();
    if worked.is_empty() {
        0.0
    } else {
        round2(worked.iter().sum::<f64>() / worked.len() as f64)
    }
}

pub fn employee_stats(records: &[AttendanceRecord]) -> Vec<EmployeeStats> {
    by_employee(records)
        .into_iter()
        .map(|(id, days)| {
            let total: f64 = days.iter().map(|r| r.working_hours).sum();
            let days_count = days.len() as u32;
            let late_count = count(&days, |r| r.is_late);
            let present_days = count(&days, |r| r.status != AttendanceStatus::Absent);

            EmployeeStats {
                employee_id: id.clone(),
                employee_name: days[0].employee_name.clone(),
                avg_hours: round2(total / f64::from(days_count)),
                total_hours: round2(total),
                days_count,
                late_count,
                present_days,
                punctuality_rate: punctuality(present_days, late_count),
            }
        })
        .collect()
}

pub fn overview(records: &[AttendanceRecord]) -> BatchOverview {
    let employees: HashSet<&EmployeeId> = records.iter().map(|r| &r.employee_id).collect();
    let days: HashSet<(&EmployeeId, NaiveDate)> =
        records.iter().map(|r| (&r.employee_id, r.date)).collect();
    let attended_days: HashSet<(&EmployeeId, NaiveDate)> = records
        .iter()
        .filter(|r| r.status.is_attended())
        .map(|r| (&r.employee_id, r.date))
        .collect();

    BatchOverview {
        total_employees: employees.len() as u32,
        total_records: records.len() as u32,
        attended_records: records.iter().filter(|r| r.status.is_attended()).count() as u32,
        late_records: records.iter().filter(|r| r.is_late).count() as u32,
        attendance_rate: ratio(attended_days.len() as u32, days.len() as u32),
    }
}

/// Highest first; ties keep employee id order.
fn top_by(stats: &[EmployeeStats], top_n: usize, value: impl Fn(&EmployeeStats) -> f64) -> Vec<RankedEmployee> {
    let mut ranked: Vec<&EmployeeStats> = stats.iter().collect();
    ranked.sort_by(|a, b| value(b).total_cmp(&value(a)));

    ranked
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(idx, s)| RankedEmployee {
            rank: idx as u32 + 1,
            employee_id: s.employee_id.clone(),
            employee_name: s.employee_name.clone(),
            value: value(s),
        })
        .collect()
}

pub fn rankings(stats: &[EmployeeStats], top_n: usize) -> Rankings {
    Rankings {
        by_avg_hours: top_by(stats, top_n, |s| s.avg_hours),
        by_punctuality: top_by(stats, top_n, |s| s.punctuality_rate),
    }
}

pub fn monthly_trends(records: &[AttendanceRecord]) -> Vec<MonthlyTrend> {
    let mut months: BTreeMap<(&EmployeeId, String), Vec<&AttendanceRecord>> = BTreeMap::new();
    for record in records {
        let month = record.date.format("%Y-%m").to_string();
        months.entry((&record.employee_id, month)).or_default().push(record);
    }

    months
        .into_iter()
        .map(|((id, month), days)| {
            let present_days = count(&days, |r| r.status == AttendanceStatus::Present);
            let late_days = count(&days, |r| r.is_late);
            MonthlyTrend {
                employee_id: id.clone(),
                month,
                total_days: days.len() as u32,
                present_days,
                late_days,
                avg_hours: mean_worked_hours(&days),
                punctuality_rate: punctuality(present_days, late_days),
            }
        })
        .collect()
}

pub fn weekly_punctuality(records: &[AttendanceRecord]) -> Vec<WeeklyPunctuality> {
    let mut weeks: BTreeMap<(&EmployeeId, (i32, u32)), (u32, u32)> = BTreeMap::new();
    for record in records.iter().filter(|r| r.check_in.is_some()) {
        let week = record.date.iso_week();
        let tally = weeks
            .entry((&record.employee_id, (week.year(), week.week())))
            .or_default();
        if record.is_late {
            tally.1 += 1;
        } else {
            tally.0 += 1;
        }
    }

    weeks
        .into_iter()
        .map(|((id, (year, week)), (on_time, late))| WeeklyPunctuality {
            employee_id: id.clone(),
            week: format!("{year}-W{week:02}"),
            on_time,
            late,
        })
        .collect()
}

/// Precomputed per-employee view; `None` when the employee has no records.
pub fn employee_dashboard(records: &[AttendanceRecord], employee_id: &str) -> Option<EmployeeDashboard> {
    let mut days: Vec<&AttendanceRecord> = records
        .iter()
        .filter(|r| r.employee_id.matches(employee_id))
        .collect();
    let first = days.first()?;
    let (id, name) = (first.employee_id.clone(), first.employee_name.clone());

    days.sort_by_key(|r| r.date);

    let present_days = count(&days, |r| r.status == AttendanceStatus::Present);
    let late_days = count(&days, |r| r.is_late);
    let status_distribution = AttendanceStatus::iter()
        .map(|status| StatusCount {
            status,
            count: count(&days, |r| r.status == status),
        })
        .collect();
    let recent_days = days[days.len().saturating_sub(DASHBOARD_DAYS)..]
        .iter()
        .map(|r| DailyHours {
            date: r.date,
            working_hours: r.working_hours,
            status: r.status,
            is_late: r.is_late,
        })
        .collect();

    Some(EmployeeDashboard {
        employee_id: id,
        employee_name: name,
        total_records: days.len() as u32,
        present_days,
        late_days,
        avg_hours: mean_worked_hours(&days),
        punctuality_rate: punctuality(present_days, late_days),
        last_check_in: days.last().and_then(|r| r.check_in),
        status_distribution,
        recent_days,
    })
}

/// Distinct employees present in the records, ordered by id.
pub fn distinct_employees(records: &[AttendanceRecord]) -> Vec<Employee> {
    by_employee(records)
        .into_iter()
        .map(|(id, days)| Employee {
            employee_id: id.clone(),
            employee_name: days[0].employee_name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::Directory;
    use crate::pipeline::punches::parse_punch_log;
    use crate::pipeline::reconcile::reconcile;

    fn sample() -> Vec<AttendanceRecord> {
        let log = "\
1\t2024-01-08 09:00:00\n1\t2024-01-08 17:00:00\n\
1\t2024-01-09 09:45:00\n1\t2024-01-09 17:45:00\n\
1\t2024-02-05 09:10:00\n1\t2024-02-05 14:10:00\n\
2\t2024-01-08 10:00:00\n\
2\t2024-01-09 09:00:00\n2\t2024-01-09 19:00:00\n\
3\t2024-01-08 09:20:00\n3\t2024-01-08 18:20:00\n";
        let directory: Directory = [("1", "Ann"), ("2", "Ben"), ("3", "Cid")].into_iter().collect();
        reconcile(&parse_punch_log(log), &directory)
    }

    #[test]
    fn per_employee_stats() {
        let stats = employee_stats(&sample());

        assert_eq!(stats.len(), 3);
        let ann = &stats[0];
        assert_eq!(ann.employee_id.as_str(), "1");
        assert_eq!(ann.days_count, 3);
        assert_eq!(ann.total_hours, 21.0);
        assert_eq!(ann.avg_hours, 7.0);
        assert_eq!(ann.late_count, 1);
        assert_eq!(ann.present_days, 3);
        assert!((ann.punctuality_rate - 2.0 / 3.0).abs() < 1e-9);

        let ben = &stats[1];
        assert_eq!(ben.avg_hours, 5.0);
        assert_eq!(ben.late_count, 1);
        assert_eq!(ben.punctuality_rate, 0.5);
    }

    #[test]
    fn punctuality_is_zero_without_present_days() {
        assert_eq!(ratio(0, 0), 0.0);
        assert_eq!(punctuality(0, 2), 0.0);
    }

    #[test]
    fn late_half_days_can_push_monthly_punctuality_negative() {
        // one on-time full day, two late half days in the same month
        let log = "\
5\t2024-03-04 09:00:00\n5\t2024-03-04 17:00:00\n\
5\t2024-03-05 10:00:00\n5\t2024-03-05 15:00:00\n\
5\t2024-03-06 10:00:00\n5\t2024-03-06 15:00:00\n";
        let records = reconcile(&parse_punch_log(log), &Directory::new());
        assert_eq!(records[1].status, AttendanceStatus::HalfDay);

        let trends = monthly_trends(&records);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].present_days, 1);
        assert_eq!(trends[0].late_days, 2);
        assert_eq!(trends[0].punctuality_rate, -1.0);

        let dashboard = employee_dashboard(&records, "5").unwrap();
        assert_eq!(dashboard.punctuality_rate, -1.0);

        // non-absent days include the half days, so the per-employee rate stays in range
        let stats = employee_stats(&records);
        assert!((stats[0].punctuality_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn overview_counts_unique_employee_days() {
        let mut records = sample();
        // a duplicated day must not inflate the rate
        records.push(records[0].clone());
        let mut absent = records[3].clone();
        absent.date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        absent.status = AttendanceStatus::Absent;
        absent.check_in = None;
        records.push(absent);

        let overview = overview(&records);

        assert_eq!(overview.total_employees, 3);
        assert_eq!(overview.total_records, 8);
        assert_eq!(overview.attended_records, 7);
        assert!((overview.attendance_rate - 6.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn empty_records_give_zero_rates() {
        let summary = summarize(&[], DEFAULT_TOP_N);

        assert_eq!(summary.overview.attendance_rate, 0.0);
        assert!(summary.employees.is_empty());
        assert!(summary.rankings.by_avg_hours.is_empty());
    }

    #[test]
    fn rankings_are_bounded_and_sorted() {
        let summary = summarize(&sample(), 2);

        let hours: Vec<&str> = summary
            .rankings
            .by_avg_hours
            .iter()
            .map(|r| r.employee_id.as_str())
            .collect();
        assert_eq!(hours, vec!["3", "1"]);
        assert_eq!(summary.rankings.by_avg_hours[0].rank, 1);

        let all = summarize(&sample(), DEFAULT_TOP_N);
        assert_eq!(all.rankings.by_punctuality.len(), 3);
        assert_eq!(all.rankings.by_punctuality[0].employee_id.as_str(), "3");
        assert_eq!(all.rankings.by_punctuality[0].value, 1.0);
    }

    #[test]
    fn monthly_trends_split_by_month() {
        let trends = monthly_trends(&sample());

        let ann: Vec<&MonthlyTrend> = trends.iter().filter(|t| t.employee_id.as_str() == "1").collect();
        assert_eq!(ann.len(), 2);
        assert_eq!(ann[0].month, "2024-01");
        assert_eq!(ann[0].total_days, 2);
        assert_eq!(ann[0].late_days, 1);
        assert_eq!(ann[0].avg_hours, 8.0);
        assert_eq!(ann[1].month, "2024-02");
        assert_eq!(ann[1].present_days, 0);
        assert_eq!(ann[1].punctuality_rate, 0.0);
    }

    #[test]
    fn monthly_average_ignores_zero_hour_days() {
        let trends = monthly_trends(&sample());

        let ben = trends.iter().find(|t| t.employee_id.as_str() == "2").unwrap();
        assert_eq!(ben.avg_hours, 10.0);
    }

    #[test]
    fn weekly_punctuality_uses_iso_weeks() {
        let weeks = weekly_punctuality(&sample());

        let ann: Vec<&WeeklyPunctuality> = weeks.iter().filter(|w| w.employee_id.as_str() == "1").collect();
        assert_eq!(ann[0].week, "2024-W02");
        assert_eq!((ann[0].on_time, ann[0].late), (1, 1));
        assert_eq!(ann[1].week, "2024-W06");
    }

    #[test]
    fn dashboard_for_known_and_unknown_employee() {
        let records = sample();

        let ben = employee_dashboard(&records, "2").unwrap();
        assert_eq!(ben.employee_name, "Ben");
        assert_eq!(ben.total_records, 2);
        assert_eq!(ben.present_days, 2);
        assert_eq!(ben.late_days, 1);
        assert_eq!(ben.last_check_in.map(|t| t.to_string()), Some("09:00:00".to_string()));
        assert_eq!(ben.status_distribution.len(), 3);
        assert_eq!(ben.status_distribution[0].count, 2);
        assert_eq!(ben.recent_days.len(), 2);

        assert!(employee_dashboard(&records, "99").is_none());
    }

    #[test]
    fn distinct_employees_are_ordered_by_id() {
        let employees = distinct_employees(&sample());

        let names: Vec<&str> = employees.iter().map(|e| e.employee_name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Ben", "Cid"]);
    }
}
