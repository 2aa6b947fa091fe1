use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use tracing::info;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus, LateFlag};
use crate::model::employee::{Directory, EmployeeId};
use crate::model::punch::PunchEvent;

/// Check-ins after this time are late.
pub const OFFICE_START: NaiveTime = match NaiveTime::from_hms_opt(9, 30, 0) {
    Some(t) => t,
    None => panic!("invalid office start"),
};

pub const FULL_DAY_HOURS: f64 = 7.0;
pub const HALF_DAY_HOURS: f64 = 4.0;

/// Fold punch events into one record per employee per day.
///
/// Days appear in the order their first punch appears in `events`.
pub fn reconcile(events: &[PunchEvent], directory: &Directory) -> Vec<AttendanceRecord> {
    let mut index: HashMap<(&EmployeeId, NaiveDate), usize> = HashMap::new();
    let mut days: Vec<(&EmployeeId, NaiveDate, Vec<NaiveTime>)> = Vec::new();

    for event in events {
        let key = (&event.employee_id, event.date());
        let slot = *index.entry(key).or_insert_with(|| {
            days.push((&event.employee_id, event.date(), Vec::new()));
            days.len() - 1
        });
        days[slot].2.push(event.time());
    }

    let records: Vec<AttendanceRecord> = days
        .into_iter()
        .map(|(id, date, mut times)| {
            times.sort_unstable();
            day_record(id, directory.resolve(id), date, &times)
        })
        .collect();

    info!(records = records.len(), "Reconciled employee-day records");
    records
}

/// `times` must be sorted ascending.
fn day_record(id: &EmployeeId, name: String, date: NaiveDate, times: &[NaiveTime]) -> AttendanceRecord {
    let check_in = times.first().copied();
    // A single punch cannot establish an interval.
    let check_out = if times.len() > 1 { times.last().copied() } else { None };

    let working_hours = match (check_in, check_out) {
        (Some(start), Some(end)) => (end - start).num_seconds() as f64 / 3600.0,
        _ => 0.0,
    };

    let late_minutes = match check_in {
        Some(t) if t > OFFICE_START => Some((t - OFFICE_START).num_minutes() as u32),
        _ => None,
    };
    let is_late = late_minutes.is_some();

    let status = classify(check_in.is_some(), working_hours);
    let late_flag = match (status, is_late) {
        (AttendanceStatus::Absent, _) => LateFlag::Absent,
        (_, true) => LateFlag::Late,
        (_, false) => LateFlag::OnTime,
    };

    AttendanceRecord {
        employee_id: id.clone(),
        employee_name: name,
        date,
        check_in,
        check_out,
        working_hours: round2(working_hours),
        late_minutes: late_minutes.unwrap_or(0),
        status,
        late_flag,
        is_late,
    }
}

/// Under four hours with a check-in still counts as present; only `[4, 7)` is a half day.
pub fn classify(checked_in: bool, working_hours: f64) -> AttendanceStatus {
    if !checked_in {
        AttendanceStatus::Absent
    } else if working_hours >= FULL_DAY_HOURS {
        AttendanceStatus::Present
    } else if working_hours >= HALF_DAY_HOURS {
        AttendanceStatus::HalfDay
    } else {
        AttendanceStatus::Present
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
