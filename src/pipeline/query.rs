use chrono::NaiveDate;

use crate::model::attendance::AttendanceRecord;

/// Optional filters over reconciled records. Empty fields filter nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub employee_id: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn for_employee(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: Some(employee_id.into()),
            ..Self::default()
        }
    }

    pub fn between(mut self, from_date: Option<NaiveDate>, to_date: Option<NaiveDate>) -> Self {
        self.from_date = from_date;
        self.to_date = to_date;
        self
    }

    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        let id_ok = match self.employee_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => record.employee_id.matches(id),
            _ => true,
        };
        id_ok
            && self.from_date.is_none_or(|from| record.date >= from)
            && self.to_date.is_none_or(|to| record.date <= to)
    }
}

/// Records matching `filter`, in dataset order. No match is an empty list.
pub fn filter_records<'a>(records: &'a [AttendanceRecord], filter: &RecordFilter) -> Vec<&'a AttendanceRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}
