use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::employee::EmployeeId;

/// Single badge swipe read from the attendance log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchEvent {
    pub employee_id: EmployeeId,
    pub timestamp: NaiveDateTime,
}

impl PunchEvent {
    pub fn new(employee_id: impl Into<EmployeeId>, timestamp: NaiveDateTime) -> Self {
        Self {
            employee_id: employee_id.into(),
            timestamp,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }
}
