use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, error, info};

use crate::model::punch::PunchEvent;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse raw attendance log bytes.
///
/// Logs that are not UTF-8 are treated as unreadable and yield no events.
pub fn parse_punch_bytes(bytes: &[u8]) -> Vec<PunchEvent> {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse_punch_log(text),
        Err(e) => {
            error!(error = %e, "Attendance log is not valid UTF-8");
            Vec::new()
        }
    }
}

pub fn read_punch_file(path: &Path) -> Vec<PunchEvent> {
    match std::fs::read(path) {
        Ok(bytes) => {
            info!(path = %path.display(), size = bytes.len(), "Read attendance log");
            parse_punch_bytes(&bytes)
        }
        Err(e) => {
            error!(error = %e, path = %path.display(), "Attendance log unreadable");
            Vec::new()
        }
    }
}

/// One event per `id<TAB>YYYY-MM-DD HH:MM:SS` line, in input order.
pub fn parse_punch_log(text: &str) -> Vec<PunchEvent> {
    let events: Vec<PunchEvent> = text
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| parse_line(idx + 1, line))
        .collect();

    info!(events = events.len(), "Parsed attendance log");
    events
}

fn parse_line(line_no: usize, line: &str) -> Option<PunchEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut fields = line.split('\t');
    let (Some(id), Some(stamp)) = (fields.next(), fields.next()) else {
        debug!(line_no, line, "Skipping attendance line with too few fields");
        return None;
    };

    let id = id.trim();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        debug!(line_no, line, "Skipping attendance line with non-numeric employee id");
        return None;
    }

    match NaiveDateTime::parse_from_str(stamp.trim(), TIMESTAMP_FORMAT) {
        Ok(timestamp) => Some(PunchEvent::new(id, timestamp)),
        Err(e) => {
            debug!(line_no, line, error = %e, "Skipping malformed attendance line");
            None
        }
    }
}
