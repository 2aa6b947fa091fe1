//! Recovers the employee directory from the biometric device's binary roster.
//!
//! The roster layout is undocumented, so both extractors are heuristics
//! over a byte slice: they never fail, they only find fewer employees.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::model::employee::{Directory, EmployeeId};

const MAX_NAME_LEN: usize = 50;
const ID_SEARCH_WINDOW: usize = 100;
const MAX_ID_DIGITS: usize = 3;
/// Bytes read per id candidate.
const ID_READ_LEN: usize = 10;
/// Bytes skipped past an accepted name so its tail is not matched again.
const NAME_SKIP: usize = 50;
/// The scan stops this many bytes before the end of the buffer.
const TAIL_GUARD: usize = 10;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z\s]*$").expect("valid name pattern"));

static NAME_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z]+)(\d+)").expect("valid name/id pattern"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

fn is_printable(byte: u8) -> bool {
    (0x20..=0x7e).contains(&byte)
}

/// Read the roster file and extract its directory.
///
/// An unreadable file yields an empty directory.
pub fn read_directory_file(path: &Path) -> Directory {
    match std::fs::read(path) {
        Ok(bytes) => {
            info!(path = %path.display(), size = bytes.len(), "Read employee roster");
            extract_directory(&bytes)
        }
        Err(e) => {
            error!(error = %e, path = %path.display(), "Employee roster unreadable");
            Directory::new()
        }
    }
}

/// Primary scan first; the fallback only runs when it finds nobody.
pub fn extract_directory(data: &[u8]) -> Directory {
    let directory = scan_name_records(data);
    if !directory.is_empty() {
        info!(employees = directory.len(), "Loaded employees from roster");
        return directory;
    }

    warn!("Primary roster scan found no employees, trying inline name/id extraction");
    let directory = scan_inline_pairs(data);
    info!(employees = directory.len(), "Loaded employees with inline extraction");
    directory
}

/// Scans for null-terminated names, each followed within a short window by a numeric id.
pub fn scan_name_records(data: &[u8]) -> Directory {
    let mut directory = Directory::new();
    let mut pos = 0;

    while pos + TAIL_GUARD < data.len() {
        let run_end = printable_run_end(data, pos);

        match candidate_name(&data[pos..run_end]) {
            Some(name) => {
                if let Some(id) = find_id_after(data, run_end) {
                    debug!(employee_id = %id, name, "Found roster entry");
                    directory.insert(id, name);
                }
                pos = run_end + NAME_SKIP;
            }
            None => pos += 1,
        }
    }

    directory
}

/// End of the printable run starting at `start`, capped at `MAX_NAME_LEN` bytes.
fn printable_run_end(data: &[u8], start: usize) -> usize {
    let limit = data.len().min(start + MAX_NAME_LEN);
    data[start..limit]
        .iter()
        .position(|&b| b == 0 || !is_printable(b))
        .map_or(limit, |offset| start + offset)
}

fn candidate_name(run: &[u8]) -> Option<&str> {
    if run.len() <= 2 {
        return None;
    }
    // The run is printable ASCII, so this only fails on a logic error upstream.
    let text = std::str::from_utf8(run).ok()?.trim();
    NAME_PATTERN.is_match(text).then_some(text)
}

/// Looks for at most three digits after a name, skipping null padding.
///
/// Every offset in the window is a candidate, so the tail of a longer
/// digit run (`345` in `12345`) still counts.
fn find_id_after(data: &[u8], name_end: usize) -> Option<EmployeeId> {
    let start = data[name_end..]
        .iter()
        .position(|&b| b != 0)
        .map_or(data.len(), |offset| name_end + offset);
    let window_end = data.len().min(start + ID_SEARCH_WINDOW);

    for pos in start..window_end {
        let read_end = data.len().min(pos + ID_READ_LEN);
        let digits_end = data[pos..read_end]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(read_end, |offset| pos + offset);

        if (1..=MAX_ID_DIGITS).contains(&(digits_end - pos)) {
            let id = std::str::from_utf8(&data[pos..digits_end]).ok()?;
            return Some(EmployeeId::new(id));
        }
    }

    None
}

/// Fallback for rosters that store names and ids back to back, e.g. `Alice12 Bob7`.
pub fn scan_inline_pairs(data: &[u8]) -> Directory {
    let printable: String = data
        .iter()
        .map(|&b| if is_printable(b) { b as char } else { ' ' })
        .collect();
    let text = WHITESPACE.replace_all(&printable, " ");
    let text = text.trim();

    let mut directory = Directory::new();
    for caps in NAME_ID_PATTERN.captures_iter(text) {
        let (Some(name), Some(id)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if id.as_str().len() > MAX_ID_DIGITS {
            continue;
        }
        let boundary_ok = text[id.end()..]
            .chars()
            .next()
            .is_none_or(|c| c.is_ascii_uppercase() || c.is_whitespace());
        if !boundary_ok {
            continue;
        }

        debug!(employee_id = id.as_str(), name = name.as_str(), "Found inline roster entry");
        directory.insert(EmployeeId::new(id.as_str()), name.as_str());
    }

    directory
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, id: &str) -> Vec<u8> {
        let mut bytes = vec![0xff, 0x01];
        bytes.extend_from_slice(name.as_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes.extend_from_slice(id.as_bytes());
        bytes.extend(std::iter::repeat_n(0u8, 80));
        bytes
    }

    #[test]
    fn finds_name_followed_by_padded_id() {
        let directory = extract_directory(&record("Jane Doe", "007"));

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.get(&"007".into()), Some("Jane Doe"));
    }

    #[test]
    fn reads_consecutive_records_and_last_duplicate_wins() {
        let mut data = record("Alice Smith", "1");
        data.extend(record("Bob", "22"));
        data.extend(record("Carol", "1"));

        let directory = scan_name_records(&data);

        assert_eq!(directory.len(), 2);
        assert_eq!(directory.get(&"1".into()), Some("Carol"));
        assert_eq!(directory.get(&"22".into()), Some("Bob"));
    }

    #[test]
    fn rejects_names_containing_digits() {
        let mut data = record("R2D2", "5");
        data.extend(record("Agent 99x", "6"));

        assert!(scan_name_records(&data).is_empty());
    }

    #[test]
    fn long_digit_run_yields_its_last_three_digits() {
        let mut data = vec![0x02];
        data.extend_from_slice(b"Dave\0\x0512345\0");
        data.extend(std::iter::repeat_n(0u8, 40));

        let directory = scan_name_records(&data);

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.get(&"345".into()), Some("Dave"));
    }

    #[test]
    fn long_digit_run_wins_over_a_later_short_id() {
        let mut data = vec![0x02];
        data.extend_from_slice(b"Dave\0\x0512345\x05");
        data.extend_from_slice(b"42");
        data.extend(std::iter::repeat_n(0u8, 40));

        let directory = scan_name_records(&data);

        assert_eq!(directory.get(&"345".into()), Some("Dave"));
        assert!(directory.get(&"42".into()).is_none());
    }

    fn id_after_filler(filler: usize) -> Vec<u8> {
        let mut data = vec![0x02];
        data.extend_from_slice(b"Fay\0\0");
        data.extend(std::iter::repeat_n(0x05u8, filler));
        data.push(b'7');
        data.extend(std::iter::repeat_n(0u8, 40));
        data
    }

    #[test]
    fn id_search_stops_one_hundred_bytes_past_the_padding() {
        let inside = scan_name_records(&id_after_filler(ID_SEARCH_WINDOW - 1));
        assert_eq!(inside.get(&"7".into()), Some("Fay"));

        assert!(scan_name_records(&id_after_filler(ID_SEARCH_WINDOW)).is_empty());
    }

    #[test]
    fn names_are_cut_at_fifty_bytes() {
        let long_name = "A".repeat(60);
        let mut data = vec![0x02];
        data.extend_from_slice(long_name.as_bytes());
        data.extend_from_slice(b"\0\0");
        data.extend_from_slice(b"12");
        data.extend(std::iter::repeat_n(0u8, 40));

        let directory = scan_name_records(&data);

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.get(&"12".into()), Some("A".repeat(MAX_NAME_LEN).as_str()));
    }

    #[test]
    fn last_ten_bytes_are_never_scanned() {
        let mut data = vec![0u8; 30];
        data.extend_from_slice(b"Zed\0");
        data.extend_from_slice(b"5");
        data.extend_from_slice(&[0, 0]);
        assert!(data.len() - 30 <= TAIL_GUARD);

        assert!(scan_name_records(&data).is_empty());

        // the same record with room after it is found
        data.extend(std::iter::repeat_n(0u8, TAIL_GUARD));
        assert_eq!(scan_name_records(&data).get(&"5".into()), Some("Zed"));
    }

    #[test]
    fn inline_pair_followed_by_lowercase_is_rejected() {
        let data = b"\x01Alice12bob Bob7\x00\x00";

        let directory = scan_inline_pairs(data);

        assert!(directory.get(&"12".into()).is_none());
        assert_eq!(directory.get(&"7".into()), Some("Bob"));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn name_without_id_is_ignored() {
        let mut data = vec![0x02];
        data.extend_from_slice(b"Eve\0");
        data.extend(std::iter::repeat_n(0u8, 150));

        assert!(scan_name_records(&data).is_empty());
    }

    #[test]
    fn falls_back_to_inline_pairs() {
        let data = b"\x01\x02Alice12Bob7\x00Carol345\x03Dan1234 Erin9x\x00\x00";

        assert!(scan_name_records(data).is_empty());
        let directory = extract_directory(data);

        assert_eq!(directory.get(&"12".into()), Some("Alice"));
        assert_eq!(directory.get(&"7".into()), Some("Bob"));
        assert_eq!(directory.get(&"345".into()), Some("Carol"));
        assert!(directory.get(&"1234".into()).is_none());
        assert!(directory.get(&"9".into()).is_none());
        assert_eq!(directory.len(), 3);
    }

    #[test]
    fn garbage_and_tiny_inputs_yield_empty_directory() {
        assert!(extract_directory(&[]).is_empty());
        assert!(extract_directory(&[0xff; 5]).is_empty());
        let noise: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let _ = extract_directory(&noise);
    }

    #[test]
    fn missing_file_yields_empty_directory() {
        assert!(read_directory_file(Path::new("/nonexistent/roster.dat")).is_empty());
    }
}
