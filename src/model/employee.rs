use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employee identifier exactly as it appears in the source files.
///
/// Kept as a string token: `"007"` and `"7"` are different employees.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "007")]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive exact match, used by record queries.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "employee_id": "007", "employee_name": "Jane Doe" }))]
pub struct Employee {
    pub employee_id: EmployeeId,
    pub employee_name: String,
}

/// Employee id to name mapping recovered from the roster file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Directory(BTreeMap<EmployeeId, String>);

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins on duplicate ids.
    pub fn insert(&mut self, id: EmployeeId, name: impl Into<String>) {
        self.0.insert(id, name.into());
    }

    pub fn get(&self, id: &EmployeeId) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    /// Directory name, or `Unknown_<id>` when the id was never recovered.
    pub fn resolve(&self, id: &EmployeeId) -> String {
        self.get(id)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Unknown_{id}"))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<I: Into<EmployeeId>, N: Into<String>> FromIterator<(I, N)> for Directory {
    fn from_iter<T: IntoIterator<Item = (I, N)>>(iter: T) -> Self {
        let mut directory = Directory::new();
        for (id, name) in iter {
            directory.insert(id.into(), name);
        }
        directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_keep_leading_zeros() {
        assert_ne!(EmployeeId::from("007"), EmployeeId::from("7"));
        assert!(EmployeeId::from("007").matches(" 007 "));
        assert!(!EmployeeId::from("007").matches("7"));
    }

    #[test]
    fn resolve_falls_back_to_unknown_placeholder() {
        let directory: Directory = [("007", "Jane Doe")].into_iter().collect();

        assert_eq!(directory.resolve(&"007".into()), "Jane Doe");
        assert_eq!(directory.resolve(&"042".into()), "Unknown_042");
    }

    #[test]
    fn duplicate_ids_keep_last_name() {
        let directory: Directory = [("1", "Alice"), ("1", "Bob")].into_iter().collect();

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.get(&"1".into()), Some("Bob"));
    }
}
