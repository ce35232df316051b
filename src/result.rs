//! Normalized output of one capability invocation.
//!
//! A [`ResultSet`] is always returned, never thrown: launch failures and
//! empty non-zero exits are carried in its `error` field.

use std::fmt;
use std::hash::Hash;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A normalized entry produced by one tool's output parser.
pub trait Record: Serialize {
    /// JSON field name under which the entries of a result set are emitted.
    const FIELD: &'static str;
}

/// Why a tool invocation produced no usable result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolFailure {
    /// The binary could not be spawned (missing, not executable, ...).
    Launch { tool: String, reason: String },
    /// The process ran, exited non-zero and produced nothing parseable.
    Exit { tool: String, code: Option<i32>, stderr: String },
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolFailure::Launch { tool, reason } => write!(
                f,
                "Failed to execute {tool}: {reason}. Make sure {tool} is installed."
            ),
            ToolFailure::Exit { tool, code, stderr } => {
                let code = code.map(|c| c.to_string()).unwrap_or_else(|| "null".to_string());
                write!(f, "{tool} exited with code {code}: {stderr}")
            }
        }
    }
}

/// Exit information of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExitReport {
    pub code: Option<i32>,
    pub stderr: String,
}

impl ExitReport {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet<T> {
    entries: Vec<T>,
    failure: Option<ToolFailure>,
}

impl<T> ResultSet<T> {
    pub fn ok(entries: Vec<T>) -> Self {
        Self { entries, failure: None }
    }

    pub fn failed(failure: ToolFailure) -> Self {
        Self { entries: Vec::new(), failure: Some(failure) }
    }

    pub fn launch_failure(tool: &str, reason: impl fmt::Display) -> Self {
        Self::failed(ToolFailure::Launch {
            tool: tool.to_string(),
            reason: reason.to_string(),
        })
    }

    /// Apply the completion policy: a non-zero exit only counts as an error
    /// when nothing was parsed. Entries always win over the exit code.
    pub fn complete(tool: &str, entries: Vec<T>, exit: ExitReport) -> Self {
        if !exit.success() && entries.is_empty() {
            return Self::failed(ToolFailure::Exit {
                tool: tool.to_string(),
                code: exit.code,
                stderr: exit.stderr,
            });
        }
        if !exit.success() {
            tracing::warn!(tool, code = ?exit.code, entries = entries.len(), "tool exited non-zero, keeping parsed results");
        }
        Self::ok(entries)
    }

    /// Concatenate per-batch result sets in batch order. The merged set only
    /// carries an error when it ended up with no entries at all.
    pub fn merge(parts: Vec<ResultSet<T>>) -> Self {
        let mut entries = Vec::new();
        let mut first_failure = None;
        for part in parts {
            if first_failure.is_none() {
                first_failure = part.failure;
            }
            entries.extend(part.entries);
        }
        if entries.is_empty() {
            if let Some(failure) = first_failure {
                return Self::failed(failure);
            }
        }
        Self::ok(entries)
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn error(&self) -> Option<String> {
        self.failure.as_ref().map(|f| f.to_string())
    }

    pub fn is_error(&self) -> bool {
        self.failure.is_some()
    }

    pub fn is_launch_failure(&self) -> bool {
        matches!(self.failure, Some(ToolFailure::Launch { .. }))
    }

    /// Empty or errored: the workflow treats both as "nothing to continue with".
    pub fn is_dead_end(&self) -> bool {
        self.is_error() || self.is_empty()
    }
}

impl<T: Eq + Hash + Clone> ResultSet<T> {
    /// Set semantics; first occurrence wins.
    pub fn dedup(mut self) -> Self {
        let mut seen = ahash::AHashSet::with_capacity(self.entries.len());
        self.entries.retain(|e| seen.insert(e.clone()));
        self
    }
}

impl<T: Record> Serialize for ResultSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.failure.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(T::FIELD, &self.entries)?;
        map.serialize_entry("count", &self.entries.len())?;
        if let Some(failure) = &self.failure {
            map.serialize_entry("error", &failure.to_string())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
    struct Item(String);

    impl Record for Item {
        const FIELD: &'static str = "items";
    }

    fn items(v: &[&str]) -> Vec<Item> {
        v.iter().map(|s| Item(s.to_string())).collect()
    }

    #[test]
    fn nonzero_exit_without_entries_is_error_with_code() {
        let rs: ResultSet<Item> = ResultSet::complete(
            "tool",
            Vec::new(),
            ExitReport { code: Some(2), stderr: "boom".into() },
        );
        assert_eq!(rs.count(), 0);
        let err = rs.error().unwrap();
        assert!(err.contains("exited with code 2"));
        assert!(err.contains("boom"));
        assert!(!rs.is_launch_failure());
    }

    #[test]
    fn nonzero_exit_with_entries_keeps_entries() {
        let rs = ResultSet::complete("tool", items(&["a"]), ExitReport { code: Some(1), stderr: String::new() });
        assert_eq!(rs.count(), 1);
        assert!(rs.error().is_none());
    }

    #[test]
    fn launch_failure_is_distinguishable() {
        let rs: ResultSet<Item> = ResultSet::launch_failure("nuclei", "No such file or directory");
        assert!(rs.is_launch_failure());
        assert_eq!(
            rs.error().unwrap(),
            "Failed to execute nuclei: No such file or directory. Make sure nuclei is installed."
        );
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let rs = ResultSet::ok(items(&["b", "a", "b", "c", "a"])).dedup();
        assert_eq!(rs.entries(), items(&["b", "a", "c"]).as_slice());
        assert_eq!(rs.count(), 3);
    }

    #[test]
    fn merge_drops_error_when_any_batch_produced_entries() {
        let failed: ResultSet<Item> = ResultSet::complete("t", Vec::new(), ExitReport { code: Some(1), stderr: String::new() });
        let merged = ResultSet::merge(vec![failed.clone(), ResultSet::ok(items(&["x"]))]);
        assert_eq!(merged.count(), 1);
        assert!(!merged.is_error());

        let merged = ResultSet::merge(vec![ResultSet::ok(Vec::new()), failed]);
        assert!(merged.is_error());
    }

    #[test]
    fn serializes_with_record_field_name() {
        let v = serde_json::to_value(ResultSet::ok(items(&["x", "y"]))).unwrap();
        assert_eq!(v, json!({"items": ["x", "y"], "count": 2}));

        let v = serde_json::to_value(ResultSet::<Item>::launch_failure("t", "nope")).unwrap();
        assert_eq!(v["count"], 0);
        assert!(v["error"].as_str().unwrap().starts_with("Failed to execute t"));
    }
}
