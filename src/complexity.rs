use std::{fs, path::Path};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumIter};
use tracing::debug;
use crate::error::GraphError;

/// Which version of a repository a complexity report was computed on. The
/// analyzer writes one `<state>.json` per state into each profile's
/// `stats/complexities` directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ObfuscationState {
    Original,
    Obfuscated,
    Deobfuscated,
}

impl ObfuscationState {
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_ref())
    }
}

/// Reads a complexity report. Only the top level has to be an object; the
/// values can be anything the analyzer emits. Bytes that are not UTF-8 JSON
/// count as a malformed report, not a missing one.
pub fn read_report(path: &Path) -> Result<Map<String, Value>, GraphError> {
    let contents = fs::read(path).map_err(|source| GraphError::MissingMetricFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&contents).map_err(|source| GraphError::MalformedMetricFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Looks up a single numeric metric in a complexity report.
pub fn metric_value(report: &Map<String, Value>, key: &str, path: &Path) -> Result<f64, GraphError> {
    let value = report.get(key).ok_or_else(|| GraphError::MissingMetricKey {
        path: path.to_path_buf(),
        key: key.to_string(),
    })?;
    value.as_f64().ok_or_else(|| GraphError::MetricNotNumeric {
        path: path.to_path_buf(),
        key: key.to_string(),
        found: short_json(value),
    })
}

pub fn read_metric(path: &Path, key: &str) -> Result<f64, GraphError> {
    let report = read_report(path)?;
    let value = metric_value(&report, key, path)?;
    debug!("{} = {} in {}", key, value, path.display());
    Ok(value)
}

fn short_json(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(_) => "a boolean".into(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(a) => format!("an array of {} items", a.len()),
        Value::Object(_) => "an object".into(),
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;
    use super::*;

    fn write_file<C: AsRef<[u8]>>(dir: &Path, name: &str, contents: C) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_file_names() {
        let names: Vec<_> = ObfuscationState::iter().map(|s| s.file_name()).collect();
        assert_eq!(names, vec!["original.json", "obfuscated.json", "deobfuscated.json"]);
        assert_eq!(ObfuscationState::Deobfuscated.to_string(), "deobfuscated");
    }

    #[test]
    fn test_read_metric() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(), "original.json",
            r#"{"totalCyclomatic": 10, "totalHalsteadEffort": 2.5, "reports": []}"#,
        );
        assert_eq!(read_metric(&path, "totalCyclomatic").unwrap(), 10.0);
        assert_eq!(read_metric(&path, "totalHalsteadEffort").unwrap(), 2.5);
    }

    #[test]
    fn test_read_metric_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "obfuscated.json", r#"{"reports": [1, 2], "name": "x"}"#);
        assert!(matches!(
            read_metric(&path, "totalCyclomatic"),
            Err(GraphError::MissingMetricKey { key, .. }) if key == "totalCyclomatic",
        ));
        match read_metric(&path, "reports") {
            Err(GraphError::MetricNotNumeric { found, .. }) => assert_eq!(found, "an array of 2 items"),
            other => panic!("unexpected result: {:?}", other),
        }
        let bad = write_file(dir.path(), "bad.json", "[1, 2, 3]");
        assert!(matches!(read_metric(&bad, "x"), Err(GraphError::MalformedMetricFile { .. })));
        let missing = dir.path().join("missing.json");
        assert!(matches!(read_metric(&missing, "x"), Err(GraphError::MissingMetricFile { .. })));
    }

    #[test]
    fn test_read_metric_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "original.json", b"{\"totalCyclomatic\": \"\xff\"}");
        assert!(matches!(
            read_metric(&path, "totalCyclomatic"),
            Err(GraphError::MalformedMetricFile { path: p, .. }) if p == path,
        ));
    }
}
