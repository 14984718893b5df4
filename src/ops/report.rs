//! Structured operation results.
//!
//! Every operation returns a flat key -> value map. BTreeMap keeps the key
//! order deterministic so repeated reads of an unchanged document produce
//! identical output.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// The structured success payload of one operation.
#[derive(Debug, Clone, Default)]
pub struct Report {
    values: BTreeMap<String, Value>,
}

impl Report {
    pub fn new() -> Self {
        Report::default()
    }

    /// Insert a value under a key. Values that fail JSON conversion (which
    /// none of our types do) are recorded as null rather than dropped.
    pub fn set(&mut self, key: &str, value: impl Serialize) -> &mut Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// The whole report as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.values.clone().into_iter().collect())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.values {
            match value {
                Value::String(s) => writeln!(f, "{}: {}", key, s)?,
                other => writeln!(f, "{}: {}", key, other)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_sorted() {
        let report = Report::new()
            .with("zeta", 1)
            .with("alpha", "two")
            .with("mid", vec!["a", "b"]);
        let keys: Vec<_> = report.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_display_unquotes_strings() {
        let report = Report::new().with("name", "App").with("count", 3);
        let text = report.to_string();
        assert!(text.contains("name: App"));
        assert!(text.contains("count: 3"));
        assert!(!text.contains("\"App\""));
    }
}
