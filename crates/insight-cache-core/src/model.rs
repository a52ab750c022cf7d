use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scalar request parameter as passed by a page.
///
/// `Null` means "not specified" and is distinct from an empty string.
/// `Int(1)` and `Float(1.0)` are different values and hash differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Null => write!(f, "null"),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<&String> for ParamValue {
    fn from(s: &String) -> Self {
        ParamValue::Text(s.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => ParamValue::Null,
        }
    }
}

/// Named request parameters for one cache lookup or save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut p = Params::new();
        for (k, v) in iter {
            p.insert(k, v);
        }
        p
    }
}

/// Raw row as read back from a cache table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRow {
    pub cache_key: String,
    pub content: String,
    pub model: String,
    pub confidence: f64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A cache hit, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResult {
    pub content: String,
    pub model: String,
    pub confidence: f64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub cache_key: String,
    pub age: String,
}

/// Payload and identity columns for one upsert.
#[derive(Debug, Clone)]
pub struct CacheWrite<'a> {
    pub table: &'a str,
    pub cache_key: &'a str,
    pub content: &'a str,
    pub model: &'a str,
    pub confidence: f64,
    pub params: &'a Params,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStats {
    pub table: String,
    pub rows: u64,
    pub last_update: Option<String>,
    pub avg_age_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub table: String,
    pub cache_key: String,
    pub model: String,
    pub created_at: String,
    pub updated_at: String,
    /// Identity column values as stored, keyed by field name.
    pub identity: Params,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStatus {
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<TableStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Snapshot of every configured table plus the newest entries overall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub tables: Vec<TableStatus>,
    pub total_rows: u64,
    pub recent: Vec<RecentEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_none_becomes_null() {
        let p = Params::new()
            .with("sub_type", Option::<&str>::None)
            .with("report_type", Some("executive"));
        assert_eq!(p.get("sub_type"), Some(&ParamValue::Null));
        assert_eq!(p.get("report_type"), Some(&ParamValue::from("executive")));
    }

    #[test]
    fn serializes_untagged() {
        let p = Params::new()
            .with("a", 1i64)
            .with("b", 1.5)
            .with("c", "x")
            .with("d", ParamValue::Null);
        let s = serde_json::to_string(&p).unwrap();
        assert_eq!(s, r#"{"a":1,"b":1.5,"c":"x","d":null}"#);
    }
}
