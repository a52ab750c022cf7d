use crate::errors::{CacheError, ConfigError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub mod builtin;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Columns every cache table carries regardless of its identity fields.
pub const PAYLOAD_COLUMNS: &[&str] = &[
    "CACHE_KEY",
    "AI_CONTENT",
    "AI_MODEL",
    "CONFIDENCE_SCORE",
    "CREATED_AT",
    "UPDATED_AT",
];

/// Parameter names that carry payload on save and never take part in identity.
pub const PAYLOAD_PARAMS: &[&str] = &["ai_content", "ai_model", "confidence_score"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    /// When false, every lookup misses and every save is skipped.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Reject table names that are not configured instead of hashing them
    /// onto the shared empty-identity key.
    #[serde(default)]
    pub strict_tables: bool,

    #[serde(default)]
    pub tables: Vec<TableSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSpec {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    /// Parameter name as passed by callers (e.g. `report_type`).
    pub name: String,
    /// Column name; defaults to the upper-cased parameter name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default)]
    pub kind: FieldKind,
    /// Identity fields participate in the cache key; the rest are stored
    /// alongside the entry for inspection only.
    #[serde(default)]
    pub identity: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Integer,
    Real,
}

impl FieldKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldKind::Text => "TEXT",
            FieldKind::Integer => "INTEGER",
            FieldKind::Real => "REAL",
        }
    }
}

impl FieldSpec {
    pub fn identity(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            column: None,
            kind,
            identity: true,
        }
    }

    pub fn metadata(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            column: None,
            kind,
            identity: false,
        }
    }

    pub fn with_column(mut self, column: &str) -> Self {
        self.column = Some(column.to_string());
        self
    }

    pub fn column_name(&self) -> String {
        self.column
            .clone()
            .unwrap_or_else(|| self.name.to_ascii_uppercase())
    }
}

impl TableSpec {
    pub fn identity_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.identity)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CacheConfig {
    /// The logical tables used by the network insights dashboard.
    pub fn builtin() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            enabled: true,
            strict_tables: false,
            tables: builtin::tables(),
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Looks up a table, producing a typed error with a close-match hint.
    pub fn require_table(&self, name: &str) -> Result<&TableSpec, CacheError> {
        self.table(name).ok_or_else(|| CacheError::UnknownTable {
            table: name.to_string(),
            suggestion: self.suggest_table(name),
        })
    }

    fn suggest_table(&self, name: &str) -> Option<String> {
        let upper = name.to_ascii_uppercase();
        self.table_names()
            .map(|t| (t, strsim::jaro_winkler(&upper, t)))
            .filter(|(_, score)| *score > 0.85)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(t, _)| t.to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError(format!(
                "unsupported config version {} (supported: {})",
                self.version, SUPPORTED_CONFIG_VERSION
            )));
        }

        let ident = identifier_pattern()?;
        let mut seen_tables = HashSet::new();
        for table in &self.tables {
            if !ident.is_match(&table.name) {
                return Err(ConfigError(format!(
                    "invalid table name '{}': expected [A-Za-z_][A-Za-z0-9_]*",
                    table.name
                )));
            }
            if !seen_tables.insert(table.name.to_ascii_uppercase()) {
                return Err(ConfigError(format!("duplicate table '{}'", table.name)));
            }

            let mut seen_fields = HashSet::new();
            let mut seen_columns = HashSet::new();
            for field in &table.fields {
                if PAYLOAD_PARAMS.contains(&field.name.as_str()) {
                    return Err(ConfigError(format!(
                        "table '{}': field '{}' is a reserved payload parameter",
                        table.name, field.name
                    )));
                }
                if !seen_fields.insert(field.name.as_str()) {
                    return Err(ConfigError(format!(
                        "table '{}': duplicate field '{}'",
                        table.name, field.name
                    )));
                }

                let column = field.column_name();
                if !ident.is_match(&column) {
                    return Err(ConfigError(format!(
                        "table '{}': invalid column name '{}'",
                        table.name, column
                    )));
                }
                let upper = column.to_ascii_uppercase();
                if PAYLOAD_COLUMNS.contains(&upper.as_str()) {
                    return Err(ConfigError(format!(
                        "table '{}': column '{}' collides with a payload column",
                        table.name, column
                    )));
                }
                if !seen_columns.insert(upper) {
                    return Err(ConfigError(format!(
                        "table '{}': duplicate column '{}'",
                        table.name, column
                    )));
                }
            }
        }
        Ok(())
    }
}

fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}

fn default_true() -> bool {
    true
}

fn identifier_pattern() -> Result<Regex, ConfigError> {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
        .map_err(|e| ConfigError(format!("identifier pattern: {}", e)))
}

pub fn load_config(path: &Path, strict: bool) -> Result<CacheConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    parse_config(&raw, strict)
        .map_err(|e| ConfigError(format!("{} (file: {})", e.0, path.display())))
}

pub fn parse_config(raw: &str, strict: bool) -> Result<CacheConfig, ConfigError> {
    let mut ignored_keys = HashSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);

    let cfg: CacheConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    // Anchor blocks (`x-...`, `_...`) are allowed to sit next to real keys.
    let meaningful_unknowns: Vec<_> = ignored_keys
        .iter()
        .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
        .collect();

    if !meaningful_unknowns.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "Unknown fields detected in strict mode: {:?}",
                meaningful_unknowns
            )));
        }
        tracing::warn!(ignored = ?meaningful_unknowns, "ignored unknown config fields");
    }

    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_is_valid() {
        CacheConfig::builtin().validate().unwrap();
    }

    #[test]
    fn column_defaults_to_upper_name() {
        let f = FieldSpec::identity("report_type", FieldKind::Text);
        assert_eq!(f.column_name(), "REPORT_TYPE");
    }

    #[test]
    fn rejects_injection_in_table_name() {
        let cfg = CacheConfig {
            tables: vec![TableSpec {
                name: "X; DROP TABLE Y".into(),
                fields: vec![],
            }],
            ..CacheConfig::builtin()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_payload_column_collision() {
        let cfg = CacheConfig {
            tables: vec![TableSpec {
                name: "T".into(),
                fields: vec![FieldSpec::identity("ai_model_name", FieldKind::Text)
                    .with_column("AI_MODEL")],
            }],
            ..CacheConfig::builtin()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.0.contains("payload column"), "{}", err);
    }

    #[test]
    fn suggests_close_table_name() {
        let cfg = CacheConfig::builtin();
        let err = cfg.require_table("ai_insight_cache").unwrap_err();
        assert!(err.to_string().contains("AI_INSIGHTS_CACHE"), "{}", err);
    }

    #[test]
    fn unknown_keys_fail_only_in_strict_mode() {
        let raw = "version: 1\ntables: []\nttl_seconds: 60\n";
        assert!(parse_config(raw, true).is_err());
        assert!(parse_config(raw, false).is_ok());
    }

    #[test]
    fn anchor_keys_are_tolerated_in_strict_mode() {
        let raw = "version: 1\nx-common: &c {kind: text}\ntables:\n  - name: T\n    fields:\n      - {name: a, identity: true}\n";
        let cfg = parse_config(raw, true).unwrap();
        assert_eq!(cfg.tables[0].fields[0].kind, FieldKind::Text);
    }
}
