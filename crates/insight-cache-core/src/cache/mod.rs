//! Result cache for AI-generated page content.
//!
//! Entries are keyed by the identity parameters of a logical table and are
//! never expired: a page refresh overwrites the entry, and removal is a
//! manual operator action.

pub mod age;
pub mod key;
pub mod notice;

use crate::config::CacheConfig;
use crate::model::{CacheStatus, CacheWrite, CachedResult, Params, TableStatus};
use crate::storage::{CacheStore, DisabledStore, SqliteCacheStore, Store};
use notice::{StatusSink, TracingSink};
use std::sync::Arc;

pub use age::{format_age, format_age_at};
pub use key::{ensure_finite_identity, filter_identity_params, generate_key};

const REFRESH_HINT: &str = " Click 'Run/Refresh' to update.";

/// Cache facade used by pages. Stateless apart from its shared handles, so
/// it can be cloned freely across requests.
#[derive(Clone)]
pub struct AiCache {
    store: Arc<dyn CacheStore>,
    config: Arc<CacheConfig>,
    sink: Arc<dyn StatusSink>,
}

impl AiCache {
    pub fn new(store: Arc<dyn CacheStore>, config: Arc<CacheConfig>) -> Self {
        Self {
            store,
            config,
            sink: Arc::new(TracingSink),
        }
    }

    /// Facade over an existing SQLite handle.
    pub fn sqlite(store: Store, config: Arc<CacheConfig>) -> Self {
        let backend = SqliteCacheStore::new(store, config.clone());
        Self::new(Arc::new(backend), config)
    }

    /// A cache that never hits and never stores.
    pub fn disabled() -> Self {
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::builtin()
        };
        Self::new(Arc::new(DisabledStore), Arc::new(config))
    }

    pub fn with_status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn cache_key(&self, table: &str, params: &Params) -> String {
        generate_key(&self.config, table, params)
    }

    /// Strict mode turns unknown tables away before they reach the store.
    fn accepts_table(&self, table: &str) -> bool {
        if !self.config.strict_tables {
            return true;
        }
        match self.config.require_table(table) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(table, error = %e, "rejected cache table");
                self.sink.warning(&format!("Cache table rejected: {}", e));
                false
            }
        }
    }

    /// NaN and infinities would share the key of an unspecified value.
    fn accepts_params(&self, table: &str, params: &Params) -> bool {
        match ensure_finite_identity(&self.config, table, params) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(table, error = %e, "rejected cache params");
                self.sink.warning(&format!("Cache params rejected: {}", e));
                false
            }
        }
    }

    pub fn get_cached_result(&self, table: &str, params: &Params) -> Option<CachedResult> {
        if !self.config.enabled {
            tracing::debug!(table, "cache disabled, skipping lookup");
            return None;
        }
        if !self.accepts_table(table) || !self.accepts_params(table, params) {
            return None;
        }

        let cache_key = self.cache_key(table, params);
        match self.store.get(table, &cache_key) {
            Ok(Some(row)) => {
                tracing::debug!(table, cache_key = %cache_key, "cache hit");
                let age = format_age(row.created_at.as_deref());
                Some(CachedResult {
                    content: row.content,
                    model: row.model,
                    confidence: row.confidence,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                    cache_key,
                    age,
                })
            }
            Ok(None) => {
                tracing::debug!(table, cache_key = %cache_key, "cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(table, cache_key = %cache_key, error = %e, "cache read failed");
                self.sink.warning(&format!("Cache read error: {}", e));
                None
            }
        }
    }

    pub fn save_to_cache(
        &self,
        table: &str,
        ai_content: &str,
        ai_model: &str,
        confidence_score: f64,
        params: &Params,
    ) -> bool {
        if !self.config.enabled {
            tracing::debug!(table, "cache disabled, skipping save");
            return false;
        }
        if !self.accepts_table(table) || !self.accepts_params(table, params) {
            return false;
        }

        let cache_key = self.cache_key(table, params);
        let write = CacheWrite {
            table,
            cache_key: &cache_key,
            content: ai_content,
            model: ai_model,
            confidence: confidence_score,
            params,
        };
        match self.store.upsert(&write) {
            Ok(()) => {
                tracing::debug!(table, cache_key = %cache_key, model = ai_model, "cache saved");
                true
            }
            Err(e) => {
                tracing::error!(table, cache_key = %cache_key, error = %e, "cache write failed");
                self.sink.error(&format!("Cache write error: {}", e));
                false
            }
        }
    }

    /// Drops the single entry these params map to. A disabled cache owns no
    /// entries, so this is a no-op returning false.
    pub fn invalidate(&self, table: &str, params: &Params) -> bool {
        if !self.config.enabled {
            tracing::debug!(table, "cache disabled, skipping invalidate");
            return false;
        }
        if !self.accepts_table(table) || !self.accepts_params(table, params) {
            return false;
        }
        let cache_key = self.cache_key(table, params);
        match self.store.delete(table, &cache_key) {
            Ok(removed) => {
                tracing::info!(table, cache_key = %cache_key, removed, "cache entry invalidated");
                removed
            }
            Err(e) => {
                tracing::error!(table, cache_key = %cache_key, error = %e, "cache invalidate failed");
                self.sink.error(&format!("Cache invalidate error: {}", e));
                false
            }
        }
    }

    /// Empties one table; `None` when the store refused or the cache is
    /// disabled.
    pub fn clear(&self, table: &str) -> Option<u64> {
        if !self.config.enabled {
            tracing::debug!(table, "cache disabled, skipping clear");
            return None;
        }
        match self.store.clear(table) {
            Ok(n) => {
                tracing::info!(table, removed = n, "cache table cleared");
                Some(n)
            }
            Err(e) => {
                tracing::error!(table, error = %e, "cache clear failed");
                self.sink.error(&format!("Cache clear error: {}", e));
                None
            }
        }
    }

    pub fn status(&self, recent_limit: usize) -> CacheStatus {
        let mut tables = Vec::new();
        let mut recent = Vec::new();
        let mut total_rows = 0;

        for name in self.config.table_names() {
            match self.store.stats(name) {
                Ok(stats) => {
                    total_rows += stats.rows;
                    tables.push(TableStatus {
                        table: name.to_string(),
                        stats: Some(stats),
                        error: None,
                    });
                }
                Err(e) => tables.push(TableStatus {
                    table: name.to_string(),
                    stats: None,
                    error: Some(e.to_string()),
                }),
            }
            if recent_limit > 0 {
                match self.store.recent(name, recent_limit) {
                    Ok(mut entries) => recent.append(&mut entries),
                    Err(e) => tracing::debug!(table = name, error = %e, "recent entries unavailable"),
                }
            }
        }

        // RFC 3339 UTC strings of equal precision sort chronologically.
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(recent_limit);

        CacheStatus {
            tables,
            total_rows,
            recent,
        }
    }

    pub fn display_cache_indicator(&self, result: Option<&CachedResult>, show_refresh_hint: bool) {
        if let Some(r) = result {
            self.sink.info(&cache_indicator_text(r, show_refresh_hint));
        }
    }
}

pub fn cache_indicator_text(result: &CachedResult, show_refresh_hint: bool) -> String {
    let hint = if show_refresh_hint { REFRESH_HINT } else { "" };
    format!(
        "Cached result • Generated {} using {}.{}",
        result.age, result.model, hint
    )
}
