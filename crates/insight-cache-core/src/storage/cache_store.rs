use super::row::bind_columns;
use super::schema::{create_table_sql, quote_ident, upsert_sql};
use super::store::Store;
use crate::cache::age::parse_timestamp;
use crate::config::CacheConfig;
use crate::model::{CacheRow, CacheWrite, ParamValue, Params, RecentEntry, TableStats};
use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, params_from_iter, OptionalExtension, ToSql};
use std::sync::Arc;

/// Persistence for cache entries, one table per logical cache table.
///
/// Implementations return errors for genuine I/O failures only; a missing
/// row is `Ok(None)`.
pub trait CacheStore: Send + Sync {
    fn get(&self, table: &str, cache_key: &str) -> anyhow::Result<Option<CacheRow>>;

    /// Insert-or-update in one atomic step. On update only the payload and
    /// `updated_at` change.
    fn upsert(&self, write: &CacheWrite<'_>) -> anyhow::Result<()>;

    /// Returns whether a row was removed.
    fn delete(&self, table: &str, cache_key: &str) -> anyhow::Result<bool>;

    /// Removes every row of `table`, returning the count.
    fn clear(&self, table: &str) -> anyhow::Result<u64>;

    fn stats(&self, table: &str) -> anyhow::Result<TableStats>;

    /// Most recently created entries of `table`, newest first.
    fn recent(&self, table: &str, limit: usize) -> anyhow::Result<Vec<RecentEntry>>;
}

#[derive(Clone)]
pub struct SqliteCacheStore {
    store: Store,
    config: Arc<CacheConfig>,
}

impl SqliteCacheStore {
    pub fn new(store: Store, config: Arc<CacheConfig>) -> Self {
        Self { store, config }
    }

    /// Creates every configured table that does not exist yet.
    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.store.lock()?;
        for table in &self.config.tables {
            conn.execute_batch(&create_table_sql(table))
                .with_context(|| format!("failed to create cache table {}", table.name))?;
        }
        Ok(())
    }

    fn table_ident(&self, table: &str) -> anyhow::Result<String> {
        let spec = self.config.require_table(table)?;
        Ok(quote_ident(&spec.name))
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl CacheStore for SqliteCacheStore {
    fn get(&self, table: &str, cache_key: &str) -> anyhow::Result<Option<CacheRow>> {
        let ident = self.table_ident(table)?;
        let conn = self.store.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT AI_CONTENT, AI_MODEL, CONFIDENCE_SCORE, CREATED_AT, UPDATED_AT
             FROM {} WHERE CACHE_KEY=?1",
            ident
        ))?;
        let row = stmt
            .query_row(params![cache_key], |row| {
                Ok(CacheRow {
                    cache_key: cache_key.to_string(),
                    content: row.get(0)?,
                    model: row.get(1)?,
                    confidence: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })
            .optional()?;
        Ok(row)
    }

    fn upsert(&self, write: &CacheWrite<'_>) -> anyhow::Result<()> {
        let spec = self.config.require_table(write.table)?;
        let bound = bind_columns(spec, write.params);
        let columns: Vec<String> = bound.iter().map(|b| b.column.clone()).collect();
        let sql = upsert_sql(&spec.name, &columns);

        let now = now_timestamp();
        let mut values: Vec<&dyn ToSql> = vec![
            &write.cache_key,
            &write.content,
            &write.model,
            &write.confidence,
            &now,
            &now,
        ];
        values.extend(bound.iter().map(|b| b.value as &dyn ToSql));

        let conn = self.store.lock()?;
        conn.execute(&sql, params_from_iter(values))
            .with_context(|| format!("failed to upsert into {}", spec.name))?;
        Ok(())
    }

    fn delete(&self, table: &str, cache_key: &str) -> anyhow::Result<bool> {
        let ident = self.table_ident(table)?;
        let conn = self.store.lock()?;
        let n = conn.execute(
            &format!("DELETE FROM {} WHERE CACHE_KEY=?1", ident),
            params![cache_key],
        )?;
        Ok(n > 0)
    }

    fn clear(&self, table: &str) -> anyhow::Result<u64> {
        let ident = self.table_ident(table)?;
        let conn = self.store.lock()?;
        let n = conn.execute(&format!("DELETE FROM {}", ident), [])?;
        Ok(n as u64)
    }

    fn stats(&self, table: &str) -> anyhow::Result<TableStats> {
        let ident = self.table_ident(table)?;
        let conn = self.store.lock()?;

        let (rows, last_update): (i64, Option<String>) = conn.query_row(
            &format!("SELECT COUNT(*), MAX(UPDATED_AT) FROM {}", ident),
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        let mut stmt = conn.prepare(&format!("SELECT CREATED_AT FROM {}", ident))?;
        let created = stmt.query_map([], |r| r.get::<_, Option<String>>(0))?;

        let now = Utc::now();
        let mut total_hours = 0.0;
        let mut counted = 0u32;
        for c in created {
            if let Some(ts) = c?.as_deref().and_then(parse_timestamp) {
                total_hours += (now - ts).num_seconds() as f64 / 3600.0;
                counted += 1;
            }
        }

        Ok(TableStats {
            table: table.to_string(),
            rows: rows as u64,
            last_update,
            avg_age_hours: (counted > 0).then(|| total_hours / f64::from(counted)),
        })
    }

    fn recent(&self, table: &str, limit: usize) -> anyhow::Result<Vec<RecentEntry>> {
        let spec = self.config.require_table(table)?;
        let field_columns: Vec<(String, String)> = spec
            .fields
            .iter()
            .map(|f| (f.name.clone(), quote_ident(&f.column_name())))
            .collect();

        let mut select = vec![
            "CACHE_KEY".to_string(),
            "AI_MODEL".to_string(),
            "CREATED_AT".to_string(),
            "UPDATED_AT".to_string(),
        ];
        select.extend(field_columns.iter().map(|(_, c)| c.clone()));

        let conn = self.store.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY CREATED_AT DESC LIMIT ?1",
            select.join(", "),
            quote_ident(&spec.name)
        ))?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            let mut identity = Params::new();
            for (i, (name, _)) in field_columns.iter().enumerate() {
                let value = ParamValue::from(row.get_ref(4 + i)?);
                if !value.is_null() {
                    identity.insert(name.clone(), value);
                }
            }
            Ok(RecentEntry {
                table: spec.name.clone(),
                cache_key: row.get(0)?,
                model: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
                identity,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}
