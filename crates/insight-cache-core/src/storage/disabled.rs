use super::cache_store::CacheStore;
use crate::errors::CacheError;
use crate::model::{CacheRow, CacheWrite, RecentEntry, TableStats};

/// Stand-in used when no cache database is available: reads always miss
/// and writes report failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStore;

impl CacheStore for DisabledStore {
    fn get(&self, _table: &str, _cache_key: &str) -> anyhow::Result<Option<CacheRow>> {
        Ok(None)
    }

    fn upsert(&self, _write: &CacheWrite<'_>) -> anyhow::Result<()> {
        Err(CacheError::Disabled.into())
    }

    fn delete(&self, _table: &str, _cache_key: &str) -> anyhow::Result<bool> {
        Ok(false)
    }

    fn clear(&self, _table: &str) -> anyhow::Result<u64> {
        Ok(0)
    }

    fn stats(&self, _table: &str) -> anyhow::Result<TableStats> {
        Err(CacheError::Disabled.into())
    }

    fn recent(&self, _table: &str, _limit: usize) -> anyhow::Result<Vec<RecentEntry>> {
        Ok(Vec::new())
    }
}
