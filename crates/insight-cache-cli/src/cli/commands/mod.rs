use super::args::{Cli, Command, GlobalArgs};
use anyhow::Context;
use insight_cache_core::config::{load_config, CacheConfig, FieldKind};
use insight_cache_core::storage::{SqliteCacheStore, Store};
use insight_cache_core::{AiCache, ParamValue, Params};
use std::sync::Arc;

pub mod entry;
pub mod status;
pub mod tables;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const NOT_FOUND: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let g = cli.global;
    match cli.cmd {
        Command::Init => cmd_init(&g),
        Command::Status(args) => status::run(&g, args),
        Command::Tables => tables::run(&g),
        Command::Key(args) => entry::key(&g, args),
        Command::Get(args) => entry::get(&g, args),
        Command::Put(args) => entry::put(&g, args),
        Command::Invalidate(args) => entry::invalidate(&g, args),
        Command::Clear(args) => entry::clear(&g, args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_init(g: &GlobalArgs) -> anyhow::Result<i32> {
    let ctx = Session::open(g)?;
    ctx.backend.init_schema()?;
    eprintln!(
        "initialised {} cache tables in {}",
        ctx.config.tables.len(),
        g.db.display()
    );
    Ok(exit_codes::OK)
}

pub(crate) fn load(g: &GlobalArgs) -> anyhow::Result<Arc<CacheConfig>> {
    let cfg = match &g.config {
        Some(path) => {
            load_config(path, g.strict_config).map_err(|e| anyhow::anyhow!("config error: {}", e))?
        }
        None => CacheConfig::builtin(),
    };
    Ok(Arc::new(cfg))
}

/// Opened database plus the facade over it.
pub(crate) struct Session {
    pub config: Arc<CacheConfig>,
    pub backend: SqliteCacheStore,
    pub cache: AiCache,
}

impl Session {
    pub fn open(g: &GlobalArgs) -> anyhow::Result<Self> {
        let config = load(g)?;
        if let Some(parent) = g.db.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let store = Store::open(&g.db)?;
        let backend = SqliteCacheStore::new(store.clone(), config.clone());
        let cache = AiCache::sqlite(store, config.clone());
        Ok(Self {
            config,
            backend,
            cache,
        })
    }
    pub fn require_enabled(&self) -> anyhow::Result<()> {
        if !self.config.enabled {
            anyhow::bail!("cache is disabled by config (enabled: false)");
        }
        Ok(())
    }
}

/// Parses `name=value` pairs, typing each value by the field's declared kind.
pub(crate) fn parse_params(
    config: &CacheConfig,
    table: &str,
    raw: &[String],
) -> anyhow::Result<Params> {
    let spec = config.table(table);
    let mut params = Params::new();
    for item in raw {
        let (name, value) = item
            .split_once('=')
            .with_context(|| format!("invalid --param '{}': expected NAME=VALUE", item))?;
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("invalid --param '{}': empty name", item);
        }
        let kind = spec
            .and_then(|t| t.field(name))
            .map(|f| f.kind)
            .unwrap_or_default();
        params.insert(name, coerce(name, value, kind)?);
    }
    Ok(params)
}

fn coerce(name: &str, raw: &str, kind: FieldKind) -> anyhow::Result<ParamValue> {
    if raw.is_empty() || raw == "null" {
        return Ok(ParamValue::Null);
    }
    Ok(match kind {
        FieldKind::Text => ParamValue::Text(raw.to_string()),
        FieldKind::Integer => ParamValue::Int(
            raw.parse()
                .with_context(|| format!("--param {}: '{}' is not an integer", name, raw))?,
        ),
        FieldKind::Real => {
            let v: f64 = raw
                .parse()
                .with_context(|| format!("--param {}: '{}' is not a number", name, raw))?;
            if !v.is_finite() {
                anyhow::bail!("--param {}: '{}' is not a finite number", name, raw);
            }
            ParamValue::Float(v)
        }
    })
}
