use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "insight-cache",
    version,
    about = "Inspect and maintain the AI insight result cache"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// SQLite database holding the cache tables
    #[arg(long, global = true, env = "INSIGHT_CACHE_DB", default_value = ".insight/ai_cache.db")]
    pub db: PathBuf,

    /// Cache table definitions (YAML); the built-in tables are used when omitted
    #[arg(long, global = true, env = "INSIGHT_CACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fail on unknown keys in the config file
    #[arg(long, global = true)]
    pub strict_config: bool,

    /// tracing filter directive, e.g. `info` or `insight_cache_core=debug`
    #[arg(long, global = true, env = "INSIGHT_CACHE_LOG", default_value = "warn")]
    pub log_level: String,

    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create every configured cache table
    Init,
    /// Row counts, freshness and the newest entries
    Status(StatusArgs),
    /// List configured tables and their fields
    Tables,
    /// Print the cache key for a set of params
    Key(EntryArgs),
    /// Print a cached entry (exit 1 on miss)
    Get(GetArgs),
    /// Store content for a set of params
    Put(PutArgs),
    /// Remove the entry for a set of params
    Invalidate(EntryArgs),
    /// Remove every entry of one table
    Clear(ClearArgs),
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Number of recent entries to list
    #[arg(long, default_value_t = 10)]
    pub recent: usize,

    /// Output format: text | json
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Args, Debug, Clone)]
pub struct EntryArgs {
    #[arg(long)]
    pub table: String,

    /// Request parameter as name=value; repeatable. `null` or an empty value means unset.
    #[arg(long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    #[command(flatten)]
    pub entry: EntryArgs,

    /// Output format: text | json
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Args, Debug, Clone)]
pub struct PutArgs {
    #[command(flatten)]
    pub entry: EntryArgs,

    #[arg(long)]
    pub model: String,

    #[arg(long, default_value_t = 1.0)]
    pub confidence: f64,

    #[arg(long, conflicts_with = "content_file", required_unless_present = "content_file")]
    pub content: Option<String>,

    #[arg(long)]
    pub content_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ClearArgs {
    #[arg(long)]
    pub table: String,
}
