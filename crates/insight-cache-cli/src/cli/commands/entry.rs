use super::{exit_codes, load, parse_params, Session};
use crate::cli::args::{ClearArgs, EntryArgs, GetArgs, GlobalArgs, PutArgs};
use anyhow::Context;

pub fn key(g: &GlobalArgs, args: EntryArgs) -> anyhow::Result<i32> {
    let config = load(g)?;
    let params = parse_params(&config, &args.table, &args.params)?;
    if config.table(&args.table).is_none() {
        eprintln!(
            "warning: '{}' is not a configured table; all params are ignored for the key",
            args.table
        );
    }
    println!(
        "{}",
        insight_cache_core::cache::generate_key(&config, &args.table, &params)
    );
    Ok(exit_codes::OK)
}

pub fn get(g: &GlobalArgs, args: GetArgs) -> anyhow::Result<i32> {
    let s = Session::open(g)?;
    let params = parse_params(&s.config, &args.entry.table, &args.entry.params)?;

    let Some(hit) = s.cache.get_cached_result(&args.entry.table, &params) else {
        eprintln!("miss: no cached entry in {}", args.entry.table);
        return Ok(exit_codes::NOT_FOUND);
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&hit)?);
    } else {
        eprintln!(
            "{}",
            insight_cache_core::cache::cache_indicator_text(&hit, false)
        );
        eprintln!("key: {}  confidence: {:.2}", hit.cache_key, hit.confidence);
        println!("{}", hit.content);
    }
    Ok(exit_codes::OK)
}

pub fn put(g: &GlobalArgs, args: PutArgs) -> anyhow::Result<i32> {
    let content = match (&args.content, &args.content_file) {
        (Some(c), _) => c.clone(),
        (None, Some(p)) => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read {}", p.display()))?,
        (None, None) => anyhow::bail!("one of --content or --content-file is required"),
    };

    let s = Session::open(g)?;
    let params = parse_params(&s.config, &args.entry.table, &args.entry.params)?;
    let key = s.cache.cache_key(&args.entry.table, &params);

    if s.cache.save_to_cache(
        &args.entry.table,
        &content,
        &args.model,
        args.confidence,
        &params,
    ) {
        println!("{}", key);
        Ok(exit_codes::OK)
    } else {
        anyhow::bail!("failed to save entry to {}", args.entry.table)
    }
}

pub fn invalidate(g: &GlobalArgs, args: EntryArgs) -> anyhow::Result<i32> {
    let s = Session::open(g)?;
    s.require_enabled()?;
    let params = parse_params(&s.config, &args.table, &args.params)?;
    if s.cache.invalidate(&args.table, &params) {
        eprintln!("invalidated {}", s.cache.cache_key(&args.table, &params));
        Ok(exit_codes::OK)
    } else {
        eprintln!("nothing to invalidate in {}", args.table);
        Ok(exit_codes::NOT_FOUND)
    }
}

pub fn clear(g: &GlobalArgs, args: ClearArgs) -> anyhow::Result<i32> {
    let s = Session::open(g)?;
    s.require_enabled()?;
    match s.cache.clear(&args.table) {
        Some(n) => {
            eprintln!("removed {} entries from {}", n, args.table);
            Ok(exit_codes::OK)
        }
        None => anyhow::bail!("failed to clear {}", args.table),
    }
}
