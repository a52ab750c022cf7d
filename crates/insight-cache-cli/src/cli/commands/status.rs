use super::{exit_codes, Session};
use crate::cli::args::{GlobalArgs, StatusArgs};
use insight_cache_core::cache::format_age;

pub fn run(g: &GlobalArgs, args: StatusArgs) -> anyhow::Result<i32> {
    let s = Session::open(g)?;
    let status = s.cache.status(args.recent);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(exit_codes::OK);
    }

    let mut out = String::new();
    out.push_str(&format!("Cache status ({})\n\n", g.db.display()));
    out.push_str("Tables:\n");
    for t in &status.tables {
        match (&t.stats, &t.error) {
            (Some(st), _) => {
                let last = st
                    .last_update
                    .as_deref()
                    .map(|u| format_age(Some(u)))
                    .unwrap_or_else(|| "-".to_string());
                let avg = st
                    .avg_age_hours
                    .map(|h| format!("{:.1}h", h))
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "  {:<28} {:>5} rows | last update: {} | avg age: {}\n",
                    t.table, st.rows, last, avg
                ));
            }
            (None, Some(e)) => out.push_str(&format!("  {:<28} ERROR - {}\n", t.table, e)),
            (None, None) => out.push_str(&format!("  {:<28} -\n", t.table)),
        }
    }
    out.push_str(&format!("  {:<28} {:>5} rows\n", "TOTAL", status.total_rows));

    if args.recent > 0 {
        out.push_str("\nRecent entries:\n");
        if status.recent.is_empty() {
            out.push_str("  (none)\n");
        }
        for e in &status.recent {
            let identity = e
                .identity
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&format!(
                "  {:<28} {} | {} | {} | {}\n",
                e.table,
                short_key(&e.cache_key),
                e.model,
                format_age(Some(&e.created_at)),
                identity
            ));
        }
    }

    print!("{}", out);
    Ok(exit_codes::OK)
}

/// First eight characters of a key; keys written by other tools need not be hex.
fn short_key(key: &str) -> String {
    key.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_key_respects_char_boundaries() {
        assert_eq!(short_key("0123456789abcdef"), "01234567");
        assert_eq!(short_key("abc"), "abc");
        assert_eq!(short_key("ключ-кэша-42"), "ключ-кэш");
    }
}
