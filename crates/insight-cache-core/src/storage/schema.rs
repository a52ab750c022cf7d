use crate::config::TableSpec;

/// Quotes an identifier that already passed config validation.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn create_table_sql(table: &TableSpec) -> String {
    let mut cols = vec![
        "CACHE_KEY TEXT PRIMARY KEY".to_string(),
        "AI_CONTENT TEXT NOT NULL".to_string(),
        "AI_MODEL TEXT NOT NULL".to_string(),
        "CONFIDENCE_SCORE REAL NOT NULL".to_string(),
        "CREATED_AT TEXT NOT NULL".to_string(),
        "UPDATED_AT TEXT NOT NULL".to_string(),
    ];
    for f in &table.fields {
        cols.push(format!(
            "{} {}",
            quote_ident(&f.column_name()),
            f.kind.sql_type()
        ));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quote_ident(&table.name),
        cols.join(",\n  ")
    )
}

/// Single-statement merge on CACHE_KEY. Identity columns and CREATED_AT are
/// written on insert only.
pub fn upsert_sql(table: &str, identity_columns: &[String]) -> String {
    let mut columns = vec![
        "CACHE_KEY".to_string(),
        "AI_CONTENT".to_string(),
        "AI_MODEL".to_string(),
        "CONFIDENCE_SCORE".to_string(),
        "CREATED_AT".to_string(),
        "UPDATED_AT".to_string(),
    ];
    columns.extend(identity_columns.iter().map(|c| quote_ident(c)));

    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {}({}) VALUES ({})
         ON CONFLICT(CACHE_KEY) DO UPDATE SET
            AI_CONTENT=excluded.AI_CONTENT,
            AI_MODEL=excluded.AI_MODEL,
            CONFIDENCE_SCORE=excluded.CONFIDENCE_SCORE,
            UPDATED_AT=excluded.UPDATED_AT",
        quote_ident(table),
        columns.join(", "),
        placeholders
    )
}
