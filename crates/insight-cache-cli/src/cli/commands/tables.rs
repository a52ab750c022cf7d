use super::{exit_codes, load};
use crate::cli::args::GlobalArgs;

pub fn run(g: &GlobalArgs) -> anyhow::Result<i32> {
    let config = load(g)?;
    for table in &config.tables {
        println!("{}", table.name);
        for f in &table.fields {
            println!(
                "  {:<24} {:<8} {:<22} {}",
                f.name,
                f.kind.sql_type(),
                f.column_name(),
                if f.identity { "identity" } else { "metadata" }
            );
        }
    }
    if config.strict_tables {
        eprintln!("strict_tables: unknown table names are rejected");
    }
    Ok(exit_codes::OK)
}
