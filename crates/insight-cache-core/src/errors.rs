use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ConfigError(pub String);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("unknown cache table '{table}'{}", suggestion_suffix(.suggestion))]
    UnknownTable {
        table: String,
        suggestion: Option<String>,
    },

    #[error("cache connection lock poisoned")]
    LockPoisoned,

    #[error("cache is disabled")]
    Disabled,

    #[error("identity parameter '{field}' is not a finite number ({value})")]
    NonFiniteParam { field: String, value: f64 },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}
