pub mod cache;
pub mod config;
pub mod errors;
pub mod model;
pub mod storage;

pub use cache::AiCache;
pub use config::CacheConfig;
pub use model::{CachedResult, ParamValue, Params};
