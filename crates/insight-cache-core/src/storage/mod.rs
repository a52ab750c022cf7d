pub mod cache_store;
pub mod disabled;
pub mod row;
pub mod schema;
pub mod store;

pub use cache_store::{CacheStore, SqliteCacheStore};
pub use disabled::DisabledStore;
pub use store::Store;
