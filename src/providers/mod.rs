pub mod exchange_rate_api;

// Re-export so providers can easily use the shared cache
pub use crate::core::cache::Cache;
