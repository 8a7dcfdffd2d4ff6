//! Core business logic abstractions

pub mod cache;
pub mod currency;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use currency::Currency;
pub use rates::{PairConversion, PairRateProvider};
