//! Pair conversion abstractions for the proxy side.

use anyhow::Result;
use async_trait::async_trait;

/// A single pair conversion as reported by the upstream service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairConversion {
    /// Units of target currency per one unit of source currency.
    pub rate: f64,
    /// The amount converted at that rate.
    pub converted: f64,
}

#[async_trait]
pub trait PairRateProvider: Send + Sync {
    async fn convert_pair(&self, from: &str, to: &str, amount: f64) -> Result<PairConversion>;
}
