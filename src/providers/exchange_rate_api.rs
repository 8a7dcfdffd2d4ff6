use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::rates::{PairConversion, PairRateProvider};

// ExchangeRateApiProvider implementation for PairRateProvider
//
// The API key is embedded in the request path, so neither the URL nor
// reqwest errors (which carry the URL) may ever reach logs or callers.
pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: String,
    cache: Arc<Cache<String, PairConversion>>,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, api_key: &str, cache: Arc<Cache<String, PairConversion>>) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            cache,
        }
    }
}

#[derive(Deserialize, Debug)]
struct PairResponse {
    result: String,
    conversion_rate: Option<f64>,
    conversion_result: Option<f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

#[async_trait]
impl PairRateProvider for ExchangeRateApiProvider {
    #[instrument(
        name = "PairConversionFetch",
        skip(self),
        fields(from = %from, to = %to, amount = %amount)
    )]
    async fn convert_pair(&self, from: &str, to: &str, amount: f64) -> Result<PairConversion> {
        let key = format!("{from}/{to}/{amount}");
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/{}/pair/{}/{}/{}",
            self.base_url, self.api_key, from, to, amount
        );
        debug!("Requesting pair conversion from upstream");

        let client = reqwest::Client::builder().user_agent("ezx/0.1").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Upstream request error: {}", e.without_url()))?;

        if !response.status().is_success() {
            bail!("Upstream returned HTTP {}", response.status());
        }

        let data = response
            .json::<PairResponse>()
            .await
            .map_err(|e| anyhow!("Failed to parse upstream response: {}", e.without_url()))?;

        if data.result != "success" {
            bail!(
                "Upstream reported failure: {}",
                data.error_type.as_deref().unwrap_or("unknown")
            );
        }

        let rate = data
            .conversion_rate
            .ok_or_else(|| anyhow!("Upstream response missing conversion_rate"))?;
        let converted = data
            .conversion_result
            .ok_or_else(|| anyhow!("Upstream response missing conversion_result"))?;

        let conversion = PairConversion { rate, converted };
        self.cache.put(key, conversion).await;

        Ok(conversion)
    }
}
