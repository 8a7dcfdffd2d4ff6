//! HTTP conversion client: the widget's single outbound call to the proxy.

use crate::conversion_client::{Conversion, ConversionClient, ConvertError};
use crate::core::Currency;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const FALLBACK_API_MESSAGE: &str = "Failed to convert currency";

pub struct HttpConversionClient {
    base_url: String,
}

impl HttpConversionClient {
    pub fn new(base_url: &str) -> Self {
        HttpConversionClient {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct ConvertResponse {
    conversion_rate: f64,
    conversion_result: f64,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    error: String,
}

#[async_trait]
impl ConversionClient for HttpConversionClient {
    async fn convert(
        &self,
        from: Currency,
        to: Currency,
        amount: f64,
    ) -> Result<Conversion, ConvertError> {
        let url = format!("{}/api/convert", self.base_url);
        debug!("Requesting conversion from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("ezx/0.1")
            .build()
            .map_err(|e| ConvertError::Network(e.to_string()))?;

        let response = client
            .get(&url)
            .query(&[
                ("from", from.code().to_string()),
                ("to", to.code().to_string()),
                ("amount", amount.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ConvertError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => FALLBACK_API_MESSAGE.to_string(),
            };
            return Err(ConvertError::Api(message));
        }

        let body = response
            .json::<ConvertResponse>()
            .await
            .map_err(|e| ConvertError::Api(format!("Invalid conversion response: {e}")))?;

        Ok(Conversion {
            rate: body.conversion_rate,
            converted_amount: body.conversion_result,
        })
    }
}
