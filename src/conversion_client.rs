//! Client-side conversion abstractions and error kinds.

use crate::core::Currency;
use async_trait::async_trait;
use thiserror::Error;

/// Outcome of a single conversion call against the proxy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub rate: f64,
    pub converted_amount: f64,
}

/// Errors surfaced to the widget, each carrying the message shown inline.
///
/// All three kinds are terminal for the current submission; nothing retries.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// User input was malformed. No network call is made.
    #[error("{0}")]
    Validation(String),
    /// The proxy could not be reached at the transport level.
    #[error("{0}")]
    Network(String),
    /// The proxy or the upstream service reported a failure.
    #[error("{0}")]
    Api(String),
}

#[async_trait]
pub trait ConversionClient: Send + Sync {
    async fn convert(
        &self,
        from: Currency,
        to: Currency,
        amount: f64,
    ) -> Result<Conversion, ConvertError>;
}
