//! The converter widget: a single state value transitioned by explicit
//! actions, so that result, error, and loading can never disagree.
//!
//! Every submission mints a token. Actions that discard displayed state
//! (`Swap`, `SelectFrom`, a new `SubmitStart`) invalidate the token, and a
//! completion carrying a stale token is ignored, so a late response cannot
//! overwrite state the user already reset.

use crate::conversion_client::{ConversionClient, ConvertError};
use crate::core::Currency;
use tracing::debug;

const INVALID_AMOUNT_MESSAGE: &str = "Please enter a valid amount greater than zero.";
const SAME_CURRENCY_MESSAGE: &str = "Please select different currencies for conversion.";

/// Identifies one submission; stale tokens are ignored on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionToken(u64);

/// A completed conversion, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub amount: f64,
    pub from: Currency,
    pub to: Currency,
    pub converted_amount: f64,
    /// Units of target currency per one unit of source currency.
    pub rate: f64,
    /// Reciprocal of `rate`.
    pub inverse_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetAmount(String),
    SelectFrom(Currency),
    SelectTo(Currency),
    Swap,
    SubmitStart,
    SubmitSuccess {
        token: SubmissionToken,
        result: ConversionResult,
    },
    SubmitFailure {
        token: SubmissionToken,
        message: String,
    },
}

/// Side effects the view layer must perform after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Bring the result region into view.
    RevealResult,
}

#[derive(Debug, Clone)]
pub struct Converter {
    amount: String,
    from: Currency,
    to: Currency,
    result: Option<ConversionResult>,
    error: Option<String>,
    loading: bool,
    submission: u64,
}

impl Converter {
    pub fn new() -> Self {
        Converter {
            amount: "10.00".to_string(),
            from: Currency::Usd,
            to: Currency::Gbp,
            result: None,
            error: None,
            loading: false,
            submission: 0,
        }
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn from(&self) -> Currency {
        self.from
    }

    pub fn to(&self) -> Currency {
        self.to
    }

    pub fn result(&self) -> Option<&ConversionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Token identifying the current submission.
    pub fn submission_token(&self) -> SubmissionToken {
        SubmissionToken(self.submission)
    }

    /// Options offered by the target picker. The current source currency is
    /// never offered, so source = target cannot be selected from here.
    pub fn to_options(&self) -> Vec<Currency> {
        Currency::ALL
            .iter()
            .copied()
            .filter(|c| *c != self.from)
            .collect()
    }

    pub fn apply(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::SetAmount(text) => {
                self.amount = text;
                None
            }
            Action::SelectFrom(currency) => {
                self.from = currency;
                if self.to == currency {
                    // First other currency in iteration order
                    if let Some(next) = Currency::ALL.iter().copied().find(|c| *c != currency) {
                        self.to = next;
                    }
                }
                self.clear_outcome_and_invalidate();
                None
            }
            Action::SelectTo(currency) => {
                // Guard against equal selection; the picker excludes it
                if currency != self.from {
                    self.to = currency;
                }
                None
            }
            Action::Swap => {
                std::mem::swap(&mut self.from, &mut self.to);
                self.clear_outcome_and_invalidate();
                None
            }
            Action::SubmitStart => {
                self.result = None;
                self.error = None;
                self.loading = true;
                self.submission += 1;
                None
            }
            Action::SubmitSuccess { token, result } => {
                if token != self.submission_token() {
                    debug!("Ignoring stale conversion success");
                    return None;
                }
                self.loading = false;
                self.result = Some(result);
                Some(Effect::RevealResult)
            }
            Action::SubmitFailure { token, message } => {
                if token != self.submission_token() {
                    debug!("Ignoring stale conversion failure");
                    return None;
                }
                self.loading = false;
                self.error = Some(message);
                None
            }
        }
    }

    /// Validates the current inputs and performs one conversion call.
    ///
    /// A malformed amount or equal currencies is reported inline without
    /// touching the network or entering the loading state.
    pub async fn submit(&mut self, client: &dyn ConversionClient) -> Option<Effect> {
        self.result = None;
        self.error = None;

        let amount = match self.validate() {
            Ok(amount) => amount,
            Err(e) => {
                let token = self.submission_token();
                return self.apply(Action::SubmitFailure {
                    token,
                    message: e.to_string(),
                });
            }
        };

        self.apply(Action::SubmitStart);
        let token = self.submission_token();
        let (from, to) = (self.from, self.to);

        match client.convert(from, to, amount).await {
            Ok(conversion) => self.apply(Action::SubmitSuccess {
                token,
                result: ConversionResult {
                    amount,
                    from,
                    to,
                    converted_amount: conversion.converted_amount,
                    rate: conversion.rate,
                    inverse_rate: 1.0 / conversion.rate,
                },
            }),
            Err(e) => self.apply(Action::SubmitFailure {
                token,
                message: e.to_string(),
            }),
        }
    }

    fn validate(&self) -> Result<f64, ConvertError> {
        let amount: f64 = self
            .amount
            .trim()
            .parse()
            .map_err(|_| ConvertError::Validation(INVALID_AMOUNT_MESSAGE.to_string()))?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ConvertError::Validation(INVALID_AMOUNT_MESSAGE.to_string()));
        }
        if self.from == self.to {
            return Err(ConvertError::Validation(SAME_CURRENCY_MESSAGE.to_string()));
        }
        Ok(amount)
    }

    fn clear_outcome_and_invalidate(&mut self) {
        self.result = None;
        self.error = None;
        // The submission these belonged to is dead
        self.loading = false;
        self.submission += 1;
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}
