//! The fixed set of currencies offered by the converter.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Gbp,
    Eur,
}

impl Currency {
    /// Iteration order used for picker options and target reassignment.
    pub const ALL: [Currency; 3] = [Currency::Usd, Currency::Gbp, Currency::Eur];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Gbp => "British Pound",
            Currency::Eur => "Euro",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Gbp => "£",
            Currency::Eur => "€",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "GBP" => Ok(Currency::Gbp),
            "EUR" => Ok(Currency::Eur),
            _ => Err(anyhow::anyhow!("Unsupported currency: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_display() {
        assert_eq!(Currency::Usd.code(), "USD");
        assert_eq!(Currency::Gbp.to_string(), "GBP");
        assert_eq!(Currency::Eur.symbol(), "€");
        assert_eq!(Currency::Usd.name(), "US Dollar");
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!("Gbp".parse::<Currency>().unwrap(), Currency::Gbp);
        assert!("JPY".parse::<Currency>().is_err());
        assert!("".parse::<Currency>().is_err());
    }

    #[test]
    fn test_iteration_order_is_deterministic() {
        assert_eq!(
            Currency::ALL,
            [Currency::Usd, Currency::Gbp, Currency::Eur]
        );
    }

    #[test]
    fn test_serde_uses_code() {
        let json = serde_json::to_string(&Currency::Eur).unwrap();
        assert_eq!(json, "\"EUR\"");
        let back: Currency = serde_json::from_str("\"GBP\"").unwrap();
        assert_eq!(back, Currency::Gbp);
    }
}
