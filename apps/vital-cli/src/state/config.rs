//! # Configuration State
//!
//! Application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command-line flags (`--api-url`, `--session-file`)
//! 2. Environment variables (`VITAL_*`)
//! 3. Defaults (this file and `vital_client::config`)
//!
//! Read-only after startup.

use std::env;

use vital_client::{ClientConfig, ConfigError};
use vital_core::bill::default_terms;
use vital_core::{BillBuilder, Issuer, TaxRate};

/// Everything printed on a bill that is not cart content.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingConfig {
    /// Seller block (name, address lines, phone, email)
    pub issuer: Issuer,

    /// Tax rate in basis points. Checkout charges none by default.
    pub tax_rate: TaxRate,

    /// Footer lines
    pub terms: Vec<String>,
}

impl Default for BillingConfig {
    fn default() -> Self {
        BillingConfig {
            issuer: Issuer::default(),
            tax_rate: TaxRate::zero(),
            terms: default_terms(),
        }
    }
}

impl BillingConfig {
    /// Billing configuration from any key/value source.
    ///
    /// ## Variables
    /// - `VITAL_TAX_RATE_BPS`: tax rate in basis points (e.g. "825")
    /// - `VITAL_ISSUER_NAME`, `VITAL_ISSUER_PHONE`, `VITAL_ISSUER_EMAIL`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = BillingConfig::default();

        if let Some(bps) = lookup("VITAL_TAX_RATE_BPS") {
            let bps = bps.trim().parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                key: "VITAL_TAX_RATE_BPS".to_string(),
                value: bps.clone(),
            })?;
            config.tax_rate = TaxRate::from_bps(bps);
        }

        if let Some(name) = lookup("VITAL_ISSUER_NAME") {
            config.issuer.name = name;
        }
        if let Some(phone) = lookup("VITAL_ISSUER_PHONE") {
            config.issuer.phone = phone;
        }
        if let Some(email) = lookup("VITAL_ISSUER_EMAIL") {
            config.issuer.email = email;
        }

        Ok(config)
    }

    /// Bill builder carrying this configuration.
    pub fn bill_builder(&self) -> BillBuilder {
        BillBuilder {
            issuer: self.issuer.clone(),
            tax_rate: self.tax_rate,
            terms: self.terms.clone(),
        }
    }
}

/// Client and billing configuration together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub billing: BillingConfig,
}

impl AppConfig {
    /// Loads the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(AppConfig {
            client: ClientConfig::from_lookup(&lookup)?,
            billing: BillingConfig::from_lookup(&lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_tax() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert!(config.billing.tax_rate.is_zero());
        assert_eq!(config.billing.issuer.name, "VitalConnect Medical Supplies");
        assert_eq!(config.billing.terms.len(), 4);
    }

    #[test]
    fn test_tax_rate_from_env() {
        let config = BillingConfig::from_lookup(|key| {
            (key == "VITAL_TAX_RATE_BPS").then(|| "825".to_string())
        })
        .unwrap();
        assert_eq!(config.tax_rate.bps(), 825);
        assert_eq!(config.bill_builder().tax_rate.bps(), 825);
    }

    #[test]
    fn test_invalid_tax_rate_rejected() {
        let result = BillingConfig::from_lookup(|key| {
            (key == "VITAL_TAX_RATE_BPS").then(|| "8.25%".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_issuer_override() {
        let config = BillingConfig::from_lookup(|key| {
            (key == "VITAL_ISSUER_NAME").then(|| "Mercy Pharmacy".to_string())
        })
        .unwrap();
        assert_eq!(config.issuer.name, "Mercy Pharmacy");
        assert_eq!(config.issuer.phone, "(555) 123-4567");
    }
}
