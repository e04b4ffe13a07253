//! Seller configuration loaded from TOML

use serde::Deserialize;
use std::{fs, path::Path};

use crate::tax::gst::DEFAULT_CURRENCY_SCALE;
use crate::types::{BooksError, BooksResult};
use crate::utils::validation::validate_gstin;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BooksConfig {
    /// GSTIN of the business filing returns
    pub seller_gstin: String,
    #[serde(default)]
    pub seller_name: String,
    /// Decimal places used when rounding exported amounts
    #[serde(default = "default_currency_scale")]
    pub currency_scale: i64,
}

fn default_currency_scale() -> i64 {
    DEFAULT_CURRENCY_SCALE
}

impl BooksConfig {
    pub fn new(seller_gstin: impl Into<String>) -> Self {
        Self {
            seller_gstin: seller_gstin.into(),
            seller_name: String::new(),
            currency_scale: DEFAULT_CURRENCY_SCALE,
        }
    }

    pub fn from_toml_str(content: &str) -> BooksResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> BooksResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> BooksResult<()> {
        validate_gstin(&self.seller_gstin)?;

        if !(0..=6).contains(&self.currency_scale) {
            return Err(BooksError::Config(format!(
                "currency_scale must be between 0 and 6, got {}",
                self.currency_scale
            )));
        }

        Ok(())
    }
}
