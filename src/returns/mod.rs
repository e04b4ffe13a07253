//! GST return periods and GSTR-1 / GSTR-3B payload construction

pub mod gstr1;
pub mod gstr3b;

pub use gstr1::*;
pub use gstr3b::*;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::config::BooksConfig;
use crate::tax::gst::{round_currency, DEFAULT_CURRENCY_SCALE};
use crate::types::{BooksError, BooksResult, Invoice, InvoiceKind};

/// Day of the following month on which a return falls due
const DUE_DAY: u32 = 20;

/// Largest magnitude below which every whole `f64` is an exact integer (2^53)
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Currency figure or rate in a return payload.
///
/// Whole values are written as JSON integers (`25000`, `18`) and fractional
/// ones as decimals (`1.05`).
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    pub const ZERO: Amount = Amount(0.0);

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount(value)
    }
}

impl PartialEq<f64> for Amount {
    fn eq(&self, other: &f64) -> bool {
        self.0 == *other
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0.abs() < MAX_EXACT_INTEGER {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

/// Filing period: one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReturnPeriod {
    year: i32,
    month: u32,
}

impl ReturnPeriod {
    pub fn new(year: i32, month: u32) -> BooksResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(BooksError::InvalidPeriod(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        if !(1..=9999).contains(&year) {
            return Err(BooksError::InvalidPeriod(format!(
                "year must have four digits, got {}",
                year
            )));
        }
        Ok(Self { year, month })
    }

    /// Period containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// `ret_period` value used in return payloads (`YYYYMM`)
    pub fn ret_period(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    /// The following month
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Filing due date: the 20th of the following month
    pub fn due_date(&self) -> NaiveDate {
        let next = self.next();
        NaiveDate::from_ymd_opt(next.year, next.month, DUE_DAY).unwrap_or(NaiveDate::MAX)
    }

    pub fn gstr1_file_name(&self) -> String {
        format!("GSTR1_{}.json", self)
    }

    pub fn gstr3b_file_name(&self) -> String {
        format!("GSTR3B_{}.json", self)
    }
}

impl fmt::Display for ReturnPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ReturnPeriod {
    type Err = BooksError;

    /// Accepts `YYYY-MM` (month picker value) or `YYYYMM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = match s.split_once('-') {
            Some(parts) => parts,
            None if s.len() == 6 && s.is_char_boundary(4) => s.split_at(4),
            None => {
                return Err(BooksError::InvalidPeriod(format!(
                    "expected YYYY-MM or YYYYMM, got '{}'",
                    s
                )))
            }
        };

        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || month.len() != 2 || !digits(year) || !digits(month) {
            return Err(BooksError::InvalidPeriod(format!(
                "expected YYYY-MM or YYYYMM, got '{}'",
                s
            )));
        }

        let year: i32 = year
            .parse()
            .map_err(|_| BooksError::InvalidPeriod(format!("invalid year in '{}'", s)))?;
        let month: u32 = month
            .parse()
            .map_err(|_| BooksError::InvalidPeriod(format!("invalid month in '{}'", s)))?;

        Self::new(year, month)
    }
}

impl TryFrom<String> for ReturnPeriod {
    type Error = BooksError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReturnPeriod> for String {
    fn from(period: ReturnPeriod) -> Self {
        period.to_string()
    }
}

/// Invoices dated inside `period`, optionally restricted to one kind, in input order
pub fn filter_by_period<'a>(
    invoices: &'a [Invoice],
    period: &ReturnPeriod,
    kind: Option<InvoiceKind>,
) -> Vec<&'a Invoice> {
    invoices
        .iter()
        .filter(|invoice| period.contains(invoice.date))
        .filter(|invoice| kind.is_none_or(|kind| invoice.kind == kind))
        .collect()
}

/// Builds return payloads for one seller
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnBuilder {
    seller_gstin: String,
    currency_scale: i64,
}

impl ReturnBuilder {
    pub fn new(seller_gstin: impl Into<String>) -> Self {
        Self {
            seller_gstin: seller_gstin.into(),
            currency_scale: DEFAULT_CURRENCY_SCALE,
        }
    }

    /// Builder for the seller described by `config`; the config is validated first
    pub fn from_config(config: &BooksConfig) -> BooksResult<Self> {
        config.validate()?;
        Ok(Self::new(config.seller_gstin.clone()).with_currency_scale(config.currency_scale))
    }

    pub fn with_currency_scale(mut self, scale: i64) -> Self {
        self.currency_scale = scale;
        self
    }

    pub fn seller_gstin(&self) -> &str {
        &self.seller_gstin
    }

    /// Two-digit state code of the seller, used as place of supply
    pub fn place_of_supply(&self) -> String {
        self.seller_gstin.chars().take(2).collect()
    }

    /// Round for export and convert to a JSON number
    fn export_amount(&self, value: &BigDecimal) -> Amount {
        Amount(
            round_currency(value, self.currency_scale)
                .to_f64()
                .unwrap_or(0.0),
        )
    }
}
