//! Stock level classification and stock page summary

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::{StockItem, StockStatus};

/// Classify a stock level.
///
/// Low is checked first (current at or below minimum), then High (current at
/// or above 80% of maximum); both bounds are inclusive.
pub fn stock_status(current: i64, minimum: i64, maximum: i64) -> StockStatus {
    if current <= minimum {
        StockStatus::Low
    } else if i128::from(current) * 5 >= i128::from(maximum) * 4 {
        StockStatus::High
    } else {
        StockStatus::Normal
    }
}

/// Headline figures for the stock page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub total_items: usize,
    pub low_stock_items: usize,
    /// Sum of current stock x unit price
    pub total_value: BigDecimal,
}

impl StockSummary {
    pub fn from_items(items: &[StockItem]) -> Self {
        Self {
            total_items: items.len(),
            low_stock_items: items
                .iter()
                .filter(|item| item.status() == StockStatus::Low)
                .count(),
            total_value: items.iter().map(StockItem::stock_value).sum(),
        }
    }
}
