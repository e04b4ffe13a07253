//! Month-wise sales/purchase report, best-selling products and category shares

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::returns::ReturnPeriod;
use crate::tax::gst::round_currency;
use crate::types::{Invoice, InvoiceKind, StockItem};

/// Number of products listed in a financial report
pub const TOP_PRODUCTS_LIMIT: usize = 5;

/// Category for sold items that match no stock item
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Sales, purchases and profit for one month, on taxable values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFigures {
    pub period: ReturnPeriod,
    pub sales: BigDecimal,
    pub purchases: BigDecimal,
    /// Sales minus purchases
    pub profit: BigDecimal,
}

/// Group invoices by calendar month, oldest month first
pub fn monthly_report(invoices: &[Invoice]) -> Vec<MonthlyFigures> {
    let mut months: BTreeMap<ReturnPeriod, (BigDecimal, BigDecimal)> = BTreeMap::new();

    for invoice in invoices {
        let (sales, purchases) = months
            .entry(ReturnPeriod::from_date(invoice.date))
            .or_insert_with(|| (BigDecimal::from(0), BigDecimal::from(0)));
        let taxable = invoice.totals().subtotal;
        match invoice.kind {
            InvoiceKind::Sales => *sales += taxable,
            InvoiceKind::Purchase => *purchases += taxable,
        }
    }

    months
        .into_iter()
        .map(|(period, (sales, purchases))| {
            let profit = &sales - &purchases;
            MonthlyFigures {
                period,
                sales,
                purchases,
                profit,
            }
        })
        .collect()
}

/// Sales of one product, by line item description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    pub product: String,
    /// Taxable sales value
    pub sales: BigDecimal,
    pub quantity: BigDecimal,
}

/// Products ranked by taxable sales value, highest first, at most `limit` of them.
///
/// Only sales invoices count. Equal sales keep alphabetical order.
pub fn top_products(invoices: &[Invoice], limit: usize) -> Vec<TopProduct> {
    let mut products: BTreeMap<&str, (BigDecimal, BigDecimal)> = BTreeMap::new();

    for item in invoices
        .iter()
        .filter(|invoice| invoice.kind == InvoiceKind::Sales)
        .flat_map(|invoice| &invoice.line_items)
    {
        let (sales, quantity) = products
            .entry(item.description.as_str())
            .or_insert_with(|| (BigDecimal::zero(), BigDecimal::zero()));
        *sales += item.amounts().amount;
        *quantity += &item.quantity;
    }

    let mut ranked: Vec<TopProduct> = products
        .into_iter()
        .map(|(product, (sales, quantity))| TopProduct {
            product: product.to_string(),
            sales,
            quantity,
        })
        .collect();
    ranked.sort_by(|a, b| b.sales.cmp(&a.sales));
    ranked.truncate(limit);
    ranked
}

/// One category's part of total sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub name: String,
    pub sales: BigDecimal,
    /// Whole percent of all sales
    pub value: u32,
}

/// Sales split by stock category, largest first.
///
/// A sold item takes the category of the stock item with the same name
/// (case-insensitive); anything else counts as [`UNCATEGORIZED`].
pub fn category_shares(invoices: &[Invoice], stock: &[StockItem]) -> Vec<CategoryShare> {
    let category_of = |description: &str| {
        stock
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(description.trim()))
            .map_or(UNCATEGORIZED, |item| item.category.as_str())
    };

    let mut categories: BTreeMap<&str, BigDecimal> = BTreeMap::new();
    for item in invoices
        .iter()
        .filter(|invoice| invoice.kind == InvoiceKind::Sales)
        .flat_map(|invoice| &invoice.line_items)
    {
        *categories
            .entry(category_of(&item.description))
            .or_insert_with(BigDecimal::zero) += item.amounts().amount;
    }

    let total: BigDecimal = categories.values().sum();
    if total.is_zero() {
        return Vec::new();
    }

    let mut shares: Vec<CategoryShare> = categories
        .into_iter()
        .map(|(name, sales)| {
            let percent = round_currency(&(&sales * BigDecimal::from(100) / &total), 0);
            CategoryShare {
                name: name.to_string(),
                value: percent.to_u32().unwrap_or(0),
                sales,
            }
        })
        .collect();
    shares.sort_by(|a, b| b.sales.cmp(&a.sales));
    shares
}

/// Report export: month-wise figures, category shares and best sellers,
/// stamped with the time they were produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub monthly: Vec<MonthlyFigures>,
    pub categories: Vec<CategoryShare>,
    pub top_products: Vec<TopProduct>,
    pub generated_at: DateTime<Utc>,
}

impl FinancialReport {
    pub fn new(invoices: &[Invoice], stock: &[StockItem], generated_at: DateTime<Utc>) -> Self {
        Self {
            monthly: monthly_report(invoices),
            categories: category_shares(invoices, stock),
            top_products: top_products(invoices, TOP_PRODUCTS_LIMIT),
            generated_at,
        }
    }
}
