//! Core types and data structures for GST bookkeeping

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tax::gst::{GstError, InvoiceTotals, LineAmounts, LineItem};

/// Direction of an invoice from the business's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    /// Bill received from a vendor (inward supply)
    Purchase,
    /// Bill issued to a customer (outward supply)
    Sales,
}

impl InvoiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceKind::Purchase => "purchase",
            InvoiceKind::Sales => "sales",
        }
    }

    /// Label for the counterparty column of registers and lists
    pub fn party_label(&self) -> &'static str {
        match self {
            InvoiceKind::Purchase => "Vendor",
            InvoiceKind::Sales => "Customer",
        }
    }
}

impl fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status, shown alongside an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    Pending,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purchase or sales invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice number, unique per kind
    pub number: String,
    pub kind: InvoiceKind,
    /// Date of issue
    pub date: NaiveDate,
    /// Vendor for purchases, customer for sales
    pub counterparty_name: String,
    /// Counterparty's 15-character GSTIN
    pub counterparty_gstin: String,
    /// Ordered line items
    pub line_items: Vec<LineItem>,
    pub status: InvoiceStatus,
}

impl Invoice {
    /// Create an invoice without line items
    pub fn new(
        number: impl Into<String>,
        kind: InvoiceKind,
        date: NaiveDate,
        counterparty_name: impl Into<String>,
        counterparty_gstin: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            kind,
            date,
            counterparty_name: counterparty_name.into(),
            counterparty_gstin: counterparty_gstin.into(),
            line_items: Vec::new(),
            status: InvoiceStatus::Pending,
        }
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_line_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    pub fn add_line_item(&mut self, item: LineItem) {
        self.line_items.push(item);
    }

    /// Derived amounts for every line, in order
    pub fn line_amounts(&self) -> Vec<LineAmounts> {
        self.line_items.iter().map(LineItem::amounts).collect()
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::from_line_items(&self.line_items)
    }

    /// Distinct GST rates on the invoice, in order of first appearance
    pub fn gst_rates(&self) -> Vec<BigDecimal> {
        let mut rates: Vec<BigDecimal> = Vec::new();
        for item in &self.line_items {
            if !rates.contains(&item.gst_rate) {
                rates.push(item.gst_rate.clone());
            }
        }
        rates
    }

    /// Line amounts summed per GST rate, in order of first appearance
    pub fn amounts_by_rate(&self) -> Vec<(BigDecimal, LineAmounts)> {
        self.gst_rates()
            .into_iter()
            .map(|rate| {
                let lines: Vec<LineAmounts> = self
                    .line_items
                    .iter()
                    .filter(|item| item.gst_rate == rate)
                    .map(LineItem::amounts)
                    .collect();
                let totals = crate::tax::gst::aggregate(&lines);
                let amounts = LineAmounts {
                    amount: totals.subtotal,
                    cgst: totals.total_cgst,
                    sgst: totals.total_sgst,
                    igst: totals.total_igst,
                };
                (rate, amounts)
            })
            .collect()
    }
}

/// Stock level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    /// At or below the minimum level
    Low,
    /// At or above 80% of the maximum level
    High,
    Normal,
}

impl StockStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::Low => "Low Stock",
            StockStatus::High => "High Stock",
            StockStatus::Normal => "Normal",
        }
    }
}

/// Inventory item tracked on the stock page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: String,
    pub name: String,
    pub current_stock: i64,
    pub minimum_stock: i64,
    pub maximum_stock: i64,
    pub unit_price: BigDecimal,
    pub category: String,
    pub supplier: String,
    pub last_updated: NaiveDate,
}

impl StockItem {
    pub fn status(&self) -> StockStatus {
        crate::register::stock::stock_status(
            self.current_stock,
            self.minimum_stock,
            self.maximum_stock,
        )
    }

    /// Value of stock on hand (current stock x unit price)
    pub fn stock_value(&self) -> BigDecimal {
        BigDecimal::from(self.current_stock) * &self.unit_price
    }
}

/// Status of an invoice in the external accounting package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Synced,
    Pending,
    Failed,
}

/// Sync log entry for one invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub invoice_number: String,
    pub kind: InvoiceKind,
    pub date: NaiveDate,
    pub party_name: String,
    pub amount: BigDecimal,
    pub status: SyncStatus,
    /// When the last sync attempt finished, if any
    pub last_sync: Option<NaiveDateTime>,
}

impl SyncRecord {
    /// Sync log entry for an invoice that has not been pushed yet
    pub fn pending_for(invoice: &Invoice) -> Self {
        Self {
            invoice_number: invoice.number.clone(),
            kind: invoice.kind,
            date: invoice.date,
            party_name: invoice.counterparty_name.clone(),
            amount: invoice.totals().grand_total,
            status: SyncStatus::Pending,
            last_sync: None,
        }
    }
}

/// Register row: one invoice's figures at a single GST rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterEntry {
    pub invoice_number: String,
    pub kind: InvoiceKind,
    pub date: NaiveDate,
    pub party_name: String,
    pub gstin: String,
    pub taxable_value: BigDecimal,
    pub gst_rate: BigDecimal,
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
    pub igst: BigDecimal,
    pub total_amount: BigDecimal,
}

impl RegisterEntry {
    /// Split an invoice into register rows, one per GST rate it carries
    pub fn from_invoice(invoice: &Invoice) -> Vec<Self> {
        invoice
            .amounts_by_rate()
            .into_iter()
            .map(|(gst_rate, amounts)| {
                let total_amount = amounts.total();
                Self {
                    invoice_number: invoice.number.clone(),
                    kind: invoice.kind,
                    date: invoice.date,
                    party_name: invoice.counterparty_name.clone(),
                    gstin: invoice.counterparty_gstin.clone(),
                    taxable_value: amounts.amount,
                    gst_rate,
                    cgst: amounts.cgst,
                    sgst: amounts.sgst,
                    igst: amounts.igst,
                    total_amount,
                }
            })
            .collect()
    }

    pub fn total_tax(&self) -> BigDecimal {
        &self.cgst + &self.sgst + &self.igst
    }

    /// The row's figures as line amounts, e.g. for rounding before export
    pub fn amounts(&self) -> LineAmounts {
        LineAmounts {
            amount: self.taxable_value.clone(),
            cgst: self.cgst.clone(),
            sgst: self.sgst.clone(),
            igst: self.igst.clone(),
        }
    }
}

/// Errors that can occur in the bookkeeping system
#[derive(Debug, thiserror::Error)]
pub enum BooksError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),
    #[error("Stock item not found: {0}")]
    StockItemNotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid return period: {0}")]
    InvalidPeriod(String),
    #[error("Invalid GSTIN: {0}")]
    InvalidGstin(String),
    #[error("Unsupported upload: {0}")]
    UnsupportedUpload(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Gst(#[from] GstError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for bookkeeping operations
pub type BooksResult<T> = Result<T, BooksError>;
