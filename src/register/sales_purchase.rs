//! Purchase/sales registers: rate-wise grouping, filtering and invoice-list figures

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::register::matches_search;
use crate::tax::gst::STANDARD_RATES;
use crate::types::{Invoice, InvoiceKind, RegisterEntry};

/// Count and sums for a group of register rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSummary {
    pub count: usize,
    pub total_taxable: BigDecimal,
    pub total_tax: BigDecimal,
    pub total_amount: BigDecimal,
}

impl RateSummary {
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a RegisterEntry>,
    {
        let mut summary = Self {
            count: 0,
            total_taxable: BigDecimal::from(0),
            total_tax: BigDecimal::from(0),
            total_amount: BigDecimal::from(0),
        };

        for entry in entries {
            summary.count += 1;
            summary.total_taxable += &entry.taxable_value;
            summary.total_tax += entry.total_tax();
            summary.total_amount += &entry.total_amount;
        }

        summary
    }
}

/// Whether a row passes the rate filter. `None` passes everything; `Some(0)` only zero-rated rows.
pub fn matches_rate(entry: &RegisterEntry, rate: Option<&BigDecimal>) -> bool {
    rate.is_none_or(|rate| &entry.gst_rate == rate)
}

/// Summarise the rows at `rate`, or all rows when `rate` is `None`
pub fn group_by_rate(records: &[RegisterEntry], rate: Option<&BigDecimal>) -> RateSummary {
    RateSummary::from_entries(records.iter().filter(|entry| matches_rate(entry, rate)))
}

/// Rows passing both the search term and the rate filter, in input order
pub fn filter_register<'a>(
    records: &'a [RegisterEntry],
    search: &str,
    rate: Option<&BigDecimal>,
) -> Vec<&'a RegisterEntry> {
    records
        .iter()
        .filter(|entry| matches_search(*entry, search) && matches_rate(entry, rate))
        .collect()
}

/// One summary per standard GST rate, in ascending rate order
pub fn rate_wise_summary(records: &[RegisterEntry]) -> Vec<(BigDecimal, RateSummary)> {
    STANDARD_RATES
        .iter()
        .map(|rate| {
            let rate = BigDecimal::from(*rate);
            let summary = group_by_rate(records, Some(&rate));
            (rate, summary)
        })
        .collect()
}

/// Register rows for every invoice of `kind`
pub fn register_entries(invoices: &[Invoice], kind: InvoiceKind) -> Vec<RegisterEntry> {
    invoices
        .iter()
        .filter(|invoice| invoice.kind == kind)
        .flat_map(RegisterEntry::from_invoice)
        .collect()
}

/// Headline figures for the invoice list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub purchase_count: usize,
    pub sales_count: usize,
    /// Sum of invoice grand totals across both kinds
    pub total_amount: BigDecimal,
}

impl InvoiceSummary {
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        Self {
            purchase_count: invoices
                .iter()
                .filter(|invoice| invoice.kind == InvoiceKind::Purchase)
                .count(),
            sales_count: invoices
                .iter()
                .filter(|invoice| invoice.kind == InvoiceKind::Sales)
                .count(),
            total_amount: invoices
                .iter()
                .map(|invoice| invoice.totals().grand_total)
                .sum(),
        }
    }
}

/// Invoices matching the search term, optionally restricted to one kind
pub fn filter_invoices<'a>(
    invoices: &'a [Invoice],
    search: &str,
    kind: Option<InvoiceKind>,
) -> Vec<&'a Invoice> {
    invoices
        .iter()
        .filter(|invoice| kind.is_none_or(|kind| invoice.kind == kind))
        .filter(|invoice| matches_search(*invoice, search))
        .collect()
}
