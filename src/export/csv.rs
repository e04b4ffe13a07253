//! CSV exports for the invoice list, stock report and registers

use bigdecimal::BigDecimal;
use std::io::Write;
use tracing::info;

use crate::tax::gst::{round_currency, DEFAULT_CURRENCY_SCALE};
use crate::types::*;

pub const INVOICES_FILE: &str = "invoices.csv";
pub const STOCK_REPORT_FILE: &str = "stock_report.csv";

pub const INVOICES_HEADER: [&str; 7] = [
    "Invoice Number",
    "Date",
    "Vendor",
    "Type",
    "Amount",
    "GST",
    "Status",
];

pub const STOCK_HEADER: [&str; 8] = [
    "Item Name",
    "Current Stock",
    "Minimum Stock",
    "Maximum Stock",
    "Unit Price",
    "Category",
    "Supplier",
    "Last Updated",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `purchase_register.csv` or `sales_register.csv`
pub fn register_file_name(kind: InvoiceKind) -> String {
    format!("{}_register.csv", kind.as_str())
}

/// Register header; the party column is labelled Vendor or Customer
pub fn register_header(kind: InvoiceKind) -> [&'static str; 10] {
    [
        "Invoice No",
        "Date",
        kind.party_label(),
        "GSTIN",
        "Taxable Value",
        "GST Rate",
        "CGST",
        "SGST",
        "IGST",
        "Total Amount",
    ]
}

/// GST rate as shown in registers, e.g. `18%` or `12.5%`
pub fn format_rate(rate: &BigDecimal) -> String {
    if rate.is_integer() {
        format!("{}%", rate.with_scale(0))
    } else {
        format!("{}%", rate.normalized())
    }
}

fn format_amount(value: &BigDecimal) -> String {
    round_currency(value, DEFAULT_CURRENCY_SCALE).to_string()
}

fn csv_writer<W: Write>(writer: W) -> ::csv::Writer<W> {
    ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(writer)
}

/// Write the invoice list. Amount is the grand total and GST the total tax.
pub fn write_invoices_csv<'a, I, W>(invoices: I, writer: W) -> BooksResult<usize>
where
    I: IntoIterator<Item = &'a Invoice>,
    W: Write,
{
    let mut csv = csv_writer(writer);
    csv.write_record(INVOICES_HEADER)?;

    let mut rows = 0;
    for invoice in invoices {
        let totals = invoice.totals().rounded(DEFAULT_CURRENCY_SCALE);
        csv.write_record([
            invoice.number.clone(),
            invoice.date.format(DATE_FORMAT).to_string(),
            invoice.counterparty_name.clone(),
            invoice.kind.to_string(),
            totals.grand_total.to_string(),
            totals.total_tax.to_string(),
            invoice.status.to_string(),
        ])?;
        rows += 1;
    }

    csv.flush()?;
    info!(rows, "exported invoice list");
    Ok(rows)
}

pub fn write_stock_csv<'a, I, W>(items: I, writer: W) -> BooksResult<usize>
where
    I: IntoIterator<Item = &'a StockItem>,
    W: Write,
{
    let mut csv = csv_writer(writer);
    csv.write_record(STOCK_HEADER)?;

    let mut rows = 0;
    for item in items {
        csv.write_record([
            item.name.clone(),
            item.current_stock.to_string(),
            item.minimum_stock.to_string(),
            item.maximum_stock.to_string(),
            format_amount(&item.unit_price),
            item.category.clone(),
            item.supplier.clone(),
            item.last_updated.format(DATE_FORMAT).to_string(),
        ])?;
        rows += 1;
    }

    csv.flush()?;
    info!(rows, "exported stock report");
    Ok(rows)
}

/// Write register rows under the header for `kind`
pub fn write_register_csv<'a, I, W>(kind: InvoiceKind, entries: I, writer: W) -> BooksResult<usize>
where
    I: IntoIterator<Item = &'a RegisterEntry>,
    W: Write,
{
    let mut csv = csv_writer(writer);
    csv.write_record(register_header(kind))?;

    let mut rows = 0;
    for entry in entries {
        let rounded = entry.amounts().rounded(DEFAULT_CURRENCY_SCALE);
        csv.write_record([
            entry.invoice_number.clone(),
            entry.date.format(DATE_FORMAT).to_string(),
            entry.party_name.clone(),
            entry.gstin.clone(),
            rounded.amount.to_string(),
            format_rate(&entry.gst_rate),
            rounded.cgst.to_string(),
            rounded.sgst.to_string(),
            rounded.igst.to_string(),
            rounded.total().to_string(),
        ])?;
        rows += 1;
    }

    csv.flush()?;
    info!(rows, register = %kind, "exported register");
    Ok(rows)
}
