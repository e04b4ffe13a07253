//! Uploaded invoice acceptance and conversion of extracted data

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::tax::gst::{parse_amount, round_currency, LineItem, DEFAULT_CURRENCY_SCALE, STANDARD_RATES};
use crate::types::*;

/// Largest accepted upload (10 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// File types accepted for invoice upload
pub const ACCEPTED_MIME_TYPES: [&str; 7] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "image/tiff",
    "image/bmp",
];

/// Check an upload's declared MIME type and size before it is processed
pub fn validate_upload(mime_type: &str, size_bytes: u64) -> BooksResult<()> {
    if !ACCEPTED_MIME_TYPES.contains(&mime_type) {
        warn!(mime_type, "rejected upload with unsupported file type");
        return Err(BooksError::UnsupportedUpload(format!(
            "file type '{}' is not accepted; upload an image (JPG, PNG, GIF, WebP) or PDF file",
            mime_type
        )));
    }

    if size_bytes > MAX_UPLOAD_BYTES {
        warn!(size_bytes, "rejected upload over the size limit");
        return Err(BooksError::UnsupportedUpload(format!(
            "file is {} bytes; the limit is {} bytes",
            size_bytes, MAX_UPLOAD_BYTES
        )));
    }

    Ok(())
}

/// Item row as produced by the extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub name: String,
    pub quantity: String,
    pub rate: String,
    pub amount: String,
}

impl ExtractedItem {
    /// Line value as extracted, or quantity x rate when no amount was read
    pub fn value(&self) -> BigDecimal {
        let amount = parse_amount(&self.amount);
        if amount.is_zero() {
            parse_amount(&self.quantity) * parse_amount(&self.rate)
        } else {
            amount
        }
    }

    fn line_item(&self, gst_rate: &BigDecimal) -> LineItem {
        let quantity = parse_amount(&self.quantity);
        let rate = parse_amount(&self.rate);
        if (&quantity * &rate).is_zero() {
            LineItem::new(self.name.clone(), BigDecimal::from(1), self.value(), gst_rate.clone())
        } else {
            LineItem::new(self.name.clone(), quantity, rate, gst_rate.clone())
        }
    }
}

/// Invoice fields read off an uploaded document. Every field is raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedInvoice {
    pub invoice_number: String,
    pub date: String,
    pub vendor_name: String,
    #[serde(rename = "vendorGST")]
    pub vendor_gst: String,
    pub total_amount: String,
    pub gst_amount: String,
    #[serde(default)]
    pub items: Vec<ExtractedItem>,
}

impl ExtractedInvoice {
    pub fn from_json(json: &str) -> BooksResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// GST rate implied by the tax and total amounts.
    ///
    /// Items carry no rate of their own, so the rate is `gst / (total - gst)`
    /// when that lands on a standard slab, and zero otherwise.
    pub fn inferred_gst_rate(&self) -> BigDecimal {
        let total = parse_amount(&self.total_amount);
        let gst = parse_amount(&self.gst_amount);
        let taxable = &total - &gst;

        if gst.is_zero() || taxable <= BigDecimal::zero() {
            return BigDecimal::zero();
        }

        let percent = round_currency(&(gst * BigDecimal::from(100) / taxable), 0);
        match percent.to_u32() {
            Some(rate) if STANDARD_RATES.contains(&rate) => BigDecimal::from(rate),
            _ => BigDecimal::zero(),
        }
    }

    /// Rows that make up the taxable value.
    ///
    /// Item values should add up to `total - gst`. When they don't, rows whose
    /// value equals the GST amount are the tax itself and are left out.
    pub fn goods_items(&self) -> Vec<&ExtractedItem> {
        let gst = parse_amount(&self.gst_amount);
        let taxable = parse_amount(&self.total_amount) - &gst;
        let listed: BigDecimal = self.items.iter().map(ExtractedItem::value).sum();

        if listed == taxable || gst.is_zero() {
            return self.items.iter().collect();
        }
        self.items.iter().filter(|item| item.value() != gst).collect()
    }

    /// Convert into an invoice, parsing numbers leniently.
    ///
    /// The converted invoice must reproduce the document's total and GST
    /// amount; otherwise the extraction is rejected.
    pub fn into_invoice(self, kind: InvoiceKind) -> BooksResult<Invoice> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|err| {
            BooksError::Validation(format!("invoice date '{}' is not a date: {}", self.date, err))
        })?;
        let gst_rate = self.inferred_gst_rate();
        let goods = self.goods_items();
        if goods.len() < self.items.len() {
            debug!(
                invoice = %self.invoice_number,
                dropped = self.items.len() - goods.len(),
                "treating extracted rows equal to the GST amount as tax"
            );
        }

        let mut invoice = Invoice::new(
            self.invoice_number.trim(),
            kind,
            date,
            self.vendor_name.trim(),
            self.vendor_gst.trim(),
        );
        for item in goods {
            invoice.add_line_item(item.line_item(&gst_rate));
        }

        let totals = invoice.totals().rounded(DEFAULT_CURRENCY_SCALE);
        let stated_total = round_currency(&parse_amount(&self.total_amount), DEFAULT_CURRENCY_SCALE);
        let stated_gst = round_currency(&parse_amount(&self.gst_amount), DEFAULT_CURRENCY_SCALE);
        if totals.grand_total != stated_total || totals.total_tax != stated_gst {
            warn!(
                invoice = %invoice.number,
                computed_total = %totals.grand_total,
                stated_total = %stated_total,
                "extracted items do not reconcile with the document totals"
            );
            return Err(BooksError::Validation(format!(
                "extracted items come to {} with {} GST, but invoice {} states {} with {} GST",
                totals.grand_total, totals.total_tax, invoice.number, stated_total, stated_gst
            )));
        }

        debug!(
            invoice = %invoice.number,
            gst_rate = %gst_rate,
            lines = invoice.line_items.len(),
            "converted extracted invoice"
        );
        Ok(invoice)
    }
}
