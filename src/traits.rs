//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::*;

/// Storage abstraction for invoices, stock and the sync log
///
/// The bookkeeping core never owns data itself; any backend (database,
/// in-memory, fixtures) can be plugged in by implementing these methods.
#[async_trait]
pub trait BooksStorage: Send + Sync {
    /// Save an invoice, replacing any invoice with the same kind and number
    async fn save_invoice(&mut self, invoice: &Invoice) -> BooksResult<()>;

    /// Get an invoice by kind and number
    async fn get_invoice(&self, kind: InvoiceKind, number: &str) -> BooksResult<Option<Invoice>>;

    /// List invoices ordered by date then number, optionally filtered by kind and date range
    async fn list_invoices(
        &self,
        kind: Option<InvoiceKind>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> BooksResult<Vec<Invoice>>;

    /// Update an existing invoice
    async fn update_invoice(&mut self, invoice: &Invoice) -> BooksResult<()>;

    /// Delete an invoice
    async fn delete_invoice(&mut self, kind: InvoiceKind, number: &str) -> BooksResult<()>;

    /// Save a stock item, replacing any item with the same id
    async fn save_stock_item(&mut self, item: &StockItem) -> BooksResult<()>;

    async fn get_stock_item(&self, id: &str) -> BooksResult<Option<StockItem>>;

    /// List stock items ordered by name
    async fn list_stock_items(&self) -> BooksResult<Vec<StockItem>>;

    /// Save a sync log entry, replacing the entry for the same invoice
    async fn save_sync_record(&mut self, record: &SyncRecord) -> BooksResult<()>;

    /// List sync log entries ordered by date then invoice number
    async fn list_sync_records(&self) -> BooksResult<Vec<SyncRecord>>;
}

/// Trait for implementing custom invoice validation rules
pub trait InvoiceValidator: Send + Sync {
    /// Validate an invoice before saving
    fn validate_invoice(&self, invoice: &Invoice) -> BooksResult<()>;
}

/// Default validator: the same required fields the bill forms insist on
pub struct DefaultInvoiceValidator;

impl InvoiceValidator for DefaultInvoiceValidator {
    fn validate_invoice(&self, invoice: &Invoice) -> BooksResult<()> {
        if invoice.number.trim().is_empty() {
            return Err(BooksError::Validation(
                "Invoice number cannot be empty".to_string(),
            ));
        }

        if invoice.counterparty_name.trim().is_empty() {
            return Err(BooksError::Validation(format!(
                "{} name cannot be empty",
                invoice.kind.party_label()
            )));
        }

        Ok(())
    }
}

/// Records that can be matched against a free-text search box
pub trait Searchable {
    /// Text fields a search term is matched against
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for Invoice {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.number.as_str(), self.counterparty_name.as_str()]
    }
}

impl Searchable for RegisterEntry {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.invoice_number.as_str(), self.party_name.as_str()]
    }
}

impl Searchable for StockItem {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.category.as_str(), self.supplier.as_str()]
    }
}

impl Searchable for SyncRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.invoice_number.as_str(), self.party_name.as_str()]
    }
}
