//! Bookkeeping orchestrator tying storage, validation and return building together

use chrono::{NaiveDateTime, Utc};
use tracing::{debug, info};

use crate::billing::BillDraft;
use crate::config::BooksConfig;
use crate::register::*;
use crate::returns::{Gstr1Payload, Gstr3bPayload, ReturnBuilder, ReturnPeriod, ReturnSummary};
use crate::traits::*;
use crate::types::*;

/// Invoice books for one seller, backed by any storage implementation
pub struct Books<S: BooksStorage> {
    storage: S,
    returns: ReturnBuilder,
    validator: Box<dyn InvoiceValidator>,
}

impl<S: BooksStorage> Books<S> {
    pub fn new(storage: S, returns: ReturnBuilder) -> Self {
        Self {
            storage,
            returns,
            validator: Box::new(DefaultInvoiceValidator),
        }
    }

    /// Create books with a custom invoice validator
    pub fn with_validator(
        storage: S,
        returns: ReturnBuilder,
        validator: Box<dyn InvoiceValidator>,
    ) -> Self {
        Self {
            storage,
            returns,
            validator,
        }
    }

    pub fn from_config(storage: S, config: &BooksConfig) -> BooksResult<Self> {
        Ok(Self::new(storage, ReturnBuilder::from_config(config)?))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn return_builder(&self) -> &ReturnBuilder {
        &self.returns
    }

    // Invoice operations

    /// Validate and store a new invoice, queueing it for accounting sync
    pub async fn record_invoice(&mut self, invoice: Invoice) -> BooksResult<()> {
        self.validator.validate_invoice(&invoice)?;

        if self
            .storage
            .get_invoice(invoice.kind, &invoice.number)
            .await?
            .is_some()
        {
            return Err(BooksError::Validation(format!(
                "{} invoice '{}' already exists",
                invoice.kind, invoice.number
            )));
        }

        self.storage.save_invoice(&invoice).await?;
        self.storage
            .save_sync_record(&SyncRecord::pending_for(&invoice))
            .await?;

        info!(number = %invoice.number, kind = %invoice.kind, "recorded invoice");
        Ok(())
    }

    /// Finalize a bill draft and record the resulting invoice
    pub async fn record_bill(&mut self, draft: BillDraft) -> BooksResult<Invoice> {
        let invoice = draft.finalize()?;
        self.record_invoice(invoice.clone()).await?;
        Ok(invoice)
    }

    pub async fn get_invoice(&self, kind: InvoiceKind, number: &str) -> BooksResult<Option<Invoice>> {
        self.storage.get_invoice(kind, number).await
    }

    /// Get an invoice, returning an error if not found
    pub async fn get_invoice_required(&self, kind: InvoiceKind, number: &str) -> BooksResult<Invoice> {
        self.storage
            .get_invoice(kind, number)
            .await?
            .ok_or_else(|| BooksError::InvoiceNotFound(number.to_string()))
    }

    /// Invoices of one kind (or all), filtered by a free-text search term
    pub async fn list_invoices(&self, kind: Option<InvoiceKind>, search: &str) -> BooksResult<Vec<Invoice>> {
        let invoices = self.storage.list_invoices(kind, None, None).await?;
        Ok(invoices
            .into_iter()
            .filter(|invoice| matches_search(invoice, search))
            .collect())
    }

    pub async fn delete_invoice(&mut self, kind: InvoiceKind, number: &str) -> BooksResult<()> {
        self.storage.delete_invoice(kind, number).await?;
        info!(number, kind = %kind, "deleted invoice");
        Ok(())
    }

    pub async fn update_status(
        &mut self,
        kind: InvoiceKind,
        number: &str,
        status: InvoiceStatus,
    ) -> BooksResult<Invoice> {
        let invoice = self.get_invoice_required(kind, number).await?.with_status(status);
        self.storage.update_invoice(&invoice).await?;
        debug!(number, status = %status, "updated invoice status");
        Ok(invoice)
    }

    pub async fn invoice_summary(&self) -> BooksResult<InvoiceSummary> {
        let invoices = self.storage.list_invoices(None, None, None).await?;
        Ok(InvoiceSummary::from_invoices(&invoices))
    }

    // Registers and stock

    /// Register rows for one kind, optionally limited to a return period
    pub async fn register(
        &self,
        kind: InvoiceKind,
        period: Option<&ReturnPeriod>,
    ) -> BooksResult<Vec<RegisterEntry>> {
        let invoices = self
            .storage
            .list_invoices(
                Some(kind),
                period.map(ReturnPeriod::first_day),
                period.map(ReturnPeriod::last_day),
            )
            .await?;
        Ok(register_entries(&invoices, kind))
    }

    pub async fn add_stock_item(&mut self, item: StockItem) -> BooksResult<()> {
        crate::utils::validation::validate_required("Item name", &item.name)?;
        self.storage.save_stock_item(&item).await?;
        debug!(id = %item.id, name = %item.name, "saved stock item");
        Ok(())
    }

    pub async fn get_stock_item(&self, id: &str) -> BooksResult<StockItem> {
        self.storage
            .get_stock_item(id)
            .await?
            .ok_or_else(|| BooksError::StockItemNotFound(id.to_string()))
    }

    /// Stock items matching the search term, ordered by name
    pub async fn stock_items(&self, search: &str) -> BooksResult<Vec<StockItem>> {
        let items = self.storage.list_stock_items().await?;
        Ok(items
            .into_iter()
            .filter(|item| matches_search(item, search))
            .collect())
    }

    pub async fn stock_summary(&self) -> BooksResult<StockSummary> {
        let items = self.storage.list_stock_items().await?;
        Ok(StockSummary::from_items(&items))
    }

    // Accounting sync

    pub async fn sync_records(&self) -> BooksResult<Vec<SyncRecord>> {
        self.storage.list_sync_records().await
    }

    pub async fn sync_summary(&self) -> BooksResult<SyncSummary> {
        let records = self.storage.list_sync_records().await?;
        Ok(SyncSummary::from_records(&records))
    }

    /// Record the outcome of pushing an invoice to the accounting package
    pub async fn record_sync_result(
        &mut self,
        kind: InvoiceKind,
        number: &str,
        synced: bool,
        at: NaiveDateTime,
    ) -> BooksResult<SyncRecord> {
        let invoice = self.get_invoice_required(kind, number).await?;
        let record = SyncRecord {
            status: if synced {
                SyncStatus::Synced
            } else {
                SyncStatus::Failed
            },
            last_sync: Some(at),
            ..SyncRecord::pending_for(&invoice)
        };
        self.storage.save_sync_record(&record).await?;
        debug!(number, synced, "recorded sync result");
        Ok(record)
    }

    // Returns and reports

    async fn period_invoices(&self, kind: InvoiceKind, period: &ReturnPeriod) -> BooksResult<Vec<Invoice>> {
        self.storage
            .list_invoices(Some(kind), Some(period.first_day()), Some(period.last_day()))
            .await
    }

    pub async fn return_summary(&self, period: &ReturnPeriod) -> BooksResult<ReturnSummary> {
        let outward = self.period_invoices(InvoiceKind::Sales, period).await?;
        let inward = self.period_invoices(InvoiceKind::Purchase, period).await?;
        Ok(ReturnSummary::compute(period, &outward, &inward))
    }

    pub async fn gstr1(&self, period: &ReturnPeriod) -> BooksResult<Gstr1Payload> {
        let sales = self.period_invoices(InvoiceKind::Sales, period).await?;
        Ok(self.returns.gstr1(period, &sales))
    }

    pub async fn gstr3b(&self, period: &ReturnPeriod) -> BooksResult<Gstr3bPayload> {
        let outward = self.period_invoices(InvoiceKind::Sales, period).await?;
        let inward = self.period_invoices(InvoiceKind::Purchase, period).await?;
        Ok(self.returns.gstr3b(period, &outward, &inward))
    }

    pub async fn monthly_report(&self) -> BooksResult<Vec<MonthlyFigures>> {
        let invoices = self.storage.list_invoices(None, None, None).await?;
        Ok(monthly_report(&invoices))
    }

    pub async fn financial_report(&self) -> BooksResult<FinancialReport> {
        let invoices = self.storage.list_invoices(None, None, None).await?;
        let stock = self.storage.list_stock_items().await?;
        Ok(FinancialReport::new(&invoices, &stock, Utc::now()))
    }
}
