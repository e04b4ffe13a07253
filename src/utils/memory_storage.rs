//! In-memory storage implementation for testing

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::traits::*;
use crate::types::*;

type InvoiceKey = (InvoiceKind, String);

/// In-memory storage implementation for testing and development
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    invoices: Arc<RwLock<HashMap<InvoiceKey, Invoice>>>,
    stock: Arc<RwLock<HashMap<String, StockItem>>>,
    sync_log: Arc<RwLock<HashMap<InvoiceKey, SyncRecord>>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            invoices: Arc::new(RwLock::new(HashMap::new())),
            stock: Arc::new(RwLock::new(HashMap::new())),
            sync_log: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Storage pre-loaded with fixture data
    pub fn with_data(invoices: Vec<Invoice>, stock: Vec<StockItem>) -> BooksResult<Self> {
        let storage = Self::new();
        {
            let mut map = storage.invoices.write().map_err(poisoned)?;
            for invoice in invoices {
                map.insert(key(invoice.kind, &invoice.number), invoice);
            }
        }
        {
            let mut map = storage.stock.write().map_err(poisoned)?;
            for item in stock {
                map.insert(item.id.clone(), item);
            }
        }
        Ok(storage)
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> BooksResult<()> {
        self.invoices.write().map_err(poisoned)?.clear();
        self.stock.write().map_err(poisoned)?.clear();
        self.sync_log.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn key(kind: InvoiceKind, number: &str) -> InvoiceKey {
    (kind, number.to_string())
}

fn poisoned<T>(_: PoisonError<T>) -> BooksError {
    BooksError::Storage("storage lock poisoned".to_string())
}

fn in_range(date: NaiveDate, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> bool {
    start_date.is_none_or(|start| date >= start) && end_date.is_none_or(|end| date <= end)
}

#[async_trait]
impl BooksStorage for MemoryStorage {
    async fn save_invoice(&mut self, invoice: &Invoice) -> BooksResult<()> {
        self.invoices
            .write()
            .map_err(poisoned)?
            .insert(key(invoice.kind, &invoice.number), invoice.clone());
        debug!(number = %invoice.number, kind = %invoice.kind, "saved invoice");
        Ok(())
    }

    async fn get_invoice(&self, kind: InvoiceKind, number: &str) -> BooksResult<Option<Invoice>> {
        Ok(self
            .invoices
            .read()
            .map_err(poisoned)?
            .get(&key(kind, number))
            .cloned())
    }

    async fn list_invoices(
        &self,
        kind: Option<InvoiceKind>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> BooksResult<Vec<Invoice>> {
        let invoices = self.invoices.read().map_err(poisoned)?;
        let mut filtered: Vec<Invoice> = invoices
            .values()
            .filter(|invoice| kind.is_none_or(|kind| invoice.kind == kind))
            .filter(|invoice| in_range(invoice.date, start_date, end_date))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.number.cmp(&b.number)));
        Ok(filtered)
    }

    async fn update_invoice(&mut self, invoice: &Invoice) -> BooksResult<()> {
        let mut invoices = self.invoices.write().map_err(poisoned)?;
        let key = key(invoice.kind, &invoice.number);
        match invoices.get_mut(&key) {
            Some(existing) => {
                *existing = invoice.clone();
                Ok(())
            }
            None => Err(BooksError::InvoiceNotFound(invoice.number.clone())),
        }
    }

    async fn delete_invoice(&mut self, kind: InvoiceKind, number: &str) -> BooksResult<()> {
        if self
            .invoices
            .write()
            .map_err(poisoned)?
            .remove(&key(kind, number))
            .is_some()
        {
            self.sync_log.write().map_err(poisoned)?.remove(&key(kind, number));
            debug!(number, kind = %kind, "deleted invoice");
            Ok(())
        } else {
            Err(BooksError::InvoiceNotFound(number.to_string()))
        }
    }

    async fn save_stock_item(&mut self, item: &StockItem) -> BooksResult<()> {
        self.stock
            .write()
            .map_err(poisoned)?
            .insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn get_stock_item(&self, id: &str) -> BooksResult<Option<StockItem>> {
        Ok(self.stock.read().map_err(poisoned)?.get(id).cloned())
    }

    async fn list_stock_items(&self) -> BooksResult<Vec<StockItem>> {
        let mut items: Vec<StockItem> = self.stock.read().map_err(poisoned)?.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn save_sync_record(&mut self, record: &SyncRecord) -> BooksResult<()> {
        self.sync_log
            .write()
            .map_err(poisoned)?
            .insert(key(record.kind, &record.invoice_number), record.clone());
        Ok(())
    }

    async fn list_sync_records(&self) -> BooksResult<Vec<SyncRecord>> {
        let mut records: Vec<SyncRecord> = self
            .sync_log
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.invoice_number.cmp(&b.invoice_number))
        });
        Ok(records)
    }
}
