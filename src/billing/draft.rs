//! Draft bills with editable line items

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::tax::gst::{aggregate, parse_amount, InvoiceTotals, LineAmounts, LineItem};
use crate::types::*;
use crate::utils::validation::validate_required;

/// Line on a draft bill, keyed by a stable id so rows can be edited and removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftLine {
    pub id: Uuid,
    pub item: LineItem,
}

impl DraftLine {
    fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            item: LineItem::new(
                "",
                BigDecimal::from(1),
                BigDecimal::from(0),
                BigDecimal::from(18),
            ),
        }
    }
}

/// Vendor or customer details captured on the bill form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyDetails {
    pub name: String,
    pub address: String,
    pub gstin: String,
    /// Phone or email used when sending the bill
    pub contact: String,
}

/// Editable field of a draft line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineField {
    Description,
    Quantity,
    Rate,
    GstRate,
}

/// A single edit applied to a draft line
#[derive(Debug, Clone, PartialEq)]
pub enum LineEdit {
    Description(String),
    Quantity(BigDecimal),
    Rate(BigDecimal),
    GstRate(BigDecimal),
}

impl LineEdit {
    /// Build an edit from raw form input. Numeric fields that fail to parse become zero.
    pub fn parse(field: LineField, text: &str) -> Self {
        match field {
            LineField::Description => LineEdit::Description(text.to_string()),
            LineField::Quantity => LineEdit::Quantity(parse_amount(text)),
            LineField::Rate => LineEdit::Rate(parse_amount(text)),
            LineField::GstRate => LineEdit::GstRate(parse_amount(text)),
        }
    }

    fn apply(self, item: LineItem) -> LineItem {
        match self {
            LineEdit::Description(description) => item.with_description(description),
            LineEdit::Quantity(quantity) => item.with_quantity(quantity),
            LineEdit::Rate(rate) => item.with_rate(rate),
            LineEdit::GstRate(gst_rate) => item.with_gst_rate(gst_rate),
        }
    }
}

/// Purchase or sales bill being filled in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDraft {
    pub kind: InvoiceKind,
    pub party: PartyDetails,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub place_of_supply: String,
    pub payment_terms: String,
    pub notes: String,
    lines: Vec<DraftLine>,
}

impl BillDraft {
    /// Empty draft with a single blank line (quantity 1, rate 0, 18% GST)
    pub fn new(kind: InvoiceKind, invoice_date: NaiveDate) -> Self {
        Self {
            kind,
            party: PartyDetails::default(),
            invoice_number: String::new(),
            invoice_date,
            due_date: None,
            place_of_supply: String::new(),
            payment_terms: String::new(),
            notes: String::new(),
            lines: vec![DraftLine::blank()],
        }
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    /// Append a blank line and return its id
    pub fn add_line(&mut self) -> Uuid {
        let line = DraftLine::blank();
        let id = line.id;
        self.lines.push(line);
        id
    }

    /// Append a prepared line item and return its id
    pub fn push_line(&mut self, item: LineItem) -> Uuid {
        let id = Uuid::new_v4();
        self.lines.push(DraftLine { id, item });
        id
    }

    /// Remove a line. The last remaining line is never removed.
    pub fn remove_line(&mut self, id: Uuid) -> bool {
        if self.lines.len() <= 1 {
            return false;
        }

        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        self.lines.len() != before
    }

    /// Apply an edit to one line; returns false when no line has that id
    pub fn update_line(&mut self, id: Uuid, edit: LineEdit) -> bool {
        match self.lines.iter_mut().find(|line| line.id == id) {
            Some(line) => {
                line.item = edit.apply(line.item.clone());
                true
            }
            None => false,
        }
    }

    pub fn totals(&self) -> InvoiceTotals {
        let amounts: Vec<LineAmounts> = self.lines.iter().map(|line| line.item.amounts()).collect();
        aggregate(&amounts)
    }

    /// Required fields for saving: party name and invoice number
    pub fn validate(&self) -> BooksResult<()> {
        let result = validate_required(&format!("{} name", self.kind.party_label()), &self.party.name)
            .and_then(|_| validate_required("Invoice number", &self.invoice_number));

        if let Err(err) = &result {
            warn!(kind = %self.kind, error = %err, "bill draft failed validation");
        }
        result
    }

    /// Sending additionally requires a contact for the party
    pub fn ensure_sendable(&self) -> BooksResult<()> {
        self.validate()?;

        if self.party.contact.trim().is_empty() {
            warn!(invoice = %self.invoice_number, "bill draft has no contact to send to");
            return Err(BooksError::Validation(format!(
                "{} contact is required to send the invoice",
                self.kind.party_label()
            )));
        }

        Ok(())
    }

    /// Validate and turn the draft into an invoice
    pub fn finalize(self) -> BooksResult<Invoice> {
        self.validate()?;

        let mut invoice = Invoice::new(
            self.invoice_number.trim(),
            self.kind,
            self.invoice_date,
            self.party.name.trim(),
            self.party.gstin.trim(),
        );
        for line in self.lines {
            invoice.add_line_item(line.item);
        }

        debug!(
            invoice = %invoice.number,
            kind = %invoice.kind,
            lines = invoice.line_items.len(),
            "finalized bill draft"
        );
        Ok(invoice)
    }

    /// Clear the form back to a fresh draft dated `invoice_date`
    pub fn reset(&mut self, invoice_date: NaiveDate) {
        *self = Self::new(self.kind, invoice_date);
    }
}
