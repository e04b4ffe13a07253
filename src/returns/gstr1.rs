//! GSTR-1 (outward supplies) payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bigdecimal::BigDecimal;

use crate::returns::{filter_by_period, Amount, ReturnBuilder, ReturnPeriod};
use crate::tax::gst::LineAmounts;
use crate::types::{Invoice, InvoiceKind};

/// Reverse charge flag; reverse-charge supplies are not modelled
const REVERSE_CHARGE_NO: &str = "N";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gstr1Payload {
    /// Seller GSTIN
    pub gstin: String,
    /// `YYYYMM`
    pub ret_period: String,
    /// Business-to-business supplies grouped by customer GSTIN
    pub b2b: Vec<B2bParty>,
    pub generated_at: DateTime<Utc>,
}

impl Gstr1Payload {
    /// Number of invoices across all customer groups
    pub fn invoice_count(&self) -> usize {
        self.b2b.iter().map(|party| party.inv.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct B2bParty {
    /// Customer GSTIN
    pub ctin: String,
    pub inv: Vec<B2bInvoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct B2bInvoice {
    /// Invoice number
    pub inum: String,
    /// Invoice date, `YYYY-MM-DD`
    pub idt: String,
    /// Invoice value including tax; the sum of the item blocks
    pub val: Amount,
    /// Place of supply (state code)
    pub pos: String,
    /// Reverse charge, always "N"
    pub rchrg: String,
    /// E-commerce operator GSTIN, always empty
    pub etin: String,
    pub itms: Vec<B2bItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct B2bItem {
    /// 1-based item number within the invoice
    pub num: u32,
    pub itm_det: ItemDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    pub txval: Amount,
    pub rt: Amount,
    pub camt: Amount,
    pub samt: Amount,
    pub iamt: Amount,
    /// Cess, not modelled
    pub csamt: Amount,
}

impl ReturnBuilder {
    /// GSTR-1 for `period`, stamped with the current time
    pub fn gstr1(&self, period: &ReturnPeriod, sales_invoices: &[Invoice]) -> Gstr1Payload {
        self.gstr1_at(period, sales_invoices, Utc::now())
    }

    /// GSTR-1 for `period`. Only sales invoices dated inside the period are included.
    pub fn gstr1_at(
        &self,
        period: &ReturnPeriod,
        sales_invoices: &[Invoice],
        generated_at: DateTime<Utc>,
    ) -> Gstr1Payload {
        let in_period = filter_by_period(sales_invoices, period, Some(InvoiceKind::Sales));
        debug!(
            period = %period,
            supplied = sales_invoices.len(),
            included = in_period.len(),
            "filtered sales invoices for GSTR-1"
        );

        let mut b2b: Vec<B2bParty> = Vec::new();
        for invoice in in_period {
            let entry = self.b2b_invoice(invoice);
            match b2b
                .iter_mut()
                .find(|party| party.ctin == invoice.counterparty_gstin)
            {
                Some(party) => party.inv.push(entry),
                None => b2b.push(B2bParty {
                    ctin: invoice.counterparty_gstin.clone(),
                    inv: vec![entry],
                }),
            }
        }

        let payload = Gstr1Payload {
            gstin: self.seller_gstin().to_string(),
            ret_period: period.ret_period(),
            b2b,
            generated_at,
        };

        info!(
            period = %period,
            customers = payload.b2b.len(),
            invoices = payload.invoice_count(),
            "built GSTR-1 payload"
        );
        payload
    }

    fn b2b_invoice(&self, invoice: &Invoice) -> B2bInvoice {
        let by_rate: Vec<(BigDecimal, LineAmounts)> = invoice
            .amounts_by_rate()
            .into_iter()
            .map(|(rate, amounts)| (rate, amounts.rounded(self.currency_scale)))
            .collect();
        let value: BigDecimal = by_rate.iter().map(|(_, amounts)| amounts.total()).sum();

        let itms = by_rate
            .iter()
            .zip(1u32..)
            .map(|((rate, amounts), num)| B2bItem {
                num,
                itm_det: ItemDetail {
                    txval: self.export_amount(&amounts.amount),
                    rt: self.export_amount(rate),
                    camt: self.export_amount(&amounts.cgst),
                    samt: self.export_amount(&amounts.sgst),
                    iamt: self.export_amount(&amounts.igst),
                    csamt: Amount::ZERO,
                },
            })
            .collect();

        B2bInvoice {
            inum: invoice.number.clone(),
            idt: invoice.date.format("%Y-%m-%d").to_string(),
            val: self.export_amount(&value),
            pos: self.place_of_supply(),
            rchrg: REVERSE_CHARGE_NO.to_string(),
            etin: String::new(),
            itms,
        }
    }
}

/// GSTR-1 for `seller_gstin`, stamped with the current time
pub fn build_gstr1(
    period: &ReturnPeriod,
    seller_gstin: &str,
    sales_invoices: &[Invoice],
) -> Gstr1Payload {
    ReturnBuilder::new(seller_gstin).gstr1(period, sales_invoices)
}
