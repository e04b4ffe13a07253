//! GSTR-3B (summary return) payload and the liability figures behind it

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::returns::{filter_by_period, Amount, ReturnBuilder, ReturnPeriod};
use crate::tax::gst::InvoiceTotals;
use crate::types::{Invoice, InvoiceKind};

/// Input-tax-credit type tag for imports of goods
pub const ITC_IMPORT_OF_GOODS: &str = "IMPG";

/// Output tax, input credit and net liability for a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSummary {
    pub period: ReturnPeriod,
    /// Totals of sales invoices in the period
    pub outward: InvoiceTotals,
    /// Totals of purchase invoices in the period
    pub inward: InvoiceTotals,
    pub net_cgst: BigDecimal,
    pub net_sgst: BigDecimal,
    pub net_igst: BigDecimal,
}

impl ReturnSummary {
    /// Sum in-period sales (outward) and purchases (inward).
    ///
    /// Net tax per component is output tax less input credit, floored at zero.
    pub fn compute(period: &ReturnPeriod, outward: &[Invoice], inward: &[Invoice]) -> Self {
        let outward: InvoiceTotals = filter_by_period(outward, period, Some(InvoiceKind::Sales))
            .into_iter()
            .map(Invoice::totals)
            .sum();
        let inward: InvoiceTotals = filter_by_period(inward, period, Some(InvoiceKind::Purchase))
            .into_iter()
            .map(Invoice::totals)
            .sum();

        let net_cgst = payable(&outward.total_cgst, &inward.total_cgst);
        let net_sgst = payable(&outward.total_sgst, &inward.total_sgst);
        let net_igst = payable(&outward.total_igst, &inward.total_igst);

        Self {
            period: *period,
            outward,
            inward,
            net_cgst,
            net_sgst,
            net_igst,
        }
    }

    /// Output tax on sales
    pub fn output_tax(&self) -> &BigDecimal {
        &self.outward.total_tax
    }

    /// Input tax credit available from purchases
    pub fn input_tax_credit(&self) -> &BigDecimal {
        &self.inward.total_tax
    }

    pub fn net_tax_payable(&self) -> BigDecimal {
        &self.net_cgst + &self.net_sgst + &self.net_igst
    }
}

fn payable(output: &BigDecimal, credit: &BigDecimal) -> BigDecimal {
    let net = output - credit;
    if net < BigDecimal::zero() {
        BigDecimal::zero()
    } else {
        net
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gstr3bPayload {
    pub gstin: String,
    pub ret_period: String,
    pub sup_details: SupplyDetails,
    pub itc_elg: ItcEligibility,
    /// Net tax payable per component
    pub intr_ltfee: TaxAmounts,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyDetails {
    /// Outward taxable supplies
    pub osup_det: SupplyTotals,
    /// Inward supplies
    pub isup_rev: SupplyTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyTotals {
    pub txval: Amount,
    pub camt: Amount,
    pub samt: Amount,
    pub iamt: Amount,
    pub csamt: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItcEligibility {
    pub itc_avl: Vec<ItcEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItcEntry {
    pub ty: String,
    pub camt: Amount,
    pub samt: Amount,
    pub iamt: Amount,
    pub csamt: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxAmounts {
    pub camt: Amount,
    pub samt: Amount,
    pub iamt: Amount,
    pub csamt: Amount,
}

impl ReturnBuilder {
    /// GSTR-3B for `period`, stamped with the current time
    pub fn gstr3b(&self, period: &ReturnPeriod, outward: &[Invoice], inward: &[Invoice]) -> Gstr3bPayload {
        self.gstr3b_at(period, outward, inward, Utc::now())
    }

    pub fn gstr3b_at(
        &self,
        period: &ReturnPeriod,
        outward: &[Invoice],
        inward: &[Invoice],
        generated_at: DateTime<Utc>,
    ) -> Gstr3bPayload {
        let summary = ReturnSummary::compute(period, outward, inward);
        let payload = self.gstr3b_from_summary(&summary, generated_at);

        info!(
            period = %period,
            output_tax = %summary.output_tax(),
            input_credit = %summary.input_tax_credit(),
            net_payable = %summary.net_tax_payable(),
            "built GSTR-3B payload"
        );
        payload
    }

    /// Render an already computed summary.
    ///
    /// Figures are rounded once per block and the net liability is taken from
    /// the rounded blocks, so the payload agrees with itself.
    pub fn gstr3b_from_summary(&self, summary: &ReturnSummary, generated_at: DateTime<Utc>) -> Gstr3bPayload {
        let outward = summary.outward.rounded(self.currency_scale);
        let inward = summary.inward.rounded(self.currency_scale);

        Gstr3bPayload {
            gstin: self.seller_gstin().to_string(),
            ret_period: summary.period.ret_period(),
            sup_details: SupplyDetails {
                osup_det: self.supply_totals(&outward),
                isup_rev: self.supply_totals(&inward),
            },
            itc_elg: ItcEligibility {
                itc_avl: vec![ItcEntry {
                    ty: ITC_IMPORT_OF_GOODS.to_string(),
                    camt: self.export_amount(&inward.total_cgst),
                    samt: self.export_amount(&inward.total_sgst),
                    iamt: self.export_amount(&inward.total_igst),
                    csamt: Amount::ZERO,
                }],
            },
            intr_ltfee: TaxAmounts {
                camt: self.export_amount(&payable(&outward.total_cgst, &inward.total_cgst)),
                samt: self.export_amount(&payable(&outward.total_sgst, &inward.total_sgst)),
                iamt: self.export_amount(&payable(&outward.total_igst, &inward.total_igst)),
                csamt: Amount::ZERO,
            },
            generated_at,
        }
    }

    fn supply_totals(&self, totals: &InvoiceTotals) -> SupplyTotals {
        SupplyTotals {
            txval: self.export_amount(&totals.subtotal),
            camt: self.export_amount(&totals.total_cgst),
            samt: self.export_amount(&totals.total_sgst),
            iamt: self.export_amount(&totals.total_igst),
            csamt: Amount::ZERO,
        }
    }
}

/// GSTR-3B for `seller_gstin`, stamped with the current time
pub fn build_gstr3b(
    period: &ReturnPeriod,
    seller_gstin: &str,
    outward: &[Invoice],
    inward: &[Invoice],
) -> Gstr3bPayload {
    ReturnBuilder::new(seller_gstin).gstr3b(period, outward, inward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::gst::LineItem;
    use chrono::{NaiveDate, TimeZone};

    const SELLER: &str = "22AAAAA0000A1Z5";

    fn invoice(kind: InvoiceKind, number: &str, month: u32, taxable: i64, rate: u32) -> Invoice {
        Invoice::new(
            number,
            kind,
            NaiveDate::from_ymd_opt(2024, month, 15).unwrap(),
            "Party",
            "27AAAAA0000A1Z5",
        )
        .with_line_item(LineItem::new(
            "Goods",
            BigDecimal::from(1),
            BigDecimal::from(taxable),
            BigDecimal::from(rate),
        ))
    }

    fn january() -> ReturnPeriod {
        "2024-01".parse().unwrap()
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 5, 10, 30, 0).unwrap()
    }

    fn sales() -> Vec<Invoice> {
        vec![
            invoice(InvoiceKind::Sales, "S-1", 1, 25000, 18),
            invoice(InvoiceKind::Sales, "S-2", 1, 15000, 18),
            invoice(InvoiceKind::Sales, "S-FEB", 2, 99000, 18),
        ]
    }

    fn purchases() -> Vec<Invoice> {
        vec![
            invoice(InvoiceKind::Purchase, "P-1", 1, 10000, 18),
            invoice(InvoiceKind::Purchase, "P-2", 1, 5000, 12),
        ]
    }

    #[test]
    fn test_summary_nets_output_against_credit() {
        let summary = ReturnSummary::compute(&january(), &sales(), &purchases());

        assert_eq!(summary.outward.subtotal, BigDecimal::from(40000));
        assert_eq!(summary.outward.total_cgst, BigDecimal::from(3600));
        assert_eq!(summary.inward.subtotal, BigDecimal::from(15000));
        assert_eq!(summary.inward.total_cgst, BigDecimal::from(1200));
        assert_eq!(summary.net_cgst, BigDecimal::from(2400));
        assert_eq!(summary.net_sgst, BigDecimal::from(2400));
        assert_eq!(summary.net_tax_payable(), BigDecimal::from(4800));
    }

    #[test]
    fn test_excess_credit_floors_at_zero() {
        let big_purchase = vec![invoice(InvoiceKind::Purchase, "P-BIG", 1, 100000, 28)];
        let summary = ReturnSummary::compute(&january(), &sales(), &big_purchase);

        assert_eq!(summary.net_cgst, BigDecimal::from(0));
        assert_eq!(summary.net_tax_payable(), BigDecimal::from(0));
    }

    #[test]
    fn test_payload_shape() {
        let payload = ReturnBuilder::new(SELLER).gstr3b_at(&january(), &sales(), &purchases(), stamp());

        assert_eq!(payload.ret_period, "202401");
        assert_eq!(payload.sup_details.osup_det.txval, 40000.0);
        assert_eq!(payload.sup_details.osup_det.camt, 3600.0);
        assert_eq!(payload.sup_details.isup_rev.txval, 15000.0);
        assert_eq!(payload.sup_details.isup_rev.samt, 1200.0);
        assert_eq!(payload.itc_elg.itc_avl.len(), 1);
        assert_eq!(payload.itc_elg.itc_avl[0].ty, "IMPG");
        assert_eq!(payload.itc_elg.itc_avl[0].camt, 1200.0);
        assert_eq!(payload.intr_ltfee.camt, 2400.0);
        assert_eq!(payload.intr_ltfee.iamt, 0.0);
        assert_eq!(payload.intr_ltfee.csamt, 0.0);
    }

    #[test]
    fn test_json_field_names() {
        let payload = ReturnBuilder::new(SELLER).gstr3b_at(&january(), &sales(), &purchases(), stamp());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["gstin"], SELLER);
        assert_eq!(json["sup_details"]["osup_det"]["txval"], 40000.0);
        assert_eq!(json["itc_elg"]["itc_avl"][0]["ty"], "IMPG");
        assert_eq!(json["intr_ltfee"]["samt"], 2400.0);
        assert!(json["generated_at"].is_string());
    }

    #[test]
    fn test_odd_paise_tax_split_is_consistent() {
        let sales = vec![invoice(InvoiceKind::Sales, "S-1", 1, 1, 5)];
        let purchases = vec![invoice(InvoiceKind::Purchase, "P-1", 1, 3, 5)];
        let payload = ReturnBuilder::new(SELLER).gstr3b_at(&january(), &sales, &purchases, stamp());

        let outward = &payload.sup_details.osup_det;
        assert_eq!(outward.camt, 0.03);
        assert_eq!(outward.samt, 0.02);

        let credit = &payload.itc_elg.itc_avl[0];
        assert_eq!(credit.camt, 0.08);
        assert_eq!(credit.samt, 0.07);

        // credit exceeds output tax on both halves
        assert_eq!(payload.intr_ltfee.camt, 0.0);
        assert_eq!(payload.intr_ltfee.samt, 0.0);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["sup_details"]["osup_det"]["samt"].to_string(), "0.02");
        assert_eq!(json["sup_details"]["osup_det"]["txval"].to_string(), "1");
    }

    #[test]
    fn test_empty_inputs() {
        let payload = build_gstr3b(&january(), SELLER, &[], &[]);
        assert_eq!(payload.sup_details.osup_det.txval, 0.0);
        assert_eq!(payload.intr_ltfee.camt, 0.0);
    }
}
