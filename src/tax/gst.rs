//! GST (Goods and Services Tax) line-item arithmetic and invoice totals
//!
//! All supplies are treated as intra-state: tax splits evenly into CGST and
//! SGST and IGST is always zero. Values stay exact decimals throughout; call
//! [`round_currency`] once when presenting or exporting a figure.

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::str::FromStr;

/// GST percentages offered by the bill generators
pub const STANDARD_RATES: [u32; 5] = [0, 5, 12, 18, 28];

/// Default number of decimal places for currency figures
pub const DEFAULT_CURRENCY_SCALE: i64 = 2;

/// GST rate split into its components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstRate {
    /// Total GST rate percentage (e.g., 18 for 18%)
    pub total_rate: BigDecimal,
    /// CGST rate percentage (Central GST)
    pub cgst_rate: BigDecimal,
    /// SGST rate percentage (State GST)
    pub sgst_rate: BigDecimal,
    /// IGST rate percentage (Integrated GST), zero for intra-state supply
    pub igst_rate: BigDecimal,
}

impl GstRate {
    /// Create an intra-state rate (CGST + SGST, each half of the total)
    pub fn intra_state(total_rate: BigDecimal) -> Self {
        let total_rate = non_negative(total_rate);
        let half_rate = &total_rate / BigDecimal::from(2);
        Self {
            total_rate,
            cgst_rate: half_rate.clone(),
            sgst_rate: half_rate,
            igst_rate: BigDecimal::zero(),
        }
    }

    /// Validate that the components add up and CGST matches SGST
    pub fn validate(&self) -> Result<(), GstError> {
        let calculated_total = &self.cgst_rate + &self.sgst_rate + &self.igst_rate;

        if calculated_total != self.total_rate {
            return Err(GstError::InvalidRate(format!(
                "GST components don't add up to total rate: {} != {}",
                calculated_total, self.total_rate
            )));
        }

        if self.cgst_rate != self.sgst_rate {
            return Err(GstError::InvalidRate(
                "CGST and SGST rates must be equal for intra-state transactions".to_string(),
            ));
        }

        if !self.igst_rate.is_zero() {
            return Err(GstError::InvalidRate(
                "IGST is not supported; only intra-state supply is modelled".to_string(),
            ));
        }

        Ok(())
    }
}

/// Standard GST slabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GstCategory {
    /// Essential items (food, medicines, etc.) - 0%
    Essential,
    /// Reduced rate items - 5%
    Reduced,
    /// Standard rate items - 12%
    Standard,
    /// Higher rate items - 18%
    Higher,
    /// Luxury/Sin goods - 28%
    Luxury,
}

impl GstCategory {
    pub const ALL: [GstCategory; 5] = [
        GstCategory::Essential,
        GstCategory::Reduced,
        GstCategory::Standard,
        GstCategory::Higher,
        GstCategory::Luxury,
    ];

    /// Get the GST percentage for this slab
    pub fn rate(&self) -> BigDecimal {
        match self {
            GstCategory::Essential => BigDecimal::from(0),
            GstCategory::Reduced => BigDecimal::from(5),
            GstCategory::Standard => BigDecimal::from(12),
            GstCategory::Higher => BigDecimal::from(18),
            GstCategory::Luxury => BigDecimal::from(28),
        }
    }

    /// Look up the slab for a percentage, if it is one of the standard rates
    pub fn from_rate(rate: &BigDecimal) -> Option<Self> {
        Self::ALL.into_iter().find(|category| &category.rate() == rate)
    }
}

/// Derived amounts for one line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAmounts {
    /// Taxable value (quantity x rate)
    pub amount: BigDecimal,
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
    pub igst: BigDecimal,
}

impl LineAmounts {
    /// Apply a GST rate to a taxable amount
    pub fn from_taxable(amount: BigDecimal, gst_rate: &GstRate) -> Self {
        let hundred = BigDecimal::from(100);
        let cgst = (&amount * &gst_rate.cgst_rate) / &hundred;
        let sgst = (&amount * &gst_rate.sgst_rate) / &hundred;
        let igst = (&amount * &gst_rate.igst_rate) / &hundred;

        Self {
            amount,
            cgst,
            sgst,
            igst,
        }
    }

    /// Total tax on the line (CGST + SGST + IGST)
    pub fn tax(&self) -> BigDecimal {
        &self.cgst + &self.sgst + &self.igst
    }

    /// Line value including tax
    pub fn total(&self) -> BigDecimal {
        &self.amount + self.tax()
    }

    /// Amounts as presented: CGST and SGST are split from the rounded tax
    pub fn rounded(&self, scale: i64) -> Self {
        let (cgst, sgst) = split_rounded_tax(&self.cgst, &self.sgst, scale);
        Self {
            amount: round_currency(&self.amount, scale),
            cgst,
            sgst,
            igst: round_currency(&self.igst, scale),
        }
    }
}

/// Compute the taxable amount and CGST/SGST/IGST split for one line.
///
/// Negative inputs are treated as zero. IGST is always zero.
pub fn compute_line(quantity: &BigDecimal, rate: &BigDecimal, gst_rate: &BigDecimal) -> LineAmounts {
    let amount = non_negative(quantity.clone()) * non_negative(rate.clone());
    LineAmounts::from_taxable(amount, &GstRate::intra_state(gst_rate.clone()))
}

/// Invoice line item. Only the inputs are stored; amounts are derived on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item description
    pub description: String,
    /// Quantity
    pub quantity: BigDecimal,
    /// Unit price (before GST)
    pub rate: BigDecimal,
    /// GST percentage
    pub gst_rate: BigDecimal,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: BigDecimal,
        rate: BigDecimal,
        gst_rate: BigDecimal,
    ) -> Self {
        Self {
            description: description.into(),
            quantity: non_negative(quantity),
            rate: non_negative(rate),
            gst_rate: non_negative(gst_rate),
        }
    }

    /// Line item at one of the standard slabs
    pub fn with_category(
        description: impl Into<String>,
        quantity: BigDecimal,
        rate: BigDecimal,
        category: GstCategory,
    ) -> Self {
        Self::new(description, quantity, rate, category.rate())
    }

    pub fn amounts(&self) -> LineAmounts {
        compute_line(&self.quantity, &self.rate, &self.gst_rate)
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    pub fn with_quantity(self, quantity: BigDecimal) -> Self {
        Self {
            quantity: non_negative(quantity),
            ..self
        }
    }

    pub fn with_rate(self, rate: BigDecimal) -> Self {
        Self {
            rate: non_negative(rate),
            ..self
        }
    }

    pub fn with_gst_rate(self, gst_rate: BigDecimal) -> Self {
        Self {
            gst_rate: non_negative(gst_rate),
            ..self
        }
    }
}

/// Totals for a set of line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of taxable amounts
    pub subtotal: BigDecimal,
    pub total_cgst: BigDecimal,
    pub total_sgst: BigDecimal,
    pub total_igst: BigDecimal,
    /// CGST + SGST + IGST
    pub total_tax: BigDecimal,
    /// Subtotal plus tax
    pub grand_total: BigDecimal,
}

impl InvoiceTotals {
    pub fn zero() -> Self {
        Self {
            subtotal: BigDecimal::zero(),
            total_cgst: BigDecimal::zero(),
            total_sgst: BigDecimal::zero(),
            total_igst: BigDecimal::zero(),
            total_tax: BigDecimal::zero(),
            grand_total: BigDecimal::zero(),
        }
    }

    /// Totals for line items, deriving each line's amounts first
    pub fn from_line_items(items: &[LineItem]) -> Self {
        let amounts: Vec<LineAmounts> = items.iter().map(LineItem::amounts).collect();
        aggregate(&amounts)
    }

    fn accumulate(&mut self, other: &InvoiceTotals) {
        self.subtotal += &other.subtotal;
        self.total_cgst += &other.total_cgst;
        self.total_sgst += &other.total_sgst;
        self.total_igst += &other.total_igst;
        self.total_tax += &other.total_tax;
        self.grand_total += &other.grand_total;
    }

    /// Round to `scale` decimal places so the rounded figures still add up:
    /// the tax halves sum to the rounded tax, and the grand total is the
    /// rounded subtotal plus the rounded tax.
    pub fn rounded(&self, scale: i64) -> Self {
        let subtotal = round_currency(&self.subtotal, scale);
        let (total_cgst, total_sgst) = split_rounded_tax(&self.total_cgst, &self.total_sgst, scale);
        let total_igst = round_currency(&self.total_igst, scale);
        let total_tax = &total_cgst + &total_sgst + &total_igst;
        let grand_total = &subtotal + &total_tax;

        Self {
            subtotal,
            total_cgst,
            total_sgst,
            total_igst,
            total_tax,
            grand_total,
        }
    }
}

impl<'a> Sum<&'a InvoiceTotals> for InvoiceTotals {
    fn sum<I: Iterator<Item = &'a InvoiceTotals>>(iter: I) -> Self {
        iter.fold(InvoiceTotals::zero(), |mut acc, totals| {
            acc.accumulate(totals);
            acc
        })
    }
}

impl Sum for InvoiceTotals {
    fn sum<I: Iterator<Item = InvoiceTotals>>(iter: I) -> Self {
        iter.fold(InvoiceTotals::zero(), |mut acc, totals| {
            acc.accumulate(&totals);
            acc
        })
    }
}

/// Sum line amounts into invoice totals. Order of `items` does not matter.
pub fn aggregate(items: &[LineAmounts]) -> InvoiceTotals {
    let subtotal: BigDecimal = items.iter().map(|item| &item.amount).sum();
    let total_cgst: BigDecimal = items.iter().map(|item| &item.cgst).sum();
    let total_sgst: BigDecimal = items.iter().map(|item| &item.sgst).sum();
    let total_igst: BigDecimal = items.iter().map(|item| &item.igst).sum();

    let total_tax = &total_cgst + &total_sgst + &total_igst;
    let grand_total = &subtotal + &total_tax;

    InvoiceTotals {
        subtotal,
        total_cgst,
        total_sgst,
        total_igst,
        total_tax,
        grand_total,
    }
}

/// Round half-up to `scale` decimal places
pub fn round_currency(value: &BigDecimal, scale: i64) -> BigDecimal {
    value.with_scale_round(scale, RoundingMode::HalfUp)
}

/// Round `cgst + sgst` once and split it into two halves that add back to it.
///
/// When the rounded tax has an odd last digit, CGST carries the extra unit.
pub fn split_rounded_tax(cgst: &BigDecimal, sgst: &BigDecimal, scale: i64) -> (BigDecimal, BigDecimal) {
    let tax = round_currency(&(cgst + sgst), scale);
    let central = round_currency(&(&tax / BigDecimal::from(2)), scale);
    let state = &tax - &central;
    (central, state)
}

/// Parse user or extractor supplied numeric text, falling back to zero.
///
/// Thousands separators, a leading rupee sign and surrounding whitespace are ignored.
pub fn parse_amount(text: &str) -> BigDecimal {
    let cleaned: String = text
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    BigDecimal::from_str(&cleaned).unwrap_or_else(|_| BigDecimal::zero())
}

fn non_negative(value: BigDecimal) -> BigDecimal {
    if value < BigDecimal::zero() {
        BigDecimal::zero()
    } else {
        value
    }
}

/// GST-related errors
#[derive(Debug, thiserror::Error)]
pub enum GstError {
    #[error("Invalid GST rate: {0}")]
    InvalidRate(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    #[test]
    fn test_gst_rate_intra_state() {
        let rate = GstRate::intra_state(BigDecimal::from(18));
        assert_eq!(rate.total_rate, BigDecimal::from(18));
        assert_eq!(rate.cgst_rate, BigDecimal::from(9));
        assert_eq!(rate.sgst_rate, BigDecimal::from(9));
        assert_eq!(rate.igst_rate, BigDecimal::from(0));
        assert!(rate.validate().is_ok());
    }

    #[test]
    fn test_gst_rate_rejects_uneven_split() {
        let rate = GstRate {
            total_rate: BigDecimal::from(18),
            cgst_rate: BigDecimal::from(10),
            sgst_rate: BigDecimal::from(8),
            igst_rate: BigDecimal::from(0),
        };
        assert!(matches!(rate.validate(), Err(GstError::InvalidRate(_))));
    }

    #[test]
    fn test_compute_line() {
        let line = compute_line(&BigDecimal::from(10), &BigDecimal::from(1000), &BigDecimal::from(18));

        assert_eq!(line.amount, BigDecimal::from(10000));
        assert_eq!(line.cgst, BigDecimal::from(900));
        assert_eq!(line.sgst, BigDecimal::from(900));
        assert_eq!(line.igst, BigDecimal::from(0));
        assert_eq!(line.total(), BigDecimal::from(11800));
    }

    #[test]
    fn test_compute_line_non_standard_rate() {
        let line = compute_line(&BigDecimal::from(3), &dec("33.33"), &dec("7.5"));

        assert_eq!(line.amount, dec("99.99"));
        assert_eq!(line.cgst, line.sgst);
        assert_eq!(line.tax(), dec("7.49925"));
    }

    #[test]
    fn test_negative_inputs_are_zeroed() {
        let line = compute_line(&BigDecimal::from(-4), &BigDecimal::from(250), &BigDecimal::from(18));
        assert_eq!(line.amount, BigDecimal::from(0));
        assert_eq!(line.tax(), BigDecimal::from(0));

        let item = LineItem::new("Refund", BigDecimal::from(1), BigDecimal::from(-50), BigDecimal::from(5));
        assert_eq!(item.rate, BigDecimal::from(0));
    }

    #[test]
    fn test_line_item_edits_rederive_amounts() {
        let item = LineItem::with_category("Product A", BigDecimal::from(1), BigDecimal::from(0), GstCategory::Higher);
        assert_eq!(item.amounts().amount, BigDecimal::from(0));

        let item = item.with_quantity(BigDecimal::from(2)).with_rate(BigDecimal::from(500));
        assert_eq!(item.amounts().amount, BigDecimal::from(1000));
        assert_eq!(item.amounts().cgst, BigDecimal::from(90));

        let item = item.with_gst_rate(BigDecimal::from(5));
        assert_eq!(item.amounts().tax(), BigDecimal::from(50));
    }

    #[test]
    fn test_aggregate() {
        let items = vec![
            LineAmounts {
                amount: BigDecimal::from(10000),
                cgst: BigDecimal::from(900),
                sgst: BigDecimal::from(900),
                igst: BigDecimal::from(0),
            },
            LineAmounts {
                amount: BigDecimal::from(1800),
                cgst: BigDecimal::from(162),
                sgst: BigDecimal::from(162),
                igst: BigDecimal::from(0),
            },
        ];

        let totals = aggregate(&items);

        assert_eq!(totals.subtotal, BigDecimal::from(11800));
        assert_eq!(totals.total_cgst, BigDecimal::from(1062));
        assert_eq!(totals.total_tax, BigDecimal::from(2124));
        assert_eq!(totals.grand_total, BigDecimal::from(13924));
    }

    #[test]
    fn test_aggregate_empty() {
        assert_eq!(aggregate(&[]), InvoiceTotals::zero());
    }

    #[test]
    fn test_totals_sum() {
        let a = InvoiceTotals::from_line_items(&[LineItem::with_category(
            "A",
            BigDecimal::from(1),
            BigDecimal::from(1000),
            GstCategory::Higher,
        )]);
        let b = InvoiceTotals::from_line_items(&[LineItem::with_category(
            "B",
            BigDecimal::from(2),
            BigDecimal::from(100),
            GstCategory::Reduced,
        )]);

        let sum: InvoiceTotals = [a, b].iter().sum();
        assert_eq!(sum.subtotal, BigDecimal::from(1200));
        assert_eq!(sum.total_tax, BigDecimal::from(190));
        assert_eq!(sum.grand_total, BigDecimal::from(1390));
    }

    #[test]
    fn test_round_currency_half_up() {
        assert_eq!(round_currency(&dec("7.49925"), 2), dec("7.50"));
        assert_eq!(round_currency(&dec("0.125"), 2), dec("0.13"));
        assert_eq!(round_currency(&dec("10"), 2), dec("10.00"));
    }

    #[test]
    fn test_rounded_split_adds_up_with_odd_paise() {
        let line = compute_line(&BigDecimal::from(1), &dec("1.00"), &BigDecimal::from(5));
        assert_eq!(line.cgst, dec("0.025"));

        let rounded = line.rounded(2);
        assert_eq!(rounded.amount, dec("1.00"));
        assert_eq!(rounded.cgst, dec("0.03"));
        assert_eq!(rounded.sgst, dec("0.02"));
        assert_eq!(rounded.total(), dec("1.05"));

        let totals = aggregate(&[line.clone(), line]).rounded(2);
        assert_eq!(totals.total_cgst, dec("0.05"));
        assert_eq!(totals.total_sgst, dec("0.05"));
        assert_eq!(totals.total_tax, dec("0.10"));
        assert_eq!(totals.grand_total, dec("2.10"));

        let three = aggregate(&[compute_line(&BigDecimal::from(3), &dec("1.00"), &BigDecimal::from(5))]).rounded(2);
        assert_eq!(three.total_tax, dec("0.15"));
        assert_eq!(&three.total_cgst + &three.total_sgst, three.total_tax);
        assert_eq!(three.total_cgst, dec("0.08"));
        assert_eq!(three.total_sgst, dec("0.07"));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("11800.00"), BigDecimal::from(11800));
        assert_eq!(parse_amount(" ₹1,800.50 "), dec("1800.50"));
        assert_eq!(parse_amount("abc"), BigDecimal::from(0));
        assert_eq!(parse_amount(""), BigDecimal::from(0));
    }

    #[test]
    fn test_category_from_rate() {
        assert_eq!(GstCategory::from_rate(&BigDecimal::from(12)), Some(GstCategory::Standard));
        assert_eq!(GstCategory::from_rate(&BigDecimal::from(0)), Some(GstCategory::Essential));
        assert_eq!(GstCategory::from_rate(&BigDecimal::from(7)), None);
    }

    fn line_strategy() -> impl Strategy<Value = LineAmounts> {
        (0u32..500, 0i64..1_000_000, prop::sample::select(STANDARD_RATES.to_vec())).prop_map(
            |(quantity, rate_paise, gst)| {
                compute_line(
                    &BigDecimal::from(quantity),
                    &BigDecimal::new(rate_paise.into(), 2),
                    &BigDecimal::from(gst),
                )
            },
        )
    }

    proptest! {
        #[test]
        fn cgst_equals_sgst_and_sums_to_tax(
            quantity in 0u32..10_000,
            rate_paise in 0i64..10_000_000,
            gst in prop::sample::select(STANDARD_RATES.to_vec()),
        ) {
            let quantity = BigDecimal::from(quantity);
            let rate = BigDecimal::new(rate_paise.into(), 2);
            let gst = BigDecimal::from(gst);

            let line = compute_line(&quantity, &rate, &gst);
            let expected = (&quantity * &rate * &gst) / BigDecimal::from(100);

            prop_assert_eq!(&line.cgst, &line.sgst);
            prop_assert_eq!(&line.cgst + &line.sgst, expected);
            prop_assert!(line.igst.is_zero());
        }

        #[test]
        fn aggregate_is_order_independent(
            (items, shuffled) in prop::collection::vec(line_strategy(), 0..12)
                .prop_flat_map(|items| (Just(items.clone()), Just(items).prop_shuffle()))
        ) {
            prop_assert_eq!(aggregate(&items), aggregate(&shuffled));
        }

        #[test]
        fn rounded_totals_add_up(items in prop::collection::vec(line_strategy(), 0..12)) {
            let rounded = aggregate(&items).rounded(DEFAULT_CURRENCY_SCALE);
            prop_assert_eq!(&rounded.total_cgst + &rounded.total_sgst + &rounded.total_igst, rounded.total_tax.clone());
            prop_assert_eq!(&rounded.subtotal + &rounded.total_tax, rounded.grand_total);
        }
    }
}
