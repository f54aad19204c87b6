use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InvoiceError, Result};

/// An extra line stored on an invoice, after the days x rate line
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub price: Decimal,
    /// Falls back to the invoice VAT rate when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<Decimal>,
}

/// Header fields the primary line is synthesized from
#[derive(Debug, Clone)]
pub struct InvoiceInput {
    pub description: String,
    pub days: Decimal,
    /// Daily rate, VAT excluded
    pub rate: Decimal,
    /// Fraction, e.g. 0.21
    pub vat_rate: Decimal,
}

/// A computed invoice line, rounded for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedLine {
    pub description: String,
    pub price: Decimal,
    pub vat: Decimal,
    pub vat_rate_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceTotals {
    pub lines: Vec<ComputedLine>,
    pub subtotal: Decimal,
    pub total_vat: Decimal,
    pub grand_total: Decimal,
    pub vat_exempt: bool,
}

/// Round a currency amount to cents
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Whole percentage of a fractional rate (0.21 -> 21)
pub fn vat_percent(rate: Decimal) -> Result<Decimal> {
    let percent = checked_mul("VAT percentage", rate, Decimal::ONE_HUNDRED)?;
    Ok(percent.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

pub(crate) fn ensure_non_negative(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(InvoiceError::InvalidAmount {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

pub(crate) fn checked_mul(field: &str, a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| InvoiceError::AmountOverflow(field.to_string()))
}

pub(crate) fn checked_add(field: &str, a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| InvoiceError::AmountOverflow(field.to_string()))
}

/// Rounded to cents; a zero result never carries a minus sign
pub(crate) fn round_output(value: Decimal) -> Decimal {
    let rounded = round_currency(value);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

struct Running {
    lines: Vec<ComputedLine>,
    subtotal: Decimal,
    total_vat: Decimal,
}

impl Running {
    fn push(mut self, description: &str, price: Decimal, rate: Decimal) -> Result<Self> {
        let vat = checked_mul(&format!("VAT of '{description}'"), price, rate)?;
        self.lines.push(ComputedLine {
            description: description.to_string(),
            price: round_currency(price),
            vat: round_output(vat),
            vat_rate_percent: vat_percent(rate)?,
        });
        self.subtotal = checked_add("subtotal", self.subtotal, price)?;
        self.total_vat = checked_add("total VAT", self.total_vat, vat)?;
        Ok(self)
    }
}

/// Compute the full VAT breakdown of an invoice.
///
/// The days x rate line always comes first, followed by `items` in stored
/// order. Sums are accumulated at full precision and rounded once.
pub fn compute_invoice(input: &InvoiceInput, items: &[LineItem]) -> Result<InvoiceTotals> {
    ensure_non_negative("days", input.days)?;
    ensure_non_negative("rate", input.rate)?;
    for item in items {
        ensure_non_negative(&format!("item '{}'", item.description), item.price)?;
    }

    let primary_price = checked_mul("days x rate", input.days, input.rate)?;
    let primary = Running {
        lines: Vec::with_capacity(items.len() + 1),
        subtotal: Decimal::ZERO,
        total_vat: Decimal::ZERO,
    }
    .push(&input.description, primary_price, input.vat_rate)?;

    let running = items.iter().try_fold(primary, |acc, item| {
        acc.push(
            &item.description,
            item.price,
            item.vat_rate.unwrap_or(input.vat_rate),
        )
    })?;

    let subtotal = round_currency(running.subtotal);
    let total_vat = round_output(running.total_vat);
    let totals = InvoiceTotals {
        lines: running.lines,
        subtotal,
        total_vat,
        grand_total: checked_add("grand total", subtotal, total_vat)?,
        vat_exempt: total_vat.is_zero(),
    };

    debug!(
        lines = totals.lines.len(),
        subtotal = %totals.subtotal,
        total_vat = %totals.total_vat,
        grand_total = %totals.grand_total,
        "computed invoice totals"
    );

    Ok(totals)
}
