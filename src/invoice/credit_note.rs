use rust_decimal::Decimal;
use serde::Serialize;

use super::calculator::{checked_add, checked_mul, ensure_non_negative, round_output, vat_percent};
use crate::error::Result;

/// Negative-valued totals of a credit note
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditNoteTotals {
    pub amount: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
    pub vat_rate_percent: Decimal,
    pub vat_exempt: bool,
}

/// Totals for a credit note over a flat `amount` (stored positive)
pub fn compute_credit_note(amount: Decimal, vat_rate: Decimal) -> Result<CreditNoteTotals> {
    ensure_non_negative("amount", amount)?;

    let vat = Decimal::ZERO - checked_mul("credit note VAT", amount, vat_rate)?;
    let rounded_amount = round_output(Decimal::ZERO - amount);
    let rounded_vat = round_output(vat);

    Ok(CreditNoteTotals {
        amount: rounded_amount,
        vat: rounded_vat,
        total: checked_add("credit note total", rounded_amount, rounded_vat)?,
        vat_rate_percent: vat_percent(vat_rate)?,
        vat_exempt: rounded_vat.is_zero(),
    })
}
