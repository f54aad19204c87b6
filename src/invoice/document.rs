use serde::Serialize;

use super::calculator::ComputedLine;
use crate::config::{Client, Profile};
use crate::format::format_amount;

/// A rendered invoice line; amounts are preformatted strings
#[derive(Debug, Serialize)]
pub struct InvoiceLineData {
    pub description: String,
    pub price: String,
    pub vat_rate_percent: String,
    pub vat: String,
}

/// Complete invoice data for PDF generation
#[derive(Debug, Serialize)]
pub struct InvoiceData {
    pub number: String,
    pub date: String,
    pub delivery_date: String,
    pub due_date: String,
    pub period: String,
    pub profile: Profile,
    pub client: Client,
    pub project: String,
    pub days: String,
    pub rate: String,
    pub lines: Vec<InvoiceLineData>,
    pub subtotal: String,
    pub total_vat: String,
    pub grand_total: String,
    pub vat_exempt: bool,
    pub currency_symbol: String,
    pub payment_terms: String,
}

impl From<&ComputedLine> for InvoiceLineData {
    fn from(line: &ComputedLine) -> Self {
        Self {
            description: line.description.clone(),
            price: format_amount(line.price),
            vat_rate_percent: line.vat_rate_percent.normalize().to_string(),
            vat: format_amount(line.vat),
        }
    }
}

/// Complete credit note data for PDF generation
#[derive(Debug, Serialize)]
pub struct CreditNoteData {
    pub number: String,
    pub date: String,
    pub invoice: Option<String>,
    pub profile: Profile,
    pub client: Client,
    pub project: String,
    pub description: String,
    pub amount: String,
    pub vat: String,
    pub vat_rate_percent: String,
    pub total: String,
    pub vat_exempt: bool,
    pub currency_symbol: String,
}
