use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::LineItem;

/// Issued invoices and credit notes
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct State {
    #[serde(default)]
    pub invoices: Vec<InvoiceRecord>,
    #[serde(default)]
    pub credit_notes: Vec<CreditNoteRecord>,
}

impl State {
    /// Highest stored invoice number plus one
    pub fn next_invoice_number(&self) -> u32 {
        self.invoices.iter().map(|i| i.number).max().unwrap_or(0) + 1
    }

    pub fn next_credit_note_number(&self) -> u32 {
        self.credit_notes.iter().map(|c| c.number).max().unwrap_or(0) + 1
    }

    pub fn invoice(&self, number: u32) -> Option<&InvoiceRecord> {
        self.invoices.iter().find(|i| i.number == number)
    }

    pub fn invoice_mut(&mut self, number: u32) -> Option<&mut InvoiceRecord> {
        self.invoices.iter_mut().find(|i| i.number == number)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InvoiceRecord {
    pub number: u32,
    pub project: String,
    pub date: NaiveDate,
    /// Billed period, both ends inclusive
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    pub days: Decimal,
    pub rate: Decimal,
    pub vat_rate: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub paid: bool,
    pub file: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CreditNoteRecord {
    pub number: u32,
    pub project: String,
    /// Invoice being corrected, if any
    #[serde(default)]
    pub invoice: Option<u32>,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub vat_rate: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    pub file: String,
}
