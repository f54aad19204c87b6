mod calculator;
mod credit_note;
mod document;
mod generator;

pub use calculator::{
    compute_invoice, round_currency, vat_percent, ComputedLine, InvoiceInput, InvoiceTotals,
    LineItem,
};
pub use credit_note::{compute_credit_note, CreditNoteTotals};
pub use document::{CreditNoteData, InvoiceData, InvoiceLineData};
pub use generator::{
    credit_note_totals, format_credit_note_number, format_invoice_number, generate_credit_note,
    generate_invoice, get_invoice_path, invoice_totals, parse_date, parse_item_input,
    regenerate_invoice, set_paid, NewCreditNote, NewInvoice,
};
