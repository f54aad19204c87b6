use chrono::{Datelike, Duration, Local, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use super::calculator::{compute_invoice, InvoiceInput, InvoiceTotals, LineItem};
use super::credit_note::{compute_credit_note, CreditNoteTotals};
use super::document::{CreditNoteData, InvoiceData, InvoiceLineData};
use crate::config::{
    load_clients, load_config, load_entries, load_projects, load_state, resolve_output_dir,
    save_state, Client, Config, CreditNoteRecord, InvoiceRecord, Project,
};
use crate::error::{InvoiceError, Result};
use crate::format::{format_amount, format_hours};
use crate::pdf::{generate_credit_note_pdf, generate_pdf};
use crate::timesheet::{aggregate_timesheet, Unit, HOURS_PER_DAY};

const DATE_DISPLAY: &str = "%B %d, %Y";

/// Parse a YYYY-MM-DD date argument
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| InvoiceError::InvalidDate(input.to_string()))
}

fn parse_decimal(input: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim()).map_err(|_| InvoiceError::InvalidNumber {
        input: input.to_string(),
        value: value.to_string(),
    })
}

/// Parse item input like "Travel=120@0.21" into a line item
pub fn parse_item_input(input: &str) -> Result<LineItem> {
    let (description, amount) = input
        .rsplit_once('=')
        .ok_or_else(|| InvoiceError::InvalidItemFormat(input.to_string()))?;

    let description = description.trim();
    if description.is_empty() {
        return Err(InvoiceError::InvalidItemFormat(input.to_string()));
    }

    let (price, vat_rate) = match amount.split_once('@') {
        Some((price, vat)) => (parse_decimal(input, price)?, Some(parse_decimal(input, vat)?)),
        None => (parse_decimal(input, amount)?, None),
    };

    Ok(LineItem {
        description: description.to_string(),
        price,
        vat_rate,
    })
}

/// Format invoice number from template
pub fn format_invoice_number(format: &str, year: i32, seq: u32) -> String {
    format
        .replace("{year}", &year.to_string())
        .replace("{seq:04}", &format!("{:04}", seq))
        .replace("{seq:05}", &format!("{:05}", seq))
        .replace("{seq:03}", &format!("{:03}", seq))
        .replace("{seq}", &seq.to_string())
}

/// Display number of a credit note, kept apart from invoice numbers
pub fn format_credit_note_number(format: &str, year: i32, seq: u32) -> String {
    format!("CN-{}", format_invoice_number(format, year, seq))
}

/// Description of the days x rate line
fn primary_description(record: &InvoiceRecord, project: &Project) -> String {
    record
        .description
        .clone()
        .or_else(|| project.default_description.clone())
        .unwrap_or_else(|| project.name.clone())
}

/// Compute the totals of a stored invoice
pub fn invoice_totals(record: &InvoiceRecord, project: &Project) -> Result<InvoiceTotals> {
    let input = InvoiceInput {
        description: primary_description(record, project),
        days: record.days,
        rate: record.rate,
        vat_rate: record.vat_rate,
    };
    compute_invoice(&input, &record.items)
}

/// Compute the totals of a stored credit note
pub fn credit_note_totals(record: &CreditNoteRecord) -> Result<CreditNoteTotals> {
    compute_credit_note(record.amount, record.vat_rate)
}

fn lookup_project<'a>(
    projects: &'a HashMap<String, Project>,
    key: &str,
) -> Result<&'a Project> {
    projects
        .get(key)
        .ok_or_else(|| InvoiceError::ProjectNotFound(key.to_string()))
}

fn lookup_client<'a>(
    clients: &'a HashMap<String, Client>,
    key: &str,
) -> Result<&'a Client> {
    clients
        .get(key)
        .ok_or_else(|| InvoiceError::ClientNotFound(key.to_string()))
}

fn build_invoice_data(
    config: &Config,
    client: &Client,
    project: &Project,
    record: &InvoiceRecord,
    totals: &InvoiceTotals,
) -> InvoiceData {
    let due_date = record
        .date
        .checked_add_signed(Duration::days(config.invoice.due_days as i64))
        .unwrap_or(record.date);

    InvoiceData {
        number: format_invoice_number(
            &config.invoice.number_format,
            record.date.year(),
            record.number,
        ),
        date: record.date.format(DATE_DISPLAY).to_string(),
        delivery_date: record
            .delivery_date
            .unwrap_or(record.end)
            .format(DATE_DISPLAY)
            .to_string(),
        due_date: due_date.format(DATE_DISPLAY).to_string(),
        period: format!("{} – {}", record.start, record.end),
        profile: config.profile.clone(),
        client: client.clone(),
        project: project.name.clone(),
        days: format_hours(record.days),
        rate: format_amount(record.rate),
        lines: totals.lines.iter().map(InvoiceLineData::from).collect(),
        subtotal: format_amount(totals.subtotal),
        total_vat: format_amount(totals.total_vat),
        grand_total: format_amount(totals.grand_total),
        vat_exempt: totals.vat_exempt,
        currency_symbol: config.invoice.currency_symbol.clone(),
        payment_terms: format!("Net {} days", config.invoice.due_days),
    }
}

/// Everything needed to issue a new invoice
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub project: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Defaults to the billable days tracked in the period
    pub days: Option<Decimal>,
    /// Defaults to the project VAT rate
    pub vat_rate: Option<Decimal>,
    /// Overrides the next free number
    pub number: Option<u32>,
    pub description: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub items: Vec<LineItem>,
    pub output: Option<PathBuf>,
    /// Record only, without rendering a PDF
    pub skip_pdf: bool,
}

/// Issue a new invoice: compute, render and record it
pub fn generate_invoice(
    cfg_dir: &Path,
    request: NewInvoice,
) -> Result<(InvoiceRecord, InvoiceTotals)> {
    let config = load_config(cfg_dir)?;
    let clients = load_clients(cfg_dir)?;
    let projects = load_projects(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    let project = lookup_project(&projects, &request.project)?;
    let client = lookup_client(&clients, &project.client)?;

    if request.end < request.start {
        return Err(InvoiceError::InvalidRange {
            start: request.start,
            end: request.end,
        });
    }

    let number = match request.number {
        Some(n) if state.invoice(n).is_some() => {
            return Err(InvoiceError::DuplicateInvoiceNumber(n))
        }
        Some(n) => n,
        None => state.next_invoice_number(),
    };

    let days = match request.days {
        Some(days) => days,
        None => {
            let entries = load_entries(cfg_dir)?.in_range(
                &request.project,
                request.start,
                request.end,
                true,
            );
            let timesheet = aggregate_timesheet(&entries, request.start, request.end, Unit::Days)?;
            // the timesheet total is rounded for display; bill the exact hours
            timesheet.total_hours() / Decimal::from(HOURS_PER_DAY)
        }
    };

    let date = Local::now().date_naive();
    let display_number = format_invoice_number(&config.invoice.number_format, date.year(), number);
    let file = match &request.output {
        Some(path) if path.is_absolute() => path.to_string_lossy().into_owned(),
        Some(path) => std::env::current_dir()?.join(path).to_string_lossy().into_owned(),
        None => format!("invoice-{}.pdf", display_number),
    };

    let record = InvoiceRecord {
        number,
        project: request.project.clone(),
        date,
        start: request.start,
        end: request.end,
        delivery_date: request.delivery_date,
        days,
        rate: project.rate,
        vat_rate: request.vat_rate.unwrap_or(project.vat_rate),
        description: request.description,
        paid: false,
        file,
        items: request.items,
    };

    let totals = invoice_totals(&record, project)?;

    if !request.skip_pdf {
        let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
        std::fs::create_dir_all(&output_dir)?;
        // absolute custom paths replace the output dir on join
        let pdf_path = output_dir.join(&record.file);
        let invoice_data = build_invoice_data(&config, client, project, &record, &totals);
        generate_pdf(&invoice_data, &pdf_path)?;
    }

    state.invoices.push(record.clone());
    save_state(cfg_dir, &state)?;

    info!(number, project = %record.project, grand_total = %totals.grand_total, "invoice recorded");

    Ok((record, totals))
}

/// Re-render the PDF of a stored invoice
pub fn regenerate_invoice(cfg_dir: &Path, number: u32) -> Result<PathBuf> {
    let config = load_config(cfg_dir)?;
    let clients = load_clients(cfg_dir)?;
    let projects = load_projects(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    let record = state.invoice(number).ok_or(InvoiceError::InvoiceNotFound(number))?;
    let project = lookup_project(&projects, &record.project)?;
    let client = lookup_client(&clients, &project.client)?;
    let totals = invoice_totals(record, project)?;

    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    std::fs::create_dir_all(&output_dir)?;
    let pdf_path = output_dir.join(&record.file);

    let invoice_data = build_invoice_data(&config, client, project, record, &totals);
    generate_pdf(&invoice_data, &pdf_path)?;

    Ok(pdf_path)
}

/// Get the PDF path for an invoice
pub fn get_invoice_path(cfg_dir: &Path, number: u32) -> Result<PathBuf> {
    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    let record = state.invoice(number).ok_or(InvoiceError::InvoiceNotFound(number))?;

    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    let pdf_path = output_dir.join(&record.file);

    if !pdf_path.exists() {
        return Err(InvoiceError::PdfFileNotFound(pdf_path));
    }

    Ok(pdf_path)
}

/// Flag an invoice as paid or unpaid
pub fn set_paid(cfg_dir: &Path, number: u32, paid: bool) -> Result<()> {
    let mut state = load_state(cfg_dir)?;
    let record = state
        .invoice_mut(number)
        .ok_or(InvoiceError::InvoiceNotFound(number))?;
    record.paid = paid;
    save_state(cfg_dir, &state)?;
    info!(number, paid, "invoice payment status updated");
    Ok(())
}

/// Everything needed to issue a credit note
#[derive(Debug, Clone)]
pub struct NewCreditNote {
    pub project: String,
    /// Invoice being corrected; its VAT rate becomes the default
    pub invoice: Option<u32>,
    pub amount: Decimal,
    pub vat_rate: Option<Decimal>,
    pub description: Option<String>,
    pub skip_pdf: bool,
}

/// Issue a credit note: compute, render and record it
pub fn generate_credit_note(
    cfg_dir: &Path,
    request: NewCreditNote,
) -> Result<(CreditNoteRecord, CreditNoteTotals)> {
    let config = load_config(cfg_dir)?;
    let clients = load_clients(cfg_dir)?;
    let projects = load_projects(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    let project = lookup_project(&projects, &request.project)?;
    let client = lookup_client(&clients, &project.client)?;

    let invoice_vat_rate = match request.invoice {
        Some(n) => Some(state.invoice(n).ok_or(InvoiceError::InvoiceNotFound(n))?.vat_rate),
        None => None,
    };

    let number = state.next_credit_note_number();
    let date = Local::now().date_naive();
    let display_number =
        format_credit_note_number(&config.invoice.number_format, date.year(), number);

    let record = CreditNoteRecord {
        number,
        project: request.project.clone(),
        invoice: request.invoice,
        date,
        amount: request.amount,
        vat_rate: request
            .vat_rate
            .or(invoice_vat_rate)
            .unwrap_or(project.vat_rate),
        description: request.description,
        file: format!("{}.pdf", display_number),
    };

    let totals = credit_note_totals(&record)?;

    if !request.skip_pdf {
        let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
        std::fs::create_dir_all(&output_dir)?;

        let data = CreditNoteData {
            number: display_number,
            date: date.format(DATE_DISPLAY).to_string(),
            invoice: record.invoice.and_then(|n| {
                state
                    .invoice(n)
                    .map(|inv| {
                        format_invoice_number(&config.invoice.number_format, inv.date.year(), n)
                    })
            }),
            profile: config.profile.clone(),
            client: client.clone(),
            project: project.name.clone(),
            description: record
                .description
                .clone()
                .unwrap_or_else(|| format!("Correction for {}", project.name)),
            amount: format_amount(totals.amount),
            vat: format_amount(totals.vat),
            vat_rate_percent: totals.vat_rate_percent.normalize().to_string(),
            total: format_amount(totals.total),
            vat_exempt: totals.vat_exempt,
            currency_symbol: config.invoice.currency_symbol.clone(),
        };
        generate_credit_note_pdf(&data, &output_dir.join(&record.file))?;
    }

    state.credit_notes.push(record.clone());
    save_state(cfg_dir, &state)?;

    info!(number, project = %record.project, total = %totals.total, "credit note recorded");

    Ok((record, totals))
}
