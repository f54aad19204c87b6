use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use invoicing::config::{
    config_dir, load_clients, load_config, load_entries, load_projects, load_state,
    resolve_output_dir, save_entries, CLIENTS_TEMPLATE, CONFIG_TEMPLATE, PROJECTS_TEMPLATE,
};
use invoicing::error::{InvoiceError, Result};
use invoicing::format::{format_hours, format_money};
use invoicing::invoice::{
    credit_note_totals, format_credit_note_number, format_invoice_number, generate_credit_note,
    generate_invoice, get_invoice_path, invoice_totals, parse_date, parse_item_input,
    regenerate_invoice, set_paid, vat_percent, LineItem, NewCreditNote, NewInvoice,
};
use invoicing::pdf::generate_timesheet_pdf;
use invoicing::timesheet::{
    aggregate_timesheet, business_days_between, overview, TimesheetData, Unit,
};
use invoicing::toggl::{check_entries, import_entries, TogglClient};

#[derive(Parser)]
#[command(name = "invoicing")]
#[command(version, about = "Timesheets and VAT invoices for freelance projects", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.invoicing)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// List configured clients
    Clients,

    /// List configured projects
    Projects,

    /// Show configuration summary and next invoice number
    Status,

    /// Import time entries from Toggl
    Import {
        /// First day to import (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,

        /// Last day to import (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,

        /// Import even when entries span days or exceed 12 hours
        #[arg(long)]
        force: bool,
    },

    /// List stored time entries of a project
    Entries {
        /// Project identifier from projects.toml
        #[arg(short, long)]
        project: String,

        /// Only entries from this day on (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// Only entries up to this day (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,
    },

    /// Show the week/day timesheet of a project
    Timesheet {
        /// Project identifier from projects.toml
        #[arg(short, long)]
        project: String,

        /// First day of the period (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,

        /// Last day of the period, inclusive (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,

        /// Unit of the total: hours or days
        #[arg(short, long, default_value = "days")]
        unit: Unit,

        /// Leave out non-billable entries
        #[arg(long)]
        billable: bool,

        /// Also render the timesheet as PDF
        #[arg(long)]
        pdf: bool,

        /// Open the generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Generate a new invoice
    Generate {
        /// Project identifier from projects.toml
        #[arg(short, long)]
        project: String,

        /// First day of the billed period (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,

        /// Last day of the billed period (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,

        /// Days to bill (default: billable time tracked in the period)
        #[arg(short, long)]
        days: Option<Decimal>,

        /// VAT rate as a fraction (default: project VAT rate)
        #[arg(long)]
        vat_rate: Option<Decimal>,

        /// Invoice number (default: highest number + 1)
        #[arg(short, long)]
        number: Option<u32>,

        /// Description of the days x rate line
        #[arg(long)]
        description: Option<String>,

        /// Delivery date (default: end of the period)
        #[arg(long, value_parser = parse_date)]
        delivery_date: Option<NaiveDate>,

        /// Extra line items "description=price[@vat]" (can be repeated)
        #[arg(short, long, value_name = "DESC=PRICE[@VAT]", value_parser = parse_item_input)]
        item: Vec<LineItem>,

        /// Custom output file path (default: output_dir/invoice-XXXX.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Record the invoice without rendering a PDF
        #[arg(long)]
        no_pdf: bool,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Show the VAT breakdown of an invoice
    Show {
        /// Invoice number
        invoice: u32,
    },

    /// List issued invoices
    List {
        /// Number of invoices to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Regenerate an invoice PDF from stored data
    Regenerate {
        /// Invoice number
        invoice: u32,

        /// Open regenerated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Open an invoice PDF
    Open {
        /// Invoice number
        invoice: u32,
    },

    /// Mark an invoice as paid
    MarkPaid {
        /// Invoice number
        invoice: u32,
    },

    /// Mark an invoice as unpaid
    MarkUnpaid {
        /// Invoice number
        invoice: u32,
    },

    /// Issue a credit note
    CreditNote {
        /// Project identifier from projects.toml
        #[arg(short, long)]
        project: String,

        /// Amount credited, VAT excluded
        #[arg(short, long)]
        amount: Decimal,

        /// Invoice being corrected
        #[arg(short, long)]
        invoice: Option<u32>,

        /// VAT rate as a fraction (default: invoice or project VAT rate)
        #[arg(long)]
        vat_rate: Option<Decimal>,

        /// Reason shown on the credit note
        #[arg(long)]
        description: Option<String>,

        /// Record the credit note without rendering a PDF
        #[arg(long)]
        no_pdf: bool,
    },

    /// List issued credit notes
    CreditNotes,

    /// Days worked per project and year
    Overview {
        /// Restrict to one project
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Count business days left (default: from today to the end of the year)
    BusinessDays {
        /// First day (default: today)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Day after the last counted day (default: December 31)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by RUST_LOG (default: warn)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::BusinessDays { from, to } => cmd_business_days(from, to),
        command => {
            if !cfg_dir.exists() {
                return Err(InvoiceError::ConfigNotFound(cfg_dir));
            }
            dispatch(&cfg_dir, command)
        }
    }
}

fn dispatch(cfg_dir: &Path, command: Commands) -> Result<()> {
    match command {
        Commands::Clients => cmd_clients(cfg_dir),
        Commands::Projects => cmd_projects(cfg_dir),
        Commands::Status => cmd_status(cfg_dir),
        Commands::Import { start, end, force } => cmd_import(cfg_dir, start, end, force),
        Commands::Entries {
            project,
            start,
            end,
        } => cmd_entries(cfg_dir, &project, start, end),
        Commands::Timesheet {
            project,
            start,
            end,
            unit,
            billable,
            pdf,
            open,
        } => cmd_timesheet(cfg_dir, &project, start, end, unit, billable, pdf || open, open),
        Commands::Generate {
            project,
            start,
            end,
            days,
            vat_rate,
            number,
            description,
            delivery_date,
            item,
            output,
            no_pdf,
            open,
        } => cmd_generate(
            cfg_dir,
            NewInvoice {
                project,
                start,
                end,
                days,
                vat_rate,
                number,
                description,
                delivery_date,
                items: item,
                output,
                skip_pdf: no_pdf,
            },
            open,
        ),
        Commands::Show { invoice } => cmd_show(cfg_dir, invoice),
        Commands::List { limit } => cmd_invoices(cfg_dir, limit),
        Commands::Regenerate { invoice, open } => cmd_regenerate(cfg_dir, invoice, open),
        Commands::Open { invoice } => cmd_open(cfg_dir, invoice),
        Commands::MarkPaid { invoice } => cmd_mark(cfg_dir, invoice, true),
        Commands::MarkUnpaid { invoice } => cmd_mark(cfg_dir, invoice, false),
        Commands::CreditNote {
            project,
            amount,
            invoice,
            vat_rate,
            description,
            no_pdf,
        } => cmd_credit_note(
            cfg_dir,
            NewCreditNote {
                project,
                invoice,
                amount,
                vat_rate,
                description,
                skip_pdf: no_pdf,
            },
        ),
        Commands::CreditNotes => cmd_credit_notes(cfg_dir),
        Commands::Overview { project } => cmd_overview(cfg_dir, project.as_deref()),
        Commands::Init | Commands::BusinessDays { .. } => unreachable!("handled in run"),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(InvoiceError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;

    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("clients.toml"), CLIENTS_TEMPLATE)?;
    fs::write(cfg_dir.join("projects.toml"), PROJECTS_TEMPLATE)?;

    println!("Initialized invoicing config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your invoicing details: $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Add your clients:            $EDITOR {}/clients.toml",
        cfg_dir.display()
    );
    println!(
        "  3. Configure projects:          $EDITOR {}/projects.toml",
        cfg_dir.display()
    );
    println!();
    println!("Then import time and generate your first invoice:");
    println!("  invoicing import --start <date> --end <date>");
    println!("  invoicing generate --project <project-id> --start <date> --end <date>");

    Ok(())
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "VAT NUMBER")]
    vat_number: String,
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "DAY RATE")]
    rate: String,
    #[tabled(rename = "VAT")]
    vat: String,
    #[tabled(rename = "TOGGL")]
    toggl: String,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "START")]
    start: String,
    #[tabled(rename = "HOURS")]
    hours: String,
    #[tabled(rename = "BILLABLE")]
    billable: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "PROJECT")]
    project: String,
    #[tabled(rename = "DAYS")]
    days: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "VAT %")]
    vat_rate: String,
    #[tabled(rename = "VAT")]
    vat: String,
}

#[derive(Tabled)]
struct CreditNoteRow {
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "PROJECT")]
    project: String,
    #[tabled(rename = "INVOICE")]
    invoice: String,
    #[tabled(rename = "TOTAL")]
    total: String,
}

#[derive(Tabled)]
struct OverviewRow {
    #[tabled(rename = "PROJECT")]
    project: String,
    #[tabled(rename = "YEAR")]
    year: i32,
    #[tabled(rename = "HOURS")]
    hours: String,
    #[tabled(rename = "DAYS")]
    days: String,
}

/// List configured clients
fn cmd_clients(cfg_dir: &Path) -> Result<()> {
    let clients = load_clients(cfg_dir)?;

    if clients.is_empty() {
        println!("No clients configured.");
        println!("Add clients to: {}/clients.toml", cfg_dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = clients.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let rows: Vec<ClientRow> = sorted
        .iter()
        .map(|(id, client)| ClientRow {
            id: id.to_string(),
            name: client.name.clone(),
            vat_number: client.vat_number.clone(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// List configured projects
fn cmd_projects(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let projects = load_projects(cfg_dir)?;

    if projects.is_empty() {
        println!("No projects configured.");
        println!("Add projects to: {}/projects.toml", cfg_dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = projects.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let rows = sorted
        .iter()
        .map(|(id, project)| -> Result<ProjectRow> {
            Ok(ProjectRow {
                id: id.to_string(),
                name: project.name.clone(),
                client: project.client.clone(),
                rate: format_money(project.rate, &config.invoice.currency_symbol),
                vat: format!("{}%", vat_percent(project.vat_rate)?),
                toggl: project
                    .toggl_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Show configuration summary
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let clients = load_clients(cfg_dir)?;
    let projects = load_projects(cfg_dir)?;
    let entries = load_entries(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    let current_year = Local::now().year();
    let next_number = format_invoice_number(
        &config.invoice.number_format,
        current_year,
        state.next_invoice_number(),
    );

    println!("Invoicing Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Invoicing as:     {}", config.profile.invoice_name);
    println!("Clients:          {}", clients.len());
    println!("Projects:         {}", projects.len());
    println!("Time entries:     {}", entries.entries.len());
    println!("Credit notes:     {}", state.credit_notes.len());
    println!("Next invoice:     {}", next_number);

    let unpaid = state.invoices.iter().filter(|i| !i.paid).count();
    if !state.invoices.is_empty() {
        println!();
        println!("Recent invoices ({} unpaid):", unpaid);
        for record in state.invoices.iter().rev().take(5) {
            println!(
                "  {} - {} - {} days",
                format_invoice_number(
                    &config.invoice.number_format,
                    record.date.year(),
                    record.number
                ),
                record.project,
                format_hours(record.days)
            );
        }
    }

    Ok(())
}

/// Import time entries from Toggl
fn cmd_import(cfg_dir: &Path, start: NaiveDate, end: NaiveDate, force: bool) -> Result<()> {
    if end < start {
        return Err(InvoiceError::InvalidRange { start, end });
    }

    let config = load_config(cfg_dir)?;
    let projects = load_projects(cfg_dir)?;
    let mut store = load_entries(cfg_dir)?;

    let token = std::env::var("TOGGL_API_TOKEN")
        .ok()
        .or(config.toggl.api_token)
        .ok_or(InvoiceError::MissingApiToken)?;

    let client = TogglClient::new(&token);
    // Toggl's end_date is exclusive
    let end_exclusive = end.succ_opt().unwrap_or(end);
    let fetched = client.time_entries(start, end_exclusive)?;

    if !force {
        check_entries(&fetched)?;
    }

    let summary = import_entries(&fetched, &projects, &mut store);
    save_entries(cfg_dir, &store)?;

    println!("Imported {} time entries", summary.imported);
    println!("  Already stored:  {}", summary.duplicates);
    println!("  Unknown project: {}", summary.unknown_project);
    println!("  Still running:   {}", summary.running);

    Ok(())
}

/// List stored time entries
fn cmd_entries(
    cfg_dir: &Path,
    project_id: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<()> {
    let projects = load_projects(cfg_dir)?;
    if !projects.contains_key(project_id) {
        return Err(InvoiceError::ProjectNotFound(project_id.to_string()));
    }

    let store = load_entries(cfg_dir)?;
    let mut entries: Vec<_> = store
        .for_project(project_id)
        .into_iter()
        .filter(|e| start.map_or(true, |d| e.start.date() >= d))
        .filter(|e| end.map_or(true, |d| e.start.date() <= d))
        .collect();

    if entries.is_empty() {
        println!("No time entries for '{project_id}'.");
        return Ok(());
    }

    entries.sort_by_key(|e| e.start);
    let total: Decimal = entries.iter().map(|e| e.duration).sum();

    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            start: e.start.format("%Y-%m-%d %H:%M").to_string(),
            hours: format_hours(e.duration),
            billable: if e.billable { "yes" } else { "no" }.to_string(),
            description: e.description.clone().unwrap_or_default(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!("Total: {} hours in {} entries", format_hours(total), entries.len());

    Ok(())
}

/// Show the week/day timesheet of a project
#[allow(clippy::too_many_arguments)]
fn cmd_timesheet(
    cfg_dir: &Path,
    project_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    unit: Unit,
    billable_only: bool,
    render: bool,
    open: bool,
) -> Result<()> {
    let projects = load_projects(cfg_dir)?;
    let project = projects
        .get(project_id)
        .ok_or_else(|| InvoiceError::ProjectNotFound(project_id.to_string()))?;

    let entries = load_entries(cfg_dir)?.in_range(project_id, start, end, billable_only);
    let timesheet = aggregate_timesheet(&entries, start, end, unit)?;

    let mut builder = Builder::default();
    builder.push_record([
        "WEEK", "MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN", "HOURS",
    ]);
    for week in &timesheet.weeks {
        let mut record = vec![week.key.clone()];
        record.extend(week.days.iter().map(|slot| match slot {
            Some(day) => format!("{:02}: {}", day.date.day(), format_hours(day.duration)),
            None => String::new(),
        }));
        record.push(format_hours(week.total()));
        builder.push_record(record);
    }
    let mut table = builder.build();
    table.with(Style::rounded());

    println!("{} ({} – {})", project.name, start, end);
    println!("{table}");
    println!("Total: {} {}", format_hours(timesheet.total), timesheet.unit);

    if render {
        let config = load_config(cfg_dir)?;
        let clients = load_clients(cfg_dir)?;
        let client = clients
            .get(&project.client)
            .ok_or_else(|| InvoiceError::ClientNotFound(project.client.clone()))?
            .clone();

        let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
        std::fs::create_dir_all(&output_dir)?;
        let pdf_path = output_dir.join(format!("timesheet-{}-{}-{}.pdf", project_id, start, end));

        let data = TimesheetData::new(config.profile, client, &project.name, &timesheet);
        generate_timesheet_pdf(&data, &pdf_path)?;
        println!("Saved: {}", pdf_path.display());

        if open {
            open_path(&pdf_path)?;
        }
    }

    Ok(())
}

/// Generate a new invoice
fn cmd_generate(cfg_dir: &Path, request: NewInvoice, open: bool) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let skip_pdf = request.skip_pdf;

    let (record, totals) = generate_invoice(cfg_dir, request)?;
    let number = format_invoice_number(
        &config.invoice.number_format,
        record.date.year(),
        record.number,
    );
    let symbol = &config.invoice.currency_symbol;

    println!("Generated invoice {}", number);
    println!("  Project: {}", record.project);
    println!("  Days:    {}", format_hours(record.days));
    println!("  Total:   {}", format_money(totals.grand_total, symbol));

    if !skip_pdf {
        let pdf_path = resolve_output_dir(&config.pdf.output_dir, cfg_dir).join(&record.file);
        println!("  Saved:   {}", pdf_path.display());
        if open {
            open_path(&pdf_path)?;
        }
    }

    Ok(())
}

/// Show the VAT breakdown of an invoice
fn cmd_show(cfg_dir: &Path, number: u32) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let projects = load_projects(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    let record = state
        .invoice(number)
        .ok_or(InvoiceError::InvoiceNotFound(number))?;
    let project = projects
        .get(&record.project)
        .ok_or_else(|| InvoiceError::ProjectNotFound(record.project.clone()))?;
    let totals = invoice_totals(record, project)?;
    let symbol = &config.invoice.currency_symbol;

    println!(
        "Invoice {} - {} ({} – {})",
        format_invoice_number(&config.invoice.number_format, record.date.year(), record.number),
        project.name,
        record.start,
        record.end
    );
    println!(
        "  {} days x {}",
        format_hours(record.days),
        format_money(record.rate, symbol)
    );

    let rows: Vec<LineRow> = totals
        .lines
        .iter()
        .enumerate()
        .map(|(idx, line)| LineRow {
            index: idx + 1,
            description: line.description.clone(),
            price: format_money(line.price, symbol),
            vat_rate: format!("{}%", line.vat_rate_percent),
            vat: format_money(line.vat, symbol),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    println!("Subtotal: {}", format_money(totals.subtotal, symbol));
    if totals.vat_exempt {
        println!("VAT:      customer is VAT exempt");
    } else {
        println!("VAT:      {}", format_money(totals.total_vat, symbol));
    }
    println!("Total:    {}", format_money(totals.grand_total, symbol));
    println!("Status:   {}", if record.paid { "PAID" } else { "UNPAID" });

    Ok(())
}

/// List issued invoices
fn cmd_invoices(cfg_dir: &Path, limit: Option<usize>) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let projects = load_projects(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    if state.invoices.is_empty() {
        println!("No invoices generated yet.");
        return Ok(());
    }

    let mut invoices: Vec<_> = state.invoices.iter().collect();
    invoices.sort_by_key(|record| std::cmp::Reverse(record.number));
    if let Some(n) = limit {
        invoices.truncate(n);
    }

    let symbol = &config.invoice.currency_symbol;
    let mut outstanding = Decimal::ZERO;
    let mut rows = Vec::with_capacity(invoices.len());

    for record in invoices {
        let project = projects
            .get(&record.project)
            .ok_or_else(|| InvoiceError::ProjectNotFound(record.project.clone()))?;
        let totals = invoice_totals(record, project)?;
        if !record.paid {
            outstanding += totals.grand_total;
        }

        rows.push(InvoiceRow {
            number: format_invoice_number(
                &config.invoice.number_format,
                record.date.year(),
                record.number,
            ),
            date: record.date.to_string(),
            project: record.project.clone(),
            days: format_hours(record.days),
            total: format_money(totals.grand_total, symbol),
            status: if record.paid { "PAID" } else { "UNPAID" }.to_string(),
        });
    }

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    println!();
    println!("Total: {} invoices", state.invoices.len());
    println!("Outstanding: {}", format_money(outstanding, symbol));

    Ok(())
}

/// Open an invoice PDF
fn cmd_open(cfg_dir: &Path, number: u32) -> Result<()> {
    let pdf_path = get_invoice_path(cfg_dir, number)?;
    open_path(&pdf_path)?;

    println!("Opened {}", pdf_path.display());
    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(pdf_path)
            .spawn()?;
    }
    Ok(())
}

/// Regenerate an invoice PDF
fn cmd_regenerate(cfg_dir: &Path, number: u32, open: bool) -> Result<()> {
    let pdf_path = regenerate_invoice(cfg_dir, number)?;
    if open {
        open_path(&pdf_path)?;
    }

    println!("Regenerated invoice {}", number);
    println!("  Saved: {}", pdf_path.display());

    Ok(())
}

fn cmd_mark(cfg_dir: &Path, number: u32, paid: bool) -> Result<()> {
    set_paid(cfg_dir, number, paid)?;
    println!(
        "Marked invoice {} as {}",
        number,
        if paid { "paid" } else { "unpaid" }
    );
    Ok(())
}

/// Issue a credit note
fn cmd_credit_note(cfg_dir: &Path, request: NewCreditNote) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let skip_pdf = request.skip_pdf;
    let symbol = &config.invoice.currency_symbol;

    let (record, totals) = generate_credit_note(cfg_dir, request)?;

    println!(
        "Generated credit note {}",
        format_credit_note_number(
            &config.invoice.number_format,
            record.date.year(),
            record.number
        )
    );
    println!("  Project: {}", record.project);
    println!("  Amount:  {}", format_money(totals.amount, symbol));
    if totals.vat_exempt {
        println!("  VAT:     customer is VAT exempt");
    } else {
        println!("  VAT:     {}", format_money(totals.vat, symbol));
    }
    println!("  Total:   {}", format_money(totals.total, symbol));
    if !skip_pdf {
        let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
        println!("  Saved:   {}", output_dir.join(&record.file).display());
    }

    Ok(())
}

/// List issued credit notes
fn cmd_credit_notes(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    if state.credit_notes.is_empty() {
        println!("No credit notes issued yet.");
        return Ok(());
    }

    let rows = state
        .credit_notes
        .iter()
        .rev()
        .map(|record| -> Result<CreditNoteRow> {
            let totals = credit_note_totals(record)?;
            Ok(CreditNoteRow {
                number: format_credit_note_number(
                    &config.invoice.number_format,
                    record.date.year(),
                    record.number,
                ),
                date: record.date.to_string(),
                project: record.project.clone(),
                invoice: record
                    .invoice
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                total: format_money(totals.total, &config.invoice.currency_symbol),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Days worked per project and year
fn cmd_overview(cfg_dir: &Path, only: Option<&str>) -> Result<()> {
    let projects = load_projects(cfg_dir)?;
    let store = load_entries(cfg_dir)?;

    if let Some(key) = only {
        if !projects.contains_key(key) {
            return Err(InvoiceError::ProjectNotFound(key.to_string()));
        }
    }

    let mut keys: Vec<_> = projects
        .keys()
        .filter(|k| only.map_or(true, |o| o == k.as_str()))
        .collect();
    keys.sort();

    let mut rows = Vec::new();
    for key in keys {
        for year in overview(&store.for_project(key)) {
            rows.push(OverviewRow {
                project: key.clone(),
                year: year.year,
                hours: format_hours(year.hours),
                days: format_hours(year.days),
            });
        }
    }

    if rows.is_empty() {
        println!("No time entries recorded.");
        return Ok(());
    }

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Count remaining business days
fn cmd_business_days(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<()> {
    let from = from.unwrap_or_else(|| Local::now().date_naive());
    let to = match to {
        Some(d) => d,
        None => NaiveDate::from_ymd_opt(from.year(), 12, 31).ok_or_else(|| {
            InvoiceError::InvalidDate(format!("{}-12-31", from.year()))
        })?,
    };

    let count = business_days_between(from, to);
    tracing::debug!(%from, %to, count, "counted business days");
    println!("{count}");

    Ok(())
}
