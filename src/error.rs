use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("Config directory not found at {0}. Run 'invoicing init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write {path}: {reason}")]
    ConfigWrite { path: PathBuf, reason: String },

    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Unsupported unit '{0}'. Use 'hours' or 'days'.")]
    UnsupportedUnit(String),

    #[error("Invalid amount for {field}: {value} (must not be negative)")]
    InvalidAmount { field: String, value: Decimal },

    #[error("Amount out of range while computing {0}")]
    AmountOverflow(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Client '{0}' not found in clients.toml")]
    ClientNotFound(String),

    #[error("Project '{0}' not found in projects.toml")]
    ProjectNotFound(String),

    #[error("Invalid item format '{0}'. Expected 'description=price[@vat]' (e.g., 'Travel=120@0.21')")]
    InvalidItemFormat(String),

    #[error("Invalid number '{value}' in '{input}'")]
    InvalidNumber { input: String, value: String },

    #[error("Invoice {0} not found")]
    InvoiceNotFound(u32),

    #[error("Invoice number {0} is already in use")]
    DuplicateInvoiceNumber(u32),

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("PDF file not found: {0}")]
    PdfFileNotFound(PathBuf),

    #[error("No Toggl API token. Set TOGGL_API_TOKEN or [toggl] api_token in config.toml")]
    MissingApiToken,

    #[error("Toggl request failed: {0}")]
    Toggl(String),

    #[error("{0} suspicious time entries found (spanning days or longer than 12 hours)")]
    SuspiciousEntries(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
