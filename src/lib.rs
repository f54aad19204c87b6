pub mod config;
pub mod error;
pub mod format;
pub mod invoice;
pub mod pdf;
pub mod timesheet;
pub mod toggl;

pub use config::{Client, Config, EntryStore, Project, State, TimeEntry};
pub use error::{InvoiceError, Result};
pub use invoice::{compute_credit_note, compute_invoice, InvoiceInput, InvoiceTotals, LineItem};
pub use timesheet::{aggregate_timesheet, Timesheet, Unit};
