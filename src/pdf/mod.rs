mod typst;

pub use typst::{generate_credit_note_pdf, generate_pdf, generate_timesheet_pdf};
