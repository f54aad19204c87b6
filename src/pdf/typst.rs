use serde::Serialize;
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{InvoiceError, Result};
use crate::invoice::{CreditNoteData, InvoiceData};
use crate::timesheet::TimesheetData;

/// Shared page setup and the profile header
const PREAMBLE: &str = r##"#let data = json("DATA_JSON_PATH")

#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 2cm, right: 2cm),
)

#set text(font: "Helvetica", size: 10pt)

#let sender = [
  #text(size: 16pt, weight: "bold")[#data.profile.invoice_name]
  #v(0.3em)
  #data.profile.address_line_1 \
  #data.profile.address_line_2 \
  #data.profile.email \
  #data.profile.phone \
  VAT: #data.profile.vat_number
]

#let recipient = [
  #text(weight: "bold", size: 11pt)[Bill To:]
  #v(0.3em)
  #text(weight: "bold")[#data.client.name] \
  #data.client.address_line_1 \
  #data.client.address_line_2 \
  VAT: #data.client.vat_number
]
"##;

const INVOICE_TEMPLATE: &str = r##"
#grid(
  columns: (1fr, 1fr),
  align: (left, right),
  sender,
  [
    #text(size: 24pt, weight: "bold")[INVOICE]
    #v(0.5em)
    #table(
      columns: (auto, auto),
      stroke: none,
      align: (right, left),
      inset: 2pt,
      [*Invoice \#:*], [#data.number],
      [*Date:*], [#data.date],
      [*Delivery:*], [#data.delivery_date],
      [*Due Date:*], [#data.due_date],
    )
  ]
)

#v(1em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(1em)

#grid(columns: (1fr, 1fr), recipient, [
  #text(weight: "bold")[Project:] #data.project \
  #text(weight: "bold")[Period:] #data.period
])

#v(1.5em)

#table(
  columns: (auto, 1fr, auto, auto, auto),
  align: (center, left, right, right, right),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else if y > 0 { (bottom: 0.5pt + gray) },
  inset: 8pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  [*\#*], [*Description*], [*Price*], [*VAT %*], [*VAT*],

  ..data.lines.enumerate().map(((i, line)) => (
    str(i + 1),
    line.description,
    data.currency_symbol + line.price,
    line.vat_rate_percent + "%",
    data.currency_symbol + line.vat,
  )).flatten()
)

#v(1em)

#align(right)[
  #table(
    columns: (auto, auto),
    stroke: none,
    align: (right, right),
    inset: 6pt,

    [Subtotal:], [#data.currency_symbol#data.subtotal],
    ..if data.vat_exempt {
      ([VAT:], [Customer is VAT exempt])
    } else {
      ([VAT:], [#data.currency_symbol#data.total_vat])
    },

    table.hline(stroke: 1pt),
    [*Total:*], [*#data.currency_symbol#data.grand_total*],
  )
]

#v(2em)

#text(weight: "bold")[Payment:] #data.payment_terms to #data.profile.bank_account,
mentioning invoice #data.number.
"##;

const CREDIT_NOTE_TEMPLATE: &str = r##"
#grid(
  columns: (1fr, 1fr),
  align: (left, right),
  sender,
  [
    #text(size: 24pt, weight: "bold")[CREDIT NOTE]
    #v(0.5em)
    #table(
      columns: (auto, auto),
      stroke: none,
      align: (right, left),
      inset: 2pt,
      [*Credit note \#:*], [#data.number],
      [*Date:*], [#data.date],
      ..if data.invoice != none { ([*Invoice:*], [#data.invoice]) } else { () },
    )
  ]
)

#v(1em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(1em)

#grid(columns: (1fr, 1fr), recipient, [
  #text(weight: "bold")[Project:] #data.project
])

#v(1.5em)

#data.description

#v(1em)

#align(right)[
  #table(
    columns: (auto, auto),
    stroke: none,
    align: (right, right),
    inset: 6pt,

    [Amount:], [#data.currency_symbol#data.amount],
    ..if data.vat_exempt {
      ([VAT:], [Customer is VAT exempt])
    } else {
      ([VAT (#data.vat_rate_percent%):], [#data.currency_symbol#data.vat])
    },

    table.hline(stroke: 1pt),
    [*Total:*], [*#data.currency_symbol#data.total*],
  )
]
"##;

const TIMESHEET_TEMPLATE: &str = r##"
#grid(
  columns: (1fr, 1fr),
  align: (left, right),
  sender,
  [
    #text(size: 24pt, weight: "bold")[TIMESHEET]
    #v(0.5em)
    #data.project \
    #data.start – #data.end
  ]
)

#v(1em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(1em)

#recipient

#v(1.5em)

#let days = ("monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday")

#table(
  columns: (auto, 1fr, 1fr, 1fr, 1fr, 1fr, 1fr, 1fr, auto),
  align: (left, right, right, right, right, right, right, right, right),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else if y > 0 { (bottom: 0.5pt + gray) },
  inset: 6pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  [*Week*], [*Mon*], [*Tue*], [*Wed*], [*Thu*], [*Fri*], [*Sat*], [*Sun*], [*Hours*],

  ..data.weeks.map(week => (
    (week.key,)
    + days.map(d => if d in week.days {
        let day = week.days.at(d)
        [#day.date.slice(8) \ #day.hours]
      } else { [] })
    + (week.hours,)
  )).flatten()
)

#v(1em)

#align(right)[
  #text(weight: "bold")[Total: #data.total #data.unit]
]

#if data.entries.len() > 0 [
  #v(2em)
  #table(
    columns: (auto, auto, 1fr),
    align: (left, right, left),
    stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else { none },
    inset: 4pt,
    [*Start*], [*Hours*], [*Description*],
    ..data.entries.map(e => (e.start, e.hours, e.description)).flatten()
  )
]
"##;

/// Generate an invoice PDF
pub fn generate_pdf(invoice_data: &InvoiceData, output_path: &Path) -> Result<()> {
    compile(INVOICE_TEMPLATE, invoice_data, "invoice", output_path)
}

/// Generate a credit note PDF
pub fn generate_credit_note_pdf(data: &CreditNoteData, output_path: &Path) -> Result<()> {
    compile(CREDIT_NOTE_TEMPLATE, data, "credit-note", output_path)
}

/// Generate a timesheet PDF
pub fn generate_timesheet_pdf(data: &TimesheetData, output_path: &Path) -> Result<()> {
    compile(TIMESHEET_TEMPLATE, data, "timesheet", output_path)
}

/// Render `data` through a Typst template using the Typst CLI
fn compile<T: Serialize>(template: &str, data: &T, stem: &str, output_path: &Path) -> Result<()> {
    let typst_check = Command::new("typst").arg("--version").output();
    if typst_check.is_err() {
        return Err(InvoiceError::TypstNotFound);
    }

    let temp_dir = std::env::temp_dir().join("invoicing-cli");
    std::fs::create_dir_all(&temp_dir)?;

    let json_data =
        serde_json::to_string(data).map_err(|e| InvoiceError::PdfGeneration(e.to_string()))?;
    let json_name = format!("{stem}.json");
    let json_path = temp_dir.join(&json_name);
    std::fs::write(&json_path, &json_data)?;

    // data JSON sits next to the template, under the typst root
    let template_content = format!("{PREAMBLE}{template}").replace("DATA_JSON_PATH", &json_name);
    let template_path = temp_dir.join(format!("{stem}.typ"));
    std::fs::write(&template_path, &template_content)?;

    debug!(template = %template_path.display(), output = %output_path.display(), "running typst");
    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(&temp_dir)
        .arg(&template_path)
        .arg(output_path)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(InvoiceError::PdfGeneration(stderr.to_string()));
    }

    let _ = std::fs::remove_file(&template_path);
    let _ = std::fs::remove_file(&json_path);

    Ok(())
}
