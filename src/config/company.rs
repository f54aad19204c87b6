use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub profile: Profile,
    pub invoice: InvoiceSettings,
    pub pdf: PdfSettings,
    #[serde(default)]
    pub toggl: TogglSettings,
}

/// The freelancer issuing the invoices
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Profile {
    pub invoice_name: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub bank_account: String,
    pub phone: String,
    pub email: String,
    pub vat_number: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InvoiceSettings {
    pub number_format: String,
    pub currency_symbol: String,
    pub due_days: u32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct TogglSettings {
    #[serde(default)]
    pub api_token: Option<String>,
}
