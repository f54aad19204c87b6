use serde::{Deserialize, Serialize};

/// Contact and invoicing details of a client
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Client {
    pub name: String,
    pub address_line_1: String,
    #[serde(default)]
    pub address_line_2: String,
    pub vat_number: String,
}
