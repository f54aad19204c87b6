use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A billable engagement for one client.
///
/// `rate` is per 8-hour day, VAT excluded.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Project {
    pub client: String,
    pub name: String,
    pub rate: Decimal,
    pub vat_rate: Decimal,
    #[serde(default)]
    pub toggl_id: Option<u64>,
    #[serde(default)]
    pub default_description: Option<String>,
}
