mod client;
mod company;
mod entries;
mod project;
mod state;

pub use client::Client;
pub use company::{Config, InvoiceSettings, PdfSettings, Profile, TogglSettings};
pub use entries::{EntryStore, TimeEntry};
pub use project::Project;
pub use state::{CreditNoteRecord, InvoiceRecord, State};

use crate::error::{InvoiceError, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the config directory path (XDG config dir, else ~/.invoicing/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "invoicing") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        InvoiceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".invoicing"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the PDF output directory; relative paths live under the config dir
pub fn resolve_output_dir(output_dir: &str, config_dir: &Path) -> PathBuf {
    let path = expand_path(output_dir);
    if path.is_absolute() {
        path
    } else {
        config_dir.join(path)
    }
}

fn read_required<T: DeserializeOwned>(path: PathBuf) -> Result<T> {
    if !path.exists() {
        return Err(InvoiceError::ConfigFileNotFound(path));
    }
    read_toml(path)
}

fn read_toml<T: DeserializeOwned>(path: PathBuf) -> Result<T> {
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| InvoiceError::ConfigParse { path, source: e })
}

fn write_toml<T: Serialize>(path: PathBuf, value: &T) -> Result<()> {
    let content = toml::to_string_pretty(value).map_err(|e| InvoiceError::ConfigWrite {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    fs::write(&path, content)?;
    debug!(path = %path.display(), "saved");
    Ok(())
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    read_required(config_dir.join("config.toml"))
}

/// Load clients.toml as a HashMap
pub fn load_clients(config_dir: &Path) -> Result<HashMap<String, Client>> {
    read_required(config_dir.join("clients.toml"))
}

/// Load projects.toml as a HashMap
pub fn load_projects(config_dir: &Path) -> Result<HashMap<String, Project>> {
    read_required(config_dir.join("projects.toml"))
}

/// Load entries.toml (empty if missing)
pub fn load_entries(config_dir: &Path) -> Result<EntryStore> {
    let path = config_dir.join("entries.toml");
    if !path.exists() {
        return Ok(EntryStore::default());
    }
    read_toml(path)
}

/// Save entries.toml
pub fn save_entries(config_dir: &Path, store: &EntryStore) -> Result<()> {
    write_toml(config_dir.join("entries.toml"), store)
}

/// Load state.toml (empty if missing)
pub fn load_state(config_dir: &Path) -> Result<State> {
    let path = config_dir.join("state.toml");
    if !path.exists() {
        return Ok(State::default());
    }
    read_toml(path)
}

/// Save state.toml
pub fn save_state(config_dir: &Path, state: &State) -> Result<()> {
    write_toml(config_dir.join("state.toml"), state)
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[profile]
invoice_name = "Your Name"
address_line_1 = "1 Main Street"
address_line_2 = "1000 Brussels"
bank_account = "BE00 0000 0000 0000"
phone = "+32 400 00 00 00"
email = "you@example.com"
vat_number = "BE0000000000"

[invoice]
number_format = "{year}-{seq:03}"  # e.g., 2026-001
currency_symbol = "€"
due_days = 30

[pdf]
output_dir = "output"  # relative to this directory

[toggl]
# api_token = "..."    # or set TOGGL_API_TOKEN
"#;

/// Template content for clients.toml
pub const CLIENTS_TEMPLATE: &str = r#"# Define your clients here. The table name (e.g., [acme]) is the
# client identifier referenced from projects.toml.

[example-client]
name = "Example Client NV"
address_line_1 = "2 Market Square"
address_line_2 = "2000 Antwerp"
vat_number = "BE0123456789"
"#;

/// Template content for projects.toml
pub const PROJECTS_TEMPLATE: &str = r#"# Define your projects here. The table name (e.g., [platform]) is the
# project identifier used by the timesheet and generate commands.
#
# Example:
#   invoicing timesheet --project example-project --start 2026-01-01 --end 2026-01-31

[example-project]
client = "example-client"
name = "Platform Rebuild"
rate = 500.00      # per 8-hour day, VAT excluded
vat_rate = 0.21
# toggl_id = 123456789
default_description = "Software development"
"#;
