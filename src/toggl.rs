use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use ureq::Agent;

use crate::config::{EntryStore, Project, TimeEntry};
use crate::error::{InvoiceError, Result};

const TIME_ENTRIES_URL: &str = "https://api.track.toggl.com/api/v9/me/time_entries";
const SECONDS_PER_HOUR: i64 = 3600;
const MAX_ENTRY_HOURS: i64 = 12;

/// A time entry as returned by the Toggl Track API
#[derive(Debug, Deserialize, Clone)]
pub struct TogglEntry {
    pub id: u64,
    #[serde(default)]
    pub project_id: Option<u64>,
    pub start: DateTime<FixedOffset>,
    #[serde(default)]
    pub stop: Option<DateTime<FixedOffset>>,
    /// Seconds; negative while the timer is running
    pub duration: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_billable")]
    pub billable: bool,
}

fn default_billable() -> bool {
    true
}

impl TogglEntry {
    pub fn is_running(&self) -> bool {
        self.duration < 0
    }

    fn local_start(&self) -> NaiveDateTime {
        self.start.with_timezone(&Local).naive_local()
    }

    fn spans_days(&self) -> bool {
        match self.stop {
            Some(stop) => {
                stop.with_timezone(&Local).date_naive()
                    != self.start.with_timezone(&Local).date_naive()
            }
            None => false,
        }
    }

    fn hours(&self) -> Decimal {
        (Decimal::from(self.duration) / Decimal::from(SECONDS_PER_HOUR)).round_dp(4)
    }
}

pub struct TogglClient {
    agent: Agent,
    authorization: String,
}

impl TogglClient {
    pub fn new(api_token: &str) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .build()
            .into();
        let credentials = STANDARD.encode(format!("{api_token}:api_token"));

        Self {
            agent,
            authorization: format!("Basic {credentials}"),
        }
    }

    /// Fetch the entries started between `start` and `end`
    pub fn time_entries(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<TogglEntry>> {
        let start_date = start.format("%Y-%m-%d").to_string();
        let end_date = end.format("%Y-%m-%d").to_string();
        debug!(%start_date, %end_date, "fetching Toggl time entries");

        let body: String = self
            .agent
            .get(TIME_ENTRIES_URL)
            .query("start_date", &start_date)
            .query("end_date", &end_date)
            .header("Authorization", &self.authorization)
            .call()
            .map_err(|e| InvoiceError::Toggl(e.to_string()))?
            .body_mut()
            .read_to_string()
            .map_err(|e| InvoiceError::Toggl(e.to_string()))?;

        parse_entries(&body)
    }
}

/// Parse a Toggl time entries response body
pub fn parse_entries(body: &str) -> Result<Vec<TogglEntry>> {
    serde_json::from_str(body).map_err(|e| InvoiceError::Toggl(format!("unexpected response: {e}")))
}

/// Reject a batch containing entries that span days or exceed 12 hours
pub fn check_entries(entries: &[TogglEntry]) -> Result<()> {
    let suspicious: Vec<&TogglEntry> = entries
        .iter()
        .filter(|e| e.spans_days() || e.duration > MAX_ENTRY_HOURS * SECONDS_PER_HOUR)
        .collect();

    for entry in &suspicious {
        warn!(
            id = entry.id,
            start = %entry.start,
            duration_s = entry.duration,
            "suspicious time entry"
        );
    }

    if suspicious.is_empty() {
        Ok(())
    } else {
        Err(InvoiceError::SuspiciousEntries(suspicious.len()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub duplicates: usize,
    pub unknown_project: usize,
    pub running: usize,
}

/// Store fetched entries against the projects they are tracked on.
///
/// Entries already stored (same Toggl id) are counted as duplicates and
/// left untouched.
pub fn import_entries(
    fetched: &[TogglEntry],
    projects: &HashMap<String, Project>,
    store: &mut EntryStore,
) -> ImportSummary {
    let by_toggl_id: HashMap<u64, &str> = projects
        .iter()
        .filter_map(|(key, project)| project.toggl_id.map(|id| (id, key.as_str())))
        .collect();

    let mut summary = ImportSummary::default();

    for entry in fetched {
        if entry.is_running() {
            summary.running += 1;
            continue;
        }

        let Some(project) = entry.project_id.and_then(|pid| by_toggl_id.get(&pid)) else {
            warn!(id = entry.id, project_id = ?entry.project_id, "unknown project");
            summary.unknown_project += 1;
            continue;
        };

        let inserted = store.insert(TimeEntry {
            toggl_id: Some(entry.id),
            project: project.to_string(),
            start: entry.local_start(),
            duration: entry.hours(),
            billable: entry.billable,
            description: entry.description.clone(),
        });

        if inserted {
            summary.imported += 1;
        } else {
            summary.duplicates += 1;
        }
    }

    info!(
        imported = summary.imported,
        duplicates = summary.duplicates,
        unknown_project = summary.unknown_project,
        running = summary.running,
        "imported Toggl entries"
    );

    summary
}
