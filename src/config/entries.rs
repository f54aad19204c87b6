use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of time worked on a project, in hours
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TimeEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggl_id: Option<u64>,
    pub project: String,
    pub start: NaiveDateTime,
    pub duration: Decimal,
    #[serde(default = "default_billable")]
    pub billable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_billable() -> bool {
    true
}

/// Contents of entries.toml
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct EntryStore {
    #[serde(default)]
    pub entries: Vec<TimeEntry>,
}

impl EntryStore {
    pub fn contains_toggl_id(&self, toggl_id: u64) -> bool {
        self.entries.iter().any(|e| e.toggl_id == Some(toggl_id))
    }

    /// Insert an entry unless its Toggl id is already stored.
    /// Returns `false` for duplicates.
    pub fn insert(&mut self, entry: TimeEntry) -> bool {
        if let Some(id) = entry.toggl_id {
            if self.contains_toggl_id(id) {
                return false;
            }
        }
        self.entries.push(entry);
        true
    }

    pub fn for_project(&self, project: &str) -> Vec<TimeEntry> {
        self.entries
            .iter()
            .filter(|e| e.project == project)
            .cloned()
            .collect()
    }

    /// Entries of `project` starting on a day in `[start, end]`
    pub fn in_range(
        &self,
        project: &str,
        start: NaiveDate,
        end: NaiveDate,
        billable_only: bool,
    ) -> Vec<TimeEntry> {
        self.entries
            .iter()
            .filter(|e| e.project == project)
            .filter(|e| !billable_only || e.billable)
            .filter(|e| {
                let day = e.start.date();
                day >= start && day <= end
            })
            .cloned()
            .collect()
    }
}
