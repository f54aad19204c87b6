use serde::Serialize;
use std::collections::BTreeMap;

use super::aggregate::{weekday_name, Timesheet};
use crate::config::{Client, Profile};
use crate::format::format_hours;

/// A day cell of the rendered timesheet
#[derive(Debug, Serialize)]
pub struct TimesheetDay {
    pub date: String,
    pub hours: String,
}

#[derive(Debug, Serialize)]
pub struct TimesheetWeek {
    pub key: String,
    pub days: BTreeMap<&'static str, TimesheetDay>,
    pub hours: String,
}

#[derive(Debug, Serialize)]
pub struct TimesheetEntryRow {
    pub start: String,
    pub hours: String,
    pub description: String,
}

/// Complete data for rendering the timesheet PDF
#[derive(Debug, Serialize)]
pub struct TimesheetData {
    pub profile: Profile,
    pub client: Client,
    pub project: String,
    pub start: String,
    pub end: String,
    pub weeks: Vec<TimesheetWeek>,
    pub entries: Vec<TimesheetEntryRow>,
    pub total: String,
    pub unit: String,
}

impl TimesheetData {
    pub fn new(profile: Profile, client: Client, project: &str, timesheet: &Timesheet) -> Self {
        let weeks = timesheet
            .weeks
            .iter()
            .map(|week| TimesheetWeek {
                key: week.key.clone(),
                days: week
                    .present_days()
                    .map(|(weekday, day)| {
                        (
                            weekday_name(weekday),
                            TimesheetDay {
                                date: day.date.to_string(),
                                hours: format_hours(day.duration),
                            },
                        )
                    })
                    .collect(),
                hours: format_hours(week.total()),
            })
            .collect();

        let entries = timesheet
            .entries
            .iter()
            .map(|entry| TimesheetEntryRow {
                start: entry.start.format("%Y-%m-%d %H:%M").to_string(),
                hours: format_hours(entry.duration),
                description: entry.description.clone().unwrap_or_default(),
            })
            .collect();

        Self {
            profile,
            client,
            project: project.to_string(),
            start: timesheet.start.to_string(),
            end: timesheet.end.to_string(),
            weeks,
            entries,
            total: format_hours(timesheet.total),
            unit: timesheet.unit.to_string(),
        }
    }
}
