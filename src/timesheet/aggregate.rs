use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::config::TimeEntry;
use crate::error::{InvoiceError, Result};

/// Hours in one billable day
pub const HOURS_PER_DAY: u32 = 8;

const WEEKDAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Output unit of a timesheet total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Hours,
    Days,
}

impl Unit {
    pub fn divisor(self) -> Decimal {
        match self {
            Unit::Hours => Decimal::ONE,
            Unit::Days => Decimal::from(HOURS_PER_DAY),
        }
    }
}

impl FromStr for Unit {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hours" => Ok(Unit::Hours),
            "days" => Ok(Unit::Days),
            other => Err(InvoiceError::UnsupportedUnit(other.to_string())),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Hours => write!(f, "hours"),
            Unit::Days => write!(f, "days"),
        }
    }
}

/// Raw hours booked on a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub duration: Decimal,
}

/// One ISO week of the timesheet grid.
///
/// `days` is indexed by ISO weekday (Monday first). Slots outside the
/// requested range stay `None`.
#[derive(Debug, Clone, Serialize)]
pub struct WeekBucket {
    pub key: String,
    pub iso_year: i32,
    pub iso_week: u32,
    #[serde(serialize_with = "serialize_days")]
    pub days: [Option<DayTotal>; 7],
}

impl WeekBucket {
    fn new(iso_year: i32, iso_week: u32) -> Self {
        Self {
            key: week_key(iso_year, iso_week),
            iso_year,
            iso_week,
            days: Default::default(),
        }
    }

    pub fn day(&self, weekday: Weekday) -> Option<&DayTotal> {
        self.days[weekday.num_days_from_monday() as usize].as_ref()
    }

    /// Days present in this bucket, Monday first
    pub fn present_days(&self) -> impl Iterator<Item = (Weekday, &DayTotal)> {
        self.days
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|day| (weekday_from_index(idx), day)))
    }

    pub fn total(&self) -> Decimal {
        self.present_days().map(|(_, day)| day.duration).sum()
    }
}

fn serialize_days<S>(
    days: &[Option<DayTotal>; 7],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let present = days.iter().filter(|d| d.is_some()).count();
    let mut map = serializer.serialize_map(Some(present))?;
    for (name, slot) in WEEKDAY_NAMES.iter().zip(days.iter()) {
        if let Some(day) = slot {
            map.serialize_entry(name, day)?;
        }
    }
    map.end()
}

fn weekday_from_index(idx: usize) -> Weekday {
    match idx {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

/// Lowercase English name of a weekday (e.g. "wednesday")
pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_monday() as usize]
}

/// Bucket key of an ISO week, e.g. `2024_03`
pub fn week_key(iso_year: i32, iso_week: u32) -> String {
    format!("{}_{:02}", iso_year, iso_week)
}

/// Aggregated timesheet for one project and period
#[derive(Debug, Clone, Serialize)]
pub struct Timesheet {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub unit: Unit,
    pub weeks: Vec<WeekBucket>,
    pub entries: Vec<TimeEntry>,
    pub total: Decimal,
}

impl Timesheet {
    /// All day cells of the grid in chronological order
    pub fn days(&self) -> impl Iterator<Item = &DayTotal> {
        self.weeks
            .iter()
            .flat_map(|week| week.days.iter().filter_map(Option::as_ref))
    }

    /// Sum of raw hours over all days
    pub fn total_hours(&self) -> Decimal {
        self.days().map(|day| day.duration).sum()
    }
}

/// Bucket time entries into an ISO week/day grid.
///
/// `end` is inclusive. Day cells hold raw hours; only `total` is expressed in
/// `unit`. Entries starting outside `[start, end]` are ignored.
pub fn aggregate_timesheet(
    entries: &[TimeEntry],
    start: NaiveDate,
    end: NaiveDate,
    unit: Unit,
) -> Result<Timesheet> {
    if end < start {
        return Err(InvoiceError::InvalidRange { start, end });
    }

    let end_exclusive = end
        .succ_opt()
        .ok_or(InvoiceError::InvalidRange { start, end })?;

    let mut in_range: Vec<TimeEntry> = Vec::with_capacity(entries.len());
    let mut per_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for entry in entries {
        let day = entry.start.date();
        if day < start || day >= end_exclusive {
            debug!(start = %entry.start, "ignoring time entry outside timesheet range");
            continue;
        }
        *per_day.entry(day).or_insert(Decimal::ZERO) += entry.duration;
        in_range.push(entry.clone());
    }
    in_range.sort_by_key(|entry| entry.start);

    let mut weeks: BTreeMap<String, WeekBucket> = BTreeMap::new();
    for date in start.iter_days().take_while(|d| *d < end_exclusive) {
        let iso = date.iso_week();
        let key = week_key(iso.year(), iso.week());
        let bucket = weeks
            .entry(key)
            .or_insert_with(|| WeekBucket::new(iso.year(), iso.week()));

        let duration = per_day.get(&date).copied().unwrap_or(Decimal::ZERO);
        bucket.days[date.weekday().num_days_from_monday() as usize] =
            Some(DayTotal { date, duration });
    }

    let hours: Decimal = in_range.iter().map(|entry| entry.duration).sum();
    let total = (hours / unit.divisor())
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

    debug!(
        %start,
        %end,
        %unit,
        entries = in_range.len(),
        weeks = weeks.len(),
        %total,
        "aggregated timesheet"
    );

    Ok(Timesheet {
        start,
        end,
        unit,
        weeks: weeks.into_values().collect(),
        entries: in_range,
        total,
    })
}
