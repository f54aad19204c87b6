use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;

use super::aggregate::HOURS_PER_DAY;
use crate::config::TimeEntry;

/// Time spent on a project during one calendar year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearTotal {
    pub year: i32,
    pub hours: Decimal,
    pub days: Decimal,
}

/// Group entries by the calendar year they start in
pub fn overview(entries: &[TimeEntry]) -> Vec<YearTotal> {
    let mut by_year: BTreeMap<i32, Decimal> = BTreeMap::new();
    for entry in entries {
        *by_year.entry(entry.start.year()).or_insert(Decimal::ZERO) += entry.duration;
    }

    by_year
        .into_iter()
        .map(|(year, hours)| YearTotal {
            year,
            hours,
            days: (hours / Decimal::from(HOURS_PER_DAY))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        })
        .collect()
}

/// Count Monday to Friday days in `[from, to)`
pub fn business_days_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }
    from.iter_days()
        .take_while(|d| *d < to)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32
}
