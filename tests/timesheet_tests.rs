use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

use invoicing::timesheet::{
    aggregate_timesheet, business_days_between, overview, week_key, TimesheetData, Unit,
};
use invoicing::config::Profile;
use invoicing::{Client, InvoiceError, TimeEntry};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn entry(start: &str, hours: Decimal) -> TimeEntry {
    TimeEntry {
        toggl_id: None,
        project: "platform".to_string(),
        start: start.parse().unwrap(),
        duration: hours,
        billable: true,
        description: None,
    }
}

#[test]
fn test_single_week_scenario() {
    let entries = vec![entry("2024-01-03T10:00:00", dec!(4))];

    let sheet =
        aggregate_timesheet(&entries, date(2024, 1, 1), date(2024, 1, 7), Unit::Days).unwrap();

    assert_eq!(sheet.weeks.len(), 1);
    let week = &sheet.weeks[0];
    assert_eq!(week.key, "2024_01");
    assert_eq!(week.day(Weekday::Wed).unwrap().duration, dec!(4));
    for weekday in [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ] {
        assert_eq!(week.day(weekday).unwrap().duration, Decimal::ZERO);
    }
    assert_eq!(sheet.total, dec!(0.5));
}

#[test]
fn test_every_day_in_range_appears_once() {
    let start = date(2023, 12, 27);
    let end = date(2024, 1, 16);

    let sheet = aggregate_timesheet(&[], start, end, Unit::Hours).unwrap();

    let days: Vec<NaiveDate> = sheet.days().map(|d| d.date).collect();
    let expected: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
    assert_eq!(days, expected);
    assert_eq!(sheet.total, Decimal::ZERO);
}

#[test]
fn test_week_buckets_follow_iso_years() {
    // 2024-12-30 belongs to ISO week 1 of 2025
    let sheet =
        aggregate_timesheet(&[], date(2024, 12, 28), date(2025, 1, 6), Unit::Hours).unwrap();

    let keys: Vec<&str> = sheet.weeks.iter().map(|w| w.key.as_str()).collect();
    assert_eq!(keys, vec!["2024_52", "2025_01", "2025_02"]);

    let first = &sheet.weeks[0];
    assert!(first.day(Weekday::Fri).is_none());
    assert_eq!(first.day(Weekday::Sat).unwrap().date, date(2024, 12, 28));
    assert_eq!(sheet.weeks[1].day(Weekday::Mon).unwrap().date, date(2024, 12, 30));
}

#[test]
fn test_day_sums_conserve_hours() {
    let entries = vec![
        entry("2024-03-04T09:00:00", dec!(3.25)),
        entry("2024-03-04T14:00:00", dec!(4.5)),
        entry("2024-03-06T08:30:00", dec!(7.75)),
        entry("2024-03-12T10:00:00", dec!(1.2)),
    ];

    let sheet =
        aggregate_timesheet(&entries, date(2024, 3, 1), date(2024, 3, 15), Unit::Hours).unwrap();

    let raw: Decimal = entries.iter().map(|e| e.duration).sum();
    assert_eq!(sheet.total_hours(), raw);
    assert_eq!(sheet.total, dec!(16.7));

    let monday = sheet.days().find(|d| d.date == date(2024, 3, 4)).unwrap();
    assert_eq!(monday.duration, dec!(7.75));
}

#[test]
fn test_days_total_rounds_to_one_decimal() {
    let entries = vec![
        entry("2024-05-06T09:00:00", dec!(7)),
        entry("2024-05-07T09:00:00", dec!(6.5)),
    ];

    let sheet =
        aggregate_timesheet(&entries, date(2024, 5, 6), date(2024, 5, 10), Unit::Days).unwrap();

    // 13.5 / 8 = 1.6875
    assert_eq!(sheet.total, dec!(1.7));
    // cells stay in raw hours
    assert_eq!(sheet.weeks[0].day(Weekday::Tue).unwrap().duration, dec!(6.5));
}

#[test]
fn test_entry_at_midnight_counts_for_its_own_day() {
    let entries = vec![
        entry("2024-01-02T23:59:00", dec!(1)),
        entry("2024-01-03T00:00:00", dec!(2)),
    ];

    let sheet =
        aggregate_timesheet(&entries, date(2024, 1, 1), date(2024, 1, 7), Unit::Hours).unwrap();

    let week = &sheet.weeks[0];
    assert_eq!(week.day(Weekday::Tue).unwrap().duration, dec!(1));
    assert_eq!(week.day(Weekday::Wed).unwrap().duration, dec!(2));
}

#[test]
fn test_end_date_is_inclusive() {
    let entries = vec![
        entry("2024-01-07T18:00:00", dec!(2)),
        entry("2024-01-08T09:00:00", dec!(5)),
    ];

    let sheet =
        aggregate_timesheet(&entries, date(2024, 1, 1), date(2024, 1, 7), Unit::Hours).unwrap();

    assert_eq!(sheet.weeks.len(), 1);
    assert_eq!(sheet.weeks[0].day(Weekday::Sun).unwrap().duration, dec!(2));
    assert_eq!(sheet.entries.len(), 1);
    assert_eq!(sheet.total, dec!(2));
}

#[test]
fn test_single_day_range() {
    let entries = vec![entry("2024-02-29T09:00:00", dec!(8))];

    let sheet =
        aggregate_timesheet(&entries, date(2024, 2, 29), date(2024, 2, 29), Unit::Days).unwrap();

    assert_eq!(sheet.weeks.len(), 1);
    assert_eq!(sheet.days().count(), 1);
    assert_eq!(sheet.weeks[0].key, week_key(2024, 9));
    assert_eq!(sheet.total, dec!(1));
}

#[test]
fn test_entries_are_sorted_by_start() {
    let entries = vec![
        entry("2024-01-05T09:00:00", dec!(1)),
        entry("2024-01-02T09:00:00", dec!(1)),
    ];

    let sheet =
        aggregate_timesheet(&entries, date(2024, 1, 1), date(2024, 1, 7), Unit::Hours).unwrap();

    assert!(sheet.entries[0].start < sheet.entries[1].start);
}

#[test]
fn test_invalid_range() {
    let err =
        aggregate_timesheet(&[], date(2024, 1, 7), date(2024, 1, 1), Unit::Hours).unwrap_err();
    assert!(matches!(err, InvoiceError::InvalidRange { .. }));
}

#[test]
fn test_unit_parsing() {
    assert_eq!(Unit::from_str("hours").unwrap(), Unit::Hours);
    assert_eq!(Unit::from_str("days").unwrap(), Unit::Days);

    let err = Unit::from_str("weeks").unwrap_err();
    assert!(matches!(err, InvoiceError::UnsupportedUnit(ref u) if u == "weeks"));
    assert!(err.to_string().contains("Unsupported unit"));
}

#[test]
fn test_timesheet_serializes_weekday_names() {
    let entries = vec![entry("2024-01-03T10:00:00", dec!(4))];
    let sheet =
        aggregate_timesheet(&entries, date(2024, 1, 3), date(2024, 1, 4), Unit::Days).unwrap();

    let json = serde_json::to_value(&sheet).unwrap();
    let days = &json["weeks"][0]["days"];
    assert_eq!(days["wednesday"]["date"], "2024-01-03");
    assert!(days.get("thursday").is_some());
    assert!(days.get("monday").is_none());
    assert_eq!(json["unit"], "days");
}

#[test]
fn test_report_data_keeps_present_days() {
    let entries = vec![entry("2024-01-03T10:00:00", dec!(4.50))];
    let sheet =
        aggregate_timesheet(&entries, date(2024, 1, 3), date(2024, 1, 9), Unit::Days).unwrap();

    let profile: Profile = toml::from_str(
        r#"
invoice_name = "Jane Doe"
address_line_1 = "1 Main Street"
address_line_2 = "1000 Brussels"
bank_account = "BE00"
phone = "+32"
email = "jane@example.com"
vat_number = "BE01"
"#,
    )
    .unwrap();
    let client: Client = toml::from_str(
        r#"
name = "Acme"
address_line_1 = "2 Market Square"
vat_number = "BE02"
"#,
    )
    .unwrap();

    let data = TimesheetData::new(profile, client, "Platform", &sheet);

    assert_eq!(data.weeks.len(), 2);
    assert_eq!(data.weeks[0].days.len(), 5);
    assert_eq!(data.weeks[0].days["wednesday"].hours, "4.5");
    assert_eq!(data.weeks[1].days.len(), 2);
    assert_eq!(data.total, "0.6");
    assert_eq!(data.unit, "days");
    assert_eq!(data.entries.len(), 1);
}

#[test]
fn test_overview_groups_by_year() {
    let entries = vec![
        entry("2023-12-29T09:00:00", dec!(6)),
        entry("2024-01-02T09:00:00", dec!(8)),
        entry("2024-06-03T09:00:00", dec!(5)),
    ];

    let years = overview(&entries);

    assert_eq!(years.len(), 2);
    assert_eq!(years[0].year, 2023);
    assert_eq!(years[0].days, dec!(0.75));
    assert_eq!(years[1].year, 2024);
    assert_eq!(years[1].hours, dec!(13));
    assert_eq!(years[1].days, dec!(1.63));
}

#[test]
fn test_business_days_between() {
    // Mon 2024-01-01 .. Mon 2024-01-15, exclusive
    assert_eq!(business_days_between(date(2024, 1, 1), date(2024, 1, 15)), 10);
    // Saturday to Monday
    assert_eq!(business_days_between(date(2024, 1, 6), date(2024, 1, 8)), 0);
    assert_eq!(business_days_between(date(2024, 1, 8), date(2024, 1, 8)), 0);
    assert_eq!(business_days_between(date(2024, 1, 9), date(2024, 1, 8)), 0);
}
