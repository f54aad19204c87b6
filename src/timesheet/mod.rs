mod aggregate;
mod overview;
mod report;

pub use aggregate::{
    aggregate_timesheet, week_key, weekday_name, DayTotal, Timesheet, Unit, WeekBucket,
    HOURS_PER_DAY,
};
pub use overview::{business_days_between, overview, YearTotal};
pub use report::{TimesheetData, TimesheetDay, TimesheetEntryRow, TimesheetWeek};
