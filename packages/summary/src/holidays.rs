//! US federal holiday calendar with observed-date rules.
//!
//! Fixed-date holidays falling on a Saturday are observed the Friday
//! before; on a Sunday, the Monday after.

use chrono::{Datelike as _, NaiveDate, Weekday};

/// Observed dates of every federal holiday in `year`.
///
/// An observed New Year's Day can fall on December 31 of the previous
/// year; it is included in the list for the year it commemorates.
#[must_use]
pub fn federal_holidays(year: i32) -> Vec<NaiveDate> {
    let fixed = |month, day| NaiveDate::from_ymd_opt(year, month, day).map(nearest_workday);
    let nth = |month, weekday, n| NaiveDate::from_weekday_of_month_opt(year, month, weekday, n);

    let mut dates = vec![
        fixed(1, 1),
        (year >= 1986)
            .then(|| nth(1, Weekday::Mon, 3))
            .flatten(),
        nth(2, Weekday::Mon, 3),
        last_weekday_of_month(year, 5, Weekday::Mon),
        (year >= 2021).then(|| fixed(6, 19)).flatten(),
        fixed(7, 4),
        nth(9, Weekday::Mon, 1),
        nth(10, Weekday::Mon, 2),
        fixed(11, 11),
        nth(11, Weekday::Thu, 4),
        fixed(12, 25),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();

    dates.sort();
    dates
}

/// Whether `date` is an observed federal holiday.
#[must_use]
pub fn is_federal_holiday(date: NaiveDate) -> bool {
    let year = date.year();
    federal_holidays(year).contains(&date) || federal_holidays(year + 1).contains(&date)
}

/// Moves a Saturday back to Friday and a Sunday forward to Monday.
fn nearest_workday(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date.pred_opt().unwrap_or(date),
        Weekday::Sun => date.succ_opt().unwrap_or(date),
        _ => date,
    }
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let mut date = first_of_next.pred_opt()?;
    while date.weekday() != weekday {
        date = date.pred_opt()?;
    }
    Some(date)
}
