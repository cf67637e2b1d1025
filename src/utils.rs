use crate::prelude::*;

pub fn format_date(date: DateTime) -> String {
  date.format("%d.%m.%Y %H:%M").to_string()
}

/// Start of the calendar month containing `now`.
pub fn month_start(now: DateTime) -> DateTime {
  // day 1 / midnight always exist
  NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
    .and_then(|date| date.and_hms_opt(0, 0, 0))
    .unwrap_or(now)
}

/// Start of the day containing `now`.
pub fn day_start(now: DateTime) -> DateTime {
  now.date().and_hms_opt(0, 0, 0).unwrap_or(now)
}
