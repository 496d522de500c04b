use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};

/// The easternmost UTC offset in use. Its calendar date is the latest "today" anywhere.
const LATEST_UTC_OFFSET_HOURS: i64 = 14;
/// The westernmost UTC offset in use.
const EARLIEST_UTC_OFFSET_HOURS: i64 = -12;

/// The latest calendar date in effect anywhere, so a client's local today is never "future".
pub fn ledger_today(now: DateTime<Utc>) -> NaiveDate {
    (now + Duration::hours(LATEST_UTC_OFFSET_HOURS)).date_naive()
}

/// The earliest calendar date in effect anywhere. The backfill window is counted back from
/// it, so a boundary date a client accepts locally is never rejected here.
pub fn earliest_today(now: DateTime<Utc>) -> NaiveDate {
    (now + Duration::hours(EARLIEST_UTC_OFFSET_HOURS)).date_naive()
}

/// Storage timestamps: second precision, `Z` suffix, lexically ordered.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}
