use chrono::{Duration, NaiveDate};
use ledger_core::{DateRejection, check_backfill};

/// Inclusive calendar range handed to the reporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl DateRange {
    pub fn single(day: NaiveDate) -> Self {
        Self {
            since: day,
            until: day,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.since <= day && day <= self.until
    }
}

/// Explicit date wins, then a trailing day count (capped at the window), else today.
pub fn resolve_range(
    date: Option<NaiveDate>,
    days: Option<u32>,
    today: NaiveDate,
    window_days: i64,
) -> Result<DateRange, DateRejection> {
    let range = match (date, days) {
        (Some(day), _) => DateRange::single(day),
        (None, Some(days)) => {
            let days = i64::from(days.max(1)).min(window_days.max(1));
            DateRange {
                since: today - Duration::days(days - 1),
                until: today,
            }
        }
        (None, None) => DateRange::single(today),
    };
    check_backfill(range.since, today, window_days)?;
    check_backfill(range.until, today, window_days)?;
    Ok(range)
}

#[cfg(test)]
mod tests {
    use ledger_core::parse_ledger_date;

    use super::*;

    fn day(value: &str) -> NaiveDate {
        parse_ledger_date(value).expect("date")
    }

    #[test]
    fn defaults_to_today() {
        let today = day("2025-06-10");
        assert_eq!(
            resolve_range(None, None, today, 7),
            Ok(DateRange::single(today))
        );
    }

    #[test]
    fn day_count_is_trailing_and_capped() {
        let today = day("2025-06-10");
        let range = resolve_range(None, Some(3), today, 7).expect("range");
        assert_eq!(range.since, day("2025-06-08"));
        assert_eq!(range.until, today);

        let range = resolve_range(None, Some(30), today, 7).expect("capped");
        assert_eq!(range.since, day("2025-06-04"));
    }

    #[test]
    fn explicit_date_is_checked_against_window() {
        let today = day("2025-06-10");
        assert!(resolve_range(Some(day("2025-06-03")), None, today, 7).is_ok());
        assert!(matches!(
            resolve_range(Some(day("2025-06-02")), None, today, 7),
            Err(DateRejection::TooOld { .. })
        ));
        assert!(matches!(
            resolve_range(Some(day("2025-06-11")), None, today, 7),
            Err(DateRejection::Future { .. })
        ));
    }
}
