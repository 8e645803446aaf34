use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{EngineError, ResultEngine};

/// A calendar month in the user's timezone.
///
/// Every monthly query in the engine filters by the half-open UTC window
/// `[utc_range().0, utc_range().1)`, which covers the month from its first
/// local instant up to (and excluding) the first local instant of the next
/// month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MonthPeriod {
    year: i32,
    month: u32,
}

impl MonthPeriod {
    /// Creates a period, validating `month` is in `1..=12`.
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidPeriod(format!(
                "month must be 1..=12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The month containing `instant` in the given timezone.
    #[must_use]
    pub fn from_instant(instant: DateTime<Utc>, timezone: Tz) -> Self {
        let local = instant.with_timezone(&timezone);
        Self {
            year: local.year(),
            month: local.month(),
        }
    }

    /// The current month in the given timezone.
    #[must_use]
    pub fn current(timezone: Tz) -> Self {
        Self::from_instant(Utc::now(), timezone)
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// The previous calendar month.
    #[must_use]
    pub const fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The next calendar month.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The UTC window `[start, end)` covering this month in `timezone`.
    pub fn utc_range(self, timezone: Tz) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
        let start = month_start_utc(self.year, self.month, timezone)?;
        let next = self.next();
        let end = month_start_utc(next.year, next.month, timezone)?;
        Ok((start, end))
    }

    /// Whether `instant` falls inside this month in `timezone`.
    #[must_use]
    pub fn contains(self, instant: DateTime<Utc>, timezone: Tz) -> bool {
        Self::from_instant(instant, timezone) == self
    }

    /// Human label, e.g. `March 2026`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

fn month_start_utc(year: i32, month: u32, timezone: Tz) -> ResultEngine<DateTime<Utc>> {
    let naive = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| EngineError::InvalidPeriod(format!("invalid month {year}-{month:02}")))?;

    // Midnight can be skipped or duplicated around a DST transition; take the
    // earliest valid instant.
    timezone
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            EngineError::InvalidPeriod(format!(
                "no valid local midnight for {year}-{month:02} in {timezone}"
            ))
        })
}

/// English month name for `1..=12`.
#[must_use]
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;
    use chrono_tz::Tz;

    use super::*;

    const ROME: Tz = chrono_tz::Europe::Rome;

    #[test]
    fn rejects_invalid_month() {
        assert!(MonthPeriod::new(2026, 0).is_err());
        assert!(MonthPeriod::new(2026, 13).is_err());
        assert!(MonthPeriod::new(2026, 12).is_ok());
    }

    #[test]
    fn window_stays_inside_the_month() {
        for month in 1..=12 {
            let period = MonthPeriod::new(2026, month).unwrap();
            let (start, end) = period.utc_range(ROME).unwrap();

            let local_start = start.with_timezone(&ROME);
            assert_eq!(local_start.year(), 2026);
            assert_eq!(local_start.month(), month);
            assert_eq!(local_start.day(), 1);
            assert_eq!(local_start.hour(), 0);

            // The exclusive end is the first instant of the next month.
            let local_end = end.with_timezone(&ROME);
            let next = period.next();
            assert_eq!(local_end.year(), next.year());
            assert_eq!(local_end.month(), next.month());
            assert_eq!(local_end.day(), 1);

            assert!(start < end);
        }
    }

    #[test]
    fn leap_february_has_29_days() {
        let period = MonthPeriod::new(2028, 2).unwrap();
        let (start, end) = period.utc_range(ROME).unwrap();
        let days = (end - start).num_days();
        assert_eq!(days, 29);
    }

    #[test]
    fn prev_next_wrap_across_years() {
        let january = MonthPeriod::new(2026, 1).unwrap();
        assert_eq!(january.prev(), MonthPeriod::new(2025, 12).unwrap());
        let december = MonthPeriod::new(2026, 12).unwrap();
        assert_eq!(december.next(), MonthPeriod::new(2027, 1).unwrap());
    }

    #[test]
    fn contains_matches_window() {
        let period = MonthPeriod::new(2026, 3).unwrap();
        let (start, end) = period.utc_range(ROME).unwrap();
        assert!(period.contains(start, ROME));
        assert!(!period.contains(end, ROME));
        assert!(period.contains(end - chrono::Duration::seconds(1), ROME));
    }

    #[test]
    fn label_is_human_readable() {
        let period = MonthPeriod::new(2026, 3).unwrap();
        assert_eq!(period.label(), "March 2026");
    }
}
