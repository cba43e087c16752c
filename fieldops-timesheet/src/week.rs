//! Week periods and the seven-day timesheet.
//!
//! Weeks are numbered 1 through 52 with a fixed 52-week year. Navigating
//! past week 52 rolls over to week 1 of the next year, and before week 1 to
//! week 52 of the previous year. ISO years with a 53rd week are not
//! reconciled; week 53 is reported as 52.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::entry::TimesheetEntry;
use crate::error::{Result, TimesheetError};
use crate::hours::DayHours;

/// Number of weeks in a timesheet year.
pub const WEEKS_PER_YEAR: u32 = 52;

/// Number of days in a timesheet week.
pub const DAYS_PER_WEEK: usize = 7;

/// A seven-day window with its week number and year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPeriod {
    year: i32,
    week: u32,
    start: NaiveDate,
}

impl WeekPeriod {
    /// A period with an explicit week number. Fails for weeks outside 1..=52.
    pub fn new(year: i32, week: u32, start: NaiveDate) -> Result<Self> {
        if !(1..=WEEKS_PER_YEAR).contains(&week) {
            return Err(TimesheetError::InvalidWeek { week });
        }
        Ok(Self { year, week, start })
    }

    /// The Monday-based week containing `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        let start = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week().min(WEEKS_PER_YEAR),
            start,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window.
    pub fn end(&self) -> NaiveDate {
        self.start + Days::new(DAYS_PER_WEEK as u64 - 1)
    }

    /// The seven dates of the window, in order.
    pub fn days(&self) -> [NaiveDate; DAYS_PER_WEEK] {
        std::array::from_fn(|i| self.start + Days::new(i as u64))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    /// The following week, rolling 52 → 1 into the next year.
    pub fn next_week(&self) -> Self {
        let (year, week) = if self.week >= WEEKS_PER_YEAR {
            (self.year + 1, 1)
        } else {
            (self.year, self.week + 1)
        };
        Self {
            year,
            week,
            start: self.start + Days::new(DAYS_PER_WEEK as u64),
        }
    }

    /// The preceding week, rolling 1 → 52 into the previous year.
    pub fn previous_week(&self) -> Self {
        let (year, week) = if self.week <= 1 {
            (self.year - 1, WEEKS_PER_YEAR)
        } else {
            (self.year, self.week - 1)
        };
        Self {
            year,
            week,
            start: self.start - Days::new(DAYS_PER_WEEK as u64),
        }
    }
}

/// A week period with one entry per day.
///
/// Loading rejects a week whose entries are not exactly the period's seven
/// dates in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredWeek")]
pub struct TimesheetWeek {
    period: WeekPeriod,
    entries: Vec<TimesheetEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWeek {
    period: WeekPeriod,
    entries: Vec<TimesheetEntry>,
}

impl TryFrom<StoredWeek> for TimesheetWeek {
    type Error = TimesheetError;

    fn try_from(stored: StoredWeek) -> Result<Self> {
        let StoredWeek { period, entries } = stored;
        let matches = entries.len() == DAYS_PER_WEEK
            && entries.iter().zip(period.days()).all(|(e, day)| e.date == day);
        if !matches {
            return Err(TimesheetError::EntriesDoNotMatchPeriod {
                start: period.start().to_string(),
                found: entries.len(),
            });
        }
        Ok(Self { period, entries })
    }
}

impl TimesheetWeek {
    /// Generate seven empty entries for `period`.
    pub fn new(period: WeekPeriod) -> Self {
        Self {
            period,
            entries: period.days().into_iter().map(TimesheetEntry::new).collect(),
        }
    }

    pub fn period(&self) -> &WeekPeriod {
        &self.period
    }

    pub fn entries(&self) -> &[TimesheetEntry] {
        &self.entries
    }

    pub fn entry(&self, date: NaiveDate) -> Option<&TimesheetEntry> {
        self.entries.iter().find(|e| e.date == date)
    }

    /// Mutable entry for a date in the period.
    pub fn entry_mut(&mut self, date: NaiveDate) -> Result<&mut TimesheetEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.date == date)
            .ok_or_else(|| TimesheetError::DateOutsidePeriod {
                date: date.to_string(),
            })
    }

    /// Aggregate hours over the week.
    pub fn summary(&self) -> DayHours {
        week_summary(&self.entries)
    }

    /// Check every entry has a valid clock range. Returns the first failure.
    pub fn check(&self) -> Result<()> {
        self.entries.iter().try_for_each(TimesheetEntry::check)
    }
}

/// Element-wise sum of entry hours.
pub fn week_summary<'a, I>(entries: I) -> DayHours
where
    I: IntoIterator<Item = &'a TimesheetEntry>,
{
    entries.into_iter().map(TimesheetEntry::hours).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hours::parse_clock_time;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn for_date_starts_on_monday() {
        // 2024-03-14 is a Thursday in ISO week 11
        let period = WeekPeriod::for_date(ymd(2024, 3, 14));
        assert_eq!(period.start(), ymd(2024, 3, 11));
        assert_eq!(period.end(), ymd(2024, 3, 17));
        assert_eq!(period.week(), 11);
        assert_eq!(period.year(), 2024);
        assert!(period.contains(ymd(2024, 3, 17)));
        assert!(!period.contains(ymd(2024, 3, 18)));
    }

    #[test]
    fn iso_week_53_is_capped() {
        // 2020-12-31 falls in ISO week 53 of 2020
        let period = WeekPeriod::for_date(ymd(2020, 12, 31));
        assert_eq!(period.week(), 52);
        assert_eq!(period.year(), 2020);
    }

    #[test]
    fn navigation_shifts_seven_days() {
        let period = WeekPeriod::for_date(ymd(2024, 3, 14));
        let next = period.next_week();
        assert_eq!(next.start(), ymd(2024, 3, 18));
        assert_eq!(next.week(), 12);
        assert_eq!(next.previous_week(), period);
    }

    #[test]
    fn rolls_over_year_boundary() {
        let last = WeekPeriod::new(2023, 52, ymd(2023, 12, 25)).unwrap();
        let first = last.next_week();
        assert_eq!((first.year(), first.week()), (2024, 1));
        assert_eq!(first.start(), ymd(2024, 1, 1));

        let back = first.previous_week();
        assert_eq!((back.year(), back.week()), (2023, 52));
        assert_eq!(back.start(), ymd(2023, 12, 25));
    }

    #[test]
    fn rejects_week_out_of_range() {
        assert!(WeekPeriod::new(2024, 0, ymd(2024, 1, 1)).is_err());
        assert!(WeekPeriod::new(2024, 53, ymd(2024, 1, 1)).is_err());
    }

    #[test]
    fn new_week_has_seven_days() {
        let week = TimesheetWeek::new(WeekPeriod::for_date(ymd(2024, 3, 14)));
        assert_eq!(week.entries().len(), DAYS_PER_WEEK);
        assert_eq!(week.entries()[0].date, ymd(2024, 3, 11));
        assert_eq!(week.entries()[6].date, ymd(2024, 3, 17));
        assert_eq!(week.summary(), DayHours::ZERO);
    }

    #[test]
    fn summary_sums_entries() {
        let mut week = TimesheetWeek::new(WeekPeriod::for_date(ymd(2024, 3, 14)));
        let t = |s| Some(parse_clock_time(s).unwrap());
        week.entry_mut(ymd(2024, 3, 11))
            .unwrap()
            .set_times(t("09:00"), t("17:00"))
            .unwrap();
        week.entry_mut(ymd(2024, 3, 12))
            .unwrap()
            .set_times(t("07:00"), t("19:00"))
            .unwrap();

        let summary = week.summary();
        assert_eq!(summary.total_hours, 19.0);
        assert_eq!(summary.regular_hours, 15.5);
        assert_eq!(summary.overtime_hours, 3.5);
    }

    #[test]
    fn load_requires_one_entry_per_day() {
        let week = TimesheetWeek::new(WeekPeriod::for_date(ymd(2024, 3, 14)));
        let mut json = serde_json::to_value(&week).unwrap();
        let loaded: TimesheetWeek = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(loaded, week);

        json["entries"] = serde_json::json!([]);
        let err = serde_json::from_value::<TimesheetWeek>(json.clone()).unwrap_err();
        assert!(err.to_string().contains("exactly one entry per day"));

        let mut shifted = serde_json::to_value(week.entries()).unwrap();
        shifted[6]["date"] = "2024-03-18".into();
        json["entries"] = shifted;
        assert!(serde_json::from_value::<TimesheetWeek>(json).is_err());
    }

    #[test]
    fn entry_outside_period() {
        let mut week = TimesheetWeek::new(WeekPeriod::for_date(ymd(2024, 3, 14)));
        assert!(matches!(
            week.entry_mut(ymd(2024, 4, 1)),
            Err(TimesheetError::DateOutsidePeriod { .. })
        ));
    }

    #[test]
    fn check_reports_invalid_entry() {
        let mut week = TimesheetWeek::new(WeekPeriod::for_date(ymd(2024, 3, 14)));
        assert!(week.check().is_ok());
        let t = |s| Some(parse_clock_time(s).unwrap());
        let _ = week
            .entry_mut(ymd(2024, 3, 13))
            .unwrap()
            .set_times(t("17:00"), t("09:00"));
        assert!(matches!(
            week.check(),
            Err(TimesheetError::InvalidTimeRange { .. })
        ));
    }
}
