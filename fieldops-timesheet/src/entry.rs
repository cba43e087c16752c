//! A single day on a timesheet.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hours::{compute_day, DayHours};

/// One day of a timesheet week.
///
/// Hour totals are derived from the clock times and recomputed on every
/// edit; they are never set directly. Stored totals are ignored on load and
/// recomputed from the clock times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredEntry")]
pub struct TimesheetEntry {
    pub date: NaiveDate,
    #[serde(default, with = "clock_time", skip_serializing_if = "Option::is_none")]
    clock_in_time: Option<NaiveTime>,
    #[serde(default, with = "clock_time", skip_serializing_if = "Option::is_none")]
    clock_out_time: Option<NaiveTime>,
    total_hours: f64,
    regular_hours: f64,
    overtime_hours: f64,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_card_id: Option<String>,
    #[serde(default)]
    is_absent: bool,
}

impl TimesheetEntry {
    /// An empty day with no clock times.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            clock_in_time: None,
            clock_out_time: None,
            total_hours: 0.0,
            regular_hours: 0.0,
            overtime_hours: 0.0,
            activities: Vec::new(),
            notes: None,
            job_card_id: None,
            is_absent: false,
        }
    }

    pub fn clock_in_time(&self) -> Option<NaiveTime> {
        self.clock_in_time
    }

    pub fn clock_out_time(&self) -> Option<NaiveTime> {
        self.clock_out_time
    }

    pub fn is_absent(&self) -> bool {
        self.is_absent
    }

    /// The derived hour totals for this day.
    pub fn hours(&self) -> DayHours {
        DayHours {
            total_hours: self.total_hours,
            regular_hours: self.regular_hours,
            overtime_hours: self.overtime_hours,
        }
    }

    /// Set clock-in time and recompute hours.
    ///
    /// An invalid range keeps the time, zeroes the hours and returns the error.
    pub fn set_clock_in(&mut self, time: Option<NaiveTime>) -> Result<DayHours> {
        self.clock_in_time = time;
        self.recompute()
    }

    /// Set clock-out time and recompute hours.
    pub fn set_clock_out(&mut self, time: Option<NaiveTime>) -> Result<DayHours> {
        self.clock_out_time = time;
        self.recompute()
    }

    /// Set both clock times at once and recompute hours.
    pub fn set_times(
        &mut self,
        clock_in: Option<NaiveTime>,
        clock_out: Option<NaiveTime>,
    ) -> Result<DayHours> {
        self.clock_in_time = clock_in;
        self.clock_out_time = clock_out;
        self.recompute()
    }

    /// Mark the day absent: clock times cleared, hours zeroed.
    pub fn mark_absent(&mut self) {
        self.is_absent = true;
        self.clock_in_time = None;
        self.clock_out_time = None;
        self.apply(DayHours::ZERO);
    }

    pub fn add_activity(&mut self, activity: impl Into<String>) {
        self.activities.push(activity.into());
    }

    /// Remove the activity at `index`, if present.
    pub fn remove_activity(&mut self, index: usize) -> Option<String> {
        (index < self.activities.len()).then(|| self.activities.remove(index))
    }

    /// Check the clock times form a valid range.
    pub fn check(&self) -> Result<()> {
        compute_day(self.clock_in_time, self.clock_out_time).map(|_| ())
    }

    fn recompute(&mut self) -> Result<DayHours> {
        if self.clock_in_time.is_some() || self.clock_out_time.is_some() {
            self.is_absent = false;
        }
        match compute_day(self.clock_in_time, self.clock_out_time) {
            Ok(hours) => {
                self.apply(hours);
                Ok(hours)
            }
            Err(e) => {
                self.apply(DayHours::ZERO);
                Err(e)
            }
        }
    }

    fn apply(&mut self, hours: DayHours) {
        self.total_hours = hours.total_hours;
        self.regular_hours = hours.regular_hours;
        self.overtime_hours = hours.overtime_hours;
    }
}

/// The persisted shape of an entry, without the derived hour totals.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    date: NaiveDate,
    #[serde(default, with = "clock_time")]
    clock_in_time: Option<NaiveTime>,
    #[serde(default, with = "clock_time")]
    clock_out_time: Option<NaiveTime>,
    #[serde(default)]
    activities: Vec<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    job_card_id: Option<String>,
    #[serde(default)]
    is_absent: bool,
}

impl From<StoredEntry> for TimesheetEntry {
    fn from(stored: StoredEntry) -> Self {
        let mut entry = TimesheetEntry::new(stored.date);
        entry.activities = stored.activities;
        entry.notes = stored.notes;
        entry.job_card_id = stored.job_card_id;
        if stored.is_absent && stored.clock_in_time.is_none() && stored.clock_out_time.is_none() {
            entry.is_absent = true;
            return entry;
        }
        entry.clock_in_time = stored.clock_in_time;
        entry.clock_out_time = stored.clock_out_time;
        // An inverted range loads with zero hours and is reported by `check`.
        let _ = entry.recompute();
        entry
    }
}

/// Serde adapter encoding optional clock times as `HH:MM` strings.
mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::hours::{format_clock_time, parse_clock_time};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_str(&format_clock_time(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(v) if !v.trim().is_empty() => parse_clock_time(&v)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimesheetError;
    use crate::hours::parse_clock_time;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
    }

    fn t(s: &str) -> Option<NaiveTime> {
        Some(parse_clock_time(s).unwrap())
    }

    #[test]
    fn new_entry_is_zero() {
        let entry = TimesheetEntry::new(date());
        assert_eq!(entry.hours(), DayHours::ZERO);
        assert!(!entry.is_absent());
    }

    #[test]
    fn clock_edits_recompute() {
        let mut entry = TimesheetEntry::new(date());
        assert_eq!(entry.set_clock_in(t("07:00")).unwrap(), DayHours::ZERO);
        let hours = entry.set_clock_out(t("19:00")).unwrap();
        assert_eq!(hours.total_hours, 11.5);
        assert_eq!(entry.hours().overtime_hours, 3.5);

        entry.set_clock_out(None).unwrap();
        assert_eq!(entry.hours(), DayHours::ZERO);
    }

    #[test]
    fn invalid_range_keeps_times_and_zeroes_hours() {
        let mut entry = TimesheetEntry::new(date());
        entry.set_times(t("09:00"), t("17:00")).unwrap();
        let err = entry.set_clock_in(t("18:00")).unwrap_err();
        assert!(matches!(err, TimesheetError::InvalidTimeRange { .. }));
        assert_eq!(entry.clock_in_time(), t("18:00"));
        assert_eq!(entry.hours(), DayHours::ZERO);
        assert!(entry.check().is_err());
    }

    #[test]
    fn absent_clears_times() {
        let mut entry = TimesheetEntry::new(date());
        entry.set_times(t("09:00"), t("17:00")).unwrap();
        entry.mark_absent();
        assert!(entry.is_absent());
        assert_eq!(entry.clock_in_time(), None);
        assert_eq!(entry.hours(), DayHours::ZERO);

        entry.set_clock_in(t("10:00")).unwrap();
        assert!(!entry.is_absent());
    }

    #[test]
    fn activities() {
        let mut entry = TimesheetEntry::new(date());
        entry.add_activity("Pump overhaul");
        entry.add_activity("Travel");
        assert_eq!(entry.remove_activity(0), Some("Pump overhaul".to_string()));
        assert_eq!(entry.remove_activity(5), None);
        assert_eq!(entry.activities, vec!["Travel"]);
    }

    #[test]
    fn serializes_clock_times_as_hh_mm() {
        let mut entry = TimesheetEntry::new(date());
        entry.set_times(t("09:00"), t("17:30")).unwrap();
        entry.job_card_id = Some("JC-12".into());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["clockInTime"], "09:00");
        assert_eq!(json["clockOutTime"], "17:30");
        assert_eq!(json["date"], "2024-03-11");
        assert_eq!(json["totalHours"], 8.0);

        let parsed: TimesheetEntry = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn stored_hours_are_recomputed() {
        let json = r#"{
            "date": "2024-03-11",
            "clockInTime": "09:00",
            "clockOutTime": "17:00",
            "totalHours": 40.0,
            "regularHours": 1.0,
            "overtimeHours": 0.0
        }"#;
        let entry: TimesheetEntry = serde_json::from_str(json).unwrap();
        let hours = entry.hours();
        assert_eq!(hours.total_hours, 7.5);
        assert_eq!(hours.regular_hours, 7.5);
        assert_eq!(hours.overtime_hours, 0.0);
    }

    #[test]
    fn stored_inverted_range_loads_with_zero_hours() {
        let json = r#"{"date":"2024-03-11","clockInTime":"18:00","clockOutTime":"09:00","totalHours":9.0}"#;
        let entry: TimesheetEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.hours(), DayHours::ZERO);
        assert_eq!(entry.clock_in_time(), t("18:00"));
        assert!(entry.check().is_err());
    }

    #[test]
    fn stored_absence_is_kept() {
        let json = r#"{"date":"2024-03-11","isAbsent":true,"totalHours":8.0,"regularHours":8.0}"#;
        let entry: TimesheetEntry = serde_json::from_str(json).unwrap();
        assert!(entry.is_absent());
        assert_eq!(entry.hours(), DayHours::ZERO);
    }

    #[test]
    fn deserializes_without_times() {
        let json = r#"{"date":"2024-03-11","totalHours":0.0,"regularHours":0.0,"overtimeHours":0.0}"#;
        let entry: TimesheetEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.clock_in_time(), None);
        assert!(entry.activities.is_empty());
    }
}
