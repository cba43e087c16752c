//! Clock-time to hours calculation.
//!
//! A worked day is `clock_out - clock_in` minus a fixed unpaid break, split
//! into regular hours (capped at the daily threshold) and overtime. Clock-out
//! is always on the same calendar day as clock-in.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimesheetError};

/// Clock time wire format.
pub const CLOCK_FORMAT: &str = "%H:%M";

/// Unpaid break subtracted from every worked day, in hours.
pub const UNPAID_BREAK_HOURS: f64 = 0.5;

/// Hours per day paid at the regular rate.
pub const REGULAR_HOURS_PER_DAY: f64 = 8.0;

/// Hour totals for a day or an aggregate of days.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    pub total_hours: f64,
    pub regular_hours: f64,
    pub overtime_hours: f64,
}

impl DayHours {
    pub const ZERO: DayHours = DayHours {
        total_hours: 0.0,
        regular_hours: 0.0,
        overtime_hours: 0.0,
    };

    /// Split a day's total into regular and overtime hours.
    ///
    /// A negative total stays negative and is carried entirely as regular
    /// hours so that `total = regular + overtime` still holds.
    pub fn from_total(total_hours: f64) -> Self {
        Self {
            total_hours,
            regular_hours: total_hours.min(REGULAR_HOURS_PER_DAY),
            overtime_hours: (total_hours - REGULAR_HOURS_PER_DAY).max(0.0),
        }
    }

    /// A shift shorter than the unpaid break, which leaves a negative total.
    pub fn is_short_shift(&self) -> bool {
        self.total_hours < 0.0
    }
}

impl Add for DayHours {
    type Output = DayHours;

    fn add(self, rhs: DayHours) -> DayHours {
        DayHours {
            total_hours: self.total_hours + rhs.total_hours,
            regular_hours: self.regular_hours + rhs.regular_hours,
            overtime_hours: self.overtime_hours + rhs.overtime_hours,
        }
    }
}

impl AddAssign for DayHours {
    fn add_assign(&mut self, rhs: DayHours) {
        *self = *self + rhs;
    }
}

impl Sum for DayHours {
    fn sum<I: Iterator<Item = DayHours>>(iter: I) -> Self {
        iter.fold(DayHours::ZERO, Add::add)
    }
}

/// Parse an `HH:MM` clock time.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), CLOCK_FORMAT)
        .map_err(|_| TimesheetError::invalid_time(value))
}

/// Format a clock time as `HH:MM`.
pub fn format_clock_time(time: NaiveTime) -> String {
    time.format(CLOCK_FORMAT).to_string()
}

/// Compute a day's hours from optional clock-in and clock-out times.
///
/// Either time missing yields zero hours. Clock-out before clock-in is an
/// `InvalidTimeRange` error rather than a wrap past midnight.
pub fn compute_day(clock_in: Option<NaiveTime>, clock_out: Option<NaiveTime>) -> Result<DayHours> {
    let (Some(clock_in), Some(clock_out)) = (clock_in, clock_out) else {
        return Ok(DayHours::ZERO);
    };
    let minutes = clock_out.signed_duration_since(clock_in).num_minutes();
    if minutes < 0 {
        return Err(TimesheetError::InvalidTimeRange {
            clock_in: format_clock_time(clock_in),
            clock_out: format_clock_time(clock_out),
        });
    }
    Ok(DayHours::from_total(
        minutes as f64 / 60.0 - UNPAID_BREAK_HOURS,
    ))
}

/// Compute a day's hours from `HH:MM` strings. Empty strings count as absent.
pub fn compute_day_str(clock_in: Option<&str>, clock_out: Option<&str>) -> Result<DayHours> {
    compute_day(parse_optional(clock_in)?, parse_optional(clock_out)?)
}

fn parse_optional(value: Option<&str>) -> Result<Option<NaiveTime>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_clock_time(v).map(Some),
    }
}
