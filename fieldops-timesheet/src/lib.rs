//! Timesheet hour calculation
//!
//! Converts clock-in/clock-out times into worked hours and splits them into
//! regular and overtime hours. Every worked day loses a fixed 30 minute
//! unpaid break; anything above eight hours is overtime.
//!
//! ```rust
//! use fieldops_timesheet::compute_day_str;
//!
//! let hours = compute_day_str(Some("07:00"), Some("19:00")).unwrap();
//! assert_eq!(hours.total_hours, 11.5);
//! assert_eq!(hours.regular_hours, 8.0);
//! assert_eq!(hours.overtime_hours, 3.5);
//! ```
//!
//! Short shifts are not clamped: a shift under 30 minutes yields a negative
//! total, flagged by [`DayHours::is_short_shift`].

pub mod entry;
pub mod error;
pub mod hours;
pub mod week;

pub use entry::TimesheetEntry;
pub use error::{Result, TimesheetError};
pub use hours::{
    compute_day, compute_day_str, format_clock_time, parse_clock_time, DayHours,
    REGULAR_HOURS_PER_DAY, UNPAID_BREAK_HOURS,
};
pub use week::{week_summary, TimesheetWeek, WeekPeriod, DAYS_PER_WEEK, WEEKS_PER_YEAR};
