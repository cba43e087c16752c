//! Error types for timesheet computation

use thiserror::Error;

/// Result type for timesheet operations
pub type Result<T> = std::result::Result<T, TimesheetError>;

/// Errors that can occur computing timesheet hours
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimesheetError {
    /// Clock time is not `HH:MM`
    #[error("invalid clock time '{value}', expected HH:MM")]
    InvalidTime { value: String },

    /// Clock-out earlier than clock-in on the same day
    #[error("clock-out {clock_out} is before clock-in {clock_in}")]
    InvalidTimeRange { clock_in: String, clock_out: String },

    /// Week number outside 1..=52
    #[error("invalid week number {week}, expected 1-52")]
    InvalidWeek { week: u32 },

    /// Date does not fall inside the selected week
    #[error("date {date} is outside the selected week")]
    DateOutsidePeriod { date: String },

    /// Stored entries are not the seven days of their week, in order
    #[error("week starting {start} needs exactly one entry per day, found {found}")]
    EntriesDoNotMatchPeriod { start: String, found: usize },
}

impl TimesheetError {
    /// Create an invalid time error
    pub fn invalid_time(value: impl Into<String>) -> Self {
        Self::InvalidTime {
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TimesheetError::InvalidTimeRange {
            clock_in: "17:00".into(),
            clock_out: "09:00".into(),
        };
        assert_eq!(err.to_string(), "clock-out 09:00 is before clock-in 17:00");
    }

    #[test]
    fn test_invalid_time() {
        let err = TimesheetError::invalid_time("9am");
        assert!(err.to_string().contains("9am"));
    }
}
