use chrono::{DateTime, NaiveDate, NaiveDateTime, ParseError, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// Keyword that denotes the current instant in a time literal.
pub const NOW: &str = "now";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseTimeError {
    #[error("'{0}' is not a valid unit.")]
    InvalidUnit(String),
    #[error(transparent)]
    ParseError(#[from] ParseError),
    #[error("Negative {unit} value {value} is not supported.")]
    NegativeInt { unit: TimeUnit, value: i64 },
    #[error("{unit} value {value} is out of range, expected 0 to {max}.")]
    OutOfRange { unit: TimeUnit, value: i64, max: i64 },
    #[error("Duration overflows the millisecond range.")]
    Overflow,
    #[error("'{0}' is not a valid datetime, valid formats are 'now', %Y-%m-%d, %Y-%m-%dT%H:%M and %Y-%m-%dT%H:%M:%S.")]
    InvalidDateTimeString(String),
}

/// Units accepted by the time-constant constructors `Days(n)`, `Hours(n)`, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
    Millis,
}

impl TimeUnit {
    pub fn millis(&self) -> i64 {
        match self {
            TimeUnit::Days => 86_400_000,
            TimeUnit::Hours => 3_600_000,
            TimeUnit::Minutes => 60_000,
            TimeUnit::Seconds => 1_000,
            TimeUnit::Millis => 1,
        }
    }

    /// Length of `amount` units in milliseconds.
    pub fn duration(&self, amount: i64) -> Result<i64, ParseTimeError> {
        if amount < 0 {
            return Err(ParseTimeError::NegativeInt {
                unit: *self,
                value: amount,
            });
        }
        amount
            .checked_mul(self.millis())
            .ok_or(ParseTimeError::Overflow)
    }

    fn check_range(&self, value: i64, max: i64) -> Result<i64, ParseTimeError> {
        if (0..=max).contains(&value) {
            self.duration(value)
        } else {
            Err(ParseTimeError::OutOfRange {
                unit: *self,
                value,
                max,
            })
        }
    }
}

impl Display for TimeUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let unit = match self {
            TimeUnit::Days => "Days",
            TimeUnit::Hours => "Hours",
            TimeUnit::Minutes => "Minutes",
            TimeUnit::Seconds => "Seconds",
            TimeUnit::Millis => "Millis",
        };
        write!(f, "{}", unit)
    }
}

impl FromStr for TimeUnit {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "days" | "day" => Ok(TimeUnit::Days),
            "hours" | "hour" => Ok(TimeUnit::Hours),
            "minutes" | "minute" => Ok(TimeUnit::Minutes),
            "seconds" | "second" => Ok(TimeUnit::Seconds),
            "millis" | "milli" | "milliseconds" | "millisecond" => Ok(TimeUnit::Millis),
            _ => Err(ParseTimeError::InvalidUnit(s.to_string())),
        }
    }
}

/// Builds a duration from calendar-style components.
///
/// `days` is unbounded above, every other component must stay within its
/// natural range (hours below 24, minutes and seconds below 60, millis below 1000).
pub fn duration_from_components(
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    millis: i64,
) -> Result<i64, ParseTimeError> {
    let parts = [
        TimeUnit::Days.duration(days)?,
        TimeUnit::Hours.check_range(hours, 23)?,
        TimeUnit::Minutes.check_range(minutes, 59)?,
        TimeUnit::Seconds.check_range(seconds, 59)?,
        TimeUnit::Millis.check_range(millis, 999)?,
    ];
    parts
        .into_iter()
        .try_fold(0i64, |acc, part| acc.checked_add(part))
        .ok_or(ParseTimeError::Overflow)
}

pub trait IntoTime {
    fn into_time(self) -> i64;
}

impl IntoTime for i64 {
    fn into_time(self) -> i64 {
        self
    }
}

impl<Tz: TimeZone> IntoTime for DateTime<Tz> {
    fn into_time(self) -> i64 {
        self.timestamp_millis()
    }
}

impl IntoTime for NaiveDateTime {
    fn into_time(self) -> i64 {
        self.and_utc().timestamp_millis()
    }
}

pub trait TryIntoTime {
    fn try_into_time(self) -> Result<i64, ParseTimeError>;
}

impl<T: IntoTime> TryIntoTime for T {
    fn try_into_time(self) -> Result<i64, ParseTimeError> {
        Ok(self.into_time())
    }
}

impl TryIntoTime for &str {
    /// Parses a time literal as milliseconds since the epoch (UTC).
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM`, `YYYY-MM-DDTHH:MM:SS` and the
    /// keyword `now`, which resolves to the current instant.
    fn try_into_time(self) -> Result<i64, ParseTimeError> {
        let literal = self.trim();
        if literal.eq_ignore_ascii_case(NOW) {
            return Ok(Utc::now().timestamp_millis());
        }

        if let Ok(date) = NaiveDate::parse_from_str(literal, "%Y-%m-%d") {
            if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
                return Ok(datetime.and_utc().timestamp_millis());
            }
        }

        let result = NaiveDateTime::parse_from_str(literal, "%Y-%m-%dT%H:%M:%S");
        if let Ok(datetime) = result {
            return Ok(datetime.and_utc().timestamp_millis());
        }

        let result = NaiveDateTime::parse_from_str(literal, "%Y-%m-%dT%H:%M");
        if let Ok(datetime) = result {
            return Ok(datetime.and_utc().timestamp_millis());
        }

        Err(ParseTimeError::InvalidDateTimeString(self.to_string()))
    }
}

/// Renders milliseconds since the epoch in the literal syntax accepted by
/// [`TryIntoTime`], falling back to the raw number outside chrono's range.
pub fn format_time(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(datetime) if datetime.nanosecond() == 0 => {
            if datetime.hour() == 0 && datetime.minute() == 0 && datetime.second() == 0 {
                datetime.format("%Y-%m-%d").to_string()
            } else {
                datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
            }
        }
        Some(datetime) => datetime.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
        None => millis.to_string(),
    }
}
