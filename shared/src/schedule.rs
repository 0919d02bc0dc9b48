//! Service hours and reservation slots
//!
//! All date/time rules for reservations go through two types:
//! - [`ServiceSlot`]: a strictly parsed `YYYY-MM-DD` + `HH:MM` pair
//! - [`ServiceHours`]: the daily service window, the closed weekday and the
//!   business timezone used to evaluate "now"
//!
//! The window is half-open: `opens_at` is bookable, `closes_at` is not.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chrono_tz::Tz;
use thiserror::Error;

use crate::error::{AppError, ErrorCode};

pub const DATE_PATTERN: &str = "dddd-dd-dd";
pub const TIME_PATTERN: &str = "dd:dd";

/// Why a slot was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("'reservation_date' must be a valid date in YYYY-MM-DD format.")]
    InvalidDate,

    #[error("'reservation_time' must be a valid time in HH:MM format.")]
    InvalidTime,

    #[error("'reservation_date' must not be a {}; the restaurant is closed.", closed_day_name(.0))]
    ClosedDay(Weekday),

    #[error(
        "'reservation_time' must be within business hours ({} to {}).",
        .opens_at.format("%H:%M"),
        .closes_at.format("%H:%M")
    )]
    OutsideHours {
        opens_at: NaiveTime,
        closes_at: NaiveTime,
    },

    #[error("'reservation_time' must not be in the past.")]
    InPast,
}

impl SlotError {
    /// The request field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidDate | Self::ClosedDay(_) => "reservation_date",
            Self::InvalidTime | Self::OutsideHours { .. } | Self::InPast => "reservation_time",
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidDate | Self::InvalidTime => ErrorCode::InvalidFormat,
            Self::ClosedDay(_) => ErrorCode::ClosedDay,
            Self::OutsideHours { .. } => ErrorCode::OutsideServiceHours,
            Self::InPast => ErrorCode::ReservationInPast,
        }
    }
}

impl From<SlotError> for AppError {
    fn from(err: SlotError) -> Self {
        AppError::with_message(err.code(), err.to_string()).with_detail("field", err.field())
    }
}

/// English weekday name, e.g. `Tuesday`
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn closed_day_name(day: &Weekday) -> &'static str {
    weekday_name(*day)
}

/// `d` matches an ASCII digit, every other pattern char matches itself.
fn matches_pattern(value: &str, pattern: &str) -> bool {
    value.len() == pattern.len()
        && value.bytes().zip(pattern.bytes()).all(|(v, p)| match p {
            b'd' => v.is_ascii_digit(),
            _ => v == p,
        })
}

/// Parse a calendar date in exactly `YYYY-MM-DD` form
pub fn parse_date(raw: &str) -> Result<NaiveDate, SlotError> {
    if !matches_pattern(raw, DATE_PATTERN) {
        return Err(SlotError::InvalidDate);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| SlotError::InvalidDate)
}

/// Parse a 24-hour time in exactly `HH:MM` form
pub fn parse_time(raw: &str) -> Result<NaiveTime, SlotError> {
    if !matches_pattern(raw, TIME_PATTERN) {
        return Err(SlotError::InvalidTime);
    }
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| SlotError::InvalidTime)
}

/// A reservation date and time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceSlot {
    date: NaiveDate,
    time: NaiveTime,
}

impl ServiceSlot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Parse both halves strictly; the date is reported first.
    pub fn parse(date: &str, time: &str) -> Result<Self, SlotError> {
        let date = parse_date(date)?;
        let time = parse_time(time)?;
        Ok(Self { date, time })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// Combined local date-time
    pub fn at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Strictly before `now`; a slot equal to `now` is still bookable.
    pub fn is_before(&self, now: NaiveDateTime) -> bool {
        self.at() < now
    }
}

/// Daily service window and closed weekday
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceHours {
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
    pub closed_on: Option<Weekday>,
    pub timezone: Tz,
}

impl Default for ServiceHours {
    fn default() -> Self {
        Self {
            opens_at: NaiveTime::from_hms_opt(10, 30, 0).unwrap_or(NaiveTime::MIN),
            closes_at: NaiveTime::from_hms_opt(21, 30, 0).unwrap_or(NaiveTime::MIN),
            closed_on: Some(Weekday::Tue),
            timezone: Tz::UTC,
        }
    }
}

impl ServiceHours {
    /// Current wall-clock time in the business timezone
    pub fn now(&self) -> NaiveDateTime {
        chrono::Utc::now()
            .with_timezone(&self.timezone)
            .naive_local()
    }

    /// `opens_at <= time < closes_at`
    pub fn within_window(&self, time: NaiveTime) -> bool {
        time >= self.opens_at && time < self.closes_at
    }

    /// Reject dates on the closed weekday
    pub fn check_date(&self, date: NaiveDate) -> Result<(), SlotError> {
        match self.closed_on {
            Some(day) if date.weekday() == day => Err(SlotError::ClosedDay(day)),
            _ => Ok(()),
        }
    }

    /// Reject times in the past or outside the window
    pub fn check_time(&self, slot: &ServiceSlot, now: NaiveDateTime) -> Result<(), SlotError> {
        if slot.is_before(now) {
            return Err(SlotError::InPast);
        }
        if !self.within_window(slot.time()) {
            return Err(SlotError::OutsideHours {
                opens_at: self.opens_at,
                closes_at: self.closes_at,
            });
        }
        Ok(())
    }

    /// Full slot check: closed day, then past, then window
    pub fn check(&self, slot: &ServiceSlot, now: NaiveDateTime) -> Result<(), SlotError> {
        self.check_date(slot.date())?;
        self.check_time(slot, now)
    }
}
