//! Reservation Model

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::serde_helpers;

/// Reservation lifecycle status
///
/// `booked → seated → finished`, or `booked → cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Booked,
    Seated,
    Finished,
    Cancelled,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 4] = [
        ReservationStatus::Booked,
        ReservationStatus::Seated,
        ReservationStatus::Finished,
        ReservationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Seated => "seated",
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
        }
    }

    /// Finished reservations never change again
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised status text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reservation status: {0}")]
pub struct InvalidStatus(pub String);

impl FromStr for ReservationStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

impl TryFrom<String> for ReservationStatus {
    type Error = InvalidStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Reservation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub reservation_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub reservation_date: NaiveDate,
    #[serde(with = "serde_helpers::hhmm")]
    pub reservation_time: NaiveTime,
    pub people: i32,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated reservation fields, used for both creation and full edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub reservation_date: NaiveDate,
    #[serde(with = "serde_helpers::hhmm")]
    pub reservation_time: NaiveTime,
    pub people: i32,
}

/// Listing filter: phone search wins over date when both are given
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
}

impl ReservationQuery {
    pub fn by_date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            mobile_number: None,
        }
    }

    pub fn by_mobile_number(mobile_number: impl Into<String>) -> Self {
        Self {
            date: None,
            mobile_number: Some(mobile_number.into()),
        }
    }
}

/// Keep only the digits of a phone number: `"(555) 123-4567"` → `"5551234567"`
pub fn normalize_mobile_number(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
