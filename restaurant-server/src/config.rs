//! Server configuration

use std::str::FromStr;

use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;
use shared::ServiceHours;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Upper bound of the connection pool
    pub db_max_connections: u32,
    /// Daily rolling log directory (stdout only when unset)
    pub log_dir: Option<String>,
    /// Bookable window, closed weekday and business timezone
    pub hours: ServiceHours,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(var: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceHours::default();

        let hours = ServiceHours {
            opens_at: match var("OPENS_AT") {
                Some(v) => parse_clock("OPENS_AT", &v)?,
                None => defaults.opens_at,
            },
            closes_at: match var("CLOSES_AT") {
                Some(v) => parse_clock("CLOSES_AT", &v)?,
                None => defaults.closes_at,
            },
            closed_on: match var("CLOSED_WEEKDAY") {
                Some(v) => parse_closed_weekday(&v)?,
                None => defaults.closed_on,
            },
            timezone: match var("BUSINESS_TIMEZONE") {
                Some(v) => v
                    .parse::<Tz>()
                    .map_err(|_| format!("BUSINESS_TIMEZONE is not a known timezone: {v}"))?,
                None => defaults.timezone,
            },
        };
        if hours.opens_at >= hours.closes_at {
            return Err("OPENS_AT must be earlier than CLOSES_AT".into());
        }

        Ok(Self {
            database_url: var("DATABASE_URL").ok_or("DATABASE_URL must be set")?,
            http_port: match var("HTTP_PORT") {
                Some(v) => parse_number::<u16>("HTTP_PORT", &v)?,
                None => 5001,
            },
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            db_max_connections: match var("DB_MAX_CONNECTIONS") {
                Some(v) => match parse_number::<u32>("DB_MAX_CONNECTIONS", &v)? {
                    0 => return Err("DB_MAX_CONNECTIONS must be at least 1".into()),
                    n => n,
                },
                None => 10,
            },
            log_dir: var("LOG_DIR").filter(|s| !s.is_empty()),
            hours,
        })
    }
}

fn parse_clock(name: &str, value: &str) -> Result<NaiveTime, BoxError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| format!("{name} must be HH:MM, got {value}").into())
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T, BoxError> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("{name} is not a valid number for this setting: {value}").into())
}

fn parse_closed_weekday(value: &str) -> Result<Option<Weekday>, BoxError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    value
        .parse::<Weekday>()
        .map(Some)
        .map_err(|_| format!("CLOSED_WEEKDAY is not a weekday: {value}").into())
}
