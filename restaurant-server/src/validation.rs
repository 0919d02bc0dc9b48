//! Request payload validation
//!
//! Every write endpoint receives `{ "data": { ... } }`. The `data` object is wrapped
//! in a [`FieldMap`] and run through an ordered list of checks, each returning
//! `AppResult` so the first failure short-circuits with `?`:
//!
//! 1. required fields present (not null, strings not blank)
//! 2. no fields outside the allowed set (all offenders reported at once)
//! 3. per-field format and range rules
//! 4. business rules (closed weekday, past slot, service window)

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    DiningTableCreate, DiningTableUpdate, ReservationCreate, ReservationStatus, SeatRequest,
    normalize_mobile_number,
};
use shared::{ServiceHours, ServiceSlot};

// ── Text length limits ──────────────────────────────────────────────

/// Person and table names
pub const MAX_NAME_LEN: usize = 200;

/// Phone numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Shortest accepted table name
pub const MIN_TABLE_NAME_LEN: usize = 2;

// ── Field sets ──────────────────────────────────────────────────────

pub const RESERVATION_FIELDS: [&str; 6] = [
    "first_name",
    "last_name",
    "mobile_number",
    "reservation_date",
    "reservation_time",
    "people",
];

/// Server-owned fields a client may echo back on a full edit
const RESERVATION_ECHO_FIELDS: [&str; 4] = ["reservation_id", "status", "created_at", "updated_at"];

pub const TABLE_FIELDS: [&str; 2] = ["table_name", "capacity"];

const TABLE_ECHO_FIELDS: [&str; 3] = ["table_id", "status", "reservation_id"];

const PHONE_SEPARATORS: [char; 6] = [' ', '-', '(', ')', '.', '+'];

// ── Field map ───────────────────────────────────────────────────────

/// The `data` object of a request body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap(Map<String, Value>);

impl FieldMap {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Unwrap `{ "data": { ... } }`. An absent or null `data` is an empty map.
    pub fn from_body(body: Value) -> AppResult<Self> {
        let Value::Object(mut body) = body else {
            return Err(AppError::invalid_request("Request body must be a JSON object"));
        };
        match body.remove("data") {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::Object(fields)) => Ok(Self(fields)),
            Some(_) => Err(AppError::invalid_request("'data' must be a JSON object")),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Present and not null; strings must not be blank.
    pub fn has(&self, field: &str) -> bool {
        match self.0.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// Fail on the first missing field, in the given order
    pub fn require(&self, fields: &[&str]) -> AppResult<()> {
        match fields.iter().find(|field| !self.has(field)) {
            Some(field) => Err(AppError::missing_field(field)),
            None => Ok(()),
        }
    }

    /// Fail when any field is outside `allowed`, listing every offender
    pub fn reject_unknown(&self, allowed: &[&str]) -> AppResult<()> {
        let unknown: Vec<String> = self
            .0
            .keys()
            .filter(|key| !allowed.contains(&key.as_str()))
            .cloned()
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(AppError::unknown_fields(&unknown))
        }
    }

    /// Required string within `max_len` characters
    pub fn text(&self, field: &str, max_len: usize) -> AppResult<String> {
        let value = self.string(field)?;
        validate_text_len(value, field, max_len)?;
        Ok(value.to_string())
    }

    /// Required string of digits and phone separators
    pub fn mobile_number(&self, field: &str) -> AppResult<String> {
        let value = self.text(field, MAX_SHORT_TEXT_LEN)?;
        validate_mobile_number(&value, field)?;
        Ok(value)
    }

    /// Required JSON number, integral, from 1 up to `i32::MAX`
    pub fn positive_int(&self, field: &str) -> AppResult<i32> {
        let value = self.get(field).ok_or_else(|| AppError::missing_field(field))?;
        positive_int(value, field)
    }

    /// Required reservation date and time, parsed and checked against `hours`
    pub fn slot(&self, hours: &ServiceHours, now: NaiveDateTime) -> AppResult<ServiceSlot> {
        let date = self.string("reservation_date").unwrap_or_default();
        let time = self.string("reservation_time").unwrap_or_default();
        let slot = ServiceSlot::parse(date, time)?;
        hours.check(&slot, now)?;
        Ok(slot)
    }

    fn string(&self, field: &str) -> AppResult<&str> {
        match self.get(field) {
            Some(Value::String(s)) => Ok(s),
            None | Some(Value::Null) => Err(AppError::missing_field(field)),
            Some(_) => Err(AppError::invalid_format(
                field,
                format!("'{field}' must be a string."),
            )),
        }
    }
}

/// `{ "data": ... }` request body, lenient about content type.
///
/// An empty body is an empty field map so that path lookups (404) still run first.
pub struct DataBody(pub FieldMap);

impl<S> FromRequest<S> for DataBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::invalid_request(e.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(FieldMap::default()));
        }
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::invalid_request(format!("Malformed JSON body: {e}")))?;
        FieldMap::from_body(body).map(Self)
    }
}

// ── Single-value rules ──────────────────────────────────────────────

/// Length limit in characters
pub fn validate_text_len(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("'{field}' is too long ({len} chars, max {max_len})."),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Digits and `space - ( ) . +` only, with at least one digit
pub fn validate_mobile_number(value: &str, field: &str) -> AppResult<()> {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || PHONE_SEPARATORS.contains(&c));
    if !allowed || !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::invalid_format(
            field,
            format!("'{field}' must be a phone number (digits, spaces and - ( ) . + only)."),
        ));
    }
    Ok(())
}

fn positive_int(value: &Value, field: &str) -> AppResult<i32> {
    let Value::Number(n) = value else {
        return Err(AppError::invalid_format(
            field,
            format!("'{field}' must be a valid number."),
        ));
    };
    // Float casts saturate, so huge values still land above the bound
    let whole = n
        .as_i64()
        .or_else(|| n.as_u64().map(|_| i64::MAX))
        .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64));
    let Some(whole) = whole else {
        return Err(AppError::invalid_format(
            field,
            format!("'{field}' must be a whole number."),
        ));
    };
    if whole < 1 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("'{field}' must be at least 1."),
        )
        .with_detail("field", field));
    }
    i32::try_from(whole).map_err(|_| {
        AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("'{field}' must be at most {}.", i32::MAX),
        )
        .with_detail("field", field)
    })
}

fn positive_id(value: &Value, field: &str) -> AppResult<i64> {
    match value.as_i64() {
        Some(id) if id > 0 => Ok(id),
        _ => Err(AppError::invalid_format(
            field,
            format!("'{field}' must be a positive integer."),
        )),
    }
}

// ── Reservation pipelines ───────────────────────────────────────────

/// The six business fields, checked in declaration order
fn reservation_fields(
    data: &FieldMap,
    hours: &ServiceHours,
    now: NaiveDateTime,
) -> AppResult<ReservationCreate> {
    let first_name = data.text("first_name", MAX_NAME_LEN)?;
    let last_name = data.text("last_name", MAX_NAME_LEN)?;
    let mobile_number = data.mobile_number("mobile_number")?;
    let slot = data.slot(hours, now)?;
    let people = data.positive_int("people")?;

    Ok(ReservationCreate {
        first_name,
        last_name,
        mobile_number,
        reservation_date: slot.date(),
        reservation_time: slot.time(),
        people,
    })
}

/// `POST /reservations`: the six fields plus an optional `status` that must be `booked`
pub fn new_reservation(
    data: &FieldMap,
    hours: &ServiceHours,
    now: NaiveDateTime,
) -> AppResult<ReservationCreate> {
    data.require(&RESERVATION_FIELDS)?;

    let mut allowed = RESERVATION_FIELDS.to_vec();
    allowed.push("status");
    data.reject_unknown(&allowed)?;

    if data.has("status") {
        let status = data.get("status").and_then(Value::as_str);
        if status != Some(ReservationStatus::Booked.as_str()) {
            return Err(AppError::invalid_format(
                "status",
                "'status' must be 'booked' when creating a reservation.",
            ));
        }
    }

    reservation_fields(data, hours, now)
}

/// `PUT /reservations/{id}`: same rules as creation; echoed server fields are ignored
pub fn reservation_edit(
    data: &FieldMap,
    hours: &ServiceHours,
    now: NaiveDateTime,
) -> AppResult<ReservationCreate> {
    data.require(&RESERVATION_FIELDS)?;

    let mut allowed = RESERVATION_FIELDS.to_vec();
    allowed.extend(RESERVATION_ECHO_FIELDS);
    data.reject_unknown(&allowed)?;

    reservation_fields(data, hours, now)
}

/// `PUT /reservations/{id}/status`
pub fn status_update(data: &FieldMap) -> AppResult<ReservationStatus> {
    data.require(&["status"])?;
    data.get("status")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            AppError::invalid_format(
                "status",
                "'status' must be one of booked, seated, finished, cancelled.",
            )
        })
}

/// `?mobile_number=` search term, reduced to its digits
pub fn mobile_search(raw: &str) -> AppResult<String> {
    let digits = normalize_mobile_number(raw);
    if digits.is_empty() {
        return Err(AppError::invalid_format(
            "mobile_number",
            "'mobile_number' must contain at least one digit.",
        ));
    }
    Ok(digits)
}

// ── Table pipelines ─────────────────────────────────────────────────

fn table_name(data: &FieldMap) -> AppResult<String> {
    let name = data.text("table_name", MAX_NAME_LEN)?;
    if name.chars().count() < MIN_TABLE_NAME_LEN {
        return Err(AppError::invalid_format(
            "table_name",
            "'table_name' must be at least 2 characters long.",
        ));
    }
    Ok(name)
}

/// `POST /tables`
pub fn new_table(data: &FieldMap) -> AppResult<DiningTableCreate> {
    data.require(&TABLE_FIELDS)?;
    data.reject_unknown(&TABLE_FIELDS)?;

    Ok(DiningTableCreate {
        table_name: table_name(data)?,
        capacity: data.positive_int("capacity")?,
    })
}

/// `PUT /tables/{id}`: both fields optional
pub fn table_update(data: &FieldMap) -> AppResult<DiningTableUpdate> {
    let mut allowed = TABLE_FIELDS.to_vec();
    allowed.extend(TABLE_ECHO_FIELDS);
    data.reject_unknown(&allowed)?;

    let mut update = DiningTableUpdate::default();
    if data.has("table_name") {
        update.table_name = Some(table_name(data)?);
    }
    if data.has("capacity") {
        update.capacity = Some(data.positive_int("capacity")?);
    }
    Ok(update)
}

/// `PUT /tables/{id}/seat`
pub fn seat_request(data: &FieldMap) -> AppResult<SeatRequest> {
    data.require(&["reservation_id"])?;
    let value = data
        .get("reservation_id")
        .ok_or_else(|| AppError::missing_field("reservation_id"))?;
    Ok(SeatRequest {
        reservation_id: positive_id(value, "reservation_id")?,
    })
}
