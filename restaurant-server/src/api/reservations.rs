//! Reservation endpoints
//!
//! Each handler is a fixed sequence of steps; every step either returns the value the
//! next one needs or an error that ends the request.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use shared::ApiResponse;
use shared::error::AppError;
use shared::models::{Reservation, ReservationQuery};
use shared::schedule::parse_date;

use super::{ApiResult, ok, parse_id};
use crate::db::reservations;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::validation::{self, DataBody};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reservations", get(list).post(create))
        .route("/reservations/{reservation_id}", get(read).put(update))
        .route("/reservations/{reservation_id}/status", put(update_status))
}

fn reservation_id(raw: &str) -> Result<i64, AppError> {
    parse_id(raw, |raw| AppError::reservation_not_found(raw))
}

/// `?mobile_number=` searches by phone digits; otherwise `?date=` is required.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ReservationQuery>,
) -> ApiResult<Vec<Reservation>> {
    let mobile_number = query.mobile_number.filter(|s| !s.trim().is_empty());
    let date = query.date.filter(|s| !s.trim().is_empty());

    let rows = match (mobile_number, date) {
        (Some(mobile_number), _) => {
            let digits = validation::mobile_search(&mobile_number)?;
            reservations::search_by_mobile(&state.pool, &digits).await?
        }
        (None, Some(date)) => {
            let date = parse_date(&date).map_err(|_| {
                AppError::invalid_format("date", "'date' must be a valid date in YYYY-MM-DD format.")
            })?;
            reservations::list_by_date(&state.pool, date).await?
        }
        (None, None) => return Err(AppError::missing_field("date").into()),
    };
    ok(rows)
}

pub async fn create(
    State(state): State<AppState>,
    DataBody(data): DataBody,
) -> Result<(StatusCode, Json<ApiResponse<Reservation>>), ServiceError> {
    let fields = validation::new_reservation(&data, &state.hours, state.hours.now())?;
    let reservation = reservations::create(&state.pool, &fields).await?;
    tracing::info!(
        reservation_id = reservation.reservation_id,
        date = %reservation.reservation_date,
        people = reservation.people,
        "Reservation created"
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::success(reservation))))
}

pub async fn read(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Reservation> {
    let id = reservation_id(&raw_id)?;
    let reservation = reservations::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::reservation_not_found(id))?;
    ok(reservation)
}

/// Full edit: existence and the finished guard come before payload validation
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    DataBody(data): DataBody,
) -> ApiResult<Reservation> {
    let id = reservation_id(&raw_id)?;
    let current = reservations::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::reservation_not_found(id))?;
    reservations::ensure_editable(&current)?;

    let fields = validation::reservation_edit(&data, &state.hours, state.hours.now())?;
    let reservation = reservations::update(&state.pool, id, &fields).await?;
    ok(reservation)
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    DataBody(data): DataBody,
) -> ApiResult<Reservation> {
    let id = reservation_id(&raw_id)?;
    reservations::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::reservation_not_found(id))?;

    let status = validation::status_update(&data)?;
    let reservation = reservations::update_status(&state.pool, id, status).await?;
    ok(reservation)
}
