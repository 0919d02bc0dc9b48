//! Reservation database operations

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Reservation, ReservationCreate, ReservationStatus};
use sqlx::{PgConnection, PgPool};

use super::BoxError;
use crate::error::ServiceResult;

const COLUMNS: &str = "reservation_id, first_name, last_name, mobile_number, \
    reservation_date, reservation_time, people, status, created_at, updated_at";

// ── Rules ──

/// Finished reservations reject every change
pub fn ensure_editable(reservation: &Reservation) -> AppResult<()> {
    if reservation.status.is_final() {
        return Err(AppError::new(ErrorCode::ReservationFinished)
            .with_detail("reservation_id", reservation.reservation_id.to_string()));
    }
    Ok(())
}

// ── Read ──

/// Reservations on `date`, finished ones excluded, earliest first
pub async fn list_by_date(
    pool: &PgPool,
    date: chrono::NaiveDate,
) -> Result<Vec<Reservation>, BoxError> {
    let rows: Vec<Reservation> = sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS}
        FROM reservations
        WHERE reservation_date = $1 AND status <> 'finished'
        ORDER BY reservation_time, reservation_id
        "#
    ))
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Reservations whose phone digits contain `digits`, any status, by date then time
pub async fn search_by_mobile(pool: &PgPool, digits: &str) -> Result<Vec<Reservation>, BoxError> {
    let rows: Vec<Reservation> = sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS}
        FROM reservations
        WHERE regexp_replace(mobile_number, '[^0-9]', '', 'g') LIKE '%' || $1 || '%'
        ORDER BY reservation_date, reservation_time, reservation_id
        "#
    ))
    .bind(digits)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find(pool: &PgPool, reservation_id: i64) -> Result<Option<Reservation>, BoxError> {
    let row: Option<Reservation> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM reservations WHERE reservation_id = $1"
    ))
    .bind(reservation_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Row-locked read for use inside a transaction
pub(crate) async fn lock(
    conn: &mut PgConnection,
    reservation_id: i64,
) -> Result<Option<Reservation>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM reservations WHERE reservation_id = $1 FOR UPDATE"
    ))
    .bind(reservation_id)
    .fetch_optional(conn)
    .await
}

/// Set the status of a locked reservation
pub(crate) async fn set_status(
    conn: &mut PgConnection,
    reservation_id: i64,
    status: ReservationStatus,
) -> Result<Reservation, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        UPDATE reservations SET status = $1, updated_at = NOW()
        WHERE reservation_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(status.as_str())
    .bind(reservation_id)
    .fetch_one(conn)
    .await
}

// ── Write ──

/// Insert a new reservation; status always starts as `booked`
pub async fn create(pool: &PgPool, data: &ReservationCreate) -> Result<Reservation, BoxError> {
    let row: Reservation = sqlx::query_as(&format!(
        r#"
        INSERT INTO reservations (
            first_name, last_name, mobile_number, reservation_date, reservation_time,
            people, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, 'booked')
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.mobile_number)
    .bind(data.reservation_date)
    .bind(data.reservation_time)
    .bind(data.people)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Replace the six business fields of an unfinished reservation
pub async fn update(
    pool: &PgPool,
    reservation_id: i64,
    data: &ReservationCreate,
) -> ServiceResult<Reservation> {
    let mut tx = pool.begin().await?;

    let current = lock(&mut tx, reservation_id)
        .await?
        .ok_or_else(|| AppError::reservation_not_found(reservation_id))?;
    ensure_editable(&current)?;

    let row: Reservation = sqlx::query_as(&format!(
        r#"
        UPDATE reservations SET
            first_name = $1, last_name = $2, mobile_number = $3,
            reservation_date = $4, reservation_time = $5, people = $6,
            updated_at = NOW()
        WHERE reservation_id = $7
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.mobile_number)
    .bind(data.reservation_date)
    .bind(data.reservation_time)
    .bind(data.people)
    .bind(reservation_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Status-only transition; only `finished` is guarded
pub async fn update_status(
    pool: &PgPool,
    reservation_id: i64,
    status: ReservationStatus,
) -> ServiceResult<Reservation> {
    let mut tx = pool.begin().await?;

    let current = lock(&mut tx, reservation_id)
        .await?
        .ok_or_else(|| AppError::reservation_not_found(reservation_id))?;
    ensure_editable(&current)?;

    let row = set_status(&mut tx, reservation_id, status).await?;

    tx.commit().await?;
    tracing::info!(
        reservation_id,
        from = %current.status,
        to = %status,
        "Reservation status changed"
    );
    Ok(row)
}
