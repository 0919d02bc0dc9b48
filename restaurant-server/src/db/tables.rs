//! Dining table database operations
//!
//! Seat and un-seat change a table and its reservation together. Both rows are
//! locked with `FOR UPDATE` (tables first, then reservation) inside one transaction.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, Reservation, ReservationStatus,
};
use sqlx::{PgConnection, PgPool};

use super::BoxError;
use super::reservations;
use crate::error::ServiceResult;

const COLUMNS: &str = "table_id, table_name, capacity, status, reservation_id";

// ── Rules ──

/// Checks run before seating `reservation` at `table`, in order.
///
/// `holder` is the table currently referencing the reservation, if any.
pub fn check_seat(
    table: &DiningTable,
    reservation: &Reservation,
    holder: Option<&DiningTable>,
) -> AppResult<()> {
    match reservation.status {
        ReservationStatus::Booked => {}
        ReservationStatus::Seated => {
            return Err(AppError::new(ErrorCode::ReservationAlreadySeated)
                .with_detail("reservation_id", reservation.reservation_id.to_string()));
        }
        other => {
            return Err(AppError::with_message(
                ErrorCode::ReservationNotBookable,
                format!("Reservation is {other} and cannot be seated"),
            )
            .with_detail("reservation_id", reservation.reservation_id.to_string()));
        }
    }
    if let Some(holder) = holder {
        return Err(AppError::new(ErrorCode::ReservationAlreadySeated)
            .with_detail("reservation_id", reservation.reservation_id.to_string())
            .with_detail("table_id", holder.table_id.to_string()));
    }
    if !table.fits(reservation.people) {
        return Err(AppError::new(ErrorCode::TableCapacityExceeded)
            .with_detail("capacity", table.capacity)
            .with_detail("people", reservation.people));
    }
    if table.is_occupied() {
        return Err(AppError::new(ErrorCode::TableOccupied)
            .with_detail("table_id", table.table_id.to_string()));
    }
    Ok(())
}

/// Only an occupied table can be finished
pub fn check_unseat(table: &DiningTable) -> AppResult<i64> {
    table.reservation_id.ok_or_else(|| {
        AppError::new(ErrorCode::TableNotOccupied)
            .with_detail("table_id", table.table_id.to_string())
    })
}

/// An occupied table cannot be deleted
pub fn check_delete(table: &DiningTable) -> AppResult<()> {
    if table.is_occupied() {
        return Err(AppError::new(ErrorCode::TableOccupied)
            .with_detail("table_id", table.table_id.to_string()));
    }
    Ok(())
}

/// Capacity may not drop below the party currently seated
pub fn check_capacity(capacity: i32, seated: Option<&Reservation>) -> AppResult<()> {
    match seated {
        Some(reservation) if reservation.people > capacity => {
            Err(AppError::new(ErrorCode::TableCapacityExceeded)
                .with_detail("capacity", capacity)
                .with_detail("people", reservation.people))
        }
        _ => Ok(()),
    }
}

// ── Read ──

pub async fn list(pool: &PgPool) -> Result<Vec<DiningTable>, BoxError> {
    let rows: Vec<DiningTable> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM tables ORDER BY table_name, table_id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find(pool: &PgPool, table_id: i64) -> Result<Option<DiningTable>, BoxError> {
    let row: Option<DiningTable> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM tables WHERE table_id = $1"))
            .bind(table_id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

async fn lock(conn: &mut PgConnection, table_id: i64) -> Result<Option<DiningTable>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM tables WHERE table_id = $1 FOR UPDATE"
    ))
    .bind(table_id)
    .fetch_optional(conn)
    .await
}

/// Lock the table still referencing a reservation
async fn lock_holder(
    conn: &mut PgConnection,
    reservation_id: i64,
) -> Result<Option<DiningTable>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM tables WHERE reservation_id = $1 FOR UPDATE"
    ))
    .bind(reservation_id)
    .fetch_optional(conn)
    .await
}

// ── Write ──

pub async fn create(pool: &PgPool, data: &DiningTableCreate) -> Result<DiningTable, BoxError> {
    let row: DiningTable = sqlx::query_as(&format!(
        r#"
        INSERT INTO tables (table_name, capacity, status)
        VALUES ($1, $2, 'free')
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&data.table_name)
    .bind(data.capacity)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Rename or resize a table
pub async fn update(
    pool: &PgPool,
    table_id: i64,
    data: &DiningTableUpdate,
) -> ServiceResult<DiningTable> {
    let mut tx = pool.begin().await?;

    let table = lock(&mut tx, table_id)
        .await?
        .ok_or_else(|| AppError::table_not_found(table_id))?;

    if let Some(capacity) = data.capacity {
        let seated = match table.reservation_id {
            Some(id) => reservations::lock(&mut tx, id).await?,
            None => None,
        };
        check_capacity(capacity, seated.as_ref())?;
    }

    let row: DiningTable = sqlx::query_as(&format!(
        r#"
        UPDATE tables SET
            table_name = COALESCE($1, table_name),
            capacity = COALESCE($2, capacity)
        WHERE table_id = $3
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&data.table_name)
    .bind(data.capacity)
    .bind(table_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Delete a free table
pub async fn delete(pool: &PgPool, table_id: i64) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    let table = lock(&mut tx, table_id)
        .await?
        .ok_or_else(|| AppError::table_not_found(table_id))?;
    check_delete(&table)?;

    sqlx::query("DELETE FROM tables WHERE table_id = $1")
        .bind(table_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!(table_id, "Table deleted");
    Ok(())
}

/// Seat a booked reservation at a free table with enough capacity
pub async fn seat(pool: &PgPool, table_id: i64, reservation_id: i64) -> ServiceResult<DiningTable> {
    let mut tx = pool.begin().await?;

    let table = lock(&mut tx, table_id)
        .await?
        .ok_or_else(|| AppError::table_not_found(table_id))?;
    let holder = lock_holder(&mut tx, reservation_id).await?;
    let reservation = reservations::lock(&mut tx, reservation_id)
        .await?
        .ok_or_else(|| AppError::reservation_not_found(reservation_id))?;
    check_seat(&table, &reservation, holder.as_ref())?;

    let row: DiningTable = sqlx::query_as(&format!(
        r#"
        UPDATE tables SET status = 'occupied', reservation_id = $1
        WHERE table_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(reservation_id)
    .bind(table_id)
    .fetch_one(&mut *tx)
    .await?;
    reservations::set_status(&mut tx, reservation_id, ReservationStatus::Seated).await?;

    tx.commit().await?;
    tracing::info!(table_id, reservation_id, "Reservation seated");
    Ok(row)
}

/// Finish the seated reservation and free the table
pub async fn unseat(pool: &PgPool, table_id: i64) -> ServiceResult<DiningTable> {
    let mut tx = pool.begin().await?;

    let table = lock(&mut tx, table_id)
        .await?
        .ok_or_else(|| AppError::table_not_found(table_id))?;
    let reservation_id = check_unseat(&table)?;
    reservations::lock(&mut tx, reservation_id).await?;

    reservations::set_status(&mut tx, reservation_id, ReservationStatus::Finished).await?;
    let row: DiningTable = sqlx::query_as(&format!(
        r#"
        UPDATE tables SET status = 'free', reservation_id = NULL
        WHERE table_id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(table_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(table_id, reservation_id, "Table freed");
    Ok(row)
}
