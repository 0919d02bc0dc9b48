//! Dining table endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use shared::ApiResponse;
use shared::error::AppError;
use shared::models::DiningTable;

use super::{ApiResult, ok, parse_id};
use crate::db::tables;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::validation::{self, DataBody};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tables", get(list).post(create))
        .route(
            "/tables/{table_id}",
            get(read).put(update).delete(delete),
        )
        .route("/tables/{table_id}/seat", put(seat).delete(unseat))
}

fn table_id(raw: &str) -> Result<i64, AppError> {
    parse_id(raw, |raw| AppError::table_not_found(raw))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<DiningTable>> {
    ok(tables::list(&state.pool).await?)
}

pub async fn create(
    State(state): State<AppState>,
    DataBody(data): DataBody,
) -> Result<(StatusCode, Json<ApiResponse<DiningTable>>), ServiceError> {
    let fields = validation::new_table(&data)?;
    let table = tables::create(&state.pool, &fields).await?;
    tracing::info!(table_id = table.table_id, name = %table.table_name, "Table created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(table))))
}

pub async fn read(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<DiningTable> {
    let id = table_id(&raw_id)?;
    let table = tables::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::table_not_found(id))?;
    ok(table)
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    DataBody(data): DataBody,
) -> ApiResult<DiningTable> {
    let id = table_id(&raw_id)?;
    let fields = validation::table_update(&data)?;
    ok(tables::update(&state.pool, id, &fields).await?)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    let id = table_id(&raw_id)?;
    tables::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Table lookup comes before the payload so an unknown table is always a 404
pub async fn seat(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    DataBody(data): DataBody,
) -> ApiResult<DiningTable> {
    let id = table_id(&raw_id)?;
    tables::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::table_not_found(id))?;

    let request = validation::seat_request(&data)?;
    ok(tables::seat(&state.pool, id, request.reservation_id).await?)
}

/// Finish the seated reservation; responds with the freed table
pub async fn unseat(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<DiningTable> {
    let id = table_id(&raw_id)?;
    ok(tables::unseat(&state.pool, id).await?)
}
