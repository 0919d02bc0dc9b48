//! API routes for restaurant-server

pub mod health;
pub mod reservations;
pub mod tables;

use axum::{Json, Router};
use http::{HeaderName, HeaderValue};
use shared::ApiResponse;
use shared::error::{AppError, AppResult};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ServiceError>;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Random v4 request ids
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// All routes, no middleware
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(reservations::router())
        .merge(tables::router())
}

/// Routes with middleware and state, ready to serve
pub fn create_router(state: AppState) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        // Outermost: the id must exist before anything inside reads it
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}

/// Path ids that are not positive integers can never match a row
fn parse_id(raw: &str, not_found: impl FnOnce(&str) -> AppError) -> AppResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| not_found(raw))
}

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}
