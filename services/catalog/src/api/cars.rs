//! Car catalog API handlers.
//!
//! # Purpose
//! Implements listing, create, update, delete, and search endpoints on top of
//! [`CatalogService`](crate::service::CatalogService), translating service
//! errors into HTTP responses.
use crate::api::error::{
    ApiError, INVALID_CAR_MESSAGE, INVALID_QUERY_MESSAGE, api_invalid_query, api_validation_error,
};
use crate::api::types::{CarResponse, MessageResponse, SearchResponse};
use crate::app::AppState;
use crate::model::{Car, CarPayload};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::collections::HashMap;

// A body that is not JSON of the expected shape is invalid car data too.
fn payload_or_invalid(
    body: Result<Json<CarPayload>, JsonRejection>,
) -> Result<CarPayload, ApiError> {
    body.map(|Json(payload)| payload).map_err(|rejection| {
        tracing::debug!(error = %rejection, "unreadable car payload");
        api_validation_error(INVALID_CAR_MESSAGE)
    })
}

#[utoipa::path(
    get,
    path = "/api/cars",
    tag = "cars",
    responses(
        (status = 200, description = "Every car in the catalog", body = [Car])
    )
)]
pub(crate) async fn list_cars(State(state): State<AppState>) -> Result<Json<Vec<Car>>, ApiError> {
    Ok(Json(state.service.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/cars",
    tag = "cars",
    request_body = CarPayload,
    responses(
        (status = 201, description = "Car added to the catalog", body = CarResponse),
        (status = 400, description = "Invalid car data", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Car id already in use", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_car(
    State(state): State<AppState>,
    body: Result<Json<CarPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload_or_invalid(body)?;
    let car = state.service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CarResponse {
            message: "Car added to the catalog".to_string(),
            car,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/cars/{id}",
    tag = "cars",
    params(
        ("id" = String, Path, description = "Car identifier")
    ),
    responses(
        (status = 200, description = "Car removed from the catalog", body = MessageResponse),
        (status = 404, description = "Car not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_car(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.service.remove(&id).await?;
    Ok(Json(MessageResponse {
        message: "Car removed from the catalog".to_string(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/cars/{id}",
    tag = "cars",
    params(
        ("id" = String, Path, description = "Car identifier")
    ),
    request_body = CarPayload,
    responses(
        (status = 200, description = "Car listing updated", body = CarResponse),
        (status = 400, description = "Invalid car data", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Car not found", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Version does not match the stored car", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_car(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<CarPayload>, JsonRejection>,
) -> Result<Json<CarResponse>, ApiError> {
    let payload = payload_or_invalid(body)?;
    let car = state.service.update(&id, payload).await?;
    Ok(Json(CarResponse {
        message: "Car listing updated".to_string(),
        car,
    }))
}

/// `/api/cars/search` shadows `/api/cars/:id`, so writes to it address the
/// car whose id is literally `search`.
const SEARCH_SEGMENT: &str = "search";

pub(crate) async fn update_car_named_search(
    state: State<AppState>,
    body: Result<Json<CarPayload>, JsonRejection>,
) -> Result<Json<CarResponse>, ApiError> {
    update_car(Path(SEARCH_SEGMENT.to_string()), state, body).await
}

pub(crate) async fn delete_car_named_search(
    state: State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    delete_car(Path(SEARCH_SEGMENT.to_string()), state).await
}

#[utoipa::path(
    get,
    path = "/api/cars/search",
    tag = "cars",
    params(
        ("startDate" = Option<String>, Query, description = "First day of the rental (YYYY-MM-DD)"),
        ("endDate" = Option<String>, Query, description = "Last day of the rental (YYYY-MM-DD)"),
        ("location" = Option<String>, Query, description = "Pick-up location"),
        ("ageGroup" = Option<u32>, Query, description = "Driver age"),
        ("carGroup" = Option<String>, Query, description = "Car category")
    ),
    responses(
        (status = 200, description = "Cars matching every given filter", body = SearchResponse),
        (status = 400, description = "Unknown or malformed query parameter", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn search_cars(
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = query.map_err(|rejection| {
        tracing::debug!(error = %rejection, "unreadable search query");
        api_invalid_query(INVALID_QUERY_MESSAGE)
    })?;
    let results = state.service.search_query(&params).await?;
    Ok(Json(SearchResponse { results }))
}
