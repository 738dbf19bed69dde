//! Health API handler.
//!
//! # Purpose and responsibility
//! Lightweight readiness endpoint for probes and operators.
//!
//! # Key invariants and assumptions
//! - Health checks must be fast and side-effect free.
use crate::api::error::{ApiError, api_internal_message};
use crate::api::types::HealthStatus;
use crate::app::AppState;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Catalog health", body = HealthStatus),
        (status = 500, description = "Store unavailable", body = crate::api::types::ErrorResponse)
    )
)]
/// Return catalog health status.
///
/// # Errors
/// - Returns 500 if the store health check fails.
pub(crate) async fn system_health(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, ApiError> {
    let store = state.service.store();
    if let Err(err) = store.health_check().await {
        tracing::error!(error = ?err, backend = store.backend_name(), "store health check failed");
        return Err(api_internal_message("storage unavailable"));
    }
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
    }))
}
