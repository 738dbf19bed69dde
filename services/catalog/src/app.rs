//! Catalog HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! Only the two GET read endpoints sit behind the response cache; writes go
//! straight to the service, which invalidates the cache itself.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::cache::ResponseCache;
use crate::observability;
use crate::service::CatalogService;
use crate::store::CatalogStore;
use axum::Router;
use axum::routing::{get, put};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub service: CatalogService,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore + Send + Sync>, cache: Arc<ResponseCache>) -> Self {
        Self {
            service: CatalogService::new(store, cache),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    let cached_reads = Router::new()
        .route(
            "/api/cars",
            get(api::cars::list_cars).post(api::cars::create_car),
        )
        .route(
            "/api/cars/search",
            get(api::cars::search_cars)
                .put(api::cars::update_car_named_search)
                .delete(api::cars::delete_car_named_search),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            api::cache::cache_reads,
        ));

    Router::new()
        .route("/health", get(api::system::system_health))
        .route(
            "/api/cars/:id",
            put(api::cars::update_car).delete(api::cars::delete_car),
        )
        .merge(cached_reads)
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/api/openapi.json", ApiDoc::openapi()),
        )
        .layer(trace_layer)
        .with_state(state)
}
