//! Read-through response caching for catalog GET endpoints.
//!
//! # Purpose
//! Serves a previously rendered body for an identical GET request (same path
//! and raw query string) until it expires or a write invalidates it. Only
//! `200 OK` bodies are stored.
//!
//! # Notes
//! The body is cached as bytes, so a hit is byte-identical to the response
//! that populated it. Responses carry `x-cache: hit` or `x-cache: miss`.
use crate::api::error::api_internal_message;
use crate::app::AppState;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Cache key for a request: the path plus the raw query string, verbatim.
pub fn cache_key(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

fn cached_response(body: bytes::Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(X_CACHE, HeaderValue::from_static("hit"));
    response
}

pub(crate) async fn cache_reads(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let cache = state.service.cache().clone();
    let key = cache_key(request.uri());
    if let Some(body) = cache.get(&key).await {
        metrics::counter!("catalog_cache_hits_total").increment(1);
        tracing::debug!(%key, "cache hit");
        return cached_response(body);
    }
    metrics::counter!("catalog_cache_misses_total").increment(1);

    // Read before computing so a write that lands mid-request keeps its
    // invalidation effective.
    let generation = cache.generation();
    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(error = %err, %key, "failed to buffer response body");
            return api_internal_message("Internal server error").into_response();
        }
    };
    if !cache
        .set_if_current(key.clone(), bytes.clone(), cache.ttl(), generation)
        .await
    {
        tracing::debug!(%key, "catalog changed while rendering; not cached");
    }
    parts.headers.insert(X_CACHE, HeaderValue::from_static("miss"));
    Response::from_parts(parts, Body::from(bytes))
}
