//! HTTP API request/response types.
//!
//! # Purpose
//! Defines the response envelopes of the catalog REST API and the shapes used
//! for OpenAPI schema generation.
use crate::model::Car;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

/// Returned by create and update.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct CarResponse {
    pub message: String,
    pub car: Car,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SearchResponse {
    pub results: Vec<Car>,
}
