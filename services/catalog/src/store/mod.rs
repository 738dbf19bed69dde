//! Catalog storage abstraction.
//!
//! # Purpose
//! Defines the `CatalogStore` trait the service talks to, plus the error type
//! shared by backends. The only backend today is [`memory::InMemoryStore`].
use crate::model::Car;
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("version conflict: expected {expected}, stored {actual}")]
    VersionConflict { expected: u64, actual: u64 },
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All cars in insertion order.
    async fn list_cars(&self) -> StoreResult<Vec<Car>>;
    async fn get_car(&self, id: &str) -> StoreResult<Car>;
    /// Append a car; fails with `Conflict` if the id is taken.
    async fn insert_car(&self, car: Car) -> StoreResult<Car>;
    /// Replace a car in place if its stored version equals `expected_version`.
    ///
    /// The compare and the write are atomic with respect to other writers.
    async fn replace_car(&self, car: Car, expected_version: u64) -> StoreResult<Car>;
    async fn remove_car(&self, id: &str) -> StoreResult<Car>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
