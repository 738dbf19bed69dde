//! In-memory implementation of the catalog store.
//!
//! # Purpose
//! This store implements the `CatalogStore` trait with a single `Vec<Car>` guarded by
//! `tokio::sync::RwLock`. It is the catalog's only backend.
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: reads take the read lock, mutations take the write lock.
//!   Version checks on replace happen under the same write lock as the replacement, so two
//!   writers holding the same version cannot both succeed.
//! - **Ordering**: the vector preserves insertion order; replace keeps a record's position.
//!
//! # Performance characteristics
//! - Lookups by id are linear scans. That is fine for catalog sizes this service targets; an
//!   indexed map that preserves insertion order would be the next step.
//!
//! # Metrics
//! Publishes `catalog_cars_total` after every mutation.
use super::{CatalogStore, StoreError, StoreResult};
use crate::model::Car;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory catalog store.
///
/// Cloning shares the underlying vector, so handlers and tests can hold the same store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    /// Authoritative car records in insertion order.
    cars: Arc<RwLock<Vec<Car>>>,
}

fn position(cars: &[Car], id: &str) -> Option<usize> {
    cars.iter().position(|car| car.id == id)
}

fn publish_size(cars: &[Car]) {
    metrics::gauge!("catalog_cars_total").set(cars.len() as f64);
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn list_cars(&self) -> StoreResult<Vec<Car>> {
        Ok(self.cars.read().await.clone())
    }

    async fn get_car(&self, id: &str) -> StoreResult<Car> {
        let cars = self.cars.read().await;
        position(&cars, id)
            .map(|index| cars[index].clone())
            .ok_or_else(|| StoreError::NotFound(format!("car {id}")))
    }

    async fn insert_car(&self, car: Car) -> StoreResult<Car> {
        let mut cars = self.cars.write().await;
        if position(&cars, &car.id).is_some() {
            return Err(StoreError::Conflict(format!("car {} exists", car.id)));
        }
        cars.push(car.clone());
        publish_size(&cars);
        Ok(car)
    }

    async fn replace_car(&self, car: Car, expected_version: u64) -> StoreResult<Car> {
        let mut cars = self.cars.write().await;
        let index = position(&cars, &car.id)
            .ok_or_else(|| StoreError::NotFound(format!("car {}", car.id)))?;
        let actual = cars[index].version;
        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                actual,
            });
        }
        cars[index] = car.clone();
        Ok(car)
    }

    async fn remove_car(&self, id: &str) -> StoreResult<Car> {
        let mut cars = self.cars.write().await;
        let index = position(&cars, id).ok_or_else(|| StoreError::NotFound(format!("car {id}")))?;
        let removed = cars.remove(index);
        publish_size(&cars);
        Ok(removed)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
