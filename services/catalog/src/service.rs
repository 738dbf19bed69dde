//! Catalog service: create/read/update/delete/search over the store.
//!
//! # Purpose
//! Owns the rules that sit between HTTP handlers and storage: payload
//! validation, id assignment, optimistic version checks, search filtering,
//! and cache invalidation after writes.
//!
//! # Key invariants
//! - Validation and lookups run before any store mutation, so a failed call
//!   leaves the catalog untouched.
//! - A successful update produces exactly `stored.version + 1`.
//! - The cache is invalidated after every successful write and only then.
use crate::cache::ResponseCache;
use crate::model::{Car, CarPayload, InvalidQuery, SearchCriteria};
use crate::store::{CatalogStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid car data: {0}")]
    Validation(String),
    #[error("car not found: {0}")]
    NotFound(String),
    #[error("version conflict on car {id}: sent {sent:?}, stored {stored}")]
    ConcurrencyConflict {
        id: String,
        sent: Option<u64>,
        stored: u64,
    },
    #[error("car already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid query parameters: {0}")]
    InvalidQuery(#[from] InvalidQuery),
    #[error("storage failure: {0}")]
    Internal(#[source] StoreError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore + Send + Sync>,
    cache: Arc<ResponseCache>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore + Send + Sync>, cache: Arc<ResponseCache>) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore + Send + Sync> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub async fn list(&self) -> CatalogResult<Vec<Car>> {
        self.store.list_cars().await.map_err(CatalogError::Internal)
    }

    pub async fn create(&self, payload: CarPayload) -> CatalogResult<Car> {
        let fields = payload
            .validate()
            .map_err(|err| CatalogError::Validation(err.to_string()))?;
        let id = payload
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let car = match self.store.insert_car(Car::new(id.clone(), fields)).await {
            Ok(car) => car,
            Err(StoreError::Conflict(_)) => return Err(CatalogError::AlreadyExists(id)),
            Err(err) => return Err(CatalogError::Internal(err)),
        };
        self.cache.invalidate_for_write().await;
        tracing::info!(car_id = %car.id, "car added to catalog");
        Ok(car)
    }

    pub async fn remove(&self, id: &str) -> CatalogResult<Car> {
        let removed = self.store.remove_car(id).await.map_err(|err| match err {
            StoreError::NotFound(_) => CatalogError::NotFound(id.to_string()),
            other => CatalogError::Internal(other),
        })?;
        self.cache.invalidate_for_write().await;
        tracing::info!(car_id = %id, "car removed from catalog");
        Ok(removed)
    }

    pub async fn update(&self, id: &str, payload: CarPayload) -> CatalogResult<Car> {
        let fields = payload
            .validate()
            .map_err(|err| CatalogError::Validation(err.to_string()))?;
        let existing = self.store.get_car(id).await.map_err(|err| match err {
            StoreError::NotFound(_) => CatalogError::NotFound(id.to_string()),
            other => CatalogError::Internal(other),
        })?;
        let sent = payload.sent_version();
        if sent != Some(existing.version) {
            return Err(CatalogError::ConcurrencyConflict {
                id: id.to_string(),
                sent,
                stored: existing.version,
            });
        }

        let updated = existing.merged(fields);
        // The store re-checks the version under its write lock; a concurrent
        // writer that got there first surfaces here as a conflict.
        let updated = match self.store.replace_car(updated, existing.version).await {
            Ok(car) => car,
            Err(StoreError::VersionConflict { actual, .. }) => {
                return Err(CatalogError::ConcurrencyConflict {
                    id: id.to_string(),
                    sent,
                    stored: actual,
                });
            }
            Err(StoreError::NotFound(_)) => return Err(CatalogError::NotFound(id.to_string())),
            Err(err) => return Err(CatalogError::Internal(err)),
        };
        self.cache.invalidate_for_write().await;
        tracing::info!(car_id = %id, version = updated.version, "car listing updated");
        Ok(updated)
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> CatalogResult<Vec<Car>> {
        let cars = self.list().await?;
        let results: Vec<Car> = cars.into_iter().filter(|car| criteria.matches(car)).collect();
        tracing::debug!(results = results.len(), "catalog search");
        Ok(results)
    }

    /// Parse raw query parameters and run the search.
    pub async fn search_query(&self, params: &HashMap<String, String>) -> CatalogResult<Vec<Car>> {
        let criteria = SearchCriteria::from_query(params)?;
        self.search(&criteria).await
    }

    /// Create every payload in order, stopping at the first failure.
    ///
    /// Returns the number of cars added.
    pub async fn seed(&self, payloads: Vec<CarPayload>) -> CatalogResult<usize> {
        let mut added = 0;
        for payload in payloads {
            self.create(payload).await?;
            added += 1;
        }
        Ok(added)
    }
}
