#![allow(dead_code)]

use catalog::app::{AppState, build_router};
use catalog::cache::{DEFAULT_TTL, InvalidationPolicy, ResponseCache};
use catalog::store::memory::InMemoryStore;
use std::sync::Arc;

pub type TestApp = axum::routing::RouterIntoService<axum::body::Body, ()>;

pub fn app() -> TestApp {
    app_with_policy(InvalidationPolicy::All)
}

pub fn app_with_policy(policy: InvalidationPolicy) -> TestApp {
    app_with_cache(Arc::new(ResponseCache::new(DEFAULT_TTL, policy)))
}

pub fn app_with_cache(cache: Arc<ResponseCache>) -> TestApp {
    let state = AppState::new(Arc::new(InMemoryStore::new()), cache);
    build_router(state).into_service()
}

pub async fn read_bytes(response: axum::response::Response) -> bytes::Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&read_bytes(response).await).expect("json")
}

/// A complete, valid car body.
pub fn car_body(id: &str, dates: &[&str], locations: &[&str], min_age: u32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "description": "New Toyota Corolla!",
        "make": "Toyota",
        "model": "Corolla",
        "year": 2023,
        "price": 350,
        "carGroup": "C",
        "minimumDriverAge": min_age,
        "availableDates": dates,
        "availableLocations": locations,
        "availableExtras": ["GPS", "Baby seat"],
        "discounts": "10% off for rentals over 7 days"
    })
}

/// Car A: Oct 15-19 in Tel-Aviv and Jerusalem, drivers 21+.
pub fn car_a() -> serde_json::Value {
    car_body(
        "A",
        &[
            "2024-10-15",
            "2024-10-16",
            "2024-10-17",
            "2024-10-18",
            "2024-10-19",
        ],
        &["Tel-Aviv", "Jerusalem"],
        21,
    )
}

/// Car B: Oct 17-20, 28 and 29 in Tel-Aviv, drivers 25+.
pub fn car_b() -> serde_json::Value {
    car_body(
        "B",
        &[
            "2024-10-17",
            "2024-10-18",
            "2024-10-19",
            "2024-10-20",
            "2024-10-28",
            "2024-10-29",
        ],
        &["Tel-Aviv"],
        25,
    )
}
