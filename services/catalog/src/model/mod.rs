//! Catalog data model module.
//!
//! # Purpose
//! Re-exports the car record, inbound payload, and search criteria types used
//! by the service, store, and API layers.
mod car;
mod search;

pub use car::{Car, CarFields, CarPayload, InvalidCar, Numeric};
pub use search::{InvalidQuery, SEARCH_PARAMS, SearchCriteria};
