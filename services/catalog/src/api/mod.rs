//! Catalog HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules, the read cache middleware, and the shared
//! error and payload types.
pub mod cache;
pub mod cars;
pub mod error;
pub mod openapi;
pub mod system;
pub mod types;
