//! Car rental catalog service library crate.
//!
//! # Purpose
//! Exposes the catalog HTTP API, the catalog service with its response cache,
//! configuration, and the storage implementation for use by the binary and
//! tests.
pub mod api;
pub mod app;
pub mod availability;
pub mod cache;
pub mod config;
pub mod model;
pub mod observability;
pub mod service;
pub mod store;
