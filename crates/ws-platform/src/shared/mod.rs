//! Shared Infrastructure
//!
//! Error types, middleware, ID generation, and cross-cutting API helpers.

pub mod api_common;
pub mod error;
pub mod health_api;
pub mod indexes;
pub mod middleware;
pub mod tsid;
