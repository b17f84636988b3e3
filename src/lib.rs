//! Uganda development-indicator dashboard backend.
//!
//! Aggregates health, education, economic, demographic, infrastructure and
//! environment statistics for Uganda from four public upstreams (WHO GHO,
//! World Bank, UNESCO UIS, REST Countries), normalizes their heterogeneous
//! payloads into one record shape, and serves dashboard-ready JSON over an
//! axum HTTP API.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Fetch-layer and endpoint-boundary error types
//! - [`indicator`]: Core data model (records, series, response envelope)
//! - [`domains`]: Dashboard topic areas and their indicator code tables
//! - [`normalize`]: Per-upstream payload normalization
//! - [`stats`]: Aggregate helpers (latest value, growth rate, formatting)
//! - [`sources`]: Upstream fetchers with concurrent fan-out
//! - [`api`]: HTTP API (handlers, router, shared state)
//! - [`metrics`]: Counter registration and helpers
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod domains;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod normalize;
pub mod sources;
pub mod stats;
pub mod utils;

pub use config::Config;
pub use error::{ApiError, Result, SourceError};
