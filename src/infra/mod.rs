//! Infrastructure adapters and runtime bootstrap.

pub mod bundles;
pub mod db;
pub mod error;
pub mod http;
pub mod telemetry;
