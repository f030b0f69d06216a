//! Translation resolution for multi-locale sites.
//!
//! Messages live in two places: JSON bundles shipped with the binary and a
//! Postgres table edited through the admin API. [`application::translations`]
//! merges the two per locale, with stored rows overriding bundle entries, and
//! keeps the result in a TTL cache until an edit invalidates it.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
