//! Lingora message cache
//!
//! Keeps one resolved message tree per locale so page renders do not hit the
//! translation store on every request.
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `lingora.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 300
//! ```
//!
//! Entries are replaced wholesale on resolution and dropped by explicit
//! invalidation after admin writes. There is no cross-process coordination.

mod config;
mod store;

pub use config::CacheConfig;
pub use store::MessageCache;
