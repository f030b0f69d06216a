//! Domain layer types and invariants.

pub mod error;
pub mod locale;
pub mod message_tree;
pub mod translations;
