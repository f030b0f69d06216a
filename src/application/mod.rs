//! Application services: message resolution and translation administration.

pub mod admin;
pub mod error;
pub mod repos;
pub mod translations;
