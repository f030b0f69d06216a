//! Application services for the administrative surface.

pub mod translations;

pub use translations::AdminTranslationService;
