use std::error::Error as StdError;

use axum::{http::StatusCode, response::Response};
use thiserror::Error;

use crate::{
    application::admin::translations::AdminTranslationError, domain::error::DomainError,
    infra::error::InfraError,
};

/// Diagnostic detail carried in response extensions for the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Top-level failure of a CLI command.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("resource not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

impl From<AdminTranslationError> for AppError {
    fn from(err: AdminTranslationError) -> Self {
        match err {
            AdminTranslationError::ConstraintViolation(message) => Self::Validation(message),
            AdminTranslationError::NotFound => Self::NotFound,
            AdminTranslationError::Repo(repo) => Self::Infra(InfraError::database(repo.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::RepoError;

    #[test]
    fn report_collects_source_chain() {
        let error = AppError::from(InfraError::from(std::io::Error::other("disk full")));
        let report = ErrorReport::from_error("cli", StatusCode::INTERNAL_SERVER_ERROR, &error);

        assert_eq!(report.messages.first().map(String::as_str), Some("io error: disk full"));
        assert!(report.messages.len() >= 2);
    }

    #[test]
    fn admin_errors_map_onto_cli_errors() {
        assert!(matches!(
            AppError::from(AdminTranslationError::ConstraintViolation("bad key".into())),
            AppError::Validation(message) if message == "bad key"
        ));
        assert!(matches!(
            AppError::from(AdminTranslationError::NotFound),
            AppError::NotFound
        ));
        assert!(matches!(
            AppError::from(AdminTranslationError::Repo(RepoError::Timeout)),
            AppError::Infra(InfraError::Database { .. })
        ));
    }
}
