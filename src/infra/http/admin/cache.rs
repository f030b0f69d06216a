use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::domain::locale::Locale;
use crate::infra::http::error::ApiError;

use super::AdminState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CacheScope {
    locale: Option<String>,
}

/// An empty body means "every locale".
fn parse_scope(body: &Bytes) -> Result<CacheScope, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CacheScope::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        ApiError::bad_request("Invalid request body", Some(err.to_string()))
            .with_source("infra::http::admin::cache")
    })
}

pub(super) async fn clear_cache(State(state): State<AdminState>, body: Bytes) -> Response {
    let scope = match parse_scope(&body) {
        Ok(scope) => scope,
        Err(err) => return err.into_response(),
    };

    match scope.locale.as_deref() {
        Some(code) => match Locale::from_code(code.trim()) {
            Some(locale) => {
                state.resolver.invalidate(Some(locale));
                Json(json!({ "message": format!("Cache cleared for {locale}") })).into_response()
            }
            None => {
                debug!(
                    target = "infra::http::admin::clear_cache",
                    locale = code,
                    "Ignoring cache clear for unsupported locale"
                );
                Json(json!({ "message": format!("No cache held for {code}") })).into_response()
            }
        },
        None => {
            state.resolver.invalidate(None);
            Json(json!({ "message": "All cache cleared" })).into_response()
        }
    }
}

pub(super) async fn refresh(State(state): State<AdminState>, body: Bytes) -> Response {
    let scope = match parse_scope(&body) {
        Ok(scope) => scope,
        Err(err) => return err.into_response(),
    };

    match scope.locale.as_deref() {
        Some(code) => {
            let locale = Locale::normalize(code);
            let tree = state.resolver.force_refresh(code).await;
            Json(json!({
                "message": format!("Cache refreshed for {locale}"),
                "locale": locale,
                "messages": &*tree,
            }))
            .into_response()
        }
        None => {
            state.resolver.invalidate(None);
            Json(json!({ "message": "All cache cleared" })).into_response()
        }
    }
}
