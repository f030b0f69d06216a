//! Public listener: message trees for the rendering layer.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    application::{repos::TranslationsRepo, translations::TranslationResolver},
    domain::locale::Locale,
};

use super::{
    db_health_response,
    error::repo_to_api,
    middleware::{ResolvedLocale, log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub resolver: TranslationResolver,
    pub store: Arc<dyn TranslationsRepo>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/api/locales", get(supported_locales))
        .route("/api/messages/{locale}", get(resolved_messages))
        .route("/api/translations", get(store_messages))
        .route("/api/translations/refresh", get(refresh_messages))
        .route("/_health/db", get(public_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocaleQuery {
    locale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RefreshQuery {
    locale: Option<String>,
    force: Option<bool>,
}

#[derive(Debug, Serialize)]
struct LocaleEntry {
    code: &'static str,
    name: &'static str,
    default: bool,
}

/// The supported locale set, for language pickers.
async fn supported_locales() -> Response {
    let data: Vec<LocaleEntry> = Locale::ALL
        .iter()
        .map(|locale| LocaleEntry {
            code: locale.code(),
            name: locale.name(),
            default: locale.is_default(),
        })
        .collect();
    Json(json!({ "data": data })).into_response()
}

async fn resolved_messages(
    State(state): State<HttpState>,
    Path(locale): Path<String>,
) -> Response {
    let resolved = Locale::normalize(&locale);
    let tree = state.resolver.resolve_locale(resolved).await;
    let mut response = Json(json!({ "locale": resolved, "messages": &*tree })).into_response();
    ResolvedLocale(resolved).attach(&mut response);
    response
}

/// Store-only messages, without bundle fallback or caching.
async fn store_messages(
    State(state): State<HttpState>,
    Query(query): Query<LocaleQuery>,
) -> Response {
    let locale = Locale::normalize(query.locale.as_deref().unwrap_or_default());
    let mut response = match state.resolver.store_tree(locale).await {
        Ok(tree) => Json(json!({ "data": tree })).into_response(),
        Err(err) => repo_to_api(err)
            .with_source("infra::http::public::store_messages")
            .into_response(),
    };
    ResolvedLocale(locale).attach(&mut response);
    response
}

async fn refresh_messages(
    State(state): State<HttpState>,
    Query(query): Query<RefreshQuery>,
) -> Response {
    let requested = query.locale.as_deref().unwrap_or_default();
    let locale = Locale::normalize(requested);
    let tree = if query.force.unwrap_or(false) {
        state.resolver.force_refresh(requested).await
    } else {
        state.resolver.resolve_locale(locale).await
    };

    let mut response = Json(json!({ "locale": locale, "data": &*tree })).into_response();
    ResolvedLocale(locale).attach(&mut response);
    response
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.store.ping().await)
}
