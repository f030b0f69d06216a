mod auth;
mod cache;
mod health;
mod state;
mod translations;

pub use auth::AdminAuth;
pub use state::AdminState;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::middleware::{log_responses, set_request_context};

pub fn build_admin_router(state: AdminState) -> Router {
    let auth = state.auth.clone();
    Router::new()
        .route(
            "/translations",
            get(translations::list_translations).post(translations::create_translation),
        )
        .route(
            "/translations/bulk",
            post(translations::bulk_upsert_translations),
        )
        .route("/translations/clear-cache", post(cache::clear_cache))
        .route("/translations/refresh", post(cache::refresh))
        .route(
            "/translations/{id}",
            get(translations::get_translation)
                .put(translations::update_translation)
                .delete(translations::delete_translation),
        )
        .route("/_health/db", get(health::admin_health))
        .with_state(state)
        .layer(middleware::from_fn_with_state(auth, auth::require_admin))
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}
