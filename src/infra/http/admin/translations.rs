//! Translation CRUD handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::application::{
    admin::translations::{UpdateTranslationCommand, UpsertTranslationCommand},
    repos::TranslationQueryFilter,
};
use crate::domain::locale::Locale;
use crate::infra::http::error::{ApiError, translation_to_api};

use super::AdminState;

const ACTOR: &str = "admin";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TranslationListQuery {
    locale: Option<String>,
    namespace: Option<String>,
    search: Option<String>,
}

/// Missing fields arrive blank and fail validation with a JSON error body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TranslationUpsertRequest {
    key: String,
    locale: String,
    value: String,
    namespace: Option<String>,
}

impl From<TranslationUpsertRequest> for UpsertTranslationCommand {
    fn from(request: TranslationUpsertRequest) -> Self {
        Self {
            key: request.key,
            locale: request.locale,
            value: request.value,
            namespace: request.namespace,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TranslationUpdateRequest {
    key: Option<String>,
    locale: Option<String>,
    value: Option<String>,
    namespace: Option<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

pub(super) async fn list_translations(
    State(state): State<AdminState>,
    Query(query): Query<TranslationListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let locale = match blank_to_none(query.locale) {
        Some(code) => Some(code.parse::<Locale>().map_err(|err| {
            ApiError::bad_request("Unsupported locale", Some(err.to_string()))
        })?),
        None => None,
    };

    let filter = TranslationQueryFilter {
        locale,
        namespace: blank_to_none(query.namespace),
        search: blank_to_none(query.search),
    };

    let records = state
        .translations
        .list(&filter)
        .await
        .map_err(translation_to_api)?;

    Ok(Json(json!({ "data": records })))
}

pub(super) async fn get_translation(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .translations
        .find_by_id(id)
        .await
        .map_err(translation_to_api)?;

    match record {
        Some(record) => Ok(Json(json!({ "data": record }))),
        None => Err(ApiError::not_found("Translation not found")),
    }
}

pub(super) async fn create_translation(
    State(state): State<AdminState>,
    Json(payload): Json<TranslationUpsertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .translations
        .upsert(ACTOR, payload.into())
        .await
        .map_err(translation_to_api)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Translation saved successfully", "data": record })),
    ))
}

pub(super) async fn bulk_upsert_translations(
    State(state): State<AdminState>,
    Json(payload): Json<Vec<TranslationUpsertRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let commands = payload.into_iter().map(Into::into).collect();
    let records = state
        .translations
        .bulk_upsert(ACTOR, commands)
        .await
        .map_err(translation_to_api)?;

    Ok(Json(json!({
        "message": "Translations updated successfully",
        "data": records,
    })))
}

pub(super) async fn update_translation(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TranslationUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdateTranslationCommand {
        key: payload.key,
        locale: payload.locale,
        value: payload.value,
        namespace: payload.namespace,
    };

    let record = state
        .translations
        .update(ACTOR, id, command)
        .await
        .map_err(translation_to_api)?;

    Ok(Json(json!({
        "message": "Translation updated successfully",
        "data": record,
    })))
}

pub(super) async fn delete_translation(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .translations
        .delete(ACTOR, id)
        .await
        .map_err(translation_to_api)?;

    Ok(Json(json!({ "message": "Translation deleted successfully" })))
}
