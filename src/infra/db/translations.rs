use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        RepoError, TranslationQueryFilter, TranslationsRepo, TranslationsWriteRepo,
        UpdateTranslationParams, UpsertTranslationParams,
    },
    domain::{locale::Locale, translations::TranslationRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

const SELECT_COLUMNS: &str =
    "SELECT id, key, locale, value, namespace, created_at, updated_at FROM translations ";

#[derive(sqlx::FromRow)]
struct TranslationRow {
    id: Uuid,
    key: String,
    locale: String,
    value: String,
    namespace: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<TranslationRow> for TranslationRecord {
    type Error = RepoError;

    fn try_from(row: TranslationRow) -> Result<Self, Self::Error> {
        let locale = Locale::from_code(&row.locale).ok_or_else(|| RepoError::Integrity {
            message: format!(
                "translation `{}` has unsupported locale `{}`",
                row.id, row.locale
            ),
        })?;

        Ok(Self {
            id: row.id,
            key: row.key,
            locale,
            value: row.value,
            namespace: row.namespace,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_records(rows: Vec<TranslationRow>) -> Result<Vec<TranslationRecord>, RepoError> {
    rows.into_iter().map(TranslationRecord::try_from).collect()
}

#[async_trait]
impl TranslationsRepo for PostgresRepositories {
    async fn list_by_locale(&self, locale: Locale) -> Result<Vec<TranslationRecord>, RepoError> {
        let rows = sqlx::query_as::<_, TranslationRow>(&format!(
            "{SELECT_COLUMNS} WHERE locale = $1"
        ))
        .bind(locale.code())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        into_records(rows)
    }

    async fn list_translations(
        &self,
        filter: &TranslationQueryFilter,
    ) -> Result<Vec<TranslationRecord>, RepoError> {
        let mut qb = QueryBuilder::new(SELECT_COLUMNS);
        qb.push(" WHERE 1=1 ");

        if let Some(locale) = filter.locale {
            qb.push(" AND locale = ");
            qb.push_bind(locale.code());
        }

        if let Some(namespace) = filter.namespace.as_ref() {
            qb.push(" AND namespace = ");
            qb.push_bind(namespace.clone());
        }

        if let Some(search) = filter.search.as_ref().and_then(|value| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| escape_like(trimmed))
        }) {
            let pattern = format!("%{search}%");
            qb.push(" AND (key ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR value ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        qb.push(" ORDER BY locale ASC, key ASC");

        let rows = qb
            .build_query_as::<TranslationRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        into_records(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TranslationRecord>, RepoError> {
        let row = sqlx::query_as::<_, TranslationRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(TranslationRecord::try_from).transpose()
    }

    async fn ping(&self) -> Result<(), RepoError> {
        self.health_check().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl TranslationsWriteRepo for PostgresRepositories {
    async fn upsert_translation(
        &self,
        params: UpsertTranslationParams,
    ) -> Result<TranslationRecord, RepoError> {
        let row = sqlx::query_as::<_, TranslationRow>(
            "INSERT INTO translations (id, key, locale, value, namespace, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, now(), now()) \
             ON CONFLICT (key, locale) DO UPDATE \
             SET value = EXCLUDED.value, namespace = EXCLUDED.namespace, updated_at = now() \
             RETURNING id, key, locale, value, namespace, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&params.key)
        .bind(params.locale.code())
        .bind(&params.value)
        .bind(params.namespace.as_deref())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.try_into()
    }

    async fn update_translation(
        &self,
        params: UpdateTranslationParams,
    ) -> Result<TranslationRecord, RepoError> {
        let row = sqlx::query_as::<_, TranslationRow>(
            "UPDATE translations \
             SET key = $2, locale = $3, value = $4, namespace = $5, updated_at = now() \
             WHERE id = $1 \
             RETURNING id, key, locale, value, namespace, created_at, updated_at",
        )
        .bind(params.id)
        .bind(&params.key)
        .bind(params.locale.code())
        .bind(&params.value)
        .bind(params.namespace.as_deref())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        row.try_into()
    }

    async fn delete_translation(&self, id: Uuid) -> Result<TranslationRecord, RepoError> {
        let row = sqlx::query_as::<_, TranslationRow>(
            "DELETE FROM translations WHERE id = $1 \
             RETURNING id, key, locale, value, namespace, created_at, updated_at",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        row.try_into()
    }
}

/// Escape `LIKE` metacharacters so search input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
