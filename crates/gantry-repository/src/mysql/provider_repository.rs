//! MySQL provider repository implementation.

use crate::{traits::ProviderRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use gantry_core::{GantryError, GantryResult, PageWindow, Provider, ProviderId};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// MySQL provider repository implementation.
#[derive(Clone)]
pub struct MySqlProviderRepository {
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlProviderRepository {
    /// Creates a new MySQL provider repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a provider.
#[derive(Debug, FromRow)]
struct ProviderRow {
    id: String, // CHAR(36)
    short_name: String,
    long_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProviderRow> for Provider {
    type Error = GantryError;

    fn try_from(row: ProviderRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| GantryError::Internal(format!("Invalid UUID in database: {}", e)))?;

        Ok(Provider {
            id: ProviderId::from_uuid(id),
            short_name: row.short_name,
            long_name: row.long_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl ProviderRepository for MySqlProviderRepository {
    async fn create(&self, provider: &Provider) -> GantryResult<()> {
        debug!("Creating provider: {}", provider.short_name);

        sqlx::query(
            r#"
            INSERT INTO providers (id, short_name, long_name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(provider.id.to_string())
        .bind(&provider.short_name)
        .bind(&provider.long_name)
        .bind(provider.created_at)
        .bind(provider.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(())
    }

    async fn update(&self, provider: &Provider) -> GantryResult<bool> {
        debug!("Updating provider: {}", provider.id);

        let result = sqlx::query(
            r#"
            UPDATE providers
            SET short_name = ?, long_name = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&provider.short_name)
        .bind(&provider.long_name)
        .bind(provider.updated_at)
        .bind(provider.id.to_string())
        .execute(self.pool.inner())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: ProviderId) -> GantryResult<bool> {
        debug!("Soft-deleting provider: {}", id);

        let result = sqlx::query(
            r#"
            UPDATE providers
            SET deleted_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(Utc::now().trunc_subsecs(6))
        .bind(id.to_string())
        .execute(self.pool.inner())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: ProviderId) -> GantryResult<Option<Provider>> {
        debug!("Finding provider by id: {}", id);

        let row = sqlx::query_as::<_, ProviderRow>(
            r#"
            SELECT id, short_name, long_name, created_at, updated_at
            FROM providers
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Provider::try_from).transpose()
    }

    async fn find_by_short_name(&self, short_name: &str) -> GantryResult<Option<Provider>> {
        debug!("Finding provider by short name: {}", short_name);

        let row = sqlx::query_as::<_, ProviderRow>(
            r#"
            SELECT id, short_name, long_name, created_at, updated_at
            FROM providers
            WHERE short_name = ? AND deleted_at IS NULL
            "#,
        )
        .bind(short_name)
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Provider::try_from).transpose()
    }

    async fn list(&self, window: PageWindow) -> GantryResult<Vec<Provider>> {
        debug!("Listing providers: offset={}, limit={}", window.offset(), window.limit());

        let rows = sqlx::query_as::<_, ProviderRow>(
            r#"
            SELECT id, short_name, long_name, created_at, updated_at
            FROM providers
            WHERE deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(window.limit())
        .bind(window.offset())
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(Provider::try_from).collect()
    }

    async fn count(&self) -> GantryResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM providers WHERE deleted_at IS NULL")
            .fetch_one(self.pool.inner())
            .await?;

        Ok(count.unsigned_abs())
    }
}
