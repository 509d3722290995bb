use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::outfit::{Outfit, OutfitFilters, OutfitStatus};
use crate::repositories::RepositoryError;

/// Trait defining outfit repository operations
#[async_trait]
pub trait OutfitRepository: Send + Sync {
    /// Create a new outfit
    async fn create(&self, outfit: Outfit) -> Result<Outfit, RepositoryError>;

    /// Replace an outfit whose stored status is still `expected`.
    ///
    /// Returns `None` when no such outfit exists, either because it is gone
    /// or because its status moved on since it was read.
    async fn update(
        &self,
        outfit: Outfit,
        expected: OutfitStatus,
    ) -> Result<Option<Outfit>, RepositoryError>;

    /// Find an outfit by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Outfit>, RepositoryError>;

    /// Outfits matching all given filters, newest first
    async fn find(&self, filters: &OutfitFilters) -> Result<Vec<Outfit>, RepositoryError>;

    /// Outfits in voting or completed, most voted first
    async fn leaderboard(
        &self,
        theme_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Outfit>, RepositoryError>;

    /// Delete an outfit by ID
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

const OUTFIT_COLUMNS: &str = "id, user_id, theme_id, title, description, product_ids, \
     moodboard_images, votes, status, created_at, updated_at";

/// PostgreSQL implementation of OutfitRepository
pub struct PostgresOutfitRepository {
    pool: PgPool,
}

impl PostgresOutfitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutfitRepository for PostgresOutfitRepository {
    async fn create(&self, outfit: Outfit) -> Result<Outfit, RepositoryError> {
        let sql = format!(
            "INSERT INTO outfits \
                (id, user_id, theme_id, title, description, product_ids, \
                 moodboard_images, votes, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {OUTFIT_COLUMNS}"
        );

        sqlx::query_as::<_, Outfit>(&sql)
            .bind(outfit.id)
            .bind(outfit.user_id)
            .bind(&outfit.theme_id)
            .bind(&outfit.title)
            .bind(&outfit.description)
            .bind(&outfit.product_ids)
            .bind(&outfit.moodboard_images)
            .bind(outfit.votes)
            .bind(outfit.status)
            .bind(outfit.created_at)
            .bind(outfit.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(e, "Outfit already exists"))
    }

    async fn update(
        &self,
        outfit: Outfit,
        expected: OutfitStatus,
    ) -> Result<Option<Outfit>, RepositoryError> {
        let sql = format!(
            "UPDATE outfits SET \
                title = $2, description = $3, product_ids = $4, \
                moodboard_images = $5, status = $6, updated_at = $7 \
             WHERE id = $1 AND status = $8 \
             RETURNING {OUTFIT_COLUMNS}"
        );

        sqlx::query_as::<_, Outfit>(&sql)
            .bind(outfit.id)
            .bind(&outfit.title)
            .bind(&outfit.description)
            .bind(&outfit.product_ids)
            .bind(&outfit.moodboard_images)
            .bind(outfit.status)
            .bind(outfit.updated_at)
            .bind(expected)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Outfit>, RepositoryError> {
        let sql = format!("SELECT {OUTFIT_COLUMNS} FROM outfits WHERE id = $1");

        sqlx::query_as::<_, Outfit>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find(&self, filters: &OutfitFilters) -> Result<Vec<Outfit>, RepositoryError> {
        let sql = format!(
            "SELECT {OUTFIT_COLUMNS} FROM outfits \
             WHERE ($1::uuid IS NULL OR user_id = $1) \
               AND ($2::varchar IS NULL OR status = $2) \
               AND ($3::varchar IS NULL OR theme_id = $3) \
             ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, Outfit>(&sql)
            .bind(filters.user_id)
            .bind(filters.status.map(|s| s.as_str()))
            .bind(filters.theme_id.as_deref())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn leaderboard(
        &self,
        theme_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Outfit>, RepositoryError> {
        let sql = format!(
            "SELECT {OUTFIT_COLUMNS} FROM outfits \
             WHERE status IN ('voting', 'completed') \
               AND ($1::varchar IS NULL OR theme_id = $1) \
             ORDER BY votes DESC, created_at ASC \
             LIMIT $2"
        );

        sqlx::query_as::<_, Outfit>(&sql)
            .bind(theme_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM outfits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
