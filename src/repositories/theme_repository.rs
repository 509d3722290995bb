use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::theme::{Theme, ThemeStatus};
use crate::repositories::RepositoryError;

/// Trait defining theme repository operations
#[async_trait]
pub trait ThemeRepository: Send + Sync {
    /// Create a new theme; the slug must be unused
    async fn create(&self, theme: Theme) -> Result<Theme, RepositoryError>;

    /// Find a theme by its slug
    async fn find_by_id(&self, id: &str) -> Result<Option<Theme>, RepositoryError>;

    /// All themes in the given status, soonest ending first
    async fn find_by_status(&self, status: ThemeStatus) -> Result<Vec<Theme>, RepositoryError>;

    /// Count one more entry against the theme
    async fn increment_entries(&self, id: &str) -> Result<(), RepositoryError>;
}

const THEME_COLUMNS: &str = "id, title, description, rules, budget, required_colors, rewards, \
     status, entries, end_date, image, created_at";

/// PostgreSQL implementation of ThemeRepository
pub struct PostgresThemeRepository {
    pool: PgPool,
}

impl PostgresThemeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThemeRepository for PostgresThemeRepository {
    async fn create(&self, theme: Theme) -> Result<Theme, RepositoryError> {
        let sql = format!(
            "INSERT INTO themes \
                (id, title, description, rules, budget, required_colors, rewards, \
                 status, entries, end_date, image, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {THEME_COLUMNS}"
        );

        sqlx::query_as::<_, Theme>(&sql)
            .bind(&theme.id)
            .bind(&theme.title)
            .bind(&theme.description)
            .bind(&theme.rules)
            .bind(theme.budget)
            .bind(&theme.required_colors)
            .bind(&theme.rewards)
            .bind(theme.status)
            .bind(theme.entries)
            .bind(theme.end_date)
            .bind(&theme.image)
            .bind(theme.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(e, "Theme with this id already exists"))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Theme>, RepositoryError> {
        let sql = format!("SELECT {THEME_COLUMNS} FROM themes WHERE id = $1");

        sqlx::query_as::<_, Theme>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find_by_status(&self, status: ThemeStatus) -> Result<Vec<Theme>, RepositoryError> {
        let sql = format!(
            "SELECT {THEME_COLUMNS} FROM themes WHERE status = $1 ORDER BY end_date ASC"
        );

        sqlx::query_as::<_, Theme>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn increment_entries(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE themes SET entries = entries + 1 WHERE id = $1")
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
