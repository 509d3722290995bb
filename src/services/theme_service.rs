use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::composer::{BudgetSummary, OutfitComposer};
use crate::models::theme::{CreateThemeRequest, Theme, ThemeFilters, ThemeStatus};
use crate::repositories::RepositoryError;
use crate::repositories::product_repository::ProductRepository;
use crate::repositories::theme_repository::ThemeRepository;

/// Theme service errors
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("Theme not found")]
    ThemeNotFound,

    #[error("Theme with this id already exists")]
    DuplicateId,

    #[error("Product {0} not found")]
    ProductNotFound(Uuid),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for ThemeError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ThemeError::ThemeNotFound,
            RepositoryError::ConstraintViolation(_) => ThemeError::DuplicateId,
            RepositoryError::DatabaseError(msg) => ThemeError::DatabaseError(msg),
        }
    }
}

/// Trait defining theme service operations
#[async_trait]
pub trait ThemeService: Send + Sync {
    /// List themes in the requested status (active when unspecified)
    async fn list_themes(&self, filters: ThemeFilters) -> Result<Vec<Theme>, ThemeError>;

    /// Get a single theme
    async fn get_theme(&self, id: &str) -> Result<Theme, ThemeError>;

    /// Create a new theme
    async fn create_theme(&self, request: CreateThemeRequest) -> Result<Theme, ThemeError>;

    /// Price a selection of catalog items against the theme budget
    async fn budget_check(
        &self,
        theme_id: &str,
        product_ids: &[Uuid],
    ) -> Result<BudgetSummary, ThemeError>;
}

/// Implementation of ThemeService
pub struct ThemeServiceImpl {
    theme_repository: Arc<dyn ThemeRepository>,
    product_repository: Arc<dyn ProductRepository>,
}

impl ThemeServiceImpl {
    pub fn new(
        theme_repository: Arc<dyn ThemeRepository>,
        product_repository: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            theme_repository,
            product_repository,
        }
    }
}

#[async_trait]
impl ThemeService for ThemeServiceImpl {
    async fn list_themes(&self, filters: ThemeFilters) -> Result<Vec<Theme>, ThemeError> {
        let status = filters.status.unwrap_or(ThemeStatus::Active);
        Ok(self.theme_repository.find_by_status(status).await?)
    }

    async fn get_theme(&self, id: &str) -> Result<Theme, ThemeError> {
        self.theme_repository
            .find_by_id(id)
            .await?
            .ok_or(ThemeError::ThemeNotFound)
    }

    async fn create_theme(&self, request: CreateThemeRequest) -> Result<Theme, ThemeError> {
        let theme = Theme {
            id: request.id,
            title: request.title,
            description: request.description,
            rules: request.rules,
            budget: request.budget,
            required_colors: request.required_colors,
            rewards: request.rewards,
            status: request.status.unwrap_or(ThemeStatus::Active),
            entries: 0,
            end_date: request.end_date,
            image: request.image,
            created_at: chrono::Utc::now(),
        };

        let theme = self.theme_repository.create(theme).await?;
        info!(theme_id = %theme.id, budget = theme.budget, "Created theme");
        Ok(theme)
    }

    async fn budget_check(
        &self,
        theme_id: &str,
        product_ids: &[Uuid],
    ) -> Result<BudgetSummary, ThemeError> {
        let theme = self.get_theme(theme_id).await?;
        let products = self
            .product_repository
            .find_by_ids(product_ids)
            .await
            .map_err(|e| ThemeError::DatabaseError(e.to_string()))?;

        let found: HashSet<Uuid> = products.iter().map(|p| p.id).collect();
        if let Some(missing) = product_ids.iter().find(|id| !found.contains(id)) {
            return Err(ThemeError::ProductNotFound(*missing));
        }

        let mut composer = OutfitComposer::for_theme(&theme);
        for product in &products {
            composer.add(product);
        }
        Ok(composer.summary(&theme))
    }
}
