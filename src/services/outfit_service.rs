use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::composer::{OutfitComposer, SubmissionError};
use crate::models::outfit::{
    CreateOutfitRequest, Creator, LeaderboardQuery, Outfit, OutfitDetail, OutfitFilters,
    OutfitStatus, UpdateOutfitRequest,
};
use crate::models::product::Product;
use crate::models::theme::Theme;
use crate::repositories::RepositoryError;
use crate::repositories::outfit_repository::OutfitRepository;
use crate::repositories::product_repository::ProductRepository;
use crate::repositories::theme_repository::ThemeRepository;
use crate::repositories::user_repository::UserRepository;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

/// Outfit service errors
#[derive(Debug, thiserror::Error)]
pub enum OutfitError {
    #[error("Outfit not found")]
    OutfitNotFound,

    #[error("Theme not found")]
    ThemeNotFound,

    #[error("Product {0} not found")]
    ProductNotFound(Uuid),

    #[error("Outfit belongs to another user")]
    Forbidden,

    #[error("Cannot move outfit from {} to {}", .from.as_str(), .to.as_str())]
    InvalidTransition { from: OutfitStatus, to: OutfitStatus },

    #[error("Outfit can no longer be edited once {}", .0.as_str())]
    NotEditable(OutfitStatus),

    #[error("Outfit status changed while the update was in flight")]
    StatusChanged,

    #[error(transparent)]
    SubmissionRejected(#[from] SubmissionError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for OutfitError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => OutfitError::OutfitNotFound,
            RepositoryError::ConstraintViolation(msg) | RepositoryError::DatabaseError(msg) => {
                OutfitError::DatabaseError(msg)
            }
        }
    }
}

/// Trait defining outfit service operations
#[async_trait]
pub trait OutfitService: Send + Sync {
    /// Create an outfit owned by `user_id`
    async fn create_outfit(
        &self,
        user_id: Uuid,
        request: CreateOutfitRequest,
    ) -> Result<Outfit, OutfitError>;

    /// Get a single outfit with its items and creator
    async fn get_outfit(&self, id: Uuid) -> Result<OutfitDetail, OutfitError>;

    /// Outfits matching the filters, newest first
    async fn list_outfits(&self, filters: OutfitFilters)
    -> Result<Vec<OutfitDetail>, OutfitError>;

    /// Most voted outfits in voting or completed
    async fn leaderboard(
        &self,
        query: LeaderboardQuery,
    ) -> Result<Vec<OutfitDetail>, OutfitError>;

    /// Edit an outfit and/or advance its status
    async fn update_outfit(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateOutfitRequest,
    ) -> Result<Outfit, OutfitError>;

    /// Delete an outfit owned by `user_id`
    async fn delete_outfit(&self, user_id: Uuid, id: Uuid) -> Result<(), OutfitError>;
}

/// Fills outfits in with their catalog items and creator
#[derive(Clone)]
pub struct OutfitDetailLoader {
    product_repository: Arc<dyn ProductRepository>,
    user_repository: Arc<dyn UserRepository>,
}

impl OutfitDetailLoader {
    pub fn new(
        product_repository: Arc<dyn ProductRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            product_repository,
            user_repository,
        }
    }

    /// Expands outfits in order, fetching each item and creator once
    pub async fn load(&self, outfits: Vec<Outfit>) -> Result<Vec<OutfitDetail>, RepositoryError> {
        let product_ids = unique_ids(
            outfits
                .iter()
                .flat_map(|o| o.product_ids.iter().copied())
                .collect(),
        );
        let products: HashMap<Uuid, Product> = self
            .product_repository
            .find_by_ids(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut creators: HashMap<Uuid, Option<Creator>> = HashMap::new();
        let mut details = Vec::with_capacity(outfits.len());
        for outfit in outfits {
            if !creators.contains_key(&outfit.user_id) {
                let creator = self
                    .user_repository
                    .find_by_id(outfit.user_id)
                    .await?
                    .map(Creator::from);
                creators.insert(outfit.user_id, creator);
            }

            let items = outfit
                .product_ids
                .iter()
                .filter_map(|id| products.get(id).cloned())
                .collect();
            let creator = creators.get(&outfit.user_id).cloned().flatten();
            details.push(OutfitDetail {
                outfit,
                products: items,
                creator,
            });
        }
        Ok(details)
    }

    pub async fn load_one(&self, outfit: Outfit) -> Result<OutfitDetail, RepositoryError> {
        self.load(vec![outfit])
            .await?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }
}

/// Implementation of OutfitService
pub struct OutfitServiceImpl {
    outfit_repository: Arc<dyn OutfitRepository>,
    theme_repository: Arc<dyn ThemeRepository>,
    product_repository: Arc<dyn ProductRepository>,
    user_repository: Arc<dyn UserRepository>,
    details: OutfitDetailLoader,
}

impl OutfitServiceImpl {
    pub fn new(
        outfit_repository: Arc<dyn OutfitRepository>,
        theme_repository: Arc<dyn ThemeRepository>,
        product_repository: Arc<dyn ProductRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        let details = OutfitDetailLoader::new(product_repository.clone(), user_repository.clone());
        Self {
            outfit_repository,
            theme_repository,
            product_repository,
            user_repository,
            details,
        }
    }

    async fn find_outfit(&self, id: Uuid) -> Result<Outfit, OutfitError> {
        self.outfit_repository
            .find_by_id(id)
            .await?
            .ok_or(OutfitError::OutfitNotFound)
    }

    async fn find_theme(&self, id: &str) -> Result<Theme, OutfitError> {
        self.theme_repository
            .find_by_id(id)
            .await
            .map_err(|e| OutfitError::DatabaseError(e.to_string()))?
            .ok_or(OutfitError::ThemeNotFound)
    }

    async fn find_owned(&self, user_id: Uuid, id: Uuid) -> Result<Outfit, OutfitError> {
        let outfit = self.find_outfit(id).await?;
        if outfit.user_id != user_id {
            debug!(%user_id, outfit_id = %id, "Rejected access to foreign outfit");
            return Err(OutfitError::Forbidden);
        }
        Ok(outfit)
    }

    /// Loads the referenced items into a composer for `theme`
    async fn compose(
        &self,
        theme: &Theme,
        product_ids: &[Uuid],
    ) -> Result<OutfitComposer, OutfitError> {
        let products = self
            .product_repository
            .find_by_ids(product_ids)
            .await
            .map_err(|e| OutfitError::DatabaseError(e.to_string()))?;

        let found: HashSet<Uuid> = products.iter().map(|p| p.id).collect();
        if let Some(missing) = product_ids.iter().find(|id| !found.contains(id)) {
            return Err(OutfitError::ProductNotFound(*missing));
        }

        let mut composer = OutfitComposer::for_theme(theme);
        for product in &products {
            composer.add(product);
        }
        Ok(composer)
    }

    async fn record_entry(&self, theme_id: &str) -> Result<(), OutfitError> {
        self.theme_repository
            .increment_entries(theme_id)
            .await
            .map_err(|e| OutfitError::DatabaseError(e.to_string()))
    }
}

/// Removes repeated ids, keeping the first occurrence
fn unique_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[async_trait]
impl OutfitService for OutfitServiceImpl {
    async fn create_outfit(
        &self,
        user_id: Uuid,
        request: CreateOutfitRequest,
    ) -> Result<Outfit, OutfitError> {
        let status = request.status.unwrap_or(OutfitStatus::Draft);
        if status > OutfitStatus::Submitted {
            return Err(OutfitError::InvalidTransition {
                from: OutfitStatus::Draft,
                to: status,
            });
        }

        let theme = self.find_theme(&request.theme_id).await?;
        let product_ids = unique_ids(request.product_ids);
        let composer = self.compose(&theme, &product_ids).await?;
        if status == OutfitStatus::Submitted {
            composer.check_submission(&theme)?;
        }

        let now = Utc::now();
        let outfit = Outfit {
            id: Uuid::new_v4(),
            user_id,
            theme_id: theme.id.clone(),
            title: request.title,
            description: request.description,
            product_ids,
            moodboard_images: request.moodboard_images,
            votes: 0,
            status,
            created_at: now,
            updated_at: now,
        };

        let outfit = self.outfit_repository.create(outfit).await?;
        self.user_repository
            .increment_outfits_created(user_id)
            .await
            .map_err(|e| OutfitError::DatabaseError(e.to_string()))?;
        if status == OutfitStatus::Submitted {
            self.record_entry(&theme.id).await?;
        }

        info!(
            outfit_id = %outfit.id,
            %user_id,
            theme_id = %outfit.theme_id,
            status = status.as_str(),
            total_cost = composer.total_cost(),
            "Created outfit"
        );
        Ok(outfit)
    }

    async fn get_outfit(&self, id: Uuid) -> Result<OutfitDetail, OutfitError> {
        let outfit = self.find_outfit(id).await?;
        Ok(self.details.load_one(outfit).await?)
    }

    async fn list_outfits(
        &self,
        filters: OutfitFilters,
    ) -> Result<Vec<OutfitDetail>, OutfitError> {
        let outfits = self.outfit_repository.find(&filters).await?;
        Ok(self.details.load(outfits).await?)
    }

    async fn leaderboard(
        &self,
        query: LeaderboardQuery,
    ) -> Result<Vec<OutfitDetail>, OutfitError> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
            .clamp(1, MAX_LEADERBOARD_LIMIT);

        let outfits = self
            .outfit_repository
            .leaderboard(query.theme_id.as_deref(), limit)
            .await?;
        Ok(self.details.load(outfits).await?)
    }

    async fn update_outfit(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateOutfitRequest,
    ) -> Result<Outfit, OutfitError> {
        let mut outfit = self.find_owned(user_id, id).await?;
        let current = outfit.status;
        let target = request.status.unwrap_or(current);

        if !current.can_transition_to(target) {
            return Err(OutfitError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        let edits_content = request.title.is_some()
            || request.description.is_some()
            || request.product_ids.is_some()
            || request.moodboard_images.is_some();
        if edits_content && current != OutfitStatus::Draft {
            return Err(OutfitError::NotEditable(current));
        }

        if let Some(title) = request.title {
            outfit.title = title;
        }
        if let Some(description) = request.description {
            outfit.description = description;
        }
        if let Some(moodboard_images) = request.moodboard_images {
            outfit.moodboard_images = moodboard_images;
        }

        let product_ids = request.product_ids.map(unique_ids);
        let entering_submission =
            current == OutfitStatus::Draft && target == OutfitStatus::Submitted;
        if product_ids.is_some() || entering_submission {
            let theme = self.find_theme(&outfit.theme_id).await?;
            let ids = product_ids.unwrap_or_else(|| outfit.product_ids.clone());
            let composer = self.compose(&theme, &ids).await?;
            if entering_submission {
                composer.check_submission(&theme)?;
            }
            outfit.product_ids = ids;
        }

        outfit.status = target;
        outfit.updated_at = Utc::now();
        // Written only if no concurrent request moved the status meanwhile
        let Some(outfit) = self.outfit_repository.update(outfit, current).await? else {
            let still_there = self.outfit_repository.find_by_id(id).await?.is_some();
            debug!(outfit_id = %id, still_there, "Outfit update lost a race");
            return Err(if still_there {
                OutfitError::StatusChanged
            } else {
                OutfitError::OutfitNotFound
            });
        };

        if entering_submission {
            self.record_entry(&outfit.theme_id).await?;
        }
        if current != target {
            info!(
                outfit_id = %id,
                from = current.as_str(),
                to = target.as_str(),
                "Outfit status changed"
            );
        }
        Ok(outfit)
    }

    async fn delete_outfit(&self, user_id: Uuid, id: Uuid) -> Result<(), OutfitError> {
        let outfit = self.find_owned(user_id, id).await?;
        self.outfit_repository.delete(outfit.id).await?;
        info!(outfit_id = %id, %user_id, status = outfit.status.as_str(), "Deleted outfit");
        Ok(())
    }
}
