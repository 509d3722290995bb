//! In-memory repositories implementing the same traits as the Postgres
//! ones. Used when `STORAGE_BACKEND=memory` and throughout the tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::outfit::{Outfit, OutfitFilters, OutfitStatus};
use crate::models::product::{Product, ProductFilters};
use crate::models::theme::{Theme, ThemeStatus};
use crate::models::user::{
    CreateUserRequest, DEFAULT_LEVEL, POINTS_PER_VOTE_RECEIVED, User, level_for_points,
};
use crate::models::vote::Vote;
use crate::repositories::RepositoryError;
use crate::repositories::outfit_repository::OutfitRepository;
use crate::repositories::product_repository::ProductRepository;
use crate::repositories::theme_repository::ThemeRepository;
use crate::repositories::user_repository::UserRepository;
use crate::repositories::vote_repository::{CastOutcome, VoteRepository};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::DatabaseError("In-memory store poisoned".to_string()))
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&self, id: Uuid, apply: impl FnOnce(&mut User)) -> Result<(), RepositoryError> {
        let mut users = lock(&self.users)?;
        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        apply(user);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(
        &self,
        user: CreateUserRequest,
        password_hash: String,
    ) -> Result<User, RepositoryError> {
        let mut users = lock(&self.users)?;

        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::ConstraintViolation(
                "Email already exists".to_string(),
            ));
        }

        let new_user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash,
            avatar: user.avatar,
            points: 0,
            level: DEFAULT_LEVEL.to_string(),
            outfits_created: 0,
            votes_given: 0,
            created_at: Utc::now(),
        };

        users.insert(new_user.id, new_user.clone());
        Ok(new_user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = lock(&self.users)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let users = lock(&self.users)?;
        Ok(users.get(&id).cloned())
    }

    async fn increment_outfits_created(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.bump(id, |u| u.outfits_created += 1)
    }
}

#[derive(Default)]
pub struct InMemoryThemeRepository {
    themes: Mutex<HashMap<String, Theme>>,
}

impl InMemoryThemeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThemeRepository for InMemoryThemeRepository {
    async fn create(&self, theme: Theme) -> Result<Theme, RepositoryError> {
        let mut themes = lock(&self.themes)?;

        if themes.contains_key(&theme.id) {
            return Err(RepositoryError::ConstraintViolation(
                "Theme with this id already exists".to_string(),
            ));
        }

        themes.insert(theme.id.clone(), theme.clone());
        Ok(theme)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Theme>, RepositoryError> {
        let themes = lock(&self.themes)?;
        Ok(themes.get(id).cloned())
    }

    async fn find_by_status(&self, status: ThemeStatus) -> Result<Vec<Theme>, RepositoryError> {
        let themes = lock(&self.themes)?;
        let mut result: Vec<Theme> = themes
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.end_date.cmp(&b.end_date).then_with(|| a.id.cmp(&b.id)));
        Ok(result)
    }

    async fn increment_entries(&self, id: &str) -> Result<(), RepositoryError> {
        let mut themes = lock(&self.themes)?;
        let theme = themes.get_mut(id).ok_or(RepositoryError::NotFound)?;
        theme.entries += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Mutex<HashMap<Uuid, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: Product) -> Result<Product, RepositoryError> {
        let mut products = lock(&self.products)?;

        if products.contains_key(&product.id) {
            return Err(RepositoryError::ConstraintViolation(
                "Product already exists".to_string(),
            ));
        }

        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        let products = lock(&self.products)?;
        Ok(products.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, RepositoryError> {
        let products = lock(&self.products)?;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn find(&self, filters: &ProductFilters) -> Result<Vec<Product>, RepositoryError> {
        let products = lock(&self.products)?;
        let mut result: Vec<Product> = products
            .values()
            .filter(|p| filters.matches(p))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }
}

#[derive(Default)]
pub struct InMemoryOutfitRepository {
    outfits: Mutex<HashMap<Uuid, Outfit>>,
}

impl InMemoryOutfitRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OutfitRepository for InMemoryOutfitRepository {
    async fn create(&self, outfit: Outfit) -> Result<Outfit, RepositoryError> {
        let mut outfits = lock(&self.outfits)?;

        if outfits.contains_key(&outfit.id) {
            return Err(RepositoryError::ConstraintViolation(
                "Outfit already exists".to_string(),
            ));
        }

        outfits.insert(outfit.id, outfit.clone());
        Ok(outfit)
    }

    async fn update(
        &self,
        outfit: Outfit,
        expected: OutfitStatus,
    ) -> Result<Option<Outfit>, RepositoryError> {
        let mut outfits = lock(&self.outfits)?;
        let Some(stored) = outfits
            .get_mut(&outfit.id)
            .filter(|stored| stored.status == expected)
        else {
            return Ok(None);
        };

        // Owner, theme, votes and creation time are not updatable
        stored.title = outfit.title;
        stored.description = outfit.description;
        stored.product_ids = outfit.product_ids;
        stored.moodboard_images = outfit.moodboard_images;
        stored.status = outfit.status;
        stored.updated_at = outfit.updated_at;
        Ok(Some(stored.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Outfit>, RepositoryError> {
        let outfits = lock(&self.outfits)?;
        Ok(outfits.get(&id).cloned())
    }

    async fn find(&self, filters: &OutfitFilters) -> Result<Vec<Outfit>, RepositoryError> {
        let outfits = lock(&self.outfits)?;
        let mut result: Vec<Outfit> = outfits
            .values()
            .filter(|o| filters.matches(o))
            .cloned()
            .collect();

        // Newest first
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn leaderboard(
        &self,
        theme_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Outfit>, RepositoryError> {
        let outfits = lock(&self.outfits)?;
        let mut result: Vec<Outfit> = outfits
            .values()
            .filter(|o| matches!(o.status, OutfitStatus::Voting | OutfitStatus::Completed))
            .filter(|o| theme_id.is_none_or(|t| o.theme_id == t))
            .cloned()
            .collect();

        result.sort_by(|a, b| {
            b.votes
                .cmp(&a.votes)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        result.truncate(limit);
        Ok(result)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut outfits = lock(&self.outfits)?;
        if outfits.remove(&id).is_some() {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}

/// Vote log that updates the outfit and user stores it was built over
pub struct InMemoryVoteRepository {
    votes: Mutex<Vec<Vote>>,
    outfits: Arc<InMemoryOutfitRepository>,
    users: Arc<InMemoryUserRepository>,
}

impl InMemoryVoteRepository {
    pub fn new(outfits: Arc<InMemoryOutfitRepository>, users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            votes: Mutex::new(Vec::new()),
            outfits,
            users,
        }
    }

    /// Votes recorded so far, oldest first
    pub fn recorded(&self) -> Vec<Vote> {
        self.votes.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl VoteRepository for InMemoryVoteRepository {
    async fn cast(&self, voter_id: Uuid, outfit_id: Uuid) -> Result<CastOutcome, RepositoryError> {
        // Lock order is outfits, users, votes; every check runs before any write
        let mut outfits = lock(&self.outfits.outfits)?;
        let mut users = lock(&self.users.users)?;
        let mut votes = lock(&self.votes)?;

        let outfit = match outfits.get_mut(&outfit_id) {
            None => return Ok(CastOutcome::OutfitMissing),
            Some(outfit) if outfit.status != OutfitStatus::Voting => {
                return Ok(CastOutcome::Closed(outfit.status));
            }
            Some(outfit) => outfit,
        };
        let voter = users.get_mut(&voter_id).ok_or(RepositoryError::NotFound)?;

        voter.votes_given += 1;
        outfit.votes += 1;
        if let Some(creator) = users.get_mut(&outfit.user_id) {
            creator.points += POINTS_PER_VOTE_RECEIVED;
            creator.level = level_for_points(creator.points).to_string();
        }

        let vote = Vote {
            id: Uuid::new_v4(),
            voter_id,
            outfit_id,
            outfit_votes: outfit.votes,
            created_at: Utc::now(),
        };
        votes.push(vote.clone());
        Ok(CastOutcome::Recorded(vote))
    }
}
