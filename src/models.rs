pub mod auth;
pub mod duel;
pub mod outfit;
pub mod product;
pub mod theme;
pub mod user;
pub mod vote;

pub use auth::{AuthToken, LoginRequest};
pub use duel::{DuelVoteRequest, StartDuelRequest};
pub use outfit::{
    CreateOutfitRequest, LeaderboardQuery, Outfit, OutfitFilters, OutfitStatus,
    UpdateOutfitRequest,
};
pub use product::{CreateProductRequest, Product, ProductCategory, ProductFilters};
pub use theme::{BudgetCheckRequest, CreateThemeRequest, Theme, ThemeFilters, ThemeStatus};
pub use user::{CreateUserRequest, User, UserProfile};
pub use vote::{CastVoteRequest, Vote};
