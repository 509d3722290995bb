//! Service wiring and the HTTP router.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    routing::{get, post, put},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::composer::BudgetSummary;
use crate::config::AppConfig;
use crate::handlers::ErrorResponse;
use crate::handlers::auth_handlers::{login_handler, me_handler, register_handler};
use crate::handlers::duel_handlers::{
    current_duel_handler, duel_vote_handler, end_duel_handler, skip_duel_handler,
    start_duel_handler,
};
use crate::handlers::outfit_handlers::{
    create_outfit_handler, delete_outfit_handler, get_outfit_handler, leaderboard_handler,
    list_outfits_handler, update_outfit_handler,
};
use crate::handlers::product_handlers::{
    create_product_handler, get_product_handler, list_products_handler,
};
use crate::handlers::theme_handlers::{
    budget_check_handler, create_theme_handler, get_theme_handler, list_themes_handler,
};
use crate::handlers::vote_handlers::cast_vote_handler;
use crate::middleware::auth_middleware::auth_middleware;
use crate::models::auth::{AuthToken, LoginRequest};
use crate::models::duel::{DuelVoteRequest, StartDuelRequest};
use crate::models::outfit::{
    CreateOutfitRequest, Creator, Outfit, OutfitDetail, OutfitStatus, UpdateOutfitRequest,
};
use crate::models::product::{CreateProductRequest, Product, ProductCategory};
use crate::models::theme::{BudgetCheckRequest, CreateThemeRequest, Theme, ThemeStatus};
use crate::models::user::{CreateUserRequest, User, UserProfile};
use crate::models::vote::{CastVoteRequest, Vote};
use crate::repositories::memory::{
    InMemoryOutfitRepository, InMemoryProductRepository, InMemoryThemeRepository,
    InMemoryUserRepository, InMemoryVoteRepository,
};
use crate::repositories::outfit_repository::{OutfitRepository, PostgresOutfitRepository};
use crate::repositories::product_repository::{PostgresProductRepository, ProductRepository};
use crate::repositories::theme_repository::{PostgresThemeRepository, ThemeRepository};
use crate::repositories::user_repository::{PostgresUserRepository, UserRepository};
use crate::repositories::vote_repository::{PostgresVoteRepository, VoteRepository};
use crate::services::auth_service::{AuthService, AuthServiceImpl};
use crate::services::catalog_service::{CatalogService, CatalogServiceImpl};
use crate::services::duel_service::{DuelService, DuelServiceImpl, DuelState, DuelView};
use crate::services::outfit_service::{OutfitDetailLoader, OutfitService, OutfitServiceImpl};
use crate::services::theme_service::{ThemeService, ThemeServiceImpl};
use crate::services::vote_service::{VoteService, VoteServiceImpl};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::auth_handlers::register_handler,
        crate::handlers::auth_handlers::login_handler,
        crate::handlers::auth_handlers::me_handler,
        crate::handlers::theme_handlers::list_themes_handler,
        crate::handlers::theme_handlers::get_theme_handler,
        crate::handlers::theme_handlers::create_theme_handler,
        crate::handlers::theme_handlers::budget_check_handler,
        crate::handlers::product_handlers::list_products_handler,
        crate::handlers::product_handlers::get_product_handler,
        crate::handlers::product_handlers::create_product_handler,
        crate::handlers::outfit_handlers::list_outfits_handler,
        crate::handlers::outfit_handlers::get_outfit_handler,
        crate::handlers::outfit_handlers::leaderboard_handler,
        crate::handlers::outfit_handlers::create_outfit_handler,
        crate::handlers::outfit_handlers::update_outfit_handler,
        crate::handlers::outfit_handlers::delete_outfit_handler,
        crate::handlers::vote_handlers::cast_vote_handler,
        crate::handlers::duel_handlers::start_duel_handler,
        crate::handlers::duel_handlers::current_duel_handler,
        crate::handlers::duel_handlers::duel_vote_handler,
        crate::handlers::duel_handlers::skip_duel_handler,
        crate::handlers::duel_handlers::end_duel_handler,
    ),
    components(
        schemas(
            User, UserProfile, CreateUserRequest, LoginRequest, AuthToken, ErrorResponse,
            Theme, ThemeStatus, CreateThemeRequest, BudgetCheckRequest, BudgetSummary,
            Product, ProductCategory, CreateProductRequest,
            Outfit, OutfitDetail, Creator, OutfitStatus, CreateOutfitRequest, UpdateOutfitRequest,
            Vote, CastVoteRequest,
            StartDuelRequest, DuelVoteRequest, DuelState, DuelView
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and the current user"),
        (name = "themes", description = "Style challenges and budget checks"),
        (name = "products", description = "Mock product catalog"),
        (name = "outfits", description = "Outfit entries and leaderboard"),
        (name = "votes", description = "Direct votes on outfits"),
        (name = "duels", description = "Pairwise outfit duels")
    ),
    info(
        title = "StyleDuel API",
        version = "0.1.0",
        description = "Compose outfits for themed challenges and vote on them head to head",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Storage backing the services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub themes: Arc<dyn ThemeRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub outfits: Arc<dyn OutfitRepository>,
    pub votes: Arc<dyn VoteRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let outfits = Arc::new(InMemoryOutfitRepository::new());
        // Votes write through to the same outfit and user maps
        let votes = Arc::new(InMemoryVoteRepository::new(outfits.clone(), users.clone()));

        Self {
            users,
            themes: Arc::new(InMemoryThemeRepository::new()),
            products: Arc::new(InMemoryProductRepository::new()),
            outfits,
            votes,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            themes: Arc::new(PostgresThemeRepository::new(pool.clone())),
            products: Arc::new(PostgresProductRepository::new(pool.clone())),
            outfits: Arc::new(PostgresOutfitRepository::new(pool.clone())),
            votes: Arc::new(PostgresVoteRepository::new(pool)),
        }
    }
}

/// Services shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub theme_service: Arc<dyn ThemeService>,
    pub catalog_service: Arc<dyn CatalogService>,
    pub outfit_service: Arc<dyn OutfitService>,
    pub vote_service: Arc<dyn VoteService>,
    pub duel_service: Arc<dyn DuelService>,
}

impl AppState {
    pub fn new(repositories: Repositories, config: &AppConfig) -> Self {
        let Repositories {
            users,
            themes,
            products,
            outfits,
            votes,
        } = repositories;

        let auth_service = AuthServiceImpl::new(users.clone(), config.jwt_secret.clone())
            .with_hash_cost(config.bcrypt_cost);
        let vote_service = Arc::new(VoteServiceImpl::new(votes));
        let details = OutfitDetailLoader::new(products.clone(), users.clone());

        Self {
            auth_service: Arc::new(auth_service),
            theme_service: Arc::new(ThemeServiceImpl::new(themes.clone(), products.clone())),
            catalog_service: Arc::new(CatalogServiceImpl::new(products.clone())),
            outfit_service: Arc::new(OutfitServiceImpl::new(
                outfits.clone(),
                themes,
                products,
                users,
            )),
            duel_service: Arc::new(DuelServiceImpl::new(
                outfits,
                details,
                vote_service.clone(),
                config.duel,
            )),
            vote_service,
        }
    }
}

macro_rules! service_substate {
    ($($field:ident: $service:ty),* $(,)?) => {
        $(
            impl FromRef<AppState> for Arc<$service> {
                fn from_ref(state: &AppState) -> Self {
                    state.$field.clone()
                }
            }
        )*
    };
}

service_substate!(
    auth_service: dyn AuthService,
    theme_service: dyn ThemeService,
    catalog_service: dyn CatalogService,
    outfit_service: dyn OutfitService,
    vote_service: dyn VoteService,
    duel_service: dyn DuelService,
);

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Builds the application router
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/users/me", get(me_handler))
        .route("/api/outfits", post(create_outfit_handler))
        .route(
            "/api/outfits/:id",
            put(update_outfit_handler).delete(delete_outfit_handler),
        )
        .route("/api/votes", post(cast_vote_handler))
        .route("/api/themes", post(create_theme_handler))
        .route("/api/products", post(create_product_handler))
        .route(
            "/api/duels",
            post(start_duel_handler).delete(end_duel_handler),
        )
        .route("/api/duels/current", get(current_duel_handler))
        .route("/api/duels/vote", post(duel_vote_handler))
        .route("/api/duels/skip", post(skip_duel_handler))
        .route_layer(middleware::from_fn_with_state(
            state.auth_service.clone(),
            auth_middleware,
        ));

    let public = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/themes", get(list_themes_handler))
        .route("/api/themes/:id", get(get_theme_handler))
        .route("/api/themes/:id/budget-check", post(budget_check_handler))
        .route("/api/products", get(list_products_handler))
        .route("/api/products/:id", get(get_product_handler))
        .route("/api/outfits", get(list_outfits_handler))
        .route("/api/outfits/leaderboard", get(leaderboard_handler))
        .route("/api/outfits/:id", get(get_outfit_handler));

    public
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
