use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tokio::sync::OnceCell;
use tower::ServiceExt;

use styleduel::app::{AppState, Repositories, build_router};
use styleduel::config::AppConfig;

/// Router over fresh in-memory storage
struct TestApp {
    router: Router,
    curator: OnceCell<String>,
}

impl TestApp {
    fn new() -> Self {
        let config = AppConfig::for_tests();
        let state = AppState::new(Repositories::in_memory(), &config);
        Self {
            router: build_router(state),
            curator: OnceCell::new(),
        }
    }

    async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_string(&json).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, token, Some(body)).await
    }

    async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, Some(token), Some(body)).await
    }

    /// Registers a user and returns a bearer token for them
    async fn login_as(&self, name: &str) -> String {
        let email = format!("{}@example.com", name.to_lowercase());
        let (status, _) = self
            .post(
                "/api/auth/register",
                None,
                json!({ "name": name, "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    /// Token of the user who maintains themes and the catalog
    async fn curator_token(&self) -> String {
        self.curator
            .get_or_init(|| self.login_as("Curator"))
            .await
            .clone()
    }

    async fn create_theme(&self, id: &str, budget: i64, status: &str) {
        let token = self.curator_token().await;
        let (code, body) = self
            .post(
                "/api/themes",
                Some(&token),
                json!({
                    "id": id,
                    "title": "Summer Vibes",
                    "description": "Light looks",
                    "rules": ["Include one clothing item"],
                    "budget": budget,
                    "rewards": ["500 points"],
                    "status": status,
                    "endDate": "2026-12-31T23:59:59Z"
                }),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "{body}");
    }

    async fn create_product(
        &self,
        name: &str,
        price: i64,
        category: &str,
        subcategory: &str,
    ) -> String {
        let token = self.curator_token().await;
        let (status, body) = self
            .post(
                "/api/products",
                Some(&token),
                json!({
                    "name": name,
                    "brand": "Aurelia",
                    "price": price,
                    "category": category,
                    "subcategory": subcategory,
                    "themes": ["summer-vibes"]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_outfit(&self, token: &str, product_ids: &[&str], status: &str) -> Value {
        let (code, body) = self
            .post(
                "/api/outfits",
                Some(token),
                json!({
                    "themeId": "summer-vibes",
                    "title": "Sunny Day Vibes",
                    "description": "Casual summer day out",
                    "productIds": product_ids,
                    "moodboardImages": ["/a.jpg", "/b.jpg"],
                    "status": status
                }),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "{body}");
        body
    }

    /// Creates an outfit and walks it into voting
    async fn voting_outfit(&self, token: &str, product_id: &str) -> String {
        let outfit = self.create_outfit(token, &[product_id], "submitted").await;
        let id = outfit["id"].as_str().unwrap().to_string();
        let (status, _) = self
            .put(&format!("/api/outfits/{id}"), token, json!({ "status": "voting" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        id
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_register_login_and_profile() {
    let app = TestApp::new();
    let token = app.login_as("Priya").await;

    let (status, body) = app
        .request("GET", "/api/users/me", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Priya");
    assert_eq!(body["level"], "Style Novice");
    assert_eq!(body["points"], 0);
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_and_invalid() {
    let app = TestApp::new();
    app.login_as("Priya").await;

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "Priya", "email": "priya@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_email");

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "Mira", "email": "mira@example.com", "password": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/users/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_token");

    let (status, _) = app
        .request("GET", "/api/users/me", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post("/api/votes", None, json!({ "outfitId": uuid::Uuid::new_v4() }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_catalog_writes_require_token() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/themes",
            None,
            json!({
                "id": "summer-vibes",
                "title": "Summer Vibes",
                "description": "Light looks",
                "budget": 5000,
                "endDate": "2026-12-31T23:59:59Z"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_token");

    let (status, _) = app
        .post(
            "/api/products",
            Some("garbage"),
            json!({
                "name": "Wrap Dress",
                "brand": "Aurelia",
                "price": 2499,
                "category": "clothing",
                "subcategory": "Dresses"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Reads stay public
    let (status, _) = app.get("/api/themes").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/api/products").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_out_of_range_amounts_are_rejected() {
    let app = TestApp::new();
    let token = app.curator_token().await;

    for price in [100_000_001_i64, i64::MAX] {
        let (status, body) = app
            .post(
                "/api/products",
                Some(&token),
                json!({
                    "name": "Diamond Gown",
                    "brand": "Aurelia",
                    "price": price,
                    "category": "clothing",
                    "subcategory": "Dresses"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    let (status, body) = app
        .post(
            "/api/themes",
            Some(&token),
            json!({
                "id": "billionaire",
                "title": "No Limits",
                "description": "Too rich",
                "budget": i64::MAX,
                "endDate": "2026-12-31T23:59:59Z"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    // The largest accepted price still prices cleanly against a theme
    app.create_theme("summer-vibes", 5000, "active").await;
    let priciest = app
        .create_product("Couture Gown", 100_000_000, "clothing", "Dresses")
        .await;
    let (status, body) = app
        .post(
            "/api/themes/summer-vibes/budget-check",
            None,
            json!({ "productIds": [priciest, priciest] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["canSubmit"], false);
}

#[tokio::test]
async fn test_themes_listing_and_lookup() {
    let app = TestApp::new();
    app.create_theme("summer-vibes", 5000, "active").await;
    app.create_theme("winter-layers", 7000, "upcoming").await;

    let (status, body) = app.get("/api/themes").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["summer-vibes"]);

    let (_, body) = app.get("/api/themes?status=upcoming").await;
    assert_eq!(body[0]["id"], "winter-layers");

    let (status, body) = app.get("/api/themes/summer-vibes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["budget"], 5000);
    assert_eq!(body["entries"], 0);

    let (status, body) = app.get("/api/themes/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "theme_not_found");
}

#[tokio::test]
async fn test_create_theme_rejects_bad_and_duplicate_ids() {
    let app = TestApp::new();
    app.create_theme("summer-vibes", 5000, "active").await;
    let token = app.curator_token().await;

    let (status, body) = app
        .post(
            "/api/themes",
            Some(&token),
            json!({
                "id": "Summer Vibes!",
                "title": "Bad",
                "description": "Bad slug",
                "budget": 100,
                "endDate": "2026-12-31T23:59:59Z"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = app
        .post(
            "/api/themes",
            Some(&token),
            json!({
                "id": "summer-vibes",
                "title": "Again",
                "description": "Same slug",
                "budget": 100,
                "endDate": "2026-12-31T23:59:59Z"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_theme");
}

#[tokio::test]
async fn test_products_filtering() {
    let app = TestApp::new();
    app.create_product("Wrap Dress", 2499, "clothing", "Dresses")
        .await;
    app.create_product("Linen Top", 1899, "clothing", "Tops").await;
    let sandals = app.create_product("Sandals", 1599, "shoes", "Flats").await;

    let (status, body) = app
        .get("/api/products?themeId=summer-vibes&category=clothing")
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Linen Top", "Wrap Dress"]);

    let (_, body) = app.get("/api/products?subcategory=tops").await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app.get(&format!("/api/products/{sandals}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "shoes");

    let (status, _) = app
        .get(&format!("/api/products/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_budget_check() {
    let app = TestApp::new();
    app.create_theme("summer-vibes", 5000, "active").await;
    let dress = app
        .create_product("Wrap Dress", 2499, "clothing", "Dresses")
        .await;
    let sandals = app.create_product("Sandals", 1599, "shoes", "Flats").await;
    let gown = app.create_product("Silk Gown", 8999, "clothing", "Dresses").await;

    let (status, body) = app
        .post(
            "/api/themes/summer-vibes/budget-check",
            None,
            json!({ "productIds": [dress, sandals] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCost"], 4098);
    assert_eq!(body["remainingBudget"], 902);
    assert_eq!(body["canSubmit"], true);
    assert!(body["blocker"].is_null());

    let (_, body) = app
        .post(
            "/api/themes/summer-vibes/budget-check",
            None,
            json!({ "productIds": [gown] }),
        )
        .await;
    assert_eq!(body["remainingBudget"], -3999);
    assert_eq!(body["canSubmit"], false);

    let (_, body) = app
        .post(
            "/api/themes/summer-vibes/budget-check",
            None,
            json!({ "productIds": [sandals] }),
        )
        .await;
    assert_eq!(body["canSubmit"], false);
    assert_eq!(
        body["blocker"],
        "Outfit must contain at least one clothing item"
    );
}

#[tokio::test]
async fn test_outfit_lifecycle() {
    let app = TestApp::new();
    app.create_theme("summer-vibes", 5000, "active").await;
    let dress = app
        .create_product("Wrap Dress", 2499, "clothing", "Dresses")
        .await;
    let sandals = app.create_product("Sandals", 1599, "shoes", "Flats").await;
    let token = app.login_as("Priya").await;

    let outfit = app.create_outfit(&token, &[&sandals], "draft").await;
    let id = outfit["id"].as_str().unwrap().to_string();
    let uri = format!("/api/outfits/{id}");
    assert_eq!(outfit["status"], "draft");
    assert_eq!(outfit["votes"], 0);
    assert_eq!(outfit["moodboardImages"], json!(["/a.jpg", "/b.jpg"]));

    // Shoes alone cannot be submitted
    let (status, body) = app
        .put(&uri, &token, json!({ "status": "submitted" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "submission_rejected");

    // Skipping a step is refused
    let (status, body) = app
        .put(&uri, &token, json!({ "status": "voting" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");

    let (status, body) = app
        .put(
            &uri,
            &token,
            json!({ "productIds": [dress, sandals], "status": "submitted" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "submitted");

    // Content is frozen once submitted
    let (status, body) = app.put(&uri, &token, json!({ "title": "Renamed" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "not_editable");

    let (status, _) = app.put(&uri, &token, json!({ "status": "draft" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, theme) = app.get("/api/themes/summer-vibes").await;
    assert_eq!(theme["entries"], 1);
}

#[tokio::test]
async fn test_outfit_ownership_and_delete() {
    let app = TestApp::new();
    app.create_theme("summer-vibes", 5000, "active").await;
    let dress = app
        .create_product("Wrap Dress", 2499, "clothing", "Dresses")
        .await;
    let owner = app.login_as("Priya").await;
    let stranger = app.login_as("Mira").await;

    let outfit = app.create_outfit(&owner, &[&dress], "draft").await;
    let uri = format!("/api/outfits/{}", outfit["id"].as_str().unwrap());

    let (status, body) = app.put(&uri, &stranger, json!({ "title": "Mine now" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = app.request("DELETE", &uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, mine) = app
        .get(&format!("/api/outfits?userId={}", outfit["userId"].as_str().unwrap()))
        .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (status, detail) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["id"], outfit["id"]);
    assert_eq!(detail["products"][0]["name"], "Wrap Dress");
    assert_eq!(detail["products"][0]["price"], 2499);
    assert_eq!(detail["creator"]["name"], "Priya");
    assert!(detail["creator"].get("email").is_none());

    let (status, _) = app.request("DELETE", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_outfit_unknown_theme_and_product() {
    let app = TestApp::new();
    app.create_theme("summer-vibes", 5000, "active").await;
    let token = app.login_as("Priya").await;

    let (status, body) = app
        .post(
            "/api/outfits",
            Some(&token),
            json!({
                "themeId": "summer-vibes",
                "title": "Ghost",
                "description": "Missing product",
                "productIds": [uuid::Uuid::new_v4()]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "product_not_found");

    let (status, body) = app
        .post(
            "/api/outfits",
            Some(&token),
            json!({
                "themeId": "autumn",
                "title": "Elsewhere",
                "description": "Missing theme"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "theme_not_found");
}

#[tokio::test]
async fn test_votes_and_leaderboard() {
    let app = TestApp::new();
    app.create_theme("summer-vibes", 5000, "active").await;
    let dress = app
        .create_product("Wrap Dress", 2499, "clothing", "Dresses")
        .await;
    let owner = app.login_as("Priya").await;
    let voter = app.login_as("Mira").await;

    let submitted = app.create_outfit(&owner, &[&dress], "submitted").await;
    let (status, body) = app
        .post("/api/votes", Some(&voter), json!({ "outfitId": submitted["id"] }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "not_accepting_votes");

    let first = app.voting_outfit(&owner, &dress).await;
    let second = app.voting_outfit(&owner, &dress).await;

    for _ in 0..2 {
        let (status, _) = app
            .post("/api/votes", Some(&voter), json!({ "outfitId": second }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, vote) = app
        .post("/api/votes", Some(&voter), json!({ "outfitId": first }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(vote["outfitVotes"], 1);

    let (status, board) = app
        .get("/api/outfits/leaderboard?themeId=summer-vibes")
        .await;
    assert_eq!(status, StatusCode::OK);
    let ranked: Vec<(&str, i64)> = board
        .as_array()
        .unwrap()
        .iter()
        .map(|o| (o["id"].as_str().unwrap(), o["votes"].as_i64().unwrap()))
        .collect();
    assert_eq!(ranked, vec![(second.as_str(), 2), (first.as_str(), 1)]);

    assert_eq!(board[0]["creator"]["name"], "Priya");

    let (_, board) = app.get("/api/outfits/leaderboard?limit=1").await;
    assert_eq!(board.as_array().unwrap().len(), 1);

    // Every vote received is worth 10 points to the creator
    let (_, profile) = app
        .request("GET", "/api/users/me", Some(&owner), None)
        .await;
    assert_eq!(profile["points"], 30);
    assert_eq!(profile["level"], "Style Novice");
    let (_, profile) = app
        .request("GET", "/api/users/me", Some(&voter), None)
        .await;
    assert_eq!(profile["points"], 0);

    let (status, _) = app
        .post(
            "/api/votes",
            Some(&voter),
            json!({ "outfitId": uuid::Uuid::new_v4() }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duel_flow() {
    let app = TestApp::new();
    app.create_theme("summer-vibes", 5000, "active").await;
    let dress = app
        .create_product("Wrap Dress", 2499, "clothing", "Dresses")
        .await;
    let owner = app.login_as("Priya").await;
    let voter = app.login_as("Mira").await;

    let (status, body) = app
        .request("GET", "/api/duels/current", Some(&voter), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no_duel_session");

    for _ in 0..4 {
        app.voting_outfit(&owner, &dress).await;
    }

    let (status, state) = app
        .request("POST", "/api/duels", Some(&voter), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(state["poolSize"], 4);
    assert_eq!(state["votesCast"], 0);
    let left = state["duel"]["left"]["id"].as_str().unwrap().to_string();
    let right = state["duel"]["right"]["id"].as_str().unwrap().to_string();
    assert_ne!(left, right);

    let (status, body) = app
        .post(
            "/api/duels/vote",
            Some(&voter),
            json!({ "winnerId": uuid::Uuid::new_v4() }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "winner_not_in_pair");

    let (status, state) = app
        .post("/api/duels/vote", Some(&voter), json!({ "winnerId": left }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["votesCast"], 1);
    let next_left = state["duel"]["left"]["id"].as_str().unwrap();
    let next_right = state["duel"]["right"]["id"].as_str().unwrap();
    for shown in [next_left, next_right] {
        assert_ne!(shown, left);
        assert_ne!(shown, right);
    }

    let (status, state) = app
        .request("POST", "/api/duels/skip", Some(&voter), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["votesCast"], 1);

    let (status, state) = app
        .request("GET", "/api/duels/current", Some(&voter), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["votesCast"], 1);
    assert_eq!(state["duel"]["left"]["creator"]["name"], "Priya");
    assert_eq!(state["duel"]["left"]["products"][0]["name"], "Wrap Dress");

    let (status, _) = app
        .request("DELETE", "/api/duels", Some(&voter), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .request("DELETE", "/api/duels", Some(&voter), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no_duel_session");

    let (status, _) = app
        .request("GET", "/api/duels/current", Some(&voter), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duel_with_theme_filter_and_small_pool() {
    let app = TestApp::new();
    app.create_theme("summer-vibes", 5000, "active").await;
    let dress = app
        .create_product("Wrap Dress", 2499, "clothing", "Dresses")
        .await;
    let owner = app.login_as("Priya").await;
    app.voting_outfit(&owner, &dress).await;

    let (status, state) = app
        .post(
            "/api/duels",
            Some(&owner),
            json!({ "themeId": "summer-vibes" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(state["poolSize"], 1);
    assert_eq!(state["themeId"], "summer-vibes");
    assert!(state["duel"].is_null());

    let (status, body) = app
        .post(
            "/api/duels/vote",
            Some(&owner),
            json!({ "winnerId": uuid::Uuid::new_v4() }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "no_active_pair");
}
