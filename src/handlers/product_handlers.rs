use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::handlers::{ErrorResponse, error_response, internal_error, validate_request};
use crate::models::product::{CreateProductRequest, Product, ProductFilters};
use crate::services::catalog_service::{CatalogError, CatalogService};

/// Convert CatalogError to HTTP response
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            CatalogError::ProductNotFound => (
                StatusCode::NOT_FOUND,
                "product_not_found",
                "Product not found",
            ),
            CatalogError::DuplicateProduct => (
                StatusCode::CONFLICT,
                "duplicate_product",
                "Product already exists",
            ),
            CatalogError::DatabaseError(ref msg) => return internal_error(msg),
        };

        error_response(status, error_type, message)
    }
}

/// Handler for browsing the catalog
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductFilters),
    responses(
        (status = 200, description = "Matching catalog items by name", body = Vec<Product>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products_handler(
    State(catalog_service): State<Arc<dyn CatalogService>>,
    Query(filters): Query<ProductFilters>,
) -> Result<Json<Vec<Product>>, Response> {
    match catalog_service.list_products(filters).await {
        Ok(products) => Ok(Json(products)),
        Err(e) => Err(e.into_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Catalog item", body = Product),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product_handler(
    State(catalog_service): State<Arc<dyn CatalogService>>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Product>, Response> {
    match catalog_service.get_product(product_id).await {
        Ok(product) => Ok(Json(product)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for adding a catalog item
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Catalog item created", body = Product),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "products"
)]
pub async fn create_product_handler(
    State(catalog_service): State<Arc<dyn CatalogService>>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), Response> {
    validate_request(&request)?;

    match catalog_service.create_product(request).await {
        Ok(product) => Ok((StatusCode::CREATED, Json(product))),
        Err(e) => Err(e.into_response()),
    }
}
