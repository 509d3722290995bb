use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::models::product::{CreateProductRequest, Product, ProductFilters};
use crate::repositories::RepositoryError;
use crate::repositories::product_repository::ProductRepository;

/// Catalog service errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Product already exists")]
    DuplicateProduct,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for CatalogError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => CatalogError::ProductNotFound,
            RepositoryError::ConstraintViolation(_) => CatalogError::DuplicateProduct,
            RepositoryError::DatabaseError(msg) => CatalogError::DatabaseError(msg),
        }
    }
}

/// Trait defining catalog service operations
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Catalog items matching the filters
    async fn list_products(&self, filters: ProductFilters) -> Result<Vec<Product>, CatalogError>;

    /// Get a single catalog item
    async fn get_product(&self, id: Uuid) -> Result<Product, CatalogError>;

    /// Add an item to the catalog
    async fn create_product(&self, request: CreateProductRequest)
    -> Result<Product, CatalogError>;
}

/// Implementation of CatalogService
pub struct CatalogServiceImpl {
    product_repository: Arc<dyn ProductRepository>,
}

impl CatalogServiceImpl {
    pub fn new(product_repository: Arc<dyn ProductRepository>) -> Self {
        Self { product_repository }
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn list_products(&self, filters: ProductFilters) -> Result<Vec<Product>, CatalogError> {
        Ok(self.product_repository.find(&filters).await?)
    }

    async fn get_product(&self, id: Uuid) -> Result<Product, CatalogError> {
        self.product_repository
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::ProductNotFound)
    }

    async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<Product, CatalogError> {
        let product = Product {
            id: Uuid::new_v4(),
            name: request.name,
            brand: request.brand,
            price: request.price,
            image: request.image,
            category: request.category,
            subcategory: request.subcategory,
            colors: request.colors,
            sizes: request.sizes,
            tags: request.tags,
            themes: request.themes,
            created_at: chrono::Utc::now(),
        };

        let product = self.product_repository.create(product).await?;
        info!(product_id = %product.id, price = product.price, "Added catalog item");
        Ok(product)
    }
}
