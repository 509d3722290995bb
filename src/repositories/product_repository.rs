use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::product::{Product, ProductFilters};
use crate::repositories::RepositoryError;

/// Trait defining catalog repository operations
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Add an item to the catalog
    async fn create(&self, product: Product) -> Result<Product, RepositoryError>;

    /// Find an item by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError>;

    /// Find every item whose ID is listed; unknown IDs are skipped
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, RepositoryError>;

    /// Items matching all given filters, ordered by name
    async fn find(&self, filters: &ProductFilters) -> Result<Vec<Product>, RepositoryError>;
}

const PRODUCT_COLUMNS: &str =
    "id, name, brand, price, image, category, subcategory, colors, sizes, tags, themes, created_at";

/// PostgreSQL implementation of ProductRepository
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn create(&self, product: Product) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO products \
                (id, name, brand, price, image, category, subcategory, \
                 colors, sizes, tags, themes, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {PRODUCT_COLUMNS}"
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.brand)
            .bind(product.price)
            .bind(&product.image)
            .bind(product.category)
            .bind(&product.subcategory)
            .bind(&product.colors)
            .bind(&product.sizes)
            .bind(&product.tags)
            .bind(&product.themes)
            .bind(product.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(e, "Product already exists"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)");

        sqlx::query_as::<_, Product>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find(&self, filters: &ProductFilters) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::varchar IS NULL OR $1 = ANY(themes)) \
               AND ($2::varchar IS NULL OR category = $2) \
               AND ($3::varchar IS NULL OR LOWER(subcategory) = LOWER($3)) \
             ORDER BY name ASC"
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(filters.theme_id.as_deref())
            .bind(filters.category.map(|c| c.as_str()))
            .bind(filters.subcategory.as_deref())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }
}
