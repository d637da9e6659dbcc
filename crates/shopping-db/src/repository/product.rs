//! # Product Repository
//!
//! Database operations for the read-only catalog. The cart never writes
//! here; `insert` exists for the seed binary.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use shopping_core::{Money, PageRequest, Product, ProductId};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    title: String,
    image_url: String,
    price_minor: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product::new(
            ProductId::new(row.id),
            row.title,
            row.image_url,
            Money::from_minor(row.price_minor),
        )
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let product = repo.find(ProductId::new(1)).await?;
/// let first_page = repo.find_range(PageRequest::new(0, 20)?).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn find(&self, id: ProductId) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, title, image_url, price_minor
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// One catalog page, ordered by id.
    pub async fn find_range(&self, request: PageRequest) -> DbResult<Vec<Product>> {
        let Some(offset) = request.offset().and_then(|o| i64::try_from(o).ok()) else {
            return Ok(Vec::new());
        };
        let limit = i64::try_from(request.limit()).unwrap_or(i64::MAX);

        debug!(page = request.page(), limit, "Listing products");

        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, title, image_url, price_minor
            FROM products
            ORDER BY id
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Every product, ordered by id.
    pub async fn all(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, title, image_url, price_minor FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded catalog");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Counts products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The inserted product
    /// * `Err(DbError::UniqueViolation)` - The id already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, title = %product.title, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, title, image_url, price_minor, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(product.id.get())
        .bind(&product.title)
        .bind(&product.image_url)
        .bind(product.price.minor())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: product.id.to_string(),
            },
            other => other,
        })?;

        Ok(product.clone())
    }
}
