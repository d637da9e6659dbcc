//! # Cart Item Repository
//!
//! SQLite storage for cart lines.
//!
//! ## Table Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart_items                                                             │
//! │                                                                         │
//! │  id (AUTOINCREMENT) │ product_id (UNIQUE) │ quantity (>= 1) │ ...       │
//! │  ───────────────────┼─────────────────────┼─────────────────┼───        │
//! │  1                  │ 42                  │ 3               │           │
//! │  2                  │ 17                  │ 1               │           │
//! │                                                                         │
//! │  ORDER BY id = insertion order. Deleted ids are never reused.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The repository knows nothing about cart rules (floor at one, decrease
//! deleting). Those live in [`crate::backend::apply_command`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::backend::CartBackend;
use crate::error::{DbError, DbResult};
use shopping_core::{CartItem, CartItemId, CartResult, ProductId, Quantity};

/// Raw `cart_items` row.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i64,
    product_id: i64,
    quantity: i64,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = DbError;

    fn try_from(row: CartItemRow) -> DbResult<Self> {
        let quantity = u32::try_from(row.quantity)
            .ok()
            .and_then(|count| Quantity::new(count).ok())
            .ok_or_else(|| DbError::invalid_data("cart_items.quantity", row.quantity))?;

        Ok(CartItem::new(
            CartItemId::new(row.id),
            ProductId::new(row.product_id),
            quantity,
        ))
    }
}

/// Repository for cart item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.carts();
///
/// let item = repo.upsert(ProductId::new(42), Quantity::MIN).await?;
/// let page = repo.list(0, 5).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CartItemRepository {
    pool: SqlitePool,
}

impl CartItemRepository {
    /// Creates a new CartItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartItemRepository { pool }
    }

    /// Gets the line for a product.
    pub async fn get_by_product(&self, product_id: ProductId) -> DbResult<Option<CartItem>> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r#"
            SELECT id, product_id, quantity
            FROM cart_items
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id.get())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CartItem::try_from).transpose()
    }

    /// Inserts or updates the line for a product.
    ///
    /// ## Returns
    /// The stored line. An existing line keeps its id; a new line gets the
    /// next AUTOINCREMENT id.
    pub async fn upsert(&self, product_id: ProductId, quantity: Quantity) -> DbResult<CartItem> {
        debug!(product_id = %product_id, quantity = %quantity, "Upserting cart item");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM cart_items WHERE product_id = ?1",
        )
        .bind(product_id.get())
        .fetch_optional(&mut *tx)
        .await?;

        let id = match existing {
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE cart_items
                    SET quantity = ?2, updated_at = ?3
                    WHERE id = ?1
                    "#,
                )
                .bind(id)
                .bind(i64::from(quantity.count()))
                .bind(now)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => sqlx::query(
                r#"
                INSERT INTO cart_items (product_id, quantity, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?3)
                "#,
            )
            .bind(product_id.get())
            .bind(i64::from(quantity.count()))
            .bind(now)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid(),
        };

        tx.commit().await?;

        Ok(CartItem::new(CartItemId::new(id), product_id, quantity))
    }

    /// Deletes the line for a product.
    ///
    /// ## Returns
    /// * `Ok(true)` - A line was deleted
    /// * `Ok(false)` - There was no line for the product
    pub async fn delete_by_product(&self, product_id: ProductId) -> DbResult<bool> {
        debug!(product_id = %product_id, "Deleting cart item");

        let result = sqlx::query("DELETE FROM cart_items WHERE product_id = ?1")
            .bind(product_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists up to `limit` lines starting at `offset`, oldest first.
    pub async fn list(&self, offset: usize, limit: usize) -> DbResult<Vec<CartItem>> {
        // SQLite takes signed 64-bit LIMIT/OFFSET
        let Ok(offset) = i64::try_from(offset) else {
            return Ok(Vec::new());
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, CartItemRow>(
            r#"
            SELECT id, product_id, quantity
            FROM cart_items
            ORDER BY id
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), offset, limit, "Listed cart items");

        rows.into_iter().map(CartItem::try_from).collect()
    }

    /// Number of lines.
    pub async fn count(&self) -> DbResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_items")
            .fetch_one(&self.pool)
            .await?;

        usize::try_from(count).map_err(|_| DbError::invalid_data("COUNT(*)", count))
    }

    /// Sum of all quantities.
    pub async fn total_quantity(&self) -> DbResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM cart_items")
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(total).map_err(|_| DbError::invalid_data("SUM(quantity)", total))
    }

    /// Removes every line. Ids keep counting from where they were.
    pub async fn clear(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

impl CartBackend for CartItemRepository {
    async fn find(&self, product_id: ProductId) -> CartResult<Option<CartItem>> {
        Ok(self.get_by_product(product_id).await?)
    }

    async fn upsert(&self, product_id: ProductId, quantity: Quantity) -> CartResult<CartItem> {
        Ok(CartItemRepository::upsert(self, product_id, quantity).await?)
    }

    async fn delete(&self, product_id: ProductId) -> CartResult<bool> {
        Ok(self.delete_by_product(product_id).await?)
    }

    async fn range(&self, offset: usize, limit: usize) -> CartResult<Vec<CartItem>> {
        Ok(self.list(offset, limit).await?)
    }

    async fn count(&self) -> CartResult<usize> {
        Ok(CartItemRepository::count(self).await?)
    }

    async fn total_quantity(&self) -> CartResult<u64> {
        Ok(CartItemRepository::total_quantity(self).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn repo() -> CartItemRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().carts()
    }

    fn qty(count: u32) -> Quantity {
        Quantity::new(count).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates_in_place() {
        let repo = repo().await;
        let pid = ProductId::new(42);

        let first = repo.upsert(pid, Quantity::MIN).await.unwrap();
        assert_eq!(first.id, CartItemId::FIRST);

        let second = repo.upsert(pid, qty(5)).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.quantity.count(), 5);

        let stored = repo.get_by_product(pid).await.unwrap().unwrap();
        assert_eq!(stored, second);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let repo = repo().await;

        repo.upsert(ProductId::new(1), Quantity::MIN).await.unwrap();
        repo.upsert(ProductId::new(2), Quantity::MIN).await.unwrap();
        assert!(repo.delete_by_product(ProductId::new(2)).await.unwrap());

        let item = repo.upsert(ProductId::new(3), Quantity::MIN).await.unwrap();
        assert_eq!(item.id, CartItemId::new(3));
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let repo = repo().await;
        assert!(!repo.delete_by_product(ProductId::new(9)).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_is_insertion_ordered() {
        let repo = repo().await;
        for id in [30, 10, 20] {
            repo.upsert(ProductId::new(id), Quantity::MIN).await.unwrap();
        }
        repo.upsert(ProductId::new(30), qty(4)).await.unwrap();

        let products: Vec<i64> = repo
            .list(0, 10)
            .await
            .unwrap()
            .iter()
            .map(|i| i.product_id.get())
            .collect();
        assert_eq!(products, vec![30, 10, 20]);

        let tail = repo.list(2, 10).await.unwrap();
        assert_eq!(tail.len(), 1);
        assert!(repo.list(3, 10).await.unwrap().is_empty());
        assert!(repo.list(usize::MAX, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_totals() {
        let repo = repo().await;
        assert_eq!(repo.total_quantity().await.unwrap(), 0);

        repo.upsert(ProductId::new(1), qty(2)).await.unwrap();
        repo.upsert(ProductId::new(2), qty(3)).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(repo.total_quantity().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_clear_keeps_id_sequence() {
        let repo = repo().await;
        repo.upsert(ProductId::new(1), Quantity::MIN).await.unwrap();
        assert_eq!(repo.clear().await.unwrap(), 1);
        assert_eq!(repo.count().await.unwrap(), 0);

        let item = repo.upsert(ProductId::new(1), Quantity::MIN).await.unwrap();
        assert_eq!(item.id, CartItemId::new(2));
    }

    #[tokio::test]
    async fn test_check_constraint_rejects_zero_quantity() {
        let repo = repo().await;
        let err = sqlx::query(
            "INSERT INTO cart_items (product_id, quantity, created_at, updated_at) VALUES (1, 0, 'x', 'x')",
        )
        .execute(&repo.pool)
        .await
        .map_err(DbError::from)
        .unwrap_err();

        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[test]
    fn test_row_with_zero_quantity_is_invalid_data() {
        let row = CartItemRow {
            id: 1,
            product_id: 1,
            quantity: 0,
        };
        assert!(matches!(
            CartItem::try_from(row),
            Err(DbError::InvalidData { .. })
        ));
    }
}
