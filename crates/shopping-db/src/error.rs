//! # Database Errors
//!
//! ```text
//!  sqlx::Error / MigrateError
//!        │
//!        ▼
//!  DbError            repositories, Database::new, seed
//!        │
//!        ▼
//!  CartError::Backend what a CartStore caller sees
//! ```
//!
//! SQLite reports constraint failures only as text
//! (`UNIQUE constraint failed: products.id`), so the sqlx conversion reads
//! the message to tell them apart.

use shopping_core::CartError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// `field` is `table.column` as SQLite names it. `value` is filled in by
    /// callers that know which value they inserted.
    #[error("{field} already holds '{value}'")]
    UniqueViolation { field: String, value: String },

    /// A `CHECK` failed, e.g. a cart quantity below 1 or a negative price.
    #[error("Constraint {constraint} rejected the row")]
    CheckViolation { constraint: String },

    /// The file could not be opened or created, or the handle is closed.
    #[error("Cannot open cart database: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Another process held the write lock past the busy timeout.
    #[error("Cart database is busy")]
    Busy,

    /// A stored value does not fit the domain type, e.g. `quantity = 0`.
    #[error("Invalid data in {column}: {value}")]
    InvalidData { column: String, value: String },

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn invalid_data(column: impl Into<String>, value: impl ToString) -> Self {
        DbError::InvalidData {
            column: column.into(),
            value: value.to_string(),
        }
    }

    fn from_sqlite_message(msg: &str) -> Self {
        if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
            DbError::UniqueViolation {
                field: field.to_string(),
                value: "unknown".to_string(),
            }
        } else if let Some(constraint) = msg.strip_prefix("CHECK constraint failed: ") {
            DbError::CheckViolation {
                constraint: constraint.to_string(),
            }
        } else if msg.starts_with("database is locked") {
            DbError::Busy
        } else {
            DbError::QueryFailed(msg.to_string())
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),
            sqlx::Error::Database(db_err) => DbError::from_sqlite_message(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::Busy,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("handle is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// `NotFound` included: a cart store decides absence itself, so a missing
/// row reaching a caller is a backend fault.
impl From<DbError> for CartError {
    fn from(err: DbError) -> Self {
        CartError::Backend(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shopping_core::ErrorKind;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_pool_errors() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::Busy
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_sqlite_messages() {
        assert!(matches!(
            DbError::from_sqlite_message("UNIQUE constraint failed: products.id"),
            DbError::UniqueViolation { ref field, .. } if field == "products.id"
        ));
        assert!(matches!(
            DbError::from_sqlite_message("CHECK constraint failed: quantity >= 1"),
            DbError::CheckViolation { .. }
        ));
        assert!(matches!(
            DbError::from_sqlite_message("database is locked"),
            DbError::Busy
        ));
        assert!(matches!(
            DbError::from_sqlite_message("no such table: cart_items"),
            DbError::QueryFailed(_)
        ));
    }

    #[test]
    fn test_db_errors_are_backend_cart_errors() {
        let cart: CartError = DbError::not_found("CartItem", 4).into();
        assert_eq!(cart.kind(), ErrorKind::Backend);
        assert_eq!(cart.to_string(), "Backend failure: CartItem not found: 4");

        let cart: CartError = DbError::invalid_data("quantity", 0).into();
        assert_eq!(cart.kind(), ErrorKind::Backend);
    }
}
