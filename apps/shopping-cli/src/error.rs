//! # CLI Error Types
//!
//! Everything that can end a `shopping` invocation, and the exit code it
//! maps to.
//!
//! | Exit code | Cause                                      |
//! |-----------|--------------------------------------------|
//! | 1         | Backend, database, I/O, output failures    |
//! | 2         | Invalid argument, configuration or script  |
//! | 3         | Cart line or product not found             |

use std::path::PathBuf;

use shopping_core::{CartError, ErrorKind};
use shopping_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// A script line that is not a command.
    #[error("{}:{line}: {message}", path.display())]
    Script {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Cart(err) => match err.kind() {
                ErrorKind::NotFound => 3,
                ErrorKind::InvalidArgument => 2,
                ErrorKind::Backend => 1,
            },
            CliError::InvalidConfig(_) | CliError::ConfigParse(_) | CliError::Script { .. } => 2,
            _ => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shopping_core::ProductId;

    #[test]
    fn test_exit_codes() {
        let not_found = CliError::from(CartError::CartItemNotFound(ProductId::new(1)));
        assert_eq!(not_found.exit_code(), 3);

        let backend = CliError::from(CartError::backend("gone"));
        assert_eq!(backend.exit_code(), 1);

        assert_eq!(CliError::InvalidConfig("x".into()).exit_code(), 2);
    }

    #[test]
    fn test_script_error_message() {
        let err = CliError::Script {
            path: PathBuf::from("cart.txt"),
            line: 4,
            message: "unknown command 'add'".into(),
        };
        assert_eq!(err.to_string(), "cart.txt:4: unknown command 'add'");
    }
}
