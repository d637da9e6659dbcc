//! # shopping
//!
//! Command-line front end for the cart repository.
//!
//! ```text
//! shopping increase 42
//! shopping --backend sqlite set 42 3
//! shopping show --page 2 --json
//! shopping script ./cart.txt
//! ```
//!
//! The cart store calls block, so `main` stays synchronous. Only the catalog
//! snapshot is loaded through a short-lived runtime.

mod config;
mod error;
mod logging;
mod session;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use shopping_core::{CartStore, InMemoryCartStore, InMemoryCatalog, ProductId, Quantity};
use shopping_db::{Database, DbConfig, WorkerBackedCartStore};
use tracing::{debug, info};

use crate::config::{AppConfig, BackendKind};
use crate::error::{CliError, CliResult};
use crate::session::{Action, Session};

#[derive(Parser)]
#[command(name = "shopping", author, version, about = "Shopping cart on the command line")]
struct Cli {
    /// Cart backend (overrides config and SHOPPING_BACKEND)
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendKind>,

    /// SQLite database file (overrides config and SHOPPING_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one of a product, creating the line if needed
    Increase { product_id: i64 },

    /// Remove one of a product; the line goes away at quantity 1
    Decrease { product_id: i64 },

    /// Set the quantity of a product's line
    Set { product_id: i64, quantity: u32 },

    /// Remove a product's line
    Delete { product_id: i64 },

    /// List cart lines, one page at a time
    Show {
        /// 1-based page number [default: 1]
        #[arg(long)]
        page: Option<usize>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Lines, quantities and subtotal priced from the catalog
    Summary {
        #[arg(long)]
        json: bool,
    },

    /// Browse the product catalog
    Products {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Run cart commands from a file, one per line, against one store
    Script { file: PathBuf },

    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        write: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(db) = cli.db {
        config.database.path = Some(db);
    }
    config.validate()?;

    logging::init_tracing(&config.logging.filter);
    debug!(
        source = ?config.source,
        backend = %config.backend,
        page_size = config.cart.page_size,
        "Configuration loaded"
    );

    let mut stdout = std::io::stdout().lock();

    let action = match cli.command {
        Commands::Increase { product_id } => Action::Increase(ProductId::new(product_id)),
        Commands::Decrease { product_id } => Action::Decrease(ProductId::new(product_id)),
        Commands::Set {
            product_id,
            quantity,
        } => Action::Set(ProductId::new(product_id), Quantity::new(quantity)?),
        Commands::Delete { product_id } => Action::Delete(ProductId::new(product_id)),
        Commands::Show { page, json } => Action::Show { page, json },
        Commands::Summary { json } => Action::Summary { json },
        Commands::Products { page } => Action::Products { page },
        Commands::Script { file } => {
            let session = open_session(&config, true)?;
            session.run_script(&file, &mut stdout)?;
            return Ok(());
        }
        Commands::Config { write } => {
            print!("{}", config.to_toml()?);
            if write {
                let path = config.save(cli.config.as_deref())?;
                eprintln!("wrote {}", path.display());
            }
            return Ok(());
        }
    };

    let session = open_session(&config, action.needs_catalog())?;
    session.execute(&action, &mut stdout)
}

fn open_session(config: &AppConfig, with_catalog: bool) -> CliResult<Session> {
    let db_path = config.database_path()?;

    let catalog = if with_catalog {
        load_catalog(&db_path)?
    } else {
        InMemoryCatalog::default()
    };

    let store: Box<dyn CartStore> = match config.backend {
        BackendKind::Memory => Box::new(InMemoryCartStore::new()),
        BackendKind::Sqlite => Box::new(WorkerBackedCartStore::open(DbConfig::new(&db_path))?),
    };

    info!(backend = %config.backend, path = ?db_path, "Cart store opened");
    Ok(Session::new(store, catalog, config.cart.page_size))
}

/// Reads every product into memory so rendering never touches the database.
fn load_catalog(path: &Path) -> CliResult<InMemoryCatalog> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let products = runtime.block_on(async {
        let db = Database::new(DbConfig::new(path)).await?;
        let products = db.products().all().await;
        db.close().await;
        products
    })?;

    debug!(count = products.len(), "Catalog loaded");
    Ok(products.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["shopping", "set", "4", "2", "--backend", "sqlite"]).unwrap();
        assert_eq!(cli.backend, Some(BackendKind::Sqlite));
        assert!(matches!(
            cli.command,
            Commands::Set {
                product_id: 4,
                quantity: 2
            }
        ));
    }

    #[test]
    fn test_sqlite_session_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.backend = BackendKind::Sqlite;
        config.database.path = Some(dir.path().join("cart.db"));

        {
            let session = open_session(&config, true).unwrap();
            let mut out = Vec::new();
            session
                .execute(&Action::Increase(ProductId::new(8)), &mut out)
                .unwrap();
        }

        let session = open_session(&config, false).unwrap();
        let mut out = Vec::new();
        session
            .execute(&Action::Increase(ProductId::new(8)), &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "product 8: quantity 2\n");
    }

    #[test]
    fn test_load_catalog_from_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = load_catalog(&dir.path().join("empty.db")).unwrap();
        assert!(catalog.is_empty());
    }
}
