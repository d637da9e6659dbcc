//! # Catalog Seed Generator
//!
//! Populates the products table with generated catalog entries.
//!
//! ## Usage
//! ```bash
//! # Generate 100 products (default)
//! cargo run -p shopping-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p shopping-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p shopping-db --bin seed -- --db ./data/shopping.db
//! ```
//!
//! Without `--db` the catalog goes to the same default file the `shopping`
//! CLI reads.
//!
//! Each product gets a title of `{Name} {Variant}`, a placeholder image URL
//! and a price between 1.99 and 25.98.

use std::path::PathBuf;

use clap::Parser;
use shopping_core::{Money, Product, ProductId};
use shopping_db::{default_database_path, Database, DbConfig};

/// Product names for generated titles.
const NAMES: &[&str] = &[
    "Oolong Tea",
    "Espresso Beans",
    "Sparkling Water",
    "Dark Chocolate",
    "Sea Salt Crackers",
    "Greek Yogurt",
    "Sourdough Loaf",
    "Olive Oil",
    "Basmati Rice",
    "Maple Syrup",
    "Peanut Butter",
    "Rolled Oats",
    "Almond Milk",
    "Honey",
    "Green Lentils",
    "Tomato Passata",
    "Cheddar",
    "Blueberries",
    "Granola",
    "Kimchi",
];

/// Variants with their price addon in minor units.
const VARIANTS: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 150),
    ("Large", 300),
    ("Family Pack", 600),
    ("Organic", 450),
];

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Shopping catalog seed data generator")]
struct Args {
    /// Number of products to generate
    #[arg(short, long, default_value_t = 100)]
    count: usize,

    /// Database file path [default: shopping.db in the app data directory]
    #[arg(short, long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let path = match args.db {
        Some(path) => path,
        None => default_database_path()?,
    };

    println!("Shopping Catalog Seed Generator");
    println!("===============================");
    println!("Database: {}", path.display());
    println!("Products: {}", args.count);
    println!();

    let db = Database::new(DbConfig::new(&path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..args.count {
        let product = generate_product(seed);

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.id, e);
            continue;
        }

        generated += 1;
        if generated % 50 == 0 {
            println!("  Generated {} products...", generated);
        }
    }

    println!();
    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    db.close().await;
    Ok(())
}

/// Generates the product for position `seed`. Ids start at 1.
fn generate_product(seed: usize) -> Product {
    let name = NAMES[seed % NAMES.len()];
    let (variant, price_addon) = VARIANTS[(seed / NAMES.len()) % VARIANTS.len()];
    let round = seed / (NAMES.len() * VARIANTS.len());

    let title = if round == 0 {
        format!("{} {}", name, variant)
    } else {
        format!("{} {} #{}", name, variant, round + 1)
    };

    // 1.99 - 19.98 base + variant addon
    let base_price = 199 + ((seed * 37) % 1800) as i64;

    let id = seed as i64 + 1;
    Product::new(
        ProductId::new(id),
        title,
        format!("https://picsum.photos/seed/{}/200", id),
        Money::from_minor(base_price + price_addon),
    )
}
