//! # Seed Data Generator
//!
//! Populates the catalog with products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 products (default)
//! cargo run -p shop-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p shop-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p shop-db --bin seed -- --db ./data/shop.db
//! ```
//!
//! ## Generated Products
//! Products are spread over five categories (pork, beef, turkey, lamb,
//! furniture). Prices fall between 5.00 and 1000.00 and roughly four out
//! of five products are in stock. Output is deterministic for a given
//! count.

use std::env;

use shop_core::{Money, NewProduct};
use shop_db::{Database, DbConfig};

/// Product categories with name stems for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    ("pork", &["Ribs", "Chops", "Loin", "Belly", "Sausage", "Ham"]),
    ("beef", &["Brisket", "Ribeye", "Sirloin", "Mince", "Tenderloin", "Short ribs"]),
    ("turkey", &["Breast", "Thighs", "Drumsticks", "Mince", "Wings"]),
    ("lamb", &["Shoulder", "Leg", "Rack", "Chops", "Shank"]),
    ("furniture", &["Oak chair", "Pine table", "Bookshelf", "Sofa", "Bed frame", "Desk"]),
];

/// Descriptors combined with stems to vary names.
const DESCRIPTORS: &[&str] = &["Classic", "Farm", "Premium", "Select", "Rustic", "Smoked"];

const MIN_PRICE_CENTS: i64 = 500;
const MAX_PRICE_CENTS: i64 = 100_000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./shop.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Shop Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./shop.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Shop Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut generated = 0;
    let mut in_stock = 0;

    for seed in 0..count {
        let product = generate_product(seed)?;
        if product.in_stock {
            in_stock += 1;
        }

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.name, e);
            continue;
        }

        generated += 1;
        if generated % 100 == 0 {
            println!("  Generated {} products...", generated);
        }
    }

    println!();
    println!("✓ Generated {} products ({} in stock) in {:?}", generated, in_stock, start.elapsed());

    db.close().await;
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product from its sequence number.
fn generate_product(seed: usize) -> Result<NewProduct, shop_core::ValidationError> {
    let (category, stems) = CATEGORIES[seed % CATEGORIES.len()];
    let stem = stems[(seed / CATEGORIES.len()) % stems.len()];
    let descriptor = DESCRIPTORS[(seed * 7) % DESCRIPTORS.len()];

    let name = format!("{} {} #{}", descriptor, stem.to_lowercase(), seed + 1);

    // Spread prices over the whole range without a RNG
    let span = MAX_PRICE_CENTS - MIN_PRICE_CENTS;
    let price_cents = MIN_PRICE_CENTS + ((seed as i64 * 7919) % (span + 1));

    // Every fifth product is out of stock
    let in_stock = seed % 5 != 4;

    Ok(NewProduct::new(name, Money::from_cents(price_cents))?
        .with_category(category)
        .with_description(format!("{} {} from the {} range.", descriptor, stem.to_lowercase(), category))
        .with_in_stock(in_stock))
}
