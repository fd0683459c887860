//! # Seed Data Generator
//!
//! Populates the database with a facility's consumables for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p stockroom-db --bin seed
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! Items are created empty with their minimum levels, then stocked through
//! Receive transactions from the vendor, so the Ledger accounts for every
//! unit on hand.

use std::env;
use stockroom_core::{Category, FloorLocation, Item, Quantity, TransactionDraft, TransactionType};
use stockroom_db::{Database, DbConfig, SqliteStore};
use stockroom_engine::InventoryStore;
use uuid::Uuid;

/// (name, category, unit, opening stock, min level), quantities in hundredths.
const ITEMS: &[(&str, Category, &str, i64, i64)] = &[
    ("Tissue Roll", Category::Housekeeping, "pcs", 12_000, 5_000),
    ("Hand Soap", Category::Housekeeping, "bottles", 2_400, 1_000),
    ("Floor Cleaner", Category::Housekeeping, "litres", 4_550, 2_000),
    ("Phenyl", Category::Housekeeping, "litres", 1_500, 2_000),
    ("Garbage Bags", Category::Housekeeping, "packs", 3_000, 1_500),
    ("Glass Cleaner", Category::Housekeeping, "bottles", 800, 500),
    ("Mop Refill", Category::Housekeeping, "pcs", 600, 400),
    ("Air Freshener", Category::Housekeeping, "cans", 1_800, 600),
    ("Tea Leaves", Category::Pantry, "kg", 750, 200),
    ("Coffee Powder", Category::Pantry, "kg", 325, 200),
    ("Sugar", Category::Pantry, "kg", 2_000, 500),
    ("Milk Powder", Category::Pantry, "kg", 150, 300),
    ("Paper Cups", Category::Pantry, "packs", 4_000, 1_000),
    ("Drinking Water", Category::Pantry, "cans", 2_500, 1_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stockroom_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./stockroom_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockroom Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.items().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let store = SqliteStore::new(db.clone());
    let mut stocked = 0;

    for (name, category, unit, opening, min_level) in ITEMS {
        let item = Item {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            category: *category,
            quantity: Quantity::zero(),
            unit: unit.to_string(),
            min_level: Quantity::from_hundredths(*min_level),
        };
        if let Err(e) = db.items().insert(&item).await {
            eprintln!("Failed to insert {}: {}", name, e);
            continue;
        }

        let receive = TransactionDraft {
            kind: TransactionType::Receive,
            item_name: name.to_string(),
            quantity: Quantity::from_hundredths(*opening),
            unit: unit.to_string(),
            location: Some(FloorLocation::Vendor),
            person_name: "Opening Stock".to_string(),
            notes: Some("Initial count".to_string()),
            previous_quantity: None,
            category_hint: Some(*category),
        };
        if let Err(e) = store.submit_transaction(&receive).await {
            eprintln!("Failed to stock {}: {}", name, e);
            continue;
        }

        stocked += 1;
    }

    let low = store
        .fetch_inventory()
        .await?
        .iter()
        .filter(|item| item.is_low_stock())
        .count();

    println!();
    println!("✓ Stocked {} items ({} low on stock)", stocked, low);
    println!("✓ Seed complete!");

    Ok(())
}
