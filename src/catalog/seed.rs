//! Demo catalog and vector-document generation.
//!
//! Seeding is an offline step (`seed` binary); the chat server only reads.

use crate::catalog::models::{Category, Product, ProductMetadata, RetailerListing, VectorDocument};
use crate::db::Db;
use crate::error::{Result, ShopbotError};
use rusqlite::{params, Transaction};

pub const CATEGORIES: &[(i64, &str)] = &[(1, "Electronics"), (2, "Books"), (3, "Home Goods")];

/// (id, name, description, category_id, brand, model)
pub const PRODUCTS: &[(i64, &str, &str, i64, &str, &str)] = &[
    (1, "Laptop", "A high-performance laptop suitable for gaming and professional work.", 1, "TechPro", "TP-2024"),
    (2, "Smartphone", "A latest-gen smartphone with a great camera and 5G connectivity.", 1, "PhoneTech", "PT-X12"),
    (3, "Science Fiction Novel", "A captivating novel about space travel and aliens.", 2, "AuthorPress", "Space Odyssey"),
    (4, "Cookbook", "A book full of delicious and easy-to-make recipes.", 2, "CulinaryBooks", "Easy Cook"),
    (5, "Coffee Maker", "A drip coffee maker with a programmable timer.", 3, "BrewMaster", "BM-Pro"),
    (6, "Desk Chair", "An ergonomic desk chair for your home office.", 3, "OfficeComfort", "OC-Ergo"),
    (7, "Tablet", "A versatile tablet perfect for reading and media consumption.", 1, "TabletCorp", "TC-Tab10"),
    (8, "Headphones", "Wireless noise-canceling headphones with premium sound quality.", 1, "AudioTech", "AT-Wireless"),
];

/// (retailer, product_id, price, stock, location, contact, rating)
pub const LISTINGS: &[(&str, i64, f64, i64, &str, &str, f64)] = &[
    ("TechStore", 1, 1199.99, 50, "New York, NY", "contact@techstore.com", 4.5),
    ("GadgetHub", 1, 1249.99, 30, "Los Angeles, CA", "support@gadgethub.com", 4.2),
    ("ElectroMart", 1, 1179.99, 25, "Chicago, IL", "info@electromart.com", 4.7),
    ("TechWorld", 1, 1299.99, 15, "Miami, FL", "sales@techworld.com", 4.0),
    ("MobileWorld", 2, 799.99, 100, "San Francisco, CA", "hello@mobileworld.com", 4.6),
    ("PhoneCenter", 2, 819.99, 75, "Seattle, WA", "contact@phonecenter.com", 4.3),
    ("GadgetHub", 2, 789.99, 60, "Los Angeles, CA", "support@gadgethub.com", 4.2),
    ("TechStore", 2, 829.99, 40, "New York, NY", "contact@techstore.com", 4.5),
    ("WirelessZone", 2, 795.99, 80, "Austin, TX", "info@wirelesszone.com", 4.4),
    ("BookNook", 3, 15.99, 200, "Portland, OR", "books@booknook.com", 4.8),
    ("ReadersCorner", 3, 14.99, 150, "Boston, MA", "contact@readerscorner.com", 4.6),
    ("NovelWorld", 3, 16.99, 120, "Denver, CO", "support@novelworld.com", 4.4),
    ("BookMart", 3, 15.49, 180, "Phoenix, AZ", "info@bookmart.com", 4.5),
    ("CookingBooks", 4, 25.50, 90, "Nashville, TN", "chef@cookingbooks.com", 4.7),
    ("ReadersCorner", 4, 24.99, 110, "Boston, MA", "contact@readerscorner.com", 4.6),
    ("KitchenReads", 4, 26.99, 70, "Atlanta, GA", "books@kitchenreads.com", 4.3),
    ("BookNook", 4, 25.99, 85, "Portland, OR", "books@booknook.com", 4.8),
    ("KitchenPlus", 5, 49.99, 80, "Dallas, TX", "kitchen@kitchenplus.com", 4.5),
    ("HomeAppliances", 5, 52.99, 60, "Minneapolis, MN", "sales@homeappliances.com", 4.2),
    ("BrewStore", 5, 47.99, 90, "Sacramento, CA", "brew@brewstore.com", 4.6),
    ("KitchenWorld", 5, 54.99, 45, "Tampa, FL", "info@kitchenworld.com", 4.1),
    ("HomeEssentials", 6, 149.99, 40, "Charlotte, NC", "home@homeessentials.com", 4.4),
    ("OfficeDepot", 6, 159.99, 35, "Indianapolis, IN", "office@officedepot.com", 4.2),
    ("FurnitureMax", 6, 139.99, 50, "Kansas City, MO", "furniture@furnituremax.com", 4.6),
    ("ComfortSeating", 6, 169.99, 25, "Louisville, KY", "comfort@comfortseating.com", 4.3),
    ("TechStore", 7, 329.99, 45, "New York, NY", "contact@techstore.com", 4.5),
    ("GadgetHub", 7, 319.99, 55, "Los Angeles, CA", "support@gadgethub.com", 4.2),
    ("TabletWorld", 7, 339.99, 30, "Orlando, FL", "tablets@tabletworld.com", 4.4),
    ("ElectroMart", 7, 324.99, 40, "Chicago, IL", "info@electromart.com", 4.7),
    ("AudioStore", 8, 199.99, 70, "Las Vegas, NV", "audio@audiostore.com", 4.8),
    ("SoundWorld", 8, 189.99, 85, "Detroit, MI", "sound@soundworld.com", 4.5),
    ("TechStore", 8, 209.99, 50, "New York, NY", "contact@techstore.com", 4.5),
    ("MusicGear", 8, 194.99, 60, "Nashville, TN", "gear@musicgear.com", 4.6),
    ("GadgetHub", 8, 199.99, 45, "Los Angeles, CA", "support@gadgethub.com", 4.2),
];

/// What a seeding run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    pub listings: usize,
    pub vector_documents: usize,
    /// True when the catalog already existed and nothing was written
    pub skipped: bool,
}

/// Insert the demo catalog and its (not yet embedded) vector documents.
///
/// Without `reset`, an already seeded database is left untouched.
pub async fn seed_catalog(db: &Db, reset: bool) -> Result<SeedSummary> {
    let summary = db
        .with_connection(move |conn| {
            let tx = conn.transaction()?;

            if reset {
                log::info!("Clearing existing catalog");
                tx.execute_batch(
                    "DELETE FROM product_vectors; DELETE FROM retailers; \
                     DELETE FROM products; DELETE FROM categories;",
                )?;
            } else {
                let existing: i64 = tx.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
                if existing > 0 {
                    log::info!("Catalog already seeded ({} categories), skipping", existing);
                    return Ok(SeedSummary {
                        skipped: true,
                        ..SeedSummary::default()
                    });
                }
            }

            insert_catalog(&tx)?;
            let documents = build_vector_documents(&tx)?;
            for doc in &documents {
                let metadata_json = serde_json::to_string(&doc.metadata)
                    .map_err(|e| ShopbotError::VectorStore(format!("metadata encode: {}", e)))?;
                tx.execute(
                    "INSERT INTO product_vectors (product_id, content, metadata_json) VALUES (?1, ?2, ?3)",
                    params![doc.product_id, doc.content, metadata_json],
                )?;
            }
            tx.commit()?;

            Ok(SeedSummary {
                categories: CATEGORIES.len(),
                products: PRODUCTS.len(),
                listings: LISTINGS.len(),
                vector_documents: documents.len(),
                skipped: false,
            })
        })
        .await?;

    if !summary.skipped {
        log::info!(
            "Seeded {} categories, {} products, {} retailer listings, {} vector documents",
            summary.categories,
            summary.products,
            summary.listings,
            summary.vector_documents
        );
    }
    Ok(summary)
}

/// Demo categories as typed rows
pub fn categories() -> Vec<Category> {
    CATEGORIES
        .iter()
        .map(|(id, name)| Category { id: *id, name: name.to_string() })
        .collect()
}

/// Demo products as typed rows
pub fn products() -> Vec<Product> {
    PRODUCTS
        .iter()
        .map(|(id, name, description, category_id, brand, model)| Product {
            id: *id,
            name: name.to_string(),
            description: Some(description.to_string()),
            category_id: *category_id,
            brand: Some(brand.to_string()),
            model: Some(model.to_string()),
        })
        .collect()
}

/// Demo retailer listings as typed rows; ids follow insertion order
pub fn listings() -> Vec<RetailerListing> {
    LISTINGS
        .iter()
        .enumerate()
        .map(|(idx, (retailer, product_id, price, stock, location, contact, rating))| RetailerListing {
            id: idx as i64 + 1,
            retailer: retailer.to_string(),
            product_id: *product_id,
            price: *price,
            stock: *stock,
            location: Some(location.to_string()),
            contact: Some(contact.to_string()),
            rating: Some(*rating),
        })
        .collect()
}

fn insert_catalog(tx: &Transaction<'_>) -> Result<()> {
    for category in categories() {
        tx.execute(
            "INSERT INTO categories (id, name) VALUES (?1, ?2)",
            params![category.id, category.name],
        )?;
    }
    for product in products() {
        tx.execute(
            "INSERT INTO products (id, name, description, category_id, brand, model) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                product.id,
                product.name,
                product.description,
                product.category_id,
                product.brand,
                product.model
            ],
        )?;
    }
    for listing in listings() {
        tx.execute(
            "INSERT INTO retailers (id, name, product_id, price, stock, location, contact, rating) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                listing.id,
                listing.retailer,
                listing.product_id,
                listing.price,
                listing.stock,
                listing.location,
                listing.contact,
                listing.rating
            ],
        )?;
    }
    Ok(())
}

/// One document per product that has at least one listing
fn build_vector_documents(tx: &Transaction<'_>) -> Result<Vec<VectorDocument>> {
    let mut stmt = tx.prepare(
        r#"
        SELECT p.id, p.name, p.description, p.category_id, p.brand, p.model, c.name,
               MIN(r.price), MAX(r.price), AVG(r.price)
        FROM products p
        JOIN categories c ON p.category_id = c.id
        JOIN retailers r ON r.product_id = p.id
        GROUP BY p.id
        ORDER BY p.id
        "#,
    )?;
    let documents = stmt
        .query_map([], |row| {
            let product = Product {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                category_id: row.get(3)?,
                brand: row.get(4)?,
                model: row.get(5)?,
            };
            let metadata = ProductMetadata {
                product_id: product.id,
                name: product.name.clone(),
                brand: product.brand.clone(),
                model: product.model.clone(),
                category: row.get(6)?,
                min_price: row.get(7)?,
                max_price: row.get(8)?,
                avg_price: row.get(9)?,
            };
            Ok(VectorDocument::for_product(&product, metadata))
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(documents)
}
