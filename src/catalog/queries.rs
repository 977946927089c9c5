//! Fixed, parameterized catalog queries used by the agents.
//!
//! Every statement is a constant template; user text only ever reaches SQLite
//! as a bound parameter.

use crate::catalog::models::{CategorySummary, ProductEntry, ProductPriceSummary, RetailerOffer};
use crate::db::Db;
use crate::error::Result;
use rusqlite::params;

/// Which products a query is restricted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    All,
    /// Product name contains the term (case-insensitive for ASCII)
    NameLike(String),
    /// Exact category name (case-insensitive)
    Category(String),
    /// Free text matched against name, description and brand
    Text(String),
}

impl ProductFilter {
    /// WHERE fragment and its `?1` binding. `?1 IS NULL` with a NULL binding matches everything.
    fn clause(&self) -> (&'static str, Option<String>) {
        match self {
            ProductFilter::All => ("?1 IS NULL", None),
            ProductFilter::NameLike(term) => ("p.name LIKE ?1 ESCAPE '\\'", Some(like_pattern(term))),
            ProductFilter::Category(name) => ("c.name = ?1 COLLATE NOCASE", Some(name.clone())),
            ProductFilter::Text(term) => (
                "(p.name LIKE ?1 ESCAPE '\\' OR p.description LIKE ?1 ESCAPE '\\' OR p.brand LIKE ?1 ESCAPE '\\')",
                Some(like_pattern(term)),
            ),
        }
    }

    /// Human readable description used in "not found" replies
    pub fn describe(&self) -> String {
        match self {
            ProductFilter::All => "any product".to_string(),
            ProductFilter::NameLike(term) | ProductFilter::Text(term) => format!("\"{}\"", term),
            ProductFilter::Category(name) => format!("the {} category", name),
        }
    }
}

fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Ordering for product price summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductOrder {
    Catalog,
    CheapestFirst,
}

/// Ordering for retailer offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOrder {
    PriceAscending,
    TopRated,
}

/// `None` maps to SQLite's "no limit"
fn sql_limit(limit: Option<usize>) -> i64 {
    limit.map(|l| l as i64).unwrap_or(-1)
}

/// All category names in id order
pub async fn list_categories(db: &Db) -> Result<Vec<CategorySummary>> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM categories ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CategorySummary {
                    name: row.get(0)?,
                    product_count: None,
                })
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(rows)
    })
    .await
}

/// Categories with the number of products in each, busiest first
pub async fn categories_with_counts(db: &Db) -> Result<Vec<CategorySummary>> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare(
            r#"
            SELECT c.name, COUNT(p.id) AS product_count
            FROM categories c
            LEFT JOIN products p ON c.id = p.category_id
            GROUP BY c.id, c.name
            ORDER BY product_count DESC, c.id
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CategorySummary {
                    name: row.get(0)?,
                    product_count: Some(row.get(1)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(rows)
    })
    .await
}

/// Price range per product across all its retailer listings
pub async fn product_price_summaries(
    db: &Db,
    filter: &ProductFilter,
    order: ProductOrder,
    limit: Option<usize>,
) -> Result<Vec<ProductPriceSummary>> {
    let (clause, binding) = filter.clause();
    let order_by = match order {
        ProductOrder::Catalog => "p.id",
        ProductOrder::CheapestFirst => "min_price ASC, p.id",
    };
    let sql = format!(
        r#"
        SELECT p.name, c.name AS category,
               MIN(r.price) AS min_price, MAX(r.price) AS max_price, AVG(r.price) AS avg_price,
               COUNT(r.id) AS retailer_count
        FROM products p
        JOIN categories c ON p.category_id = c.id
        JOIN retailers r ON p.id = r.product_id
        WHERE {clause}
        GROUP BY p.id, p.name, c.name
        ORDER BY {order_by}
        LIMIT ?2
        "#
    );
    let limit = sql_limit(limit);

    db.with_connection(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![binding, limit], |row| {
                Ok(ProductPriceSummary {
                    name: row.get(0)?,
                    category: row.get(1)?,
                    min_price: row.get(2)?,
                    max_price: row.get(3)?,
                    avg_price: row.get(4)?,
                    retailer_count: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(rows)
    })
    .await
}

/// Every product with its category, grouped by category then name
pub async fn product_listing(db: &Db) -> Result<Vec<ProductEntry>> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare(
            r#"
            SELECT p.name, c.name AS category
            FROM products p
            JOIN categories c ON p.category_id = c.id
            ORDER BY c.name, p.name
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ProductEntry {
                    name: row.get(0)?,
                    category: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(rows)
    })
    .await
}

/// Retailer listings for the filtered products
pub async fn retailer_offers(
    db: &Db,
    filter: &ProductFilter,
    order: OfferOrder,
    limit: Option<usize>,
) -> Result<Vec<RetailerOffer>> {
    let (clause, binding) = filter.clause();
    let order_by = match order {
        OfferOrder::PriceAscending => "r.price ASC, r.id",
        OfferOrder::TopRated => "r.rating DESC, r.price ASC, r.id",
    };
    let sql = format!(
        r#"
        SELECT r.name, p.name AS product, r.price, r.stock, r.location, r.contact, r.rating
        FROM retailers r
        JOIN products p ON r.product_id = p.id
        JOIN categories c ON p.category_id = c.id
        WHERE {clause}
        ORDER BY {order_by}
        LIMIT ?2
        "#
    );
    let limit = sql_limit(limit);

    db.with_connection(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![binding, limit], |row| {
                Ok(RetailerOffer {
                    retailer: row.get(0)?,
                    product: row.get(1)?,
                    price: row.get(2)?,
                    stock: row.get(3)?,
                    location: row.get(4)?,
                    contact: row.get(5)?,
                    rating: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(rows)
    })
    .await
}

/// Number of categories; a zero means the catalog was never seeded
pub async fn category_count(db: &Db) -> Result<i64> {
    db.with_connection(|conn| {
        let count = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seeded_db;

    #[tokio::test]
    async fn test_list_categories() {
        let (db, _dir) = seeded_db().await;
        let categories = list_categories(&db).await.unwrap();
        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Electronics", "Books", "Home Goods"]);
        assert!(categories.iter().all(|c| c.product_count.is_none()));
    }

    #[tokio::test]
    async fn test_categories_with_counts() {
        let (db, _dir) = seeded_db().await;
        let categories = categories_with_counts(&db).await.unwrap();
        assert_eq!(categories[0].name, "Electronics");
        assert_eq!(categories[0].product_count, Some(4));
        let total: i64 = categories.iter().filter_map(|c| c.product_count).sum();
        assert_eq!(total, 8);
    }

    #[tokio::test]
    async fn test_price_summary_for_smartphone() {
        let (db, _dir) = seeded_db().await;
        let rows = product_price_summaries(
            &db,
            &ProductFilter::NameLike("phone".to_string()),
            ProductOrder::Catalog,
            Some(5),
        )
        .await
        .unwrap();

        // "phone" also matches "Headphones"
        let phone = rows.iter().find(|r| r.name == "Smartphone").unwrap();
        assert_eq!(phone.retailer_count, 5);
        assert!((phone.min_price - 789.99).abs() < 1e-9);
        assert!((phone.max_price - 829.99).abs() < 1e-9);
        assert!(phone.min_price <= phone.avg_price && phone.avg_price <= phone.max_price);
    }

    #[tokio::test]
    async fn test_price_summary_cheapest_first_and_limit() {
        let (db, _dir) = seeded_db().await;
        let rows = product_price_summaries(&db, &ProductFilter::All, ProductOrder::CheapestFirst, Some(3))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "Science Fiction Novel");
        assert!(rows.windows(2).all(|w| w[0].min_price <= w[1].min_price));
    }

    #[tokio::test]
    async fn test_category_filter_is_case_insensitive() {
        let (db, _dir) = seeded_db().await;
        let rows = product_price_summaries(
            &db,
            &ProductFilter::Category("books".to_string()),
            ProductOrder::Catalog,
            None,
        )
        .await
        .unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Science Fiction Novel", "Cookbook"]);
    }

    #[tokio::test]
    async fn test_like_wildcards_are_escaped() {
        let (db, _dir) = seeded_db().await;
        let rows = product_price_summaries(
            &db,
            &ProductFilter::Text("%".to_string()),
            ProductOrder::Catalog,
            None,
        )
        .await
        .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_retailer_offers_price_ascending() {
        let (db, _dir) = seeded_db().await;
        let offers = retailer_offers(
            &db,
            &ProductFilter::NameLike("Smartphone".to_string()),
            OfferOrder::PriceAscending,
            None,
        )
        .await
        .unwrap();
        assert_eq!(offers.len(), 5);
        assert_eq!(offers[0].retailer, "GadgetHub");
        assert!(offers.windows(2).all(|w| w[0].price <= w[1].price));
        assert!(offers.iter().all(|o| o.product == "Smartphone"));
    }

    #[tokio::test]
    async fn test_retailer_offers_top_rated() {
        let (db, _dir) = seeded_db().await;
        let offers = retailer_offers(&db, &ProductFilter::All, OfferOrder::TopRated, Some(10))
            .await
            .unwrap();
        assert_eq!(offers.len(), 10);
        assert_eq!(offers[0].rating, Some(4.8));
    }

    #[tokio::test]
    async fn test_product_listing_grouped() {
        let (db, _dir) = seeded_db().await;
        let entries = product_listing(&db).await.unwrap();
        assert_eq!(entries.len(), 8);
        assert_eq!(entries[0].category, "Books");
        assert_eq!(entries[0].name, "Cookbook");
    }
}
