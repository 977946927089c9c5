use serde::{Deserialize, Serialize};

/// Product category (static reference data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Catalog product. Prices live on retailer listings, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category_id: i64,
    pub brand: Option<String>,
    pub model: Option<String>,
}

/// One retailer's offer for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetailerListing {
    pub id: i64,
    pub retailer: String,
    pub product_id: i64,
    pub price: f64,
    pub stock: i64,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub rating: Option<f64>,
}

/// Category row as returned to the categories agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    /// Present only for the "with counts" query
    pub product_count: Option<i64>,
}

/// Aggregated price range for one product across its retailers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPriceSummary {
    pub name: String,
    pub category: String,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub retailer_count: i64,
}

/// Plain name + category row for catalog listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductEntry {
    pub name: String,
    pub category: String,
}

/// Retailer listing joined with its product name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetailerOffer {
    pub retailer: String,
    pub product: String,
    pub price: f64,
    pub stock: i64,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub rating: Option<f64>,
}

/// Metadata stored next to each product's vector document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub product_id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub category: String,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
}

/// Text blob embedded for similarity search, plus its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    pub product_id: i64,
    pub content: String,
    pub metadata: ProductMetadata,
}

impl VectorDocument {
    /// Build the document text for a product and its price statistics
    pub fn for_product(product: &Product, metadata: ProductMetadata) -> Self {
        let brand = product.brand.as_deref().unwrap_or("an unknown brand");
        let model = product.model.as_deref().unwrap_or("n/a");
        let description = product.description.as_deref().unwrap_or("");
        let content = format!(
            "Product: {name}\n\
             Brand: {brand}\n\
             Model: {model}\n\
             Category: {category}\n\
             Description: {description}\n\
             Price Range: ${min:.2} - ${max:.2}\n\
             Average Price: ${avg:.2}\n\
             \n\
             This {name} is a {category_lower} product from {brand}. {description}\n\
             Available at multiple retailers with prices ranging from ${min:.2} to ${max:.2}.",
            name = product.name,
            category = metadata.category,
            category_lower = metadata.category.to_lowercase(),
            min = metadata.min_price,
            max = metadata.max_price,
            avg = metadata.avg_price,
        );

        Self {
            product_id: product.id,
            content,
            metadata,
        }
    }
}
