pub mod models;
pub mod queries;
pub mod seed;

pub use models::{
    Category, CategorySummary, Product, ProductEntry, ProductMetadata, ProductPriceSummary,
    RetailerListing, RetailerOffer, VectorDocument,
};
pub use queries::{OfferOrder, ProductFilter, ProductOrder};
pub use seed::{seed_catalog, SeedSummary};
