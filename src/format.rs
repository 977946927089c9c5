//! Turns catalog rows into the chat reply text.
//!
//! Everything here is a pure function of its input, so identical rows always
//! render byte-identical replies.

use crate::catalog::{CategorySummary, ProductEntry, ProductPriceSummary, RetailerOffer};

const CATEGORY_ICONS: &[(&str, &str)] = &[
    ("electronics", "💻"),
    ("books", "📚"),
    ("home goods", "🏠"),
    ("clothing", "👕"),
    ("sports", "⚽"),
    ("toys", "🧸"),
];

/// Matched as substrings of the lower-cased retailer name, first hit wins
const RETAILER_ICONS: &[(&str, &str)] = &[
    ("amazon", "📦"),
    ("walmart", "🛒"),
    ("target", "🎯"),
    ("bestbuy", "🔌"),
    ("mobileworld", "📱"),
    ("techstore", "💻"),
    ("gadgethub", "🔧"),
    ("booknook", "📚"),
    ("kitchenplus", "🍳"),
    ("audiostore", "🎵"),
];

/// Placeholder image ids, matched against the lower-cased product name.
/// `headphones` precedes `phone` and `cookbook` precedes `book`.
const IMAGE_IDS: &[(&str, u32)] = &[
    ("laptop", 1),
    ("headphones", 9),
    ("smartphone", 2),
    ("phone", 2),
    ("cookbook", 4),
    ("book", 3),
    ("novel", 3),
    ("coffee", 5),
    ("maker", 5),
    ("chair", 6),
    ("desk", 6),
    ("tablet", 7),
];
const DEFAULT_IMAGE_ID: u32 = 16;

/// Stock bucket shown on retailer cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    InStock,
    Limited,
    Low,
    Out,
}

impl StockLevel {
    pub fn from_stock(stock: i64) -> Self {
        match stock {
            s if s > 50 => StockLevel::InStock,
            s if s > 10 => StockLevel::Limited,
            s if s > 0 => StockLevel::Low,
            _ => StockLevel::Out,
        }
    }

    pub fn label(stock: i64) -> String {
        match Self::from_stock(stock) {
            StockLevel::InStock => format!("🟢 **In Stock** ({} available)", stock),
            StockLevel::Limited => format!("🟡 **Limited Stock** ({} available)", stock),
            StockLevel::Low => format!("🟠 **Low Stock** ({} available)", stock),
            StockLevel::Out => "🔴 **Out of Stock**".to_string(),
        }
    }
}

/// `$1,200` at or above a thousand, `$799.99` below
pub fn format_price(price: f64) -> String {
    if price >= 1000.0 {
        format!("${}", group_thousands(price.round() as i64))
    } else {
        format!("${:.2}", price)
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

/// Collapses to one price when both ends render the same
fn price_range(min: f64, max: f64) -> String {
    let (low, high) = (format_price(min), format_price(max));
    if low == high {
        low
    } else {
        format!("{} - {}", low, high)
    }
}

fn rating_display(rating: Option<f64>) -> String {
    match rating {
        Some(r) => format!("{} ({:.1}/5.0)", "⭐".repeat(r.floor().max(0.0) as usize), r),
        None => "Not rated".to_string(),
    }
}

fn category_icon(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    CATEGORY_ICONS
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|(_, icon)| *icon)
        .unwrap_or("📁")
}

fn retailer_icon(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    RETAILER_ICONS
        .iter()
        .find(|(key, _)| lower.contains(key))
        .map(|(_, icon)| *icon)
        .unwrap_or("🏪")
}

pub fn product_image_url(product: &str) -> String {
    let lower = product.to_lowercase();
    let id = IMAGE_IDS
        .iter()
        .find(|(key, _)| lower.contains(key))
        .map(|(_, id)| *id)
        .unwrap_or(DEFAULT_IMAGE_ID);
    format!("https://picsum.photos/200/200?random={}", id)
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

fn push_commentary(out: &mut String, commentary: Option<&str>) {
    if let Some(text) = commentary.map(str::trim).filter(|t| !t.is_empty()) {
        out.push('\n');
        out.push_str(text);
        out.push('\n');
    }
}

pub fn format_categories(rows: &[CategorySummary], commentary: Option<&str>) -> String {
    let mut out = format!("🏪 **Available Categories ({}):**\n\n", rows.len());
    let lines: Vec<String> = rows
        .iter()
        .map(|c| match c.product_count {
            Some(n) => format!("{} **{}** ({})", category_icon(&c.name), c.name, plural(n.max(0) as usize, "product")),
            None => format!("{} **{}**", category_icon(&c.name), c.name),
        })
        .collect();
    out.push_str(&lines.join("\n"));
    out.push('\n');
    push_commentary(&mut out, commentary);
    out.push_str("\n💡 *Try asking: \"Show me electronics\" or \"What's in the books category?\"*");
    out
}

pub fn format_product_summaries(rows: &[ProductPriceSummary], commentary: Option<&str>) -> String {
    let mut out = format!("🔍 **Found {}:**\n\n", plural(rows.len(), "product"));
    for p in rows {
        let average = if format_price(p.min_price) == format_price(p.max_price) {
            String::new()
        } else {
            format!(" (avg {})", format_price(p.avg_price))
        };
        out.push_str(&format!(
            "🛍️ **{}**\n📂 Category: {}\n💰 Price Range: {}{}\n🏪 Available at: {}\n🖼️ Image: {}\n\n",
            p.name,
            p.category,
            price_range(p.min_price, p.max_price),
            average,
            plural(p.retailer_count.max(0) as usize, "retailer"),
            product_image_url(&p.name),
        ));
    }
    push_commentary(&mut out, commentary);
    out.push_str("\n💡 *Ask \"Who sells [product]?\" to see specific retailers and their prices!*");
    out
}

/// Plain name list grouped under category headings (rows arrive sorted by category)
pub fn format_product_listing(rows: &[ProductEntry], commentary: Option<&str>) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current: Option<&str> = None;
    for entry in rows {
        if current != Some(entry.category.as_str()) {
            if current.is_some() {
                lines.push(String::new());
            }
            lines.push(format!("**{}:**", entry.category));
            current = Some(entry.category.as_str());
        }
        lines.push(format!("• {}", entry.name));
    }

    let mut out = format!("🛍️ **Available Products:**\n\n{}\n", lines.join("\n"));
    push_commentary(&mut out, commentary);
    out.push_str("\n💡 *Ask about specific products for pricing and retailer info!*");
    out
}

pub fn format_retailer_offers(rows: &[RetailerOffer], commentary: Option<&str>) -> String {
    let product = match rows.first() {
        Some(first) if rows.iter().all(|r| r.product == first.product) => first.product.as_str(),
        Some(_) => "multiple products",
        None => "products",
    };

    let mut out = format!("🏬 **Retailers selling {} ({}):**\n\n", product, rows.len());
    for r in rows {
        out.push_str(&format!(
            "{} **{}**\n🛍️ Product: {}\n💰 Price: {}\n📊 {}\n📍 Location: {}\n📧 Contact: {}\n⭐ Rating: {}\n\n",
            retailer_icon(&r.retailer),
            r.retailer,
            r.product,
            format_price(r.price),
            StockLevel::label(r.stock),
            r.location.as_deref().unwrap_or("Not listed"),
            r.contact.as_deref().unwrap_or("Not listed"),
            rating_display(r.rating),
        ));
    }
    push_commentary(&mut out, commentary);

    if rows.len() > 1 {
        let min = rows.iter().map(|r| r.price).fold(f64::INFINITY, f64::min);
        let max = rows.iter().map(|r| r.price).fold(f64::NEG_INFINITY, f64::max);
        let savings = max - min;
        if savings > 0.0 {
            out.push_str(&format!(
                "\n💡 **Price Comparison:**\n• Cheapest: ${:.2}\n• Most Expensive: ${:.2}\n• Potential Savings: ${:.2}",
                min, max, savings
            ));
        } else {
            out.push_str("\n💡 *All retailers offer the same price for this product!*");
        }
    } else {
        out.push_str("\n💡 *This is the only retailer currently selling this product.*");
    }
    out
}

pub fn categories_not_found() -> String {
    "😕 No categories are available yet. The catalog may not have been seeded.".to_string()
}

pub fn products_not_found(searched: &str) -> String {
    format!(
        "😕 I couldn't find any products matching {}.\n\n💡 *Try asking \"What products are available?\" to see the full catalog.*",
        searched
    )
}

pub fn retailers_not_found(searched: &str) -> String {
    format!(
        "😕 I couldn't find any retailers selling {}.\n\n💡 *Try asking \"Who sells laptops?\" or \"Show me retailers\".*",
        searched
    )
}

/// Prefix for the top-rated listings shown when a search term matched nothing
pub fn retailers_fallback_note(searched: &str) -> String {
    format!(
        "😕 I couldn't find any retailers selling {}. Here are our top-rated retailers instead.\n\n",
        searched
    )
}

/// One-line plain renderings handed to the model as "Database Results"
pub fn category_prompt_row(c: &CategorySummary) -> String {
    match c.product_count {
        Some(n) => format!("{} | {} products", c.name, n),
        None => c.name.clone(),
    }
}

pub fn product_prompt_row(p: &ProductPriceSummary) -> String {
    format!(
        "{} | {} | min {:.2} | max {:.2} | avg {:.2} | {} retailers",
        p.name, p.category, p.min_price, p.max_price, p.avg_price, p.retailer_count
    )
}

pub fn listing_prompt_row(e: &ProductEntry) -> String {
    format!("{} | {}", e.name, e.category)
}

pub fn offer_prompt_row(r: &RetailerOffer) -> String {
    format!(
        "{} | {} | {:.2} | stock {} | {} | rating {}",
        r.retailer,
        r.product,
        r.price,
        r.stock,
        r.location.as_deref().unwrap_or("-"),
        r.rating.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(retailer: &str, price: f64, stock: i64) -> RetailerOffer {
        RetailerOffer {
            retailer: retailer.to_string(),
            product: "Smartphone".to_string(),
            price,
            stock,
            location: Some("Austin, TX".to_string()),
            contact: Some("info@example.com".to_string()),
            rating: Some(4.5),
        }
    }

    #[test]
    fn test_stock_boundaries() {
        assert_eq!(StockLevel::from_stock(51), StockLevel::InStock);
        assert_eq!(StockLevel::from_stock(50), StockLevel::Limited);
        assert_eq!(StockLevel::from_stock(11), StockLevel::Limited);
        assert_eq!(StockLevel::from_stock(10), StockLevel::Low);
        assert_eq!(StockLevel::from_stock(1), StockLevel::Low);
        assert_eq!(StockLevel::from_stock(0), StockLevel::Out);
        assert_eq!(StockLevel::label(0), "🔴 **Out of Stock**");
        assert_eq!(StockLevel::label(51), "🟢 **In Stock** (51 available)");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(799.99), "$799.99");
        assert_eq!(format_price(15.0), "$15.00");
        assert_eq!(format_price(1199.99), "$1,200");
        assert_eq!(format_price(1000.0), "$1,000");
        assert_eq!(format_price(1234567.0), "$1,234,567");
    }

    #[test]
    fn test_retailer_comparison() {
        let rows = vec![
            offer("GadgetHub", 789.99, 60),
            offer("MobileWorld", 799.99, 100),
            offer("WirelessZone", 805.0, 80),
            offer("PhoneCenter", 815.0, 75),
            offer("TechStore", 829.99, 40),
        ];
        let text = format_retailer_offers(&rows, None);

        assert!(text.starts_with("🏬 **Retailers selling Smartphone (5):**"));
        assert_eq!(text.matches("🛍️ Product: Smartphone").count(), 5);
        assert!(text.contains("• Cheapest: $789.99"));
        assert!(text.contains("• Most Expensive: $829.99"));
        assert!(text.contains("• Potential Savings: $40.00"));
        assert!(text.contains("🔧 **GadgetHub**"));
        assert!(text.contains("📱 **MobileWorld**"));
        assert!(text.contains("⭐ Rating: ⭐⭐⭐⭐ (4.5/5.0)"));
    }

    #[test]
    fn test_retailer_footer_variants() {
        let same = vec![offer("A", 10.0, 5), offer("B", 10.0, 5)];
        assert!(format_retailer_offers(&same, None).ends_with("same price for this product!*"));

        let single = vec![offer("A", 10.0, 5)];
        let text = format_retailer_offers(&single, Some("Great pick."));
        assert!(text.contains("\nGreat pick.\n"));
        assert!(text.ends_with("only retailer currently selling this product.*"));
    }

    #[test]
    fn test_unrated_retailer() {
        let mut row = offer("CornerShop", 5.0, 0);
        row.rating = None;
        row.location = None;
        let text = format_retailer_offers(&[row], None);
        assert!(text.contains("🏪 **CornerShop**"));
        assert!(text.contains("⭐ Rating: Not rated"));
        assert!(text.contains("📍 Location: Not listed"));
        assert!(text.contains("🔴 **Out of Stock**"));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let rows = vec![offer("GadgetHub", 789.99, 60), offer("TechStore", 829.99, 40)];
        assert_eq!(format_retailer_offers(&rows, Some("x")), format_retailer_offers(&rows, Some("x")));
    }

    #[test]
    fn test_product_summary_card() {
        let rows = vec![
            ProductPriceSummary {
                name: "Laptop".to_string(),
                category: "Electronics".to_string(),
                min_price: 1179.99,
                max_price: 1299.99,
                avg_price: 1232.49,
                retailer_count: 4,
            },
            ProductPriceSummary {
                name: "Cookbook".to_string(),
                category: "Books".to_string(),
                min_price: 24.99,
                max_price: 24.99,
                avg_price: 24.99,
                retailer_count: 1,
            },
        ];
        let text = format_product_summaries(&rows, None);

        assert!(text.starts_with("🔍 **Found 2 products:**"));
        assert!(text.contains("💰 Price Range: $1,180 - $1,300 (avg $1,232)"));
        assert!(text.contains("💰 Price Range: $24.99\n"));
        assert!(text.contains("🏪 Available at: 4 retailers"));
        assert!(text.contains("🏪 Available at: 1 retailer\n"));
        assert!(text.contains("https://picsum.photos/200/200?random=4"));
    }

    #[test]
    fn test_product_listing_groups_by_category() {
        let rows = vec![
            ProductEntry { name: "Cookbook".to_string(), category: "Books".to_string() },
            ProductEntry { name: "Science Fiction Novel".to_string(), category: "Books".to_string() },
            ProductEntry { name: "Laptop".to_string(), category: "Electronics".to_string() },
        ];
        let text = format_product_listing(&rows, None);
        assert!(text.contains("**Books:**\n• Cookbook\n• Science Fiction Novel\n\n**Electronics:**\n• Laptop"));
    }

    #[test]
    fn test_categories_with_icons() {
        let rows = vec![
            CategorySummary { name: "Electronics".to_string(), product_count: Some(4) },
            CategorySummary { name: "Garden".to_string(), product_count: None },
        ];
        let text = format_categories(&rows, None);
        assert!(text.starts_with("🏪 **Available Categories (2):**"));
        assert!(text.contains("💻 **Electronics** (4 products)"));
        assert!(text.contains("📁 **Garden**"));
    }

    #[test]
    fn test_image_ids() {
        assert!(product_image_url("Headphones").ends_with("=9"));
        assert!(product_image_url("Science Fiction Novel").ends_with("=3"));
        assert!(product_image_url("Desk Chair").ends_with("=6"));
        assert!(product_image_url("Umbrella").ends_with("=16"));
        assert!(product_image_url("Smartphone").ends_with("=2"));
    }

    #[test]
    fn test_range_collapses_when_rounded_ends_match() {
        let rows = vec![ProductPriceSummary {
            name: "Laptop".to_string(),
            category: "Electronics".to_string(),
            min_price: 1199.99,
            max_price: 1200.4,
            avg_price: 1200.2,
            retailer_count: 2,
        }];
        let text = format_product_summaries(&rows, None);
        assert!(text.contains("💰 Price Range: $1,200\n"));
        assert!(!text.contains("avg"));

        let rows = vec![ProductPriceSummary {
            min_price: 999.5,
            max_price: 1000.2,
            avg_price: 999.9,
            ..rows[0].clone()
        }];
        let text = format_product_summaries(&rows, None);
        assert!(text.contains("💰 Price Range: $999.50 - $1,000 (avg $999.90)"));
    }
}
