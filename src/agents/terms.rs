//! Substring heuristics that turn an utterance into a catalog filter.

/// (substring, product name fragment). `headphone` precedes `phone` and
/// `cookbook` precedes the `book` category check in callers.
const NAMED_PRODUCTS: &[(&str, &str)] = &[
    ("laptop", "Laptop"),
    ("headphone", "Headphones"),
    ("smartphone", "Smartphone"),
    ("phone", "Smartphone"),
    ("tablet", "Tablet"),
    ("coffee", "Coffee Maker"),
    ("chair", "Desk Chair"),
    ("novel", "Novel"),
    ("cookbook", "Cookbook"),
];

/// Phrases after which the rest of the utterance names what is wanted
const TRIGGER_PHRASES: &[&str] = &[
    "where can i buy",
    "where to buy",
    "looking for",
    "search for",
    "who sells",
    "price of",
    "show me",
    "find me",
    "sells",
    "find",
    "search",
    "buy",
];

/// Words that start a location; nothing after them names a product
const LOCATION_WORDS: &[&str] = &["in", "at", "near", "around"];

const STOP_WORDS: &[&str] = &[
    "a", "about", "all", "an", "and", "any", "are", "available", "best", "buy", "can", "cheap",
    "cheapest", "cost", "could", "do", "does", "find", "for", "get", "good", "has", "have", "i", "in",
    "is", "it", "item", "me", "my", "of", "on", "or", "please", "price", "product", "retailer",
    "search", "sell", "shop", "show", "some", "stock", "store", "that", "the", "there", "this", "to",
    "under", "we", "what", "where", "which", "who", "with", "you", "your",
];

/// Product named in the utterance, as a name fragment for a LIKE filter
pub fn named_product(lower: &str) -> Option<&'static str> {
    NAMED_PRODUCTS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, name)| *name)
}

/// Category named in the utterance. `book` only counts when no named product matched first.
pub fn named_category(lower: &str) -> Option<&'static str> {
    if lower.contains("book") {
        Some("Books")
    } else if lower.contains("electronics") {
        Some("Electronics")
    } else if ["home goods", "furniture", "kitchen"].iter().any(|k| lower.contains(k)) {
        Some("Home Goods")
    } else {
        None
    }
}

/// Free-text term following a trigger phrase, minus stop words and plurals
pub fn search_term(lower: &str) -> Option<String> {
    let rest = TRIGGER_PHRASES
        .iter()
        .find_map(|phrase| lower.find(phrase).map(|pos| &lower[pos + phrase.len()..]))?;

    let words: Vec<String> = rest
        .split(|c: char| !c.is_alphanumeric() && c != '-' && c != '\'')
        .map(|w| w.trim_end_matches("'s").trim_matches('\''))
        .filter(|w| !w.is_empty())
        .take_while(|w| !LOCATION_WORDS.contains(w))
        .filter(|w| w.chars().count() > 1 && !STOP_WORDS.contains(w))
        .map(singular)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn singular(word: &str) -> String {
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_product_order() {
        assert_eq!(named_product("noise cancelling headphones"), Some("Headphones"));
        assert_eq!(named_product("who sells smartphones?"), Some("Smartphone"));
        assert_eq!(named_product("a new phone"), Some("Smartphone"));
        assert_eq!(named_product("any cookbooks?"), Some("Cookbook"));
        assert_eq!(named_product("umbrellas"), None);
    }

    #[test]
    fn test_named_category() {
        assert_eq!(named_category("show me books"), Some("Books"));
        assert_eq!(named_category("electronics please"), Some("Electronics"));
        assert_eq!(named_category("kitchen stuff"), Some("Home Goods"));
        assert_eq!(named_category("toys"), None);
    }

    #[test]
    fn test_search_term_strips_noise() {
        assert_eq!(search_term("can you find me some espresso grinders?"), Some("espresso grinder".to_string()));
        assert_eq!(search_term("who sells umbrellas"), Some("umbrella".to_string()));
        assert_eq!(search_term("show me retailers"), None);
        assert_eq!(search_term("show me products"), None);
        assert_eq!(search_term("hello there"), None);
    }

    #[test]
    fn test_singular_keeps_short_and_double_s() {
        assert_eq!(singular("glass"), "glass");
        assert_eq!(singular("bus"), "bus");
        assert_eq!(singular("lamps"), "lamp");
    }

    #[test]
    fn test_search_term_contractions_and_locations() {
        assert_eq!(search_term("show me what's in stock"), None);
        assert_eq!(search_term("show me retailers in new york"), None);
        assert_eq!(search_term("who sells umbrellas near boston"), Some("umbrella".to_string()));
        assert_eq!(search_term("find me a kid's bike"), Some("kid bike".to_string()));
        assert_eq!(search_term("search for x"), None);
    }
}
