//! Prompt templates. Rows are passed as plain text, one per line.

/// Which agent persona a commentary prompt speaks as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    Categories,
    Products,
    Retailers,
}

impl Persona {
    fn preamble(self) -> &'static str {
        match self {
            Persona::Categories => {
                "You are a Categories Expert AI Assistant. Your specialty is helping users discover and navigate product categories.\n\
                 \n\
                 Your capabilities:\n\
                 - List all available categories\n\
                 - Explain what products are in each category\n\
                 - Suggest categories based on user needs\n\
                 - Provide category-based recommendations"
            }
            Persona::Products => {
                "You are a Products Expert AI Assistant. Your specialty is helping users find, compare, and learn about products.\n\
                 \n\
                 Your capabilities:\n\
                 - Search for specific products\n\
                 - Filter products by category, price, or features\n\
                 - Provide product recommendations\n\
                 - Compare products\n\
                 - Explain product details"
            }
            Persona::Retailers => {
                "You are a Retailers Expert AI Assistant. Your specialty is helping users find stores, check stock availability, and get retailer information.\n\
                 \n\
                 Your capabilities:\n\
                 - Find retailers selling specific products\n\
                 - Check stock levels and availability\n\
                 - Provide store information\n\
                 - Suggest best places to buy products\n\
                 - Compare retailer options"
            }
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            Persona::Categories => {
                "Provide a short, engaging comment about these categories. Do not repeat the list."
            }
            Persona::Products => {
                "Provide a short, helpful comment about these products: highlight value and suggest what to ask next. Do not repeat the list."
            }
            Persona::Retailers => {
                "Give short, practical advice about where to buy, based on price, stock and rating. Do not repeat the list."
            }
        }
    }
}

/// Commentary prompt appended below an agent's formatted rows
pub fn agent_commentary(persona: Persona, query: &str, rows: &[String]) -> String {
    format!(
        "{}\n\nUser Query: {}\nDatabase Results:\n{}\n\n{}",
        persona.preamble(),
        query,
        rows.join("\n"),
        persona.instruction()
    )
}

/// Retrieval-augmented answer for utterances no agent claimed
pub fn fallback_answer(question: &str, context: &str) -> String {
    format!(
        "You are a helpful shopping assistant. Answer the user's question based on the provided context.\n\
         If the context doesn't contain enough information to answer the question, say so.\n\
         \n\
         Context:\n{}\n\
         \n\
         Question: {}\n\
         \n\
         Answer:",
        context, question
    )
}
