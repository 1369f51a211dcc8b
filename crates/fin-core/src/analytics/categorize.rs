//! Transaction categorization
//!
//! `Categorizer` is the seam where a categorization provider (ML model,
//! aggregator-supplied categories, user rules) plugs in. The built-in
//! `KeywordCategorizer` trusts a provider-supplied category when present and
//! otherwise falls back to ordered keyword rules.

use crate::models::Transaction;

/// Assigns a spending category to a transaction
pub trait Categorizer: Send + Sync {
    fn categorize(&self, transaction: &Transaction) -> String;
}

/// Ordered keyword rules; the first rule with a matching keyword wins
const KEYWORD_RULES: &[(&str, &[&str])] = &[
    (
        "Groceries",
        &["grocery", "safeway", "whole foods", "trader joe"],
    ),
    (
        "Restaurants",
        &["restaurant", "cafe", "starbucks", "mcdonald"],
    ),
    ("Transportation", &["gas", "fuel", "shell", "chevron"]),
    ("Shopping", &["amazon", "target", "walmart", "retail"]),
    (
        "Entertainment",
        &["netflix", "spotify", "hulu", "apple music"],
    ),
    ("Housing", &["rent", "mortgage", "apartment"]),
    ("Utilities", &["electric", "gas bill", "water", "internet"]),
];

pub const UNCATEGORIZED: &str = "Other";

/// Categorize a description with the keyword rules alone
pub fn categorize_description(description: &str) -> &'static str {
    let description = description.to_lowercase();

    KEYWORD_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| description.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or(UNCATEGORIZED)
}

/// Default categorizer
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordCategorizer {
    /// Ignore categories the provider attached and always use keywords
    pub ignore_provider_categories: bool,
}

impl KeywordCategorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keywords_only() -> Self {
        Self {
            ignore_provider_categories: true,
        }
    }
}

impl Categorizer for KeywordCategorizer {
    fn categorize(&self, transaction: &Transaction) -> String {
        if !self.ignore_provider_categories {
            if let Some(category) = transaction
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
            {
                return category.to_string();
            }
        }

        categorize_description(transaction.description.as_deref().unwrap_or("")).to_string()
    }
}
