use serde::{Deserialize, Serialize};

/// Sentinel filter value that selects every quote.
pub const ALL_CATEGORIES: &str = "all";

/// Id prefix for quotes created on this device.
pub const LOCAL_PREFIX: &str = "local-";

/// Id prefix for quotes pulled from the remote source.
pub const SERVER_PREFIX: &str = "server-";

/// A quote and the category it is filed under.
///
/// The `id` is unique within a collection. Entries written by the earliest
/// releases had no id at all, so it defaults to empty on deserialization and
/// the store assigns one on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub id: String,
    pub text: String,
    pub category: String,
}

impl Quote {
    pub fn new(id: impl Into<String>, text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category: category.into(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.id.starts_with(LOCAL_PREFIX)
    }

    pub fn is_remote(&self) -> bool {
        self.id.starts_with(SERVER_PREFIX)
    }

    /// Whether `other` carries the same text and category.
    pub fn same_content(&self, other: &Quote) -> bool {
        self.text == other.text && self.category == other.category
    }
}

/// Quotes used when local storage is empty or unreadable.
pub fn default_quotes() -> Vec<Quote> {
    vec![
        Quote::new(
            "local-1",
            "The only way to do great work is to love what you do.",
            "Work",
        ),
        Quote::new(
            "local-2",
            "Strive not to be a success, but rather to be of value.",
            "Value",
        ),
        Quote::new(
            "local-3",
            "The best way to predict the future is to create it.",
            "Future",
        ),
    ]
}
