use serde::{Deserialize, Serialize};

use super::{Quote, SERVER_PREFIX};

/// A post as served by the remote endpoint (JSONPlaceholder shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePost {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

/// Payload used to forward a locally added quote to the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "userId", default)]
    pub user_id: u64,
    #[serde(rename = "localId", default)]
    pub local_id: String,
}

impl NewPost {
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            title: quote.text.clone(),
            body: format!("Category: {}", quote.category),
            user_id: 1,
            local_id: quote.id.clone(),
        }
    }
}

/// The part of a create response we care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub id: u64,
}

impl Quote {
    /// Derive the quote form of a remote post.
    ///
    /// The id is stable for a given post, which is what lets repeated syncs
    /// overwrite rather than duplicate.
    pub fn from_remote(post: &RemotePost) -> Self {
        let mut chars = post.title.chars();
        let mut text: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        text.push('.');

        let category = if post.user_id % 2 == 0 {
            "Server-A"
        } else {
            "Server-B"
        };

        Quote::new(format!("{}{}", SERVER_PREFIX, post.id), text, category)
    }
}
