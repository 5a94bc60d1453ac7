use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// --- tweets/search/recent response ---

/// Body of a `tweets/search/recent` call. `data` is absent when nothing matched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    pub data: Option<Vec<Tweet>>,
    #[serde(default)]
    pub includes: Includes,
}

/// `created_at` is kept as the raw string; parsing happens per item downstream
/// so a single bad timestamp cannot fail the whole search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub author_id: Option<String>,
    pub created_at: Option<String>,
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub quote_count: u64,
}

/// Side list of expanded objects. Authors are not inlined on the tweet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
}

/// A tweet joined with its expanded author, if the expansion list had one.
#[derive(Debug, Clone)]
pub struct TweetWithAuthor {
    pub tweet: Tweet,
    pub author: Option<User>,
}

impl SearchResponse {
    /// Join every tweet with its author by `author_id`. Tweets whose author
    /// is missing from the expansion list are kept with `author: None`.
    pub fn join_authors(self) -> Vec<TweetWithAuthor> {
        let users: HashMap<String, User> = self
            .includes
            .users
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        self.data
            .unwrap_or_default()
            .into_iter()
            .map(|tweet| {
                let author = tweet
                    .author_id
                    .as_ref()
                    .and_then(|id| users.get(id))
                    .cloned();
                if author.is_none() {
                    tracing::warn!(
                        tweet_id = %tweet.id,
                        author_id = ?tweet.author_id,
                        "Author missing from expansion list"
                    );
                }
                TweetWithAuthor { tweet, author }
            })
            .collect()
    }
}

// --- Error bodies ---

/// Either `{ "errors": [{ "message": ... }] }` or a problem document
/// `{ "title": ..., "detail": ... }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
    pub title: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub message: Option<String>,
    pub title: Option<String>,
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn message(&self) -> Option<String> {
        self.errors
            .iter()
            .find_map(|e| {
                e.message
                    .clone()
                    .or_else(|| e.detail.clone())
                    .or_else(|| e.title.clone())
            })
            .or_else(|| self.detail.clone())
            .or_else(|| self.title.clone())
    }
}
