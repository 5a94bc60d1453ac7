use serde::{Deserialize, Serialize};

// --- commentThreads.list response ---

/// One page of `commentThreads.list` results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentThreadPage {
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub items: Vec<CommentThread>,
}

/// A top-level comment together with its thread metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentThread {
    pub id: String,
    pub snippet: ThreadSnippet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSnippet {
    #[serde(rename = "topLevelComment")]
    pub top_level_comment: TopLevelComment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopLevelComment {
    pub id: String,
    pub snippet: CommentSnippet,
}

/// The comment body. With `textFormat=plainText`, `text_display` carries the raw text.
/// `published_at` stays a string here so one malformed timestamp cannot fail
/// the whole page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentSnippet {
    #[serde(rename = "authorDisplayName", default)]
    pub author_display_name: String,
    #[serde(rename = "textDisplay", default)]
    pub text_display: String,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

// --- Error envelope ---

/// `{ "error": { "code": 403, "message": "...", "errors": [{ "reason": "commentsDisabled" }] } }`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub reason: Option<String>,
    pub message: Option<String>,
}
