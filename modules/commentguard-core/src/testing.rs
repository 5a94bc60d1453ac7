// Test doubles for the pipeline seams.
//
// - MockCommentSource (CommentSource): canned comment threads or a failure
// - MockPostSearch (PostSearch): canned tweets or a failure
// - FixedClassifier (Classifier): canned labels or a failure, records batches
//
// Plus builders for raw platform items.

use std::sync::Mutex;

use async_trait::async_trait;
use twitter_client::{PublicMetrics, Tweet, TweetWithAuthor, User};
use youtube_client::CommentThread;

use crate::classifier::Classifier;
use crate::error::{PipelineError, Result};
use crate::pipeline::{CommentSource, PostSearch};
use crate::types::Label;

type ErrorFn = Box<dyn Fn() -> PipelineError + Send + Sync>;

enum Canned<T> {
    Items(Vec<T>),
    Fail(ErrorFn),
}

impl<T: Clone> Canned<T> {
    fn get(&self) -> Result<Vec<T>> {
        match self {
            Canned::Items(items) => Ok(items.clone()),
            Canned::Fail(err) => Err(err()),
        }
    }
}

// ---------------------------------------------------------------------------
// MockCommentSource
// ---------------------------------------------------------------------------

pub struct MockCommentSource {
    response: Canned<CommentThread>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl MockCommentSource {
    pub fn with_threads(threads: Vec<CommentThread>) -> Self {
        Self {
            response: Canned::Items(threads),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: impl Fn() -> PipelineError + Send + Sync + 'static) -> Self {
        Self {
            response: Canned::Fail(Box::new(err)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(video_id, max_results)` for every fetch, in order.
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommentSource for MockCommentSource {
    async fn fetch(&self, video_id: &str, max_results: usize) -> Result<Vec<CommentThread>> {
        self.calls
            .lock()
            .unwrap()
            .push((video_id.to_string(), max_results));
        self.response.get()
    }
}

// ---------------------------------------------------------------------------
// MockPostSearch
// ---------------------------------------------------------------------------

pub struct MockPostSearch {
    response: Canned<TweetWithAuthor>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl MockPostSearch {
    pub fn with_posts(posts: Vec<TweetWithAuthor>) -> Self {
        Self {
            response: Canned::Items(posts),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: impl Fn() -> PipelineError + Send + Sync + 'static) -> Self {
        Self {
            response: Canned::Fail(Box::new(err)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(hashtag, max_results)` for every search, in order.
    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostSearch for MockPostSearch {
    async fn search(&self, hashtag: &str, max_results: u32) -> Result<Vec<TweetWithAuthor>> {
        self.calls
            .lock()
            .unwrap()
            .push((hashtag.to_string(), max_results));
        self.response.get()
    }
}

// ---------------------------------------------------------------------------
// FixedClassifier
// ---------------------------------------------------------------------------

/// Answers the same labels for every batch. Labels are returned as given,
/// even if their count does not match the batch.
pub struct FixedClassifier {
    response: Canned<Label>,
    batches: Mutex<Vec<Vec<String>>>,
}

impl FixedClassifier {
    pub fn with_labels(labels: Vec<Label>) -> Self {
        Self {
            response: Canned::Items(labels),
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: impl Fn() -> PipelineError + Send + Sync + 'static) -> Self {
        Self {
            response: Canned::Fail(Box::new(err)),
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Every batch this classifier was asked to label.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, texts: &[String]) -> Result<Vec<Label>> {
        self.batches.lock().unwrap().push(texts.to_vec());
        self.response.get()
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

// ---------------------------------------------------------------------------
// Raw item builders
// ---------------------------------------------------------------------------

/// A comment thread as `commentThreads.list` would return it.
pub fn comment_thread(id: &str, author: &str, text: &str) -> CommentThread {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "snippet": {
            "topLevelComment": {
                "id": id,
                "snippet": {
                    "authorDisplayName": author,
                    "textDisplay": text,
                    "publishedAt": "2024-03-01T12:00:00Z"
                }
            }
        }
    }))
    .expect("valid comment thread fixture")
}

/// A tweet joined with an author; `username: None` models an unresolved join.
pub fn tweet(id: &str, username: Option<&str>, text: &str) -> TweetWithAuthor {
    TweetWithAuthor {
        tweet: Tweet {
            id: id.to_string(),
            text: text.to_string(),
            author_id: Some(format!("author-{id}")),
            created_at: Some("2024-05-01T10:00:00.000Z".to_string()),
            public_metrics: Some(PublicMetrics {
                retweet_count: 0,
                reply_count: 0,
                like_count: 1,
                quote_count: 0,
            }),
        },
        author: username.map(|name| User {
            id: format!("author-{id}"),
            username: name.to_string(),
            name: None,
        }),
    }
}
