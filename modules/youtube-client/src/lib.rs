pub mod error;
pub mod types;

pub use error::{Result, YouTubeError};
pub use types::{CommentSnippet, CommentThread, CommentThreadPage};

use std::time::Duration;

use async_trait::async_trait;
use types::ErrorEnvelope;

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Per-request timeout unless overridden with `with_timeout`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Hard per-request limit of `commentThreads.list`.
pub const PAGE_SIZE: u32 = 100;

/// Default cap on the number of comments collected across pages.
pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// Error reason the API reports when the uploader turned comments off.
const COMMENTS_DISABLED_REASON: &str = "commentsDisabled";

/// Source of comment-thread pages. Split out from the HTTP client so the
/// pagination loop can be driven by anything that yields pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<CommentThreadPage>;
}

pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: http_client(DEFAULT_TIMEOUT),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    /// Fetch one page of top-level comments, plain-text rendering only.
    pub async fn comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<CommentThreadPage> {
        let url = format!("{}/commentThreads", self.base_url);
        let page_size = PAGE_SIZE.to_string();

        let mut query = vec![
            ("key", self.api_key.as_str()),
            ("part", "snippet"),
            ("videoId", video_id),
            ("maxResults", page_size.as_str()),
            ("textFormat", "plainText"),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let resp = self.client.get(&url).query(&query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        let body = resp.text().await?;
        let page: CommentThreadPage = serde_json::from_str(&body)?;
        Ok(page)
    }

    /// Fetch up to `max_results` top-level comments, following page tokens.
    pub async fn fetch_comments(
        &self,
        video_id: &str,
        max_results: usize,
    ) -> Result<Vec<CommentThread>> {
        tracing::info!(video_id, max_results, "Fetching YouTube comments");
        let threads = collect_pages(self, video_id, max_results).await?;
        tracing::info!(video_id, count = threads.len(), "Fetched YouTube comments");
        Ok(threads)
    }
}

#[async_trait]
impl PageFetcher for YouTubeClient {
    async fn fetch_page(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<CommentThreadPage> {
        self.comment_threads(video_id, page_token).await
    }
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to build HTTP client")
}

/// Walk pages strictly in order until the data runs out or `max_results`
/// items are held, then truncate to exactly `max_results`.
pub async fn collect_pages<F>(
    fetcher: &F,
    video_id: &str,
    max_results: usize,
) -> Result<Vec<CommentThread>>
where
    F: PageFetcher + ?Sized,
{
    let mut threads: Vec<CommentThread> = Vec::new();
    if max_results == 0 {
        return Ok(threads);
    }

    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetcher.fetch_page(video_id, page_token.as_deref()).await?;
        pages += 1;
        threads.extend(page.items);

        tracing::debug!(video_id, pages, collected = threads.len(), "Comment page received");

        if threads.len() >= max_results {
            break;
        }
        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    threads.truncate(max_results);
    Ok(threads)
}

/// Map a non-success response onto a typed error. A `commentsDisabled`
/// reason anywhere in the error list wins over the generic API error.
pub fn api_error(status: u16, body: &str) -> YouTubeError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return YouTubeError::Api {
            status,
            reason: None,
            message: body.to_string(),
        };
    };

    let reason = envelope
        .error
        .errors
        .iter()
        .find_map(|e| e.reason.clone());

    if envelope
        .error
        .errors
        .iter()
        .any(|e| e.reason.as_deref() == Some(COMMENTS_DISABLED_REASON))
    {
        return YouTubeError::CommentsDisabled;
    }

    let message = if envelope.error.message.is_empty() {
        envelope
            .error
            .errors
            .iter()
            .find_map(|e| e.message.clone())
            .unwrap_or_else(|| body.to_string())
    } else {
        envelope.error.message
    };

    YouTubeError::Api {
        status,
        reason,
        message,
    }
}
