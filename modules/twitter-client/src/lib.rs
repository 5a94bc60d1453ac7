pub mod error;
pub mod types;

pub use error::{Result, TwitterError};
pub use types::{PublicMetrics, SearchResponse, Tweet, TweetWithAuthor, User};

use std::time::Duration;

use types::ErrorResponse;

const BASE_URL: &str = "https://api.twitter.com/2";

/// Per-request timeout unless overridden with `with_timeout`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Platform ceiling for `max_results` on recent search.
pub const MAX_RESULTS_CAP: u32 = 100;

/// Platform floor for `max_results`; smaller values are rejected with a 400.
const MIN_RESULTS: u32 = 10;

pub struct TwitterClient {
    client: reqwest::Client,
    bearer_token: String,
    base_url: String,
}

impl TwitterClient {
    pub fn new(bearer_token: String) -> Self {
        Self {
            client: http_client(DEFAULT_TIMEOUT),
            bearer_token,
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

    /// Search recent original English tweets carrying `hashtag`, with author
    /// metadata expanded in the same call. Returns an empty list when nothing
    /// matched.
    pub async fn search_hashtag(
        &self,
        hashtag: &str,
        max_results: u32,
    ) -> Result<Vec<TweetWithAuthor>> {
        let limit = effective_limit(max_results);
        if limit < max_results {
            tracing::warn!(
                requested = max_results,
                limit,
                "Requested tweet count exceeds platform cap, truncating"
            );
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = hashtag_query(hashtag);
        tracing::info!(query = %query, limit, "Searching recent tweets");

        let url = format!("{}/tweets/search/recent", self.base_url);
        let request_size = limit.max(MIN_RESULTS).to_string();

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", query.as_str()),
                ("max_results", request_size.as_str()),
                ("tweet.fields", "created_at,author_id,public_metrics"),
                ("user.fields", "username,name"),
                ("expansions", "author_id"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        let body = resp.text().await?;
        let mut tweets = parse_search(&body)?;
        tweets.truncate(limit as usize);

        tracing::info!(count = tweets.len(), "Fetched tweets");
        Ok(tweets)
    }
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to build HTTP client")
}

/// `#tag -is:retweet lang:en`, tolerating a leading `#` on the input.
pub fn hashtag_query(hashtag: &str) -> String {
    let tag = hashtag.strip_prefix('#').unwrap_or(hashtag);
    format!("#{tag} -is:retweet lang:en")
}

/// Number of tweets a caller can get back for a requested count.
pub fn effective_limit(requested: u32) -> u32 {
    requested.min(MAX_RESULTS_CAP)
}

/// Parse a search body and join tweets with their expanded authors.
pub fn parse_search(body: &str) -> Result<Vec<TweetWithAuthor>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response.join_authors())
}

/// Map a non-success response onto a typed error.
pub fn api_error(status: u16, body: &str) -> TwitterError {
    match status {
        429 => TwitterError::RateLimited,
        401 => TwitterError::AuthFailed,
        _ => {
            let message = serde_json::from_str::<ErrorResponse>(body)
                .ok()
                .and_then(|e| e.message())
                .unwrap_or_else(|| body.to_string());
            TwitterError::Api { status, message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Answer exactly one HTTP request with `status` and `body`, handing the raw
    /// request text back through the returned channel.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if raw.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&raw).into_owned());
        });

        (format!("http://{addr}"), rx)
    }

    fn client(base_url: &str) -> TwitterClient {
        TwitterClient::new("tw_token".to_string())
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(5))
    }

    const THREE_TWEETS: &str = r#"{
        "data": [
            {"id": "1", "text": "one", "author_id": "u1", "created_at": "2024-05-01T10:00:00.000Z"},
            {"id": "2", "text": "two", "author_id": "u1", "created_at": "2024-05-01T10:01:00.000Z"},
            {"id": "3", "text": "three", "author_id": "u1", "created_at": "2024-05-01T10:02:00.000Z"}
        ],
        "includes": {"users": [{"id": "u1", "username": "alice"}]}
    }"#;

    #[test]
    fn query_excludes_retweets_and_filters_language() {
        assert_eq!(hashtag_query("rustlang"), "#rustlang -is:retweet lang:en");
        assert_eq!(hashtag_query("#rustlang"), "#rustlang -is:retweet lang:en");
    }

    #[test]
    fn limit_is_capped_at_platform_maximum() {
        assert_eq!(effective_limit(10), 10);
        assert_eq!(effective_limit(100), 100);
        assert_eq!(effective_limit(500), 100);
    }

    #[test]
    fn unresolved_author_keeps_the_tweet() {
        let body = r#"{
            "data": [
                {"id": "1", "text": "first", "author_id": "u1", "created_at": "2024-05-01T10:00:00.000Z"},
                {"id": "2", "text": "second", "author_id": "ghost", "created_at": "2024-05-01T10:01:00.000Z"},
                {"id": "3", "text": "third", "created_at": "2024-05-01T10:02:00.000Z"}
            ],
            "includes": {"users": [{"id": "u1", "username": "alice", "name": "Alice"}]},
            "meta": {"result_count": 3}
        }"#;

        let tweets = parse_search(body).unwrap();

        assert_eq!(tweets.len(), 3);
        assert_eq!(tweets[0].author.as_ref().unwrap().username, "alice");
        assert!(tweets[1].author.is_none());
        assert!(tweets[2].author.is_none());
        assert_eq!(tweets[1].tweet.text, "second");
    }

    #[test]
    fn missing_includes_still_parses() {
        let body = r#"{"data": [{"id": "1", "text": "hi", "author_id": "u1"}]}"#;
        let tweets = parse_search(body).unwrap();
        assert_eq!(tweets.len(), 1);
        assert!(tweets[0].author.is_none());
    }

    #[test]
    fn zero_matches_is_empty_not_error() {
        let body = r#"{"meta": {"result_count": 0}}"#;
        assert!(parse_search(body).unwrap().is_empty());
    }

    #[test]
    fn public_metrics_are_parsed() {
        let body = r#"{
            "data": [{
                "id": "1", "text": "hi", "author_id": "u1",
                "public_metrics": {"retweet_count": 2, "reply_count": 1, "like_count": 7, "quote_count": 0}
            }],
            "includes": {"users": [{"id": "u1", "username": "alice"}]}
        }"#;

        let tweets = parse_search(body).unwrap();
        let metrics = tweets[0].tweet.public_metrics.clone().unwrap();
        assert_eq!(metrics.like_count, 7);
        assert_eq!(metrics.retweet_count, 2);
    }

    #[test]
    fn status_codes_map_to_typed_errors() {
        assert!(matches!(api_error(429, ""), TwitterError::RateLimited));
        assert!(matches!(
            api_error(401, r#"{"title":"Unauthorized"}"#),
            TwitterError::AuthFailed
        ));
    }

    #[test]
    fn structured_error_body_message_is_surfaced() {
        let body = r#"{"errors":[{"message":"Invalid query: unknown operator"}],"title":"Invalid Request"}"#;
        match api_error(400, body) {
            TwitterError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid query: unknown operator");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn problem_document_detail_is_surfaced() {
        let body = r#"{"title":"Forbidden","detail":"Your client app is not configured for this endpoint."}"#;
        match api_error(403, body) {
            TwitterError::Api { message, .. } => {
                assert_eq!(message, "Your client app is not configured for this endpoint.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn raw_body_is_used_when_unstructured() {
        match api_error(503, "upstream connect error") {
            TwitterError::Api { message, .. } => assert_eq!(message, "upstream connect error"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_request_carries_query_expansion_and_bearer() {
        let (base_url, request) = serve_once("200 OK", THREE_TWEETS).await;

        let tweets = client(&base_url).search_hashtag("#rust", 2).await.unwrap();
        assert_eq!(tweets.len(), 2);
        assert_eq!(tweets[0].author.as_ref().unwrap().username, "alice");

        let raw = request.await.unwrap();
        let line = raw.lines().next().unwrap();
        assert!(line.starts_with("GET /tweets/search/recent?"), "{line}");
        for param in [
            "query=%23rust+-is%3Aretweet+lang%3Aen",
            "max_results=10",
            "expansions=author_id",
            "tweet.fields=created_at%2Cauthor_id%2Cpublic_metrics",
            "user.fields=username%2Cname",
        ] {
            assert!(line.contains(param), "missing {param} in {line}");
        }
        assert!(raw.to_lowercase().contains("authorization: bearer tw_token"));
    }

    #[tokio::test]
    async fn search_above_cap_requests_platform_maximum() {
        let (base_url, request) = serve_once("200 OK", THREE_TWEETS).await;

        let tweets = client(&base_url).search_hashtag("rust", 500).await.unwrap();
        assert_eq!(tweets.len(), 3);

        let raw = request.await.unwrap();
        assert!(raw.lines().next().unwrap().contains("max_results=100"));
    }

    #[tokio::test]
    async fn rate_limit_status_maps_to_rate_limited() {
        let (base_url, _request) =
            serve_once("429 Too Many Requests", r#"{"title":"Too Many Requests"}"#).await;

        let err = client(&base_url).search_hashtag("rust", 10).await.unwrap_err();
        assert!(matches!(err, TwitterError::RateLimited), "{err:?}");
    }

    #[tokio::test]
    async fn unauthorized_status_maps_to_auth_failed() {
        let (base_url, _request) =
            serve_once("401 Unauthorized", r#"{"title":"Unauthorized"}"#).await;

        let err = client(&base_url).search_hashtag("rust", 10).await.unwrap_err();
        assert!(matches!(err, TwitterError::AuthFailed), "{err:?}");
    }

    #[tokio::test]
    async fn undecodable_success_body_is_a_parse_error() {
        let (base_url, _request) = serve_once("200 OK", "not json").await;

        let err = client(&base_url).search_hashtag("rust", 10).await.unwrap_err();
        assert!(matches!(err, TwitterError::Parse(_)), "{err:?}");
    }

    #[test]
    fn malformed_timestamp_keeps_every_tweet() {
        let body = r#"{
            "data": [
                {"id": "1", "text": "good", "author_id": "u1", "created_at": "2024-05-01T10:00:00.000Z"},
                {"id": "2", "text": "bad date", "author_id": "u1", "created_at": "yesterday"}
            ],
            "includes": {"users": [{"id": "u1", "username": "alice"}]}
        }"#;

        let tweets = parse_search(body).unwrap();
        assert_eq!(tweets.len(), 2);
        assert_eq!(tweets[1].tweet.created_at.as_deref(), Some("yesterday"));
    }
}
