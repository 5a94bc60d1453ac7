// Platform item -> unified Comment.
// Author and body text pass through verbatim; the classifier wants raw text.

use chrono::{DateTime, Utc};
use tracing::debug;
use twitter_client::TweetWithAuthor;
use youtube_client::CommentThread;

use crate::types::{Comment, Platform, PostMetrics};

/// Author placeholder for posts whose author could not be joined.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// RFC 3339 timestamp as both platforms send it, normalized to UTC.
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw?)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Returns `None` for threads with no text or no valid timestamp.
pub fn from_comment_thread(thread: CommentThread) -> Option<Comment> {
    let thread_id = thread.id;
    let snippet = thread.snippet.top_level_comment.snippet;

    if snippet.text_display.is_empty() {
        debug!(thread_id = %thread_id, "Skipping comment with empty text");
        return None;
    }
    let Some(published_at) = parse_timestamp(snippet.published_at.as_deref()) else {
        debug!(
            thread_id = %thread_id,
            published_at = ?snippet.published_at,
            "Skipping comment without a valid publishedAt"
        );
        return None;
    };

    Some(Comment {
        author: snippet.author_display_name,
        text: snippet.text_display,
        published_at,
        platform: Platform::Youtube,
        source_id: Some(thread_id),
        metrics: None,
    })
}

/// Returns `None` for tweets with no text or no valid `created_at`.
pub fn from_tweet(item: TweetWithAuthor) -> Option<Comment> {
    let TweetWithAuthor { tweet, author } = item;

    if tweet.text.is_empty() {
        debug!(tweet_id = %tweet.id, "Skipping tweet with empty text");
        return None;
    }
    let Some(published_at) = parse_timestamp(tweet.created_at.as_deref()) else {
        debug!(
            tweet_id = %tweet.id,
            created_at = ?tweet.created_at,
            "Skipping tweet without a valid created_at"
        );
        return None;
    };

    let metrics = tweet.public_metrics.map(|m| PostMetrics {
        like_count: m.like_count,
        retweet_count: m.retweet_count,
        reply_count: m.reply_count,
        quote_count: m.quote_count,
    });

    Some(Comment {
        author: author
            .map(|u| u.username)
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        text: tweet.text,
        published_at,
        platform: Platform::Twitter,
        source_id: Some(tweet.id),
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use twitter_client::{PublicMetrics, Tweet, User};

    fn thread(author: &str, text: &str, published_at: Option<&str>) -> CommentThread {
        serde_json::from_value(serde_json::json!({
            "id": "Ugz123",
            "snippet": {
                "topLevelComment": {
                    "id": "Ugz123",
                    "snippet": {
                        "authorDisplayName": author,
                        "textDisplay": text,
                        "publishedAt": published_at
                    }
                }
            }
        }))
        .unwrap()
    }

    fn tweet(text: &str, author: Option<&str>) -> TweetWithAuthor {
        dated_tweet(text, author, Some("2024-05-01T10:00:00.000Z"))
    }

    fn dated_tweet(text: &str, author: Option<&str>, created_at: Option<&str>) -> TweetWithAuthor {
        TweetWithAuthor {
            tweet: Tweet {
                id: "1790000000000000000".to_string(),
                text: text.to_string(),
                author_id: Some("42".to_string()),
                created_at: created_at.map(String::from),
                public_metrics: Some(PublicMetrics {
                    retweet_count: 3,
                    reply_count: 1,
                    like_count: 12,
                    quote_count: 0,
                }),
            },
            author: author.map(|username| User {
                id: "42".to_string(),
                username: username.to_string(),
                name: None,
            }),
        }
    }

    #[test]
    fn comment_text_and_author_are_verbatim() {
        let raw = thread(
            "  @Some One ",
            "  spaced\ttext  \n",
            Some("2024-03-01T12:00:00Z"),
        );
        let comment = from_comment_thread(raw).unwrap();

        assert_eq!(comment.author, "  @Some One ");
        assert_eq!(comment.text, "  spaced\ttext  \n");
        assert_eq!(comment.platform, Platform::Youtube);
        assert_eq!(comment.source_id.as_deref(), Some("Ugz123"));
        assert!(comment.metrics.is_none());
    }

    #[test]
    fn comment_without_text_or_timestamp_is_dropped() {
        assert!(from_comment_thread(thread("a", "", Some("2024-03-01T12:00:00Z"))).is_none());
        assert!(from_comment_thread(thread("a", "text", None)).is_none());
    }

    #[test]
    fn comment_with_malformed_timestamp_is_dropped() {
        assert!(from_comment_thread(thread("a", "text", Some("yesterday"))).is_none());
        assert!(from_comment_thread(thread("a", "text", Some("2024-13-45"))).is_none());
    }

    #[test]
    fn timestamps_with_offsets_are_normalized_to_utc() {
        let comment =
            from_comment_thread(thread("a", "text", Some("2024-03-01T14:00:00+02:00"))).unwrap();
        assert_eq!(comment.published_at.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[test]
    fn tweet_carries_metrics_and_username() {
        let comment = from_tweet(tweet("hello #rust", Some("alice"))).unwrap();

        assert_eq!(comment.author, "alice");
        assert_eq!(comment.text, "hello #rust");
        assert_eq!(comment.platform, Platform::Twitter);
        let metrics = comment.metrics.unwrap();
        assert_eq!(metrics.like_count, 12);
        assert_eq!(metrics.retweet_count, 3);
    }

    #[test]
    fn tweet_with_malformed_or_missing_timestamp_is_dropped() {
        assert!(from_tweet(dated_tweet("hi", Some("alice"), Some("yesterday"))).is_none());
        assert!(from_tweet(dated_tweet("hi", Some("alice"), None)).is_none());
    }

    #[test]
    fn tweet_without_author_gets_placeholder() {
        let comment = from_tweet(tweet("orphan", None)).unwrap();
        assert_eq!(comment.author, UNKNOWN_AUTHOR);
    }
}
