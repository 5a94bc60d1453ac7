//! Turn user input (a video URL or a hashtag) into a canonical identifier.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::types::{CanonicalId, Platform};

/// Watch-style query (`?v=`), short links (`youtu.be/`), embed/`v/`/shorts
/// paths and channel-scoped paths. First capture group is the video id.
static RE_VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:[^/\n\s]+/\S+/|(?:v|e(?:mbed)?|shorts)/|\S*?[?&]v=)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    )
    .expect("valid video id regex")
});

static RE_HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid hashtag regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no identifier found")]
    NotFound,

    #[error("identifier has invalid characters")]
    Invalid,
}

pub fn extract(input: &str, platform: Platform) -> Result<CanonicalId, ExtractError> {
    match platform {
        Platform::Youtube => extract_video_id(input),
        Platform::Twitter => extract_hashtag(input),
    }
}

pub fn extract_video_id(url: &str) -> Result<CanonicalId, ExtractError> {
    RE_VIDEO_ID
        .captures(url)
        .and_then(|cap| cap.get(1))
        .map(|m| CanonicalId::new(m.as_str()))
        .ok_or(ExtractError::NotFound)
}

pub fn extract_hashtag(input: &str) -> Result<CanonicalId, ExtractError> {
    let tag = input.strip_prefix('#').unwrap_or(input);
    if tag.is_empty() {
        return Err(ExtractError::NotFound);
    }
    if !RE_HASHTAG.is_match(tag) {
        return Err(ExtractError::Invalid);
    }
    Ok(CanonicalId::new(tag))
}
