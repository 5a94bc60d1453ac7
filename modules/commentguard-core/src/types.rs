use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

// =============================================================================
// Platform & identifiers
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Twitter,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Youtube => write!(f, "youtube"),
            Platform::Twitter => write!(f, "twitter"),
        }
    }
}

/// Minimal handle for a target on a platform: an 11-character video id, or a
/// hashtag without its leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalId(String);

impl CanonicalId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Unified comment record
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetrics {
    pub like_count: u64,
    pub retweet_count: u64,
    pub reply_count: u64,
    pub quote_count: u64,
}

/// A comment or post from any platform, in one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PostMetrics>,
}

// =============================================================================
// Classification
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Flagged,
    Clean,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub flagged: usize,
    pub clean: usize,
}

impl LabelCounts {
    pub fn tally(labels: &[Label]) -> Self {
        labels.iter().fold(Self::default(), |mut counts, label| {
            match label {
                Label::Flagged => counts.flagged += 1,
                Label::Clean => counts.clean += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.flagged + self.clean
    }
}

/// Comments paired 1:1 with their labels, in input order.
#[derive(Debug, Clone)]
pub struct ClassificationBatch {
    items: Vec<(Comment, Label)>,
    counts: LabelCounts,
}

impl ClassificationBatch {
    /// Pair comments with labels. A length mismatch means the classifier broke
    /// its contract.
    pub fn pair(comments: Vec<Comment>, labels: Vec<Label>) -> Result<Self> {
        if comments.len() != labels.len() {
            return Err(PipelineError::ClassifierProtocolError(format!(
                "expected {} labels, got {}",
                comments.len(),
                labels.len()
            )));
        }

        let counts = LabelCounts::tally(&labels);
        let items = comments.into_iter().zip(labels).collect();
        Ok(Self { items, counts })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn counts(&self) -> LabelCounts {
        self.counts
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Comment, Label)> {
        self.items.iter()
    }

    pub fn into_flagged(self) -> Vec<Comment> {
        self.items
            .into_iter()
            .filter(|(_, label)| *label == Label::Flagged)
            .map(|(comment, _)| comment)
            .collect()
    }
}

// =============================================================================
// Request / response envelopes
// =============================================================================

/// Inbound analysis request, `{ "url": ... }` or `{ "hashtag": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AnalysisRequest {
    Video { url: String },
    Hashtag { hashtag: String },
}

impl AnalysisRequest {
    pub fn platform(&self) -> Platform {
        match self {
            AnalysisRequest::Video { .. } => Platform::Youtube,
            AnalysisRequest::Hashtag { .. } => Platform::Twitter,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            AnalysisRequest::Video { url } => url,
            AnalysisRequest::Hashtag { hashtag } => hashtag,
        }
    }
}

/// Success envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub counts: LabelCounts,
    pub flagged_comments: Vec<Comment>,
    pub platform: Platform,
    pub source: String,
}

/// Failure envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip)]
    pub status: u16,
}

impl From<&PipelineError> for ErrorResponse {
    fn from(err: &PipelineError) -> Self {
        Self {
            error: err.public_message(),
            status: err.status_code(),
        }
    }
}

pub type PipelineResult = std::result::Result<AnalysisReport, PipelineError>;
