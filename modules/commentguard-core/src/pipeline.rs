//! Per-request orchestration: extract -> fetch -> normalize -> classify.
//!
//! Each request runs the steps in order, once. The first failing step ends
//! the request with its `PipelineError`; nothing gathered before it is kept.
//! The pipeline itself holds no per-request state, so one instance serves
//! concurrent requests.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use twitter_client::{TweetWithAuthor, TwitterClient};
use youtube_client::{CommentThread, YouTubeClient};

use crate::classifier::{self, Classifier};
use crate::config::AppConfig;
use crate::error::{PipelineError, Result};
use crate::extract::{extract_hashtag, extract_video_id};
use crate::normalize;
use crate::types::{
    AnalysisReport, AnalysisRequest, ClassificationBatch, Comment, Platform, PipelineResult,
};

// ---------------------------------------------------------------------------
// Fetcher seams
// ---------------------------------------------------------------------------

/// Long-form comment fetcher.
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn fetch(&self, video_id: &str, max_results: usize) -> Result<Vec<CommentThread>>;
}

#[async_trait]
impl CommentSource for YouTubeClient {
    async fn fetch(&self, video_id: &str, max_results: usize) -> Result<Vec<CommentThread>> {
        Ok(self.fetch_comments(video_id, max_results).await?)
    }
}

/// Short-post search fetcher.
#[async_trait]
pub trait PostSearch: Send + Sync {
    async fn search(&self, hashtag: &str, max_results: u32) -> Result<Vec<TweetWithAuthor>>;
}

#[async_trait]
impl PostSearch for TwitterClient {
    async fn search(&self, hashtag: &str, max_results: u32) -> Result<Vec<TweetWithAuthor>> {
        Ok(self.search_hashtag(hashtag, max_results).await?)
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extracting,
    Fetching,
    Normalizing,
    Classifying,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extracting => "extracting",
            Stage::Fetching => "fetching",
            Stage::Normalizing => "normalizing",
            Stage::Classifying => "classifying",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

fn failed(stage: Stage, err: PipelineError) -> PipelineError {
    error!(stage = %stage, kind = ?err.kind(), error = %err, "Pipeline step failed");
    err
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Pipeline {
    youtube: Option<Arc<dyn CommentSource>>,
    twitter: Option<Arc<dyn PostSearch>>,
    classifier: Option<Arc<dyn Classifier>>,
    youtube_max_results: usize,
    twitter_max_results: u32,
}

impl Default for Pipeline {
    fn default() -> Self {
        let defaults = AppConfig::default();
        Self {
            youtube: None,
            twitter: None,
            classifier: None,
            youtube_max_results: defaults.youtube_max_results,
            twitter_max_results: defaults.twitter_max_results,
        }
    }
}

impl Pipeline {
    /// Wire clients and the classifier transport from configuration. Missing
    /// credentials leave the matching slot empty; requests that need it are
    /// rejected with `ConfigMissing`.
    pub fn from_config(config: &AppConfig) -> Self {
        let youtube = config
            .youtube_api_key
            .clone()
            .map(|key| {
                Arc::new(YouTubeClient::new(key).with_timeout(config.platform_timeout))
                    as Arc<dyn CommentSource>
            });
        let twitter = config
            .twitter_bearer_token
            .clone()
            .map(|token| {
                Arc::new(TwitterClient::new(token).with_timeout(config.platform_timeout))
                    as Arc<dyn PostSearch>
            });

        let classifier = match classifier::from_config(config) {
            Ok(classifier) => {
                info!(transport = classifier.name(), "Classifier ready");
                Some(classifier)
            }
            Err(e) => {
                warn!(error = %e, "Classifier not configured, analysis requests will be rejected");
                None
            }
        };

        Self {
            youtube,
            twitter,
            classifier,
            youtube_max_results: config.youtube_max_results,
            twitter_max_results: config.twitter_max_results,
        }
    }

    pub fn with_comment_source(mut self, source: Arc<dyn CommentSource>) -> Self {
        self.youtube = Some(source);
        self
    }

    pub fn with_post_search(mut self, search: Arc<dyn PostSearch>) -> Self {
        self.twitter = Some(search);
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_youtube_max_results(mut self, max_results: usize) -> Self {
        self.youtube_max_results = max_results;
        self
    }

    pub fn with_twitter_max_results(mut self, max_results: u32) -> Self {
        self.twitter_max_results = max_results;
        self
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> PipelineResult {
        match request {
            AnalysisRequest::Video { url } => self.analyze_video(url).await,
            AnalysisRequest::Hashtag { hashtag } => self.analyze_hashtag(hashtag).await,
        }
    }

    /// Classify the comments of the video `url` points at.
    pub async fn analyze_video(&self, url: &str) -> PipelineResult {
        if url.trim().is_empty() {
            return Err(PipelineError::InvalidInput("YouTube URL is required.".into()));
        }
        let source = self
            .youtube
            .as_ref()
            .ok_or_else(|| PipelineError::ConfigMissing("YouTube API key".into()))?;
        let classifier = self.classifier()?;

        debug!(stage = %Stage::Extracting, url, "Analyzing video");
        let video_id = extract_video_id(url).map_err(|_| {
            failed(
                Stage::Extracting,
                PipelineError::InvalidInput("Invalid YouTube URL.".into()),
            )
        })?;

        debug!(stage = %Stage::Fetching, video_id = %video_id, "Fetching comments");
        let threads = source
            .fetch(video_id.as_str(), self.youtube_max_results)
            .await
            .map_err(|e| failed(Stage::Fetching, e))?;
        if threads.is_empty() {
            return Err(failed(
                Stage::Fetching,
                PipelineError::NotFound("comments".into()),
            ));
        }

        debug!(stage = %Stage::Normalizing, count = threads.len(), "Normalizing comments");
        let comments: Vec<Comment> = threads
            .into_iter()
            .filter_map(normalize::from_comment_thread)
            .collect();

        self.classify(classifier.as_ref(), Platform::Youtube, url, comments, "comments")
            .await
    }

    /// Classify recent posts carrying `hashtag`.
    pub async fn analyze_hashtag(&self, hashtag: &str) -> PipelineResult {
        if hashtag.trim().is_empty() {
            return Err(PipelineError::InvalidInput("Hashtag is required.".into()));
        }
        let search = self
            .twitter
            .as_ref()
            .ok_or_else(|| PipelineError::ConfigMissing("Twitter API bearer token".into()))?;
        let classifier = self.classifier()?;

        debug!(stage = %Stage::Extracting, hashtag, "Analyzing hashtag");
        let tag = extract_hashtag(hashtag).map_err(|_| {
            failed(
                Stage::Extracting,
                PipelineError::InvalidInput(
                    "Invalid hashtag format. Use only letters, numbers, and underscores.".into(),
                ),
            )
        })?;

        debug!(stage = %Stage::Fetching, tag = %tag, "Searching posts");
        let posts = search
            .search(tag.as_str(), self.twitter_max_results)
            .await
            .map_err(|e| failed(Stage::Fetching, e))?;
        if posts.is_empty() {
            return Err(failed(
                Stage::Fetching,
                PipelineError::NotFound("tweets".into()),
            ));
        }

        debug!(stage = %Stage::Normalizing, count = posts.len(), "Normalizing posts");
        let comments: Vec<Comment> = posts
            .into_iter()
            .filter_map(normalize::from_tweet)
            .collect();

        self.classify(classifier.as_ref(), Platform::Twitter, hashtag, comments, "tweets")
            .await
    }

    fn classifier(&self) -> Result<Arc<dyn Classifier>> {
        self.classifier
            .clone()
            .ok_or_else(|| PipelineError::ConfigMissing("Classifier".into()))
    }

    async fn classify(
        &self,
        classifier: &dyn Classifier,
        platform: Platform,
        source: &str,
        comments: Vec<Comment>,
        item_name: &str,
    ) -> PipelineResult {
        if comments.is_empty() {
            return Err(failed(
                Stage::Normalizing,
                PipelineError::NotFound(item_name.to_string()),
            ));
        }

        debug!(
            stage = %Stage::Classifying,
            transport = classifier.name(),
            count = comments.len(),
            "Dispatching batch"
        );
        let texts: Vec<String> = comments.iter().map(|c| c.text.clone()).collect();
        let labels = classifier
            .classify(&texts)
            .await
            .map_err(|e| failed(Stage::Classifying, e))?;
        let batch =
            ClassificationBatch::pair(comments, labels).map_err(|e| failed(Stage::Classifying, e))?;

        let counts = batch.counts();
        info!(
            stage = %Stage::Done,
            platform = %platform,
            flagged = counts.flagged,
            clean = counts.clean,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            counts,
            flagged_comments: batch.into_flagged(),
            platform,
            source: source.to_string(),
        })
    }
}
