//! Classifier dispatch.
//!
//! A `Classifier` takes a batch of texts and answers one label per text, in
//! order. Two transports implement it:
//!
//! - [`HostedClassifier`]: one HTTP POST of the whole batch to a model endpoint.
//! - [`LocalProcessClassifier`]: one scorer process per call, batch on stdin,
//!   result on stdout.
//!
//! Neither retries, pools, caches or splits a batch. The transport is picked
//! once at startup by [`from_config`].

mod hosted;
mod local;
mod predictions;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AppConfig, ClassifierBackend};
use crate::error::{PipelineError, Result};
use crate::types::Label;

pub use hosted::HostedClassifier;
pub use local::{default_launcher, LocalProcessClassifier};
pub use predictions::{parse_predictions, Prediction};

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Label every text. On success the result has exactly `texts.len()`
    /// entries in input order.
    async fn classify(&self, texts: &[String]) -> Result<Vec<Label>>;

    /// Short transport name for logs.
    fn name(&self) -> &'static str;
}

/// Maps raw model labels onto `Label`.
#[derive(Debug, Clone)]
pub struct LabelPolicy {
    flagged_labels: Vec<String>,
    threshold: f64,
}

impl LabelPolicy {
    pub fn new(flagged_labels: Vec<String>, threshold: f64) -> Self {
        Self {
            flagged_labels,
            threshold,
        }
    }

    /// A flagged label scored below the threshold counts as clean. Predictions
    /// without a score are taken as given.
    pub fn label(&self, prediction: &Prediction) -> Label {
        let flagged = self
            .flagged_labels
            .iter()
            .any(|l| l.eq_ignore_ascii_case(&prediction.label));

        match (flagged, prediction.score) {
            (true, Some(score)) if score < self.threshold => Label::Clean,
            (true, _) => Label::Flagged,
            (false, _) => Label::Clean,
        }
    }

    pub fn labels(&self, predictions: &[Prediction]) -> Vec<Label> {
        predictions.iter().map(|p| self.label(p)).collect()
    }
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self::new(crate::config::default_flagged_labels(), 0.7)
    }
}

/// Build the configured transport. Fails with `ConfigMissing` when the
/// selected transport lacks what it needs.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn Classifier>> {
    let policy = LabelPolicy::new(config.flagged_labels.clone(), config.confidence_threshold);

    match config.classifier_backend {
        ClassifierBackend::Hosted => {
            let endpoint = config
                .hf_model_url
                .clone()
                .ok_or_else(|| PipelineError::ConfigMissing("Classifier endpoint".into()))?;
            let token = config
                .hf_api_token
                .clone()
                .ok_or_else(|| PipelineError::ConfigMissing("Classifier API token".into()))?;

            Ok(Arc::new(
                HostedClassifier::new(endpoint, token, policy)
                    .with_timeout(config.classifier_timeout),
            ))
        }
        ClassifierBackend::Local => {
            let launcher = config
                .classifier_launcher
                .clone()
                .unwrap_or_else(|| default_launcher().to_string());

            let args = vec![config.classifier_script.clone()];

            Ok(Arc::new(
                LocalProcessClassifier::new(launcher, args, policy)
                    .with_timeout(config.classifier_timeout),
            ))
        }
    }
}
