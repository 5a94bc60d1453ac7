use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::{parse_predictions, Classifier, LabelPolicy};
use crate::error::{PipelineError, Result};
use crate::types::Label;

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a [String],
}

/// Hosted model behind an HTTP endpoint that takes `{ "inputs": [...] }` and
/// answers one prediction per input.
pub struct HostedClassifier {
    http: reqwest::Client,
    endpoint: String,
    api_token: String,
    timeout: Duration,
    policy: LabelPolicy,
}

impl HostedClassifier {
    pub fn new(endpoint: String, api_token: String, policy: LabelPolicy) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_token,
            timeout: Duration::from_secs(120),
            policy,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Classifier for HostedClassifier {
    async fn classify(&self, texts: &[String]) -> Result<Vec<Label>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(endpoint = %self.endpoint, count = texts.len(), "Hosted classifier request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .timeout(self.timeout)
            .json(&InferenceRequest { inputs: texts })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Hosted classifier request failed");
                PipelineError::ClassifierUnavailable(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::ClassifierUnavailable(e.to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %body, "Hosted classifier returned error status");
            return Err(PipelineError::ClassifierUnavailable(format!(
                "classifier returned {status}: {body}"
            )));
        }

        let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            PipelineError::ClassifierProtocolError(format!("response is not JSON: {e}"))
        })?;

        let predictions = parse_predictions(value, texts.len())?;
        Ok(self.policy.labels(&predictions))
    }

    fn name(&self) -> &'static str {
        "hosted"
    }
}
