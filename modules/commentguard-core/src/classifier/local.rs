use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{parse_predictions, Classifier, LabelPolicy};
use crate::error::{PipelineError, Result};
use crate::types::Label;

/// Interpreter used to run the scorer script on this OS.
pub fn default_launcher() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

/// Scorer run as a child process, one process per call.
///
/// The batch goes to stdin as one JSON array of strings and stdin is closed.
/// The scorer answers one JSON document on stdout; stderr is kept for
/// diagnostics. The whole exchange is bounded by `timeout` and the child is
/// killed if it runs over.
pub struct LocalProcessClassifier {
    launcher: String,
    args: Vec<String>,
    timeout: Duration,
    policy: LabelPolicy,
}

impl LocalProcessClassifier {
    pub fn new(launcher: String, args: Vec<String>, policy: LabelPolicy) -> Self {
        Self {
            launcher,
            args,
            timeout: Duration::from_secs(120),
            policy,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, payload: Vec<u8>) -> Result<std::process::Output> {
        let mut child = Command::new(&self.launcher)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PipelineError::ClassifierUnavailable(format!(
                    "failed to launch scorer {}: {e}",
                    self.launcher
                ))
            })?;

        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // A scorer that exits without reading closes the pipe; its exit
                // status decides the outcome, not the write.
                if let Err(e) = stdin.write_all(&payload).await {
                    debug!(error = %e, "Scorer stdin closed early");
                }
            }
        };

        // stdout and stderr are drained concurrently by wait_with_output while
        // stdin is fed, so a chatty stream cannot stall the other.
        let exchange = async move {
            let ((), output) = tokio::join!(feed, child.wait_with_output());
            output
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(PipelineError::ClassifierUnavailable(format!(
                "scorer I/O failed: {e}"
            ))),
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs_f64(), "Scorer timed out, killing");
                Err(PipelineError::ClassifierUnavailable(format!(
                    "scorer timed out after {:?}",
                    self.timeout
                )))
            }
        }
    }
}

#[async_trait]
impl Classifier for LocalProcessClassifier {
    async fn classify(&self, texts: &[String]) -> Result<Vec<Label>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = serde_json::to_vec(texts)
            .map_err(|e| PipelineError::ClassifierProtocolError(e.to_string()))?;

        debug!(launcher = %self.launcher, count = texts.len(), "Spawning local scorer");
        let output = self.run(payload).await?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            warn!(code = %code, stderr = %stderr.trim(), "Scorer exited with failure");
            return Err(PipelineError::ClassifierUnavailable(format!(
                "scorer exited with {code}: {}",
                stderr.trim()
            )));
        }
        if !stderr.trim().is_empty() {
            debug!(stderr = %stderr.trim(), "Scorer diagnostics");
        }

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).map_err(|e| {
            PipelineError::ClassifierProtocolError(format!("scorer output is not JSON: {e}"))
        })?;

        let predictions = parse_predictions(value, texts.len())?;
        Ok(self.policy.labels(&predictions))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
