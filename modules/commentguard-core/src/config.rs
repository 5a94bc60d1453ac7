use std::time::Duration;

use anyhow::{Context, Result};

/// Which transport reaches the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierBackend {
    /// HTTP POST to a hosted model endpoint.
    Hosted,
    /// Scorer script run as a child process.
    Local,
}

impl std::str::FromStr for ClassifierBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hosted" | "http" | "huggingface" => Ok(ClassifierBackend::Hosted),
            "local" | "process" | "subprocess" => Ok(ClassifierBackend::Local),
            other => anyhow::bail!("unknown classifier backend: {other}"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Credentials are optional; a request for an unconfigured platform is
/// rejected when it arrives, not at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Platforms
    pub youtube_api_key: Option<String>,
    pub twitter_bearer_token: Option<String>,
    pub youtube_max_results: usize,
    pub twitter_max_results: u32,
    pub platform_timeout: Duration,

    // Classifier
    pub classifier_backend: ClassifierBackend,
    pub hf_model_url: Option<String>,
    pub hf_api_token: Option<String>,
    pub classifier_script: String,
    pub classifier_launcher: Option<String>,
    pub classifier_timeout: Duration,
    pub flagged_labels: Vec<String>,
    pub confidence_threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            twitter_bearer_token: None,
            youtube_max_results: youtube_client::DEFAULT_MAX_RESULTS,
            twitter_max_results: 10,
            platform_timeout: youtube_client::DEFAULT_TIMEOUT,
            classifier_backend: ClassifierBackend::Hosted,
            hf_model_url: None,
            hf_api_token: None,
            classifier_script: "model_runner.py".to_string(),
            classifier_launcher: None,
            classifier_timeout: Duration::from_secs(120),
            flagged_labels: default_flagged_labels(),
            confidence_threshold: 0.7,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            youtube_api_key: optional_env("YOUTUBE_API_KEY"),
            twitter_bearer_token: optional_env("TWITTER_BEARER_TOKEN"),
            youtube_max_results: parsed_env("YOUTUBE_MAX_RESULTS")?
                .unwrap_or(defaults.youtube_max_results),
            twitter_max_results: parsed_env("TWITTER_MAX_RESULTS")?
                .unwrap_or(defaults.twitter_max_results),
            platform_timeout: parsed_env::<u64>("PLATFORM_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.platform_timeout),
            classifier_backend: parsed_env("CLASSIFIER_BACKEND")?
                .unwrap_or(defaults.classifier_backend),
            hf_model_url: optional_env("HF_MODEL_URL"),
            hf_api_token: optional_env("HF_API_TOKEN"),
            classifier_script: optional_env("CLASSIFIER_SCRIPT")
                .unwrap_or(defaults.classifier_script),
            classifier_launcher: optional_env("CLASSIFIER_LAUNCHER"),
            classifier_timeout: parsed_env::<u64>("CLASSIFIER_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.classifier_timeout),
            flagged_labels: optional_env("CLASSIFIER_FLAGGED_LABELS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.flagged_labels),
            confidence_threshold: parsed_env("CLASSIFIER_THRESHOLD")?
                .unwrap_or(defaults.confidence_threshold),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.char_indices().nth(5).map(|(i, _)| i).unwrap_or(val.len());
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  YOUTUBE_API_KEY: {}", preview_opt(&self.youtube_api_key));
        tracing::info!("  TWITTER_BEARER_TOKEN: {}", preview_opt(&self.twitter_bearer_token));
        tracing::info!("  PLATFORM_TIMEOUT_SECS: {}", self.platform_timeout.as_secs());
        tracing::info!("  CLASSIFIER_BACKEND: {:?}", self.classifier_backend);
        tracing::info!("  HF_MODEL_URL: {}", self.hf_model_url.as_deref().unwrap_or("<not set>"));
        tracing::info!("  HF_API_TOKEN: {}", preview_opt(&self.hf_api_token));
        tracing::info!("  CLASSIFIER_SCRIPT: {}", self.classifier_script);
        tracing::info!("  CLASSIFIER_TIMEOUT_SECS: {}", self.classifier_timeout.as_secs());
    }
}

pub fn default_flagged_labels() -> Vec<String> {
    ["LABEL_1", "1", "flagged"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("{key} has an invalid value: {raw}"))
        })
        .transpose()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse() {
        assert_eq!("hosted".parse::<ClassifierBackend>().unwrap(), ClassifierBackend::Hosted);
        assert_eq!(" Local ".parse::<ClassifierBackend>().unwrap(), ClassifierBackend::Local);
        assert!("carrier-pigeon".parse::<ClassifierBackend>().is_err());
    }

    #[test]
    fn label_list_is_trimmed_and_skips_blanks() {
        assert_eq!(split_list("LABEL_1, toxic ,,1"), vec!["LABEL_1", "toxic", "1"]);
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.youtube_max_results, 1000);
        assert_eq!(config.twitter_max_results, 10);
        assert_eq!(config.platform_timeout, Duration::from_secs(30));
        assert_eq!(config.classifier_backend, ClassifierBackend::Hosted);
        assert!(config.flagged_labels.contains(&"LABEL_1".to_string()));
    }
}
