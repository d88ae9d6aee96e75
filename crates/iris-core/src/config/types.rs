//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which chat-completion provider requests are shaped for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// api.openai.com, bearer-token auth
    #[default]
    Openai,
    /// Azure OpenAI deployment, `api-key` header auth
    Azure,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Openai => write!(f, "openai"),
            ProviderKind::Azure => write!(f, "azure"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::Openai),
            "azure" | "azure-openai" => Ok(Self::Azure),
            other => Err(format!("Unknown provider: {other}")),
        }
    }
}

/// Provider selection and per-provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider used when the CLI does not choose one
    pub default: ProviderKind,

    /// OpenAI settings
    pub openai: OpenAiConfig,

    /// Azure OpenAI settings
    pub azure: AzureConfig,
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Chat completions endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4-vision-preview".to_string(),
        }
    }
}

/// Azure OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    /// Resource base URL, e.g. `https://my-resource.openai.azure.com/`
    pub api_base: String,

    /// Deployment name (selects the model on the Azure side)
    pub deployment: String,

    /// `api-version` query parameter
    pub api_version: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Optional `model` field sent in the body; Azure routes by deployment
    pub model: Option<String>,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.azure.com/".to_string(),
            deployment: "gpt-4o".to_string(),
            api_version: "2023-12-01-preview".to_string(),
            api_key: "${AZURE_OPENAI_API_KEY}".to_string(),
            model: None,
        }
    }
}

/// Request shaping shared by all providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// System message sent ahead of the user prompt
    pub system_prompt: String,

    /// User prompt used when the CLI does not supply one
    pub prompt: String,

    /// Image detail hint: "low", "high" or "auto"
    pub detail: String,

    /// `max_tokens` for batch runs
    pub batch_max_tokens: u32,

    /// `max_tokens` for single-image runs
    pub single_max_tokens: u32,

    /// Sampling temperature for batch runs (single runs omit it)
    pub temperature: f32,

    /// Per-request HTTP timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful assistant".to_string(),
            prompt: "your_prompt_here".to_string(),
            detail: "high".to_string(),
            batch_max_tokens: 300,
            single_max_tokens: 500,
            temperature: 0.1,
            timeout_ms: 60_000,
        }
    }
}

/// How the wait between rate-limited attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// Same wait every time
    #[default]
    Fixed,
    /// `wait_ms * 2^n`, capped at `max_wait_ms`
    Exponential,
}

/// Retry behaviour on HTTP 429.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per image, including the first
    pub max_attempts: u32,

    /// Base wait between attempts in milliseconds
    pub wait_ms: u64,

    /// Backoff strategy
    pub backoff: BackoffKind,

    /// Upper bound on any single wait
    pub max_wait_ms: u64,

    /// Let a `Retry-After` header lengthen the wait (it never shortens it)
    pub respect_retry_after: bool,

    /// Also retry 5xx responses (off: only 429 is retried)
    pub retry_server_errors: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            wait_ms: 10_000,
            backoff: BackoffKind::Fixed,
            max_wait_ms: 60_000,
            respect_retry_after: true,
            retry_server_errors: false,
        }
    }
}

/// Client-side quota window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Disable to skip both the spacing and the window pause
    pub enabled: bool,

    /// Completed requests allowed per window
    pub max_per_window: u32,

    /// Window length in seconds
    pub window_secs: u64,

    /// Pause after every completed request in milliseconds
    pub min_spacing_ms: u64,

    /// Wait out a partially used window before the run returns
    pub settle_on_finish: bool,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_per_window: 20,
            window_secs: 60,
            min_spacing_ms: 1000,
            settle_on_finish: false,
        }
    }
}

/// Input selection and payload encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Extensions eligible for processing (case-insensitive)
    pub supported_formats: Vec<String>,

    /// Declared MIME type for every payload, or "auto" to derive it
    /// from the file extension
    pub mime_type: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
            mime_type: "image/jpeg".to_string(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one `{stem}.json` per image
    pub dir: PathBuf,

    /// Spaces of indentation in written JSON
    pub indent: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            indent: 4,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("openai".parse::<ProviderKind>(), Ok(ProviderKind::Openai));
        assert_eq!("Azure".parse::<ProviderKind>(), Ok(ProviderKind::Azure));
        assert!("anthropic".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_kind_display_round_trips() {
        for kind in [ProviderKind::Openai, ProviderKind::Azure] {
            assert_eq!(kind.to_string().parse::<ProviderKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_retry_defaults() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.wait_ms, 10_000);
        assert_eq!(retry.backoff, BackoffKind::Fixed);
        assert!(!retry.retry_server_errors);
    }

    #[test]
    fn test_throttle_defaults() {
        let throttle = ThrottleConfig::default();
        assert!(throttle.enabled);
        assert_eq!(throttle.max_per_window, 20);
        assert_eq!(throttle.window_secs, 60);
        assert_eq!(throttle.min_spacing_ms, 1000);
    }
}
