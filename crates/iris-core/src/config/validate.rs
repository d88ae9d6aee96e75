//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be > 0".into(),
            ));
        }
        if self.retry.max_wait_ms < self.retry.wait_ms {
            return Err(ConfigError::ValidationError(
                "retry.max_wait_ms must be >= retry.wait_ms".into(),
            ));
        }
        if self.throttle.max_per_window == 0 {
            return Err(ConfigError::ValidationError(
                "throttle.max_per_window must be > 0".into(),
            ));
        }
        if self.throttle.window_secs == 0 {
            return Err(ConfigError::ValidationError(
                "throttle.window_secs must be > 0".into(),
            ));
        }
        if self.request.batch_max_tokens == 0 || self.request.single_max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "request.batch_max_tokens and request.single_max_tokens must be > 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.request.temperature) {
            return Err(ConfigError::ValidationError(
                "request.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.request.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "request.timeout_ms must be > 0".into(),
            ));
        }
        if !matches!(self.request.detail.as_str(), "low" | "high" | "auto") {
            return Err(ConfigError::ValidationError(format!(
                "request.detail must be one of low, high, auto (got '{}')",
                self.request.detail
            )));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        let mime = self.processing.mime_type.as_str();
        if mime != "auto" && !mime.starts_with("image/") {
            return Err(ConfigError::ValidationError(format!(
                "processing.mime_type must be \"auto\" or an image/* type (got '{mime}')"
            )));
        }
        Ok(())
    }
}
