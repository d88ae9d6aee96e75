//! Request adapter trait, request document types, and the adapter factory.
//!
//! Every provider builds the same chat-completion document: a system message
//! and a user message carrying one text part and one image part. Adapters
//! differ only in endpoint URL and auth header.

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::ConfigError;
use crate::pipeline::EncodedPayload;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prompt material shared by every request in a run.
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    /// System message
    pub system: String,
    /// User prompt text
    pub text: String,
    /// Image detail hint ("low", "high", "auto")
    pub detail: String,
}

impl ChatPrompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            system: "You are a helpful assistant".to_string(),
            text: text.into(),
            detail: "high".to_string(),
        }
    }
}

/// Sampling parameters sent with each request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    /// Omitted from the body when `None`
    pub temperature: Option<f32>,
}

/// A provider-specific HTTP request, ready to send.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub endpoint_url: String,
    pub headers: BTreeMap<String, String>,
    pub body: ChatRequest,
}

impl RequestSpec {
    pub(crate) fn new(endpoint_url: String, auth: (&str, String), body: ChatRequest) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert(auth.0.to_string(), auth.1);
        Self {
            endpoint_url,
            headers,
            body,
        }
    }
}

// --- Request document ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ChatContent>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    pub detail: String,
}

impl ChatRequest {
    /// Build the shared chat document: system message, then a user message
    /// with the prompt text followed by the image.
    pub fn vision(
        model: Option<String>,
        prompt: &ChatPrompt,
        payload: &EncodedPayload,
        sampling: &SamplingParams,
    ) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: MessageContent::Text(prompt.system.clone()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: MessageContent::Parts(vec![
                        ChatContent::Text {
                            text: prompt.text.clone(),
                        },
                        ChatContent::ImageUrl {
                            image_url: ImageUrl {
                                url: payload.data_url(),
                                detail: prompt.detail.clone(),
                            },
                        },
                    ]),
                },
            ],
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
        }
    }
}

/// Builds provider-specific requests from normalized inputs.
///
/// Implementations are pure: no I/O, no shared state.
pub trait RequestAdapter: Send + Sync {
    /// Provider name for logging (e.g., "openai", "azure").
    fn name(&self) -> &str;

    fn build_request(
        &self,
        prompt: &ChatPrompt,
        payload: &EncodedPayload,
        sampling: &SamplingParams,
    ) -> RequestSpec;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Per-run values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ProviderOverrides {
    pub api_key: Option<String>,
    /// OpenAI model, or Azure deployment name
    pub model: Option<String>,
    /// OpenAI endpoint, or Azure resource base URL
    pub api_base: Option<String>,
}

/// Factory that creates the appropriate adapter from config and overrides.
pub struct AdapterFactory;

impl AdapterFactory {
    pub fn create(
        kind: ProviderKind,
        config: &ProviderConfig,
        overrides: &ProviderOverrides,
    ) -> Result<Box<dyn RequestAdapter>, ConfigError> {
        match kind {
            ProviderKind::Openai => {
                let cfg = &config.openai;
                let api_key = overrides
                    .api_key
                    .clone()
                    .or_else(|| resolve_env_var(&cfg.api_key))
                    .ok_or(ConfigError::MissingApiKey {
                        provider: "OpenAI",
                        env_hint: "OPENAI_API_KEY",
                    })?;
                let model = overrides.model.clone().unwrap_or(cfg.model.clone());
                let endpoint = overrides.api_base.clone().unwrap_or(cfg.endpoint.clone());
                Ok(Box::new(super::openai::OpenAiAdapter::with_endpoint(
                    &api_key, &model, &endpoint,
                )))
            }
            ProviderKind::Azure => {
                let cfg = &config.azure;
                let api_key = overrides
                    .api_key
                    .clone()
                    .or_else(|| resolve_env_var(&cfg.api_key))
                    .ok_or(ConfigError::MissingApiKey {
                        provider: "Azure OpenAI",
                        env_hint: "AZURE_OPENAI_API_KEY",
                    })?;
                let deployment = overrides.model.clone().unwrap_or(cfg.deployment.clone());
                let api_base = overrides.api_base.clone().unwrap_or(cfg.api_base.clone());
                Ok(Box::new(super::azure::AzureAdapter::new(
                    &api_base,
                    &deployment,
                    &cfg.api_version,
                    &api_key,
                    cfg.model.clone(),
                )))
            }
        }
    }
}
