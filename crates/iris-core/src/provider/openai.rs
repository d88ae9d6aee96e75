//! OpenAI Chat Completions adapter.
//!
//! Bearer-token auth against a fixed endpoint; the model travels in the body.

use super::adapter::{ChatPrompt, ChatRequest, RequestAdapter, RequestSpec, SamplingParams};
use crate::pipeline::EncodedPayload;

pub struct OpenAiAdapter {
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiAdapter {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self::with_endpoint(api_key, model, "https://api.openai.com/v1/chat/completions")
    }

    /// Create with a custom endpoint (proxies, OpenAI-compatible gateways).
    pub fn with_endpoint(api_key: &str, model: &str, endpoint: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint: endpoint.to_string(),
        }
    }
}

impl RequestAdapter for OpenAiAdapter {
    fn name(&self) -> &str {
        "openai"
    }

    fn build_request(
        &self,
        prompt: &ChatPrompt,
        payload: &EncodedPayload,
        sampling: &SamplingParams,
    ) -> RequestSpec {
        let body = ChatRequest::vision(Some(self.model.clone()), prompt, payload, sampling);
        RequestSpec::new(
            self.endpoint.clone(),
            ("Authorization", format!("Bearer {}", self.api_key)),
            body,
        )
    }
}
