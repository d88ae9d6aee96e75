//! Azure OpenAI adapter.
//!
//! Same chat document as OpenAI, sent to a deployment- and version-scoped
//! URL with an `api-key` header.

use super::adapter::{ChatPrompt, ChatRequest, RequestAdapter, RequestSpec, SamplingParams};
use crate::pipeline::EncodedPayload;

pub struct AzureAdapter {
    endpoint: String,
    api_key: String,
    model: Option<String>,
}

impl AzureAdapter {
    pub fn new(
        api_base: &str,
        deployment: &str,
        api_version: &str,
        api_key: &str,
        model: Option<String>,
    ) -> Self {
        let endpoint = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            api_base.trim_end_matches('/'),
            deployment,
            api_version
        );
        Self {
            endpoint,
            api_key: api_key.to_string(),
            model,
        }
    }
}

impl RequestAdapter for AzureAdapter {
    fn name(&self) -> &str {
        "azure"
    }

    fn build_request(
        &self,
        prompt: &ChatPrompt,
        payload: &EncodedPayload,
        sampling: &SamplingParams,
    ) -> RequestSpec {
        let body = ChatRequest::vision(self.model.clone(), prompt, payload, sampling);
        RequestSpec::new(
            self.endpoint.clone(),
            ("api-key", self.api_key.clone()),
            body,
        )
    }
}
