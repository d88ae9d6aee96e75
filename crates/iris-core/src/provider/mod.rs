//! Provider integration: request adapters, transport, and retry.
//!
//! One engine serves every provider. Adapters turn a prompt and an encoded
//! image into a [`RequestSpec`]; the [`Transport`] sends it; the
//! [`RetryPolicy`] decides what to do with each [`AttemptOutcome`].

pub(crate) mod adapter;
pub(crate) mod azure;
pub(crate) mod openai;
pub(crate) mod retry;
pub(crate) mod transport;

pub use adapter::{
    resolve_env_var, AdapterFactory, ChatContent, ChatMessage, ChatPrompt, ChatRequest, ImageUrl,
    MessageContent, ProviderOverrides, RequestAdapter, RequestSpec, SamplingParams,
};
pub use azure::AzureAdapter;
pub use openai::OpenAiAdapter;
pub use retry::{backoff_duration, AttemptOutcome, FinalAttempt, RetryPolicy};
pub use transport::{HttpReply, HttpTransport, Transport};
