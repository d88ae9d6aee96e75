//! Image payload encoding.
//!
//! Pass-through base64 of the raw file bytes. No decoding or validation is
//! done here; a file the provider cannot read comes back as a request failure.

use crate::error::{TaskError, TaskResult};
use crate::types::ImageTask;
use base64::Engine;
use std::path::Path;

/// Base64-encoded image ready to embed in a chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    /// MIME type declared in the data URL
    pub mime_type: String,
    /// Base64-encoded image bytes
    pub base64_data: String,
}

impl EncodedPayload {
    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_data)
    }
}

/// How the declared MIME type is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimePolicy {
    /// Declare the same type for every image
    Fixed(String),
    /// Derive the type from the file extension
    FromExtension,
}

impl MimePolicy {
    /// Parse the `processing.mime_type` setting.
    pub fn from_setting(value: &str) -> Self {
        if value.eq_ignore_ascii_case("auto") {
            Self::FromExtension
        } else {
            Self::Fixed(value.to_string())
        }
    }

    fn mime_for(&self, path: &Path) -> String {
        match self {
            MimePolicy::Fixed(mime) => mime.clone(),
            MimePolicy::FromExtension => {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_lowercase)
                    .unwrap_or_default();
                match ext.as_str() {
                    "jpg" | "jpeg" => "image/jpeg",
                    "png" => "image/png",
                    "webp" => "image/webp",
                    "gif" => "image/gif",
                    other => {
                        tracing::warn!("Unknown image extension '{other}', declaring image/jpeg");
                        "image/jpeg"
                    }
                }
                .to_string()
            }
        }
    }
}

impl Default for MimePolicy {
    fn default() -> Self {
        Self::Fixed("image/jpeg".to_string())
    }
}

/// Reads image files and produces transport-ready payloads.
#[derive(Debug, Clone, Default)]
pub struct ImageEncoder {
    policy: MimePolicy,
}

impl ImageEncoder {
    pub fn new(policy: MimePolicy) -> Self {
        Self { policy }
    }

    /// Read and encode the task's source file.
    pub async fn encode(&self, task: &ImageTask) -> TaskResult<EncodedPayload> {
        let bytes = tokio::fs::read(&task.source_path)
            .await
            .map_err(|source| TaskError::Encoding {
                path: task.source_path.clone(),
                source,
            })?;
        Ok(self.encode_bytes(&bytes, &task.source_path))
    }

    /// Encode bytes already in memory; `path` only informs the MIME type.
    pub fn encode_bytes(&self, bytes: &[u8], path: &Path) -> EncodedPayload {
        EncodedPayload {
            mime_type: self.policy.mime_for(path),
            base64_data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}
