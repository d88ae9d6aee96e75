//! Iris Core - rate-limited batch engine for vision completion APIs.
//!
//! Iris sends every image in a directory to a vision-capable chat-completion
//! endpoint and stores each response as `{stem}.json`, staying inside the
//! provider's rate limits.
//!
//! # Architecture
//!
//! ```text
//! Discover → Encode → Build request → Send (retry on 429) → Persist → Throttle
//! ```
//!
//! One engine serves all providers; OpenAI and Azure OpenAI differ only in
//! their [`RequestAdapter`](provider::RequestAdapter).
//!
//! # Usage
//!
//! ```rust,ignore
//! use iris_core::{BatchDriver, Config, Interrupt, ProviderKind, ProviderOverrides};
//!
//! #[tokio::main]
//! async fn main() -> iris_core::Result<()> {
//!     let config = Config::load()?;
//!     let driver = BatchDriver::from_config(&config, ProviderKind::Openai, &ProviderOverrides::default())?;
//!
//!     let summary = driver
//!         .run_batch("./frames".as_ref(), "./output".as_ref(), &Interrupt::never(), |_| {})
//!         .await?;
//!     println!("{} succeeded, {} failed", summary.succeeded, summary.failed);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod clock;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod provider;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenient access
pub use clock::{Clock, TokioClock};
pub use config::{Config, ProviderKind};
pub use error::{ConfigError, IrisError, Result, TaskError, TaskResult};
pub use pipeline::{BatchDriver, DriverOptions, Interrupt, InterruptHandle};
pub use provider::{ProviderOverrides, RequestAdapter, Transport};
pub use types::{BatchSummary, ImageTask, SingleResponse, TaskOutcome, TaskReport, TaskState};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
