//! Batch driver: turns a directory of images into throttled, retried API
//! calls with one persisted result per image.
//!
//! Tasks run strictly one after another. Each is driven through
//! encode → build request → retry → persist, and any failure is recorded
//! against that image without stopping the batch. The only early exit is an
//! [`Interrupt`].

use super::discovery::FileDiscovery;
use super::encode::{ImageEncoder, MimePolicy};
use super::interrupt::Interrupt;
use super::persist::ResultPersister;
use super::throttle::ThrottleWindow;
use crate::clock::{Clock, TokioClock};
use crate::config::{Config, ProcessingConfig, ProviderKind, ThrottleConfig};
use crate::error::{Result, TaskError, TaskResult};
use crate::provider::{
    AdapterFactory, ChatPrompt, HttpTransport, ProviderOverrides, RequestAdapter, RetryPolicy,
    SamplingParams, Transport,
};
use crate::types::{
    BatchSummary, ImageTask, SingleResponse, TaskOutcome, TaskReport, TaskState,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Everything the driver needs besides the provider and transport.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub prompt: ChatPrompt,
    pub batch_sampling: SamplingParams,
    pub single_sampling: SamplingParams,
    pub retry: RetryPolicy,
    pub throttle: ThrottleConfig,
    pub processing: ProcessingConfig,
    /// Indentation of persisted JSON
    pub indent: usize,
}

impl DriverOptions {
    pub fn from_config(config: &Config) -> Self {
        let request = &config.request;
        Self {
            prompt: ChatPrompt {
                system: request.system_prompt.clone(),
                text: request.prompt.clone(),
                detail: request.detail.clone(),
            },
            batch_sampling: SamplingParams {
                max_tokens: request.batch_max_tokens,
                temperature: Some(request.temperature),
            },
            single_sampling: SamplingParams {
                max_tokens: request.single_max_tokens,
                temperature: None,
            },
            retry: RetryPolicy::from_config(&config.retry),
            throttle: config.throttle.clone(),
            processing: config.processing.clone(),
            indent: config.output.indent,
        }
    }
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct BatchDriver {
    adapter: Box<dyn RequestAdapter>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    encoder: ImageEncoder,
    persister: ResultPersister,
    discovery: FileDiscovery,
    options: DriverOptions,
}

impl BatchDriver {
    pub fn new(
        adapter: Box<dyn RequestAdapter>,
        transport: Arc<dyn Transport>,
        options: DriverOptions,
    ) -> Self {
        Self {
            adapter,
            transport,
            clock: Arc::new(TokioClock),
            encoder: ImageEncoder::new(MimePolicy::from_setting(&options.processing.mime_type)),
            persister: ResultPersister::new(options.indent),
            discovery: FileDiscovery::new(&options.processing),
            options,
        }
    }

    /// Build a driver that talks to a real provider over HTTP.
    pub fn from_config(
        config: &Config,
        kind: ProviderKind,
        overrides: &ProviderOverrides,
    ) -> Result<Self> {
        let adapter = AdapterFactory::create(kind, &config.provider, overrides)?;
        let transport = HttpTransport::new(Duration::from_millis(config.request.timeout_ms));
        Ok(Self::new(
            adapter,
            Arc::new(transport),
            DriverOptions::from_config(config),
        ))
    }

    /// Replace the time source (tests drive batches on virtual time).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.adapter.name()
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    /// List the eligible images in `input_dir`, in directory iteration order.
    pub fn discover(&self, input_dir: &Path) -> Result<Vec<ImageTask>> {
        self.discovery.discover(input_dir)
    }

    /// Process every eligible image in `input_dir`.
    ///
    /// Only discovery failures are returned as errors; per-image failures
    /// end up in the summary.
    pub async fn run_batch<F>(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        interrupt: &Interrupt,
        on_report: F,
    ) -> Result<BatchSummary>
    where
        F: FnMut(&TaskReport),
    {
        let tasks = self.discover(input_dir)?;
        Ok(self
            .run_tasks(tasks, output_dir, interrupt, on_report)
            .await)
    }

    /// Process an explicit list of tasks, in order.
    pub async fn run_tasks<F>(
        &self,
        tasks: Vec<ImageTask>,
        output_dir: &Path,
        interrupt: &Interrupt,
        mut on_report: F,
    ) -> BatchSummary
    where
        F: FnMut(&TaskReport),
    {
        let start = self.clock.now();
        let mut throttle = ThrottleWindow::new(&self.options.throttle, start);
        let mut summary = BatchSummary::default();

        if let Err(e) = std::fs::create_dir_all(output_dir) {
            tracing::warn!("Cannot create output directory {:?}: {e}", output_dir);
        }
        tracing::info!(
            "Processing {} image(s) via {} into {:?}",
            tasks.len(),
            self.adapter.name(),
            output_dir
        );

        for task in tasks {
            if interrupt.is_triggered() {
                summary.stopped_early = true;
                break;
            }

            let mut attempts = 0;
            let response = tokio::select! {
                biased;
                _ = interrupt.triggered() => Err(TaskError::Interrupted),
                response = self.request_task(&task, &mut attempts) => response,
            };
            // Once a response is in hand it is always written; the interrupt
            // is only honoured before or after the write.
            let result = match response {
                Ok(document) => {
                    self.persister
                        .persist_blocking(output_dir, &task.stable_id, document)
                        .await
                }
                Err(cause) => Err(cause),
            };

            let report = match result {
                Ok(output_path) => {
                    tracing::info!("Output saved to {:?}", output_path);
                    TaskReport {
                        task,
                        outcome: TaskOutcome::Succeeded { output_path },
                        attempts,
                    }
                }
                Err(cause) => {
                    if matches!(cause, TaskError::Interrupted) {
                        tracing::warn!("Interrupted while processing {}", task.file_name());
                    } else {
                        tracing::error!("Failed: {} - {}", task.file_name(), cause);
                    }
                    TaskReport {
                        task,
                        outcome: TaskOutcome::Failed { cause },
                        attempts,
                    }
                }
            };
            tracing::debug!("{} -> {:?}", report.task.stable_id, report.state());

            on_report(&report);
            let interrupted = report.is_interrupted();
            summary.record(report);
            if interrupted {
                summary.stopped_early = true;
                break;
            }

            // Encoding failures never reached the provider, so they don't
            // use up quota.
            if attempts > 0 {
                tokio::select! {
                    biased;
                    _ = interrupt.triggered() => {
                        summary.stopped_early = true;
                        break;
                    }
                    _ = throttle.record_completion(self.clock.as_ref()) => {}
                }
            }
        }

        if self.options.throttle.settle_on_finish && !summary.stopped_early {
            tokio::select! {
                biased;
                _ = interrupt.triggered() => summary.stopped_early = true,
                _ = throttle.settle(self.clock.as_ref()) => {}
            }
        }

        summary.elapsed = self.clock.now().saturating_duration_since(start);
        tracing::info!(
            "Batch finished: {} succeeded, {} failed{}",
            summary.succeeded,
            summary.failed,
            if summary.stopped_early {
                " (interrupted)"
            } else {
                ""
            }
        );
        summary
    }

    /// Send one image once and hand back the raw reply.
    ///
    /// Single-image mode does not retry or persist; the operator sees the
    /// status and body exactly as the provider sent them.
    pub async fn run_single(
        &self,
        image: &Path,
        interrupt: &Interrupt,
    ) -> TaskResult<SingleResponse> {
        let task = ImageTask::new(image).ok_or_else(|| TaskError::Encoding {
            path: image.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no usable file name",
            ),
        })?;

        let payload = self.encoder.encode(&task).await?;
        let request =
            self.adapter
                .build_request(&self.options.prompt, &payload, &self.options.single_sampling);
        tracing::debug!("Sending {} to {}", task.file_name(), request.endpoint_url);

        let reply = tokio::select! {
            biased;
            _ = interrupt.triggered() => return Err(TaskError::Interrupted),
            reply = self.transport.send(&request) => reply?,
        };

        Ok(SingleResponse {
            status: reply.status,
            body: reply.body,
        })
    }

    /// Encode, build, and send one task. `attempts` is updated as soon as the
    /// retry loop resolves so the caller sees it even if persistence then fails.
    async fn request_task(
        &self,
        task: &ImageTask,
        attempts: &mut u32,
    ) -> TaskResult<serde_json::Value> {
        tracing::debug!("{} -> {:?}", task.stable_id, TaskState::Encoding);
        let payload = self.encoder.encode(task).await?;

        tracing::debug!("{} -> {:?}", task.stable_id, TaskState::Requesting);
        let request =
            self.adapter
                .build_request(&self.options.prompt, &payload, &self.options.batch_sampling);
        let resolved = self
            .options
            .retry
            .execute(&request, self.transport.as_ref(), self.clock.as_ref())
            .await;
        *attempts = resolved.attempts;
        resolved.into_result()
    }
}
