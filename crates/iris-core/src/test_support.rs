//! Scripted transport and virtual clock for unit tests.

use crate::clock::Clock;
use crate::error::TaskResult;
use crate::pipeline::EncodedPayload;
use crate::provider::{
    ChatPrompt, ChatRequest, HttpReply, RequestSpec, SamplingParams, Transport,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

type ReplyFn = Box<dyn Fn(u32, &RequestSpec) -> TaskResult<HttpReply> + Send + Sync>;

/// A transport whose replies are produced by a closure over the call index.
pub struct MockTransport {
    reply_fn: ReplyFn,
    /// Number of `send` calls so far
    pub call_count: Arc<AtomicU32>,
    clock: Option<Arc<MockClock>>,
    sent_at: Mutex<Vec<Instant>>,
    requests: Mutex<Vec<RequestSpec>>,
}

impl MockTransport {
    pub fn new<F>(reply_fn: F) -> Self
    where
        F: Fn(u32, &RequestSpec) -> TaskResult<HttpReply> + Send + Sync + 'static,
    {
        Self {
            reply_fn: Box::new(reply_fn),
            call_count: Arc::new(AtomicU32::new(0)),
            clock: None,
            sent_at: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer 200 with `body`.
    pub fn ok(body: &'static str) -> Self {
        Self::new(move |_, _| Ok(HttpReply::new(200, body)))
    }

    /// Record the virtual time of every send.
    pub fn with_clock(mut self, clock: Arc<MockClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn calls(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn sent_at(&self) -> Vec<Instant> {
        self.sent_at.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<RequestSpec> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &RequestSpec) -> TaskResult<HttpReply> {
        let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(clock) = &self.clock {
            self.sent_at.lock().unwrap().push(clock.now());
        }
        self.requests.lock().unwrap().push(request.clone());
        (self.reply_fn)(idx, request)
    }
}

/// Virtual clock: `sleep` returns immediately and advances `now`.
pub struct MockClock {
    origin: Instant,
    state: Mutex<ClockState>,
}

#[derive(Default)]
struct ClockState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            state: Mutex::new(ClockState::default()),
        }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// Every duration passed to `sleep`, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().unwrap().sleeps.clone()
    }

    /// Move time forward without recording a sleep (simulates slow requests).
    pub fn advance(&self, duration: Duration) {
        self.state.lock().unwrap().elapsed += duration;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.origin + self.state.lock().unwrap().elapsed
    }

    async fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap();
        state.elapsed += duration;
        state.sleeps.push(duration);
    }
}

pub fn sample_payload() -> EncodedPayload {
    EncodedPayload {
        mime_type: "image/jpeg".to_string(),
        base64_data: "AAAA".to_string(),
    }
}

pub fn sample_request() -> RequestSpec {
    let sampling = SamplingParams {
        max_tokens: 300,
        temperature: Some(0.1),
    };
    let body = ChatRequest::vision(
        Some("gpt-4o".to_string()),
        &ChatPrompt::new("describe"),
        &sample_payload(),
        &sampling,
    );
    RequestSpec::new(
        "http://localhost/v1/chat/completions".to_string(),
        ("Authorization", "Bearer test".to_string()),
        body,
    )
}
