//! Client-side quota window.
//!
//! A cooperative limiter: at most `max_per_window` completed requests per
//! window, plus a fixed pause after each one. Failed requests count too,
//! since providers count every request they receive.
//!
//! A window opens at batch start. It resets when it fills (after pausing out
//! the remainder) or when a completion lands after it has already lapsed.
//!
//! The state is owned by a single driver. Running tasks concurrently would
//! need this behind a shared lock or a channel-fed gate instead.

use crate::clock::Clock;
use crate::config::ThrottleConfig;
use std::time::{Duration, Instant};

/// Window bookkeeping.
///
/// `processed_count` is the number of completed requests since `window_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchState {
    pub processed_count: u32,
    pub window_start: Instant,
}

#[derive(Debug)]
pub struct ThrottleWindow {
    enabled: bool,
    max_per_window: u32,
    window: Duration,
    min_spacing: Duration,
    state: BatchState,
}

impl ThrottleWindow {
    pub fn new(config: &ThrottleConfig, now: Instant) -> Self {
        Self {
            enabled: config.enabled,
            max_per_window: config.max_per_window.max(1),
            window: Duration::from_secs(config.window_secs),
            min_spacing: Duration::from_millis(config.min_spacing_ms),
            state: BatchState {
                processed_count: 0,
                window_start: now,
            },
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Record one completed request and block as the quota requires.
    ///
    /// Returns the window pause, if one was taken (the per-request spacing
    /// is not reported).
    pub async fn record_completion(&mut self, clock: &dyn Clock) -> Option<Duration> {
        if !self.enabled {
            return None;
        }

        // A window that lapsed before filling up starts over.
        let now = clock.now();
        if self.remaining(now).is_none() {
            self.roll_over(now);
        }

        self.state.processed_count += 1;
        if !self.min_spacing.is_zero() {
            clock.sleep(self.min_spacing).await;
        }

        if self.state.processed_count < self.max_per_window {
            return None;
        }

        let remaining = self.remaining(clock.now());
        if let Some(wait) = remaining {
            tracing::info!(
                "Throttle: {} requests this window, pausing {:.1}s",
                self.state.processed_count,
                wait.as_secs_f64()
            );
            clock.sleep(wait).await;
        }
        self.roll_over(clock.now());
        remaining
    }

    /// Wait out the rest of a partially used window.
    ///
    /// Keeps back-to-back runs within the quota. A no-op when the window is
    /// empty or already elapsed.
    pub async fn settle(&mut self, clock: &dyn Clock) -> Option<Duration> {
        if !self.enabled || self.state.processed_count == 0 {
            return None;
        }
        let remaining = self.remaining(clock.now());
        if let Some(wait) = remaining {
            tracing::info!("Throttle: settling final window for {:.1}s", wait.as_secs_f64());
            clock.sleep(wait).await;
        }
        self.roll_over(clock.now());
        remaining
    }

    fn remaining(&self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.state.window_start);
        self.window
            .checked_sub(elapsed)
            .filter(|wait| !wait.is_zero())
    }

    fn roll_over(&mut self, now: Instant) {
        self.state = BatchState {
            processed_count: 0,
            window_start: now,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockClock;

    fn config(max_per_window: u32) -> ThrottleConfig {
        ThrottleConfig {
            max_per_window,
            ..ThrottleConfig::default()
        }
    }

    #[tokio::test]
    async fn test_spacing_after_every_completion() {
        let clock = MockClock::new();
        let mut throttle = ThrottleWindow::new(&config(20), clock.now());

        for _ in 0..3 {
            assert_eq!(throttle.record_completion(&clock).await, None);
        }
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1); 3]);
        assert_eq!(throttle.state().processed_count, 3);
    }

    #[tokio::test]
    async fn test_full_window_pauses_for_remainder() {
        let clock = MockClock::new();
        let mut throttle = ThrottleWindow::new(&config(3), clock.now());

        throttle.record_completion(&clock).await;
        throttle.record_completion(&clock).await;
        let pause = throttle.record_completion(&clock).await;

        // Three 1s spacings already elapsed, so 57s remain in the window.
        assert_eq!(pause, Some(Duration::from_secs(57)));
        assert_eq!(clock.now() - clock.origin(), Duration::from_secs(60));
        assert_eq!(throttle.state().processed_count, 0);
        assert_eq!(throttle.state().window_start, clock.now());
    }

    #[tokio::test]
    async fn test_lapsed_window_starts_over() {
        let clock = MockClock::new();
        let mut throttle = ThrottleWindow::new(&config(2), clock.now());

        throttle.record_completion(&clock).await;
        clock.advance(Duration::from_secs(90));
        let pause = throttle.record_completion(&clock).await;

        // The slow second request opened a fresh window instead of filling
        // the stale one.
        assert_eq!(pause, None);
        assert_eq!(throttle.state().processed_count, 1);
        assert_eq!(
            throttle.state().window_start,
            clock.origin() + Duration::from_secs(91)
        );
    }

    #[tokio::test]
    async fn test_fresh_window_still_enforces_limit() {
        let clock = MockClock::new();
        let mut throttle = ThrottleWindow::new(&config(2), clock.now());

        throttle.record_completion(&clock).await;
        clock.advance(Duration::from_secs(90));
        throttle.record_completion(&clock).await;
        let pause = throttle.record_completion(&clock).await;

        // New window opened at 91s; two 1s spacings leave 58s.
        assert_eq!(pause, Some(Duration::from_secs(58)));
    }

    #[tokio::test]
    async fn test_disabled_throttle_never_sleeps() {
        let clock = MockClock::new();
        let cfg = ThrottleConfig {
            enabled: false,
            max_per_window: 1,
            ..ThrottleConfig::default()
        };
        let mut throttle = ThrottleWindow::new(&cfg, clock.now());
        for _ in 0..5 {
            throttle.record_completion(&clock).await;
        }
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_settle_waits_out_partial_window() {
        let clock = MockClock::new();
        let mut throttle = ThrottleWindow::new(&config(20), clock.now());
        throttle.record_completion(&clock).await;

        let pause = throttle.settle(&clock).await;
        assert_eq!(pause, Some(Duration::from_secs(59)));

        // Empty window: nothing to settle.
        assert_eq!(throttle.settle(&clock).await, None);
    }
}
