//! Cooperative stop signal for a running batch.
//!
//! The driver races every await point against [`Interrupt::triggered`], so a
//! trigger cuts short the current request or sleep. Nothing is cancelled
//! mid-write: persistence is never raced against the interrupt.

use tokio::sync::watch;

/// Receiving side, held by the driver.
#[derive(Debug, Clone)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

/// Sending side, held by whoever decides to stop (e.g. a Ctrl-C handler).
#[derive(Debug)]
pub struct InterruptHandle {
    tx: watch::Sender<bool>,
}

impl InterruptHandle {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl Interrupt {
    pub fn channel() -> (InterruptHandle, Interrupt) {
        let (tx, rx) = watch::channel(false);
        (InterruptHandle { tx }, Interrupt { rx })
    }

    /// An interrupt that can never fire.
    pub fn never() -> Self {
        let (_, interrupt) = Self::channel();
        interrupt
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once triggered. Pends forever if the handle is dropped untriggered.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        let sender_gone = rx.wait_for(|stop| *stop).await.is_err();
        if sender_gone {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_wakes_waiter() {
        let (handle, interrupt) = Interrupt::channel();
        assert!(!interrupt.is_triggered());
        handle.trigger();
        tokio::time::timeout(Duration::from_secs(1), interrupt.triggered())
            .await
            .unwrap();
        assert!(interrupt.is_triggered());
    }

    #[tokio::test]
    async fn test_never_does_not_fire() {
        let interrupt = Interrupt::never();
        let fired = tokio::time::timeout(Duration::from_millis(20), interrupt.triggered()).await;
        assert!(fired.is_err());
        assert!(!interrupt.is_triggered());
    }
}
