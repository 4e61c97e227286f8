//! Request Context
//!
//! Metadata carried by every request: a correlation id for tracing, an
//! optional deadline and an optional cancellation signal.

use std::future::{pending, Future};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use uuid::Uuid;

/// The request was cancelled or its deadline passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Sending half of a cancellation signal.
///
/// Cloning shares the same signal; any clone may cancel.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    sender: std::sync::Arc<watch::Sender<bool>>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: std::sync::Arc::new(sender),
        }
    }

    /// Cancel every context subscribed to this signal
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Context for a request, used for tracing and cancellation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation ID for request tracing
    pub correlation_id: Uuid,

    /// Point in time after which the request is abandoned
    pub deadline: Option<Instant>,

    cancellation: Option<watch::Receiver<bool>>,
}

impl RequestContext {
    /// Create a context with a fresh correlation id, no deadline and no
    /// cancellation signal
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            deadline: None,
            cancellation: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the deadline relative to now. A timeout too large to represent
    /// leaves the context without a deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    pub fn with_cancellation(mut self, signal: &CancelSignal) -> Self {
        self.cancellation = Some(signal.subscribe());
        self
    }

    /// True once the signal fired or the deadline passed
    pub fn is_cancelled(&self) -> bool {
        let signalled = self
            .cancellation
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false);
        let expired = self
            .deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false);
        signalled || expired
    }

    /// Drive `fut` to completion unless the context is cancelled first.
    ///
    /// When cancellation wins, `fut` is dropped before this returns.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled);
        }

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        let signalled = async {
            match self.cancellation.clone() {
                Some(mut rx) => {
                    let fired = rx.wait_for(|cancelled| *cancelled).await.is_ok();
                    // Sender gone means nobody can cancel any more
                    if !fired {
                        pending::<()>().await;
                    }
                }
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            output = fut => Ok(output),
            _ = deadline => Err(Cancelled),
            _ = signalled => Err(Cancelled),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
