//! Cancellation and deadlines for long running calls
//!
//! A [`Context`] is handed down to every collaborator call. It gets cancelled either explicitly,
//! through the [`CancelHandle`] returned by [`Context::with_cancel`], or implicitly once its
//! deadline passes. Derived contexts observe every signal of their parent.

use futures::future;
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// The reason a context is done
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cancellation {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for Cancellation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cancellation::Cancelled => write!(f, "context cancelled"),
            Cancellation::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

impl std::error::Error for Cancellation {}

#[derive(Clone, Debug, Default)]
pub struct Context {
    signals: Vec<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Cancels the context it was created with, and all contexts derived from that one
#[derive(Clone, Debug)]
pub struct CancelHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl Context {
    /// A context which is never done
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let mut ctx = self.clone();
        ctx.signals.push(receiver);

        (
            ctx,
            CancelHandle {
                sender: Arc::new(sender),
            },
        )
    }

    /// Derive a context which expires at the given instant
    ///
    /// A parent deadline which comes earlier stays in effect.
    pub fn with_deadline(&self, deadline: Instant) -> Context {
        let mut ctx = self.clone();

        ctx.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });

        ctx
    }

    pub fn with_timeout(&self, timeout: Duration) -> Context {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The reason the context is done, `None` while it is still alive
    pub fn err(&self) -> Option<Cancellation> {
        if self.signals.iter().any(|signal| *signal.borrow()) {
            return Some(Cancellation::Cancelled);
        }

        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Cancellation::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn done(&self) -> Cancellation {
        let cancelled = async {
            let mut waiting = self
                .signals
                .iter()
                .cloned()
                .map(wait_cancelled)
                .collect::<FuturesUnordered<_>>();

            if waiting.next().await.is_none() {
                future::pending::<()>().await;
            }
        };

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Cancellation::Cancelled,
            _ = expired => Cancellation::DeadlineExceeded,
        }
    }

    /// Drive the call to completion unless the context is done first
    ///
    /// The call is not started at all if the context is already done, and it is dropped
    /// as soon as the context fires.
    pub async fn run<F: Future>(&self, call: F) -> Result<F::Output, Cancellation> {
        if let Some(reason) = self.err() {
            return Err(reason);
        }

        tokio::select! {
            biased;
            reason = self.done() => Err(reason),
            output = call => Ok(output),
        }
    }
}

/// Wait for the cancel flag, a dropped handle means the context is never cancelled
async fn wait_cancelled(mut signal: watch::Receiver<bool>) {
    let closed = signal.wait_for(|cancelled| *cancelled).await.is_err();

    if closed {
        future::pending::<()>().await;
    }
}
