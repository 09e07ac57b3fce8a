//! Trailing-edge debouncing for remote option lookups.
//!
//! Each call replaces the previous pending one; only the last call made
//! within the quiet period actually runs.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::error::{PsaError, Result};

/// Quiet period before a remote option refresh fires.
pub const LOOKUP_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<tokio::task::AbortHandle>,
}

/// A scheduled call. Resolves to `Cancelled` if a later call replaced it.
pub struct Debounced<T> {
    handle: JoinHandle<Result<T>>,
}

impl<T> Debounced<T> {
    pub async fn result(self) -> Result<T> {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => {
                Err(PsaError::Cancelled("debounced lookup".to_string()))
            }
            Err(e) => Err(PsaError::Other(format!("lookup task failed: {e}"))),
        }
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule `call` after the quiet period, cancelling the previous one.
    pub fn call<T, F>(&mut self, call: F) -> Debounced<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            call.await
        });
        self.pending = Some(handle.abort_handle());
        Debounced { handle }
    }

    pub fn cancel(&mut self) {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(LOOKUP_DEBOUNCE)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
