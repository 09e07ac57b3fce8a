//! Keyed collection fetches with cancellation of superseded requests.
//!
//! A view starts a fetch for a dependency key (e.g. the selected version).
//! Starting another fetch aborts the previous one, and a result that arrives
//! after its key was superseded is reported as [`PsaError::Cancelled`] so
//! the caller never writes stale data into its view.

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

use crate::error::{PsaError, Result};

struct LoaderState<K> {
    generation: u64,
    key: Option<K>,
    in_flight: Option<AbortHandle>,
}

/// Identifies one fetch started by a [`Loader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadToken<K> {
    pub key: K,
    pub generation: u64,
}

pub struct Loader<K> {
    state: Arc<Mutex<LoaderState<K>>>,
}

impl<K> Clone for Loader<K> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<K> Default for Loader<K> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(LoaderState {
                generation: 0,
                key: None,
                in_flight: None,
            })),
        }
    }
}

impl<K> Loader<K>
where
    K: Clone + PartialEq + Debug + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `fetch` for `key`, aborting whatever fetch is still running.
    pub fn spawn<T, F>(&self, key: K, fetch: F) -> PendingLoad<K, T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let mut state = self.state.lock();
        if let Some(previous) = state.in_flight.take() {
            debug!(key = ?state.key, "aborting superseded load");
            previous.abort();
        }
        state.generation += 1;
        state.key = Some(key.clone());

        let handle = tokio::spawn(fetch);
        state.in_flight = Some(handle.abort_handle());

        PendingLoad {
            token: LoadToken {
                key,
                generation: state.generation,
            },
            handle,
            loader: self.clone(),
        }
    }

    /// Abort the running fetch, if any, without starting a new one.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if let Some(previous) = state.in_flight.take() {
            previous.abort();
        }
        state.generation += 1;
        state.key = None;
    }

    pub fn current_key(&self) -> Option<K> {
        self.state.lock().key.clone()
    }

    pub fn is_current(&self, token: &LoadToken<K>) -> bool {
        let state = self.state.lock();
        state.generation == token.generation && state.key.as_ref() == Some(&token.key)
    }

    fn settle(&self, token: &LoadToken<K>) {
        let mut state = self.state.lock();
        if state.generation == token.generation {
            state.in_flight = None;
        }
    }
}

/// A fetch in flight. Await [`PendingLoad::finish`] for its result.
pub struct PendingLoad<K, T> {
    token: LoadToken<K>,
    handle: JoinHandle<Result<T>>,
    loader: Loader<K>,
}

impl<K, T> PendingLoad<K, T>
where
    K: Clone + PartialEq + Debug + Send + Sync + 'static,
{
    /// Wait for the fetch. Returns `Cancelled` if it was aborted or another
    /// fetch started after it.
    pub async fn finish(self) -> Result<T> {
        let joined = self.handle.await;
        let cancelled = || PsaError::Cancelled(format!("{:?}", self.token.key));

        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => return Err(cancelled()),
            Err(e) => return Err(PsaError::Other(format!("load task failed: {e}"))),
        };

        if !self.loader.is_current(&self.token) {
            return Err(cancelled());
        }
        self.loader.settle(&self.token);
        outcome
    }
}
