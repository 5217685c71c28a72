//! Fetch-state controller.
//!
//! A [`FetchController`] owns the observable `{data, loading, error}` record
//! for one consumer and drives at most one retrieval at a time.  Retrievals
//! run as tasks on a [`tokio`] runtime; their completions are published
//! through a [`watch`] channel; the draw loop redraws when one reports a
//! change.
//!
//! ## Stale completions
//!
//! Every retrieval is issued under a fresh generation number.  Cancelling a
//! retrieval aborts its task *and* advances the current generation, so a
//! completion that slips past the abort still fails the generation check in
//! [`Slot::deliver`] and is dropped without touching state.  The check and
//! the publish happen under the same lock.
//!
//! ```text
//! observe(u) ──► gen 1, loading ──► task(u) ─┐
//! observe(v) ──► abort(u), gen 3, loading    │ completes: gen 1 ≠ 3, dropped
//!                └─► task(v) ──► completes: gen 3 == 3, published
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::source::{FetchError, Retrieve};

/// The observable result of retrieving one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchState<T> {
    /// Payload of the last successful retrieval.
    pub data: Option<T>,
    /// A retrieval for the current identifier is outstanding.
    pub loading: bool,
    /// Failure of the last retrieval, if it failed.
    pub error: Option<FetchError>,
}

impl<T> FetchState<T> {
    /// Freshly observed: nothing known yet, retrieval outstanding.
    pub fn pending() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }

    pub fn ready(data: T) -> Self {
        Self {
            data: Some(data),
            loading: false,
            error: None,
        }
    }

    pub fn failed(error: FetchError) -> Self {
        Self {
            data: None,
            loading: false,
            error: Some(error),
        }
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::pending()
    }
}

/// Handle on the currently authoritative retrieval.
#[derive(Debug)]
struct RetrievalToken {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl RetrievalToken {
    /// Abort the retrieval task.  Returns `false` if already cancelled.
    fn cancel(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

/// State shared between the controller and its retrieval tasks.
#[derive(Debug)]
struct Slot<T> {
    /// Generation a completion must carry to be published.
    current: Mutex<u64>,
    tx: watch::Sender<FetchState<T>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(FetchState::pending());
        Self {
            current: Mutex::new(0),
            tx,
        }
    }

    /// Open a new generation and publish the loading state for it.
    ///
    /// With `keep_previous` the last data or error stays visible while the
    /// new retrieval runs; otherwise the record starts over.
    fn begin(&self, keep_previous: bool) -> u64 {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
        if keep_previous {
            self.tx.send_modify(|state| state.loading = true);
        } else {
            self.tx.send_replace(FetchState::pending());
        }
        *current
    }

    /// Advance the generation so nothing in flight can publish.
    fn void(&self) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
    }

    /// Publish `outcome` if `generation` is still current.
    ///
    /// Returns whether the outcome was applied.
    fn deliver(&self, generation: u64, outcome: Result<T, FetchError>) -> bool {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != generation {
            return false;
        }
        let next = match outcome {
            Ok(data) => FetchState::ready(data),
            Err(error) => FetchState::failed(error),
        };
        self.tx.send_replace(next);
        true
    }
}

/// Hand a finished retrieval to `slot` and log what became of it.
///
/// Stale outcomes are only logged at debug level.
fn complete<T>(slot: &Slot<T>, url: &str, generation: u64, outcome: Result<T, FetchError>) {
    let error = outcome.as_ref().err().map(ToString::to_string);
    if !slot.deliver(generation, outcome) {
        debug!(url, generation, "stale completion discarded");
        return;
    }
    match error {
        None => info!(url, generation, "retrieval succeeded"),
        Some(error) => warn!(url, generation, error = %error, "retrieval failed"),
    }
}

/// Keeps a [`FetchState`] in step with the identifier being observed.
///
/// Dropping the controller stops observation and cancels any retrieval in
/// flight.
pub struct FetchController<T> {
    source: Arc<dyn Retrieve<T>>,
    runtime: Handle,
    slot: Arc<Slot<T>>,
    url: Option<String>,
    token: Option<RetrievalToken>,
}

impl<T> FetchController<T>
where
    T: Send + Sync + 'static,
{
    /// Create an idle controller that retrieves through `source` on `runtime`.
    pub fn new(source: Arc<dyn Retrieve<T>>, runtime: Handle) -> Self {
        Self {
            source,
            runtime,
            slot: Arc::new(Slot::new()),
            url: None,
            token: None,
        }
    }

    /// Observe `url`.
    ///
    /// A different identifier cancels the outstanding retrieval and starts a
    /// new one from a fresh state.  The identifier already being observed is
    /// left alone, whether or not its retrieval has finished.
    pub fn observe(&mut self, url: &str) {
        if self.url.as_deref() == Some(url) {
            debug!(url, "already observing");
            return;
        }
        self.start(url.to_string(), false);
    }

    /// Cancel and re-issue the retrieval for the current identifier.
    ///
    /// The previous data or error stays in place until the new retrieval
    /// lands.  Does nothing when not observing.
    pub fn reload(&mut self) {
        if let Some(url) = self.url.clone() {
            self.start(url, true);
        }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> FetchState<T>
    where
        T: Clone,
    {
        self.slot.tx.borrow().clone()
    }

    /// A receiver that sees every published state change.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.slot.tx.subscribe()
    }

    fn start(&mut self, url: String, keep_previous: bool) {
        self.cancel();

        let generation = self.slot.begin(keep_previous);
        info!(url = %url, generation, "retrieval started");

        let slot = Arc::clone(&self.slot);
        let source = Arc::clone(&self.source);
        let task_url = url.clone();
        let task = self.runtime.spawn(async move {
            let outcome = source.retrieve(&task_url).await;
            complete(&slot, &task_url, generation, outcome);
        });

        self.token = Some(RetrievalToken {
            generation,
            task: Some(task),
        });
        self.url = Some(url);
    }
}

impl<T> FetchController<T> {
    /// The identifier being observed, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Stop observing.  The last published state stays readable but will not
    /// change again until the next [`observe`](Self::observe).
    pub fn stop(&mut self) {
        self.cancel();
        if let Some(url) = self.url.take() {
            debug!(url = %url, "observation stopped");
        }
    }

    fn cancel(&mut self) {
        if let Some(mut token) = self.token.take() {
            self.slot.void();
            if !token.is_finished() && token.cancel() {
                debug!(generation = token.generation, "retrieval cancelled");
            }
        }
    }
}

impl<T> Drop for FetchController<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
