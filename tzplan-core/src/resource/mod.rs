//! Resource operations: gateway calls that keep the mirror store current.
//!
//! Every operation sets `loading` for its duration, records `error` when it
//! fails, and returns the failure to its caller. A newer request for the
//! same key (an entity id, or the collection itself for loads) cancels the
//! one still in flight; a cancelled request never touches the store.

mod events;
mod logs;
mod profiles;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::oneshot;

pub use events::Events;
pub use logs::Logs;
pub use profiles::Profiles;

use crate::error::{GatewayError, TzPlanError, TzPlanResult};
use crate::store::{Action, Store};

/// Key used for whole-collection loads.
const COLLECTION: &str = "*";

/// The newest in-flight request per key.
#[derive(Default)]
pub(crate) struct InFlight {
    next_generation: AtomicU64,
    slots: Mutex<HashMap<String, (u64, oneshot::Sender<()>)>>,
}

impl InFlight {
    /// Register a request for `key`, cancelling whatever was registered
    /// before it.
    fn begin(&self, key: &str) -> Ticket<'_> {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();

        // Dropping the previous sender wakes its receiver: that is the cancel.
        let previous = self
            .slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), (generation, tx));
        drop(previous);

        Ticket {
            owner: self,
            key: key.to_string(),
            generation,
            cancelled: rx,
        }
    }
}

struct Ticket<'a> {
    owner: &'a InFlight,
    key: String,
    generation: u64,
    cancelled: oneshot::Receiver<()>,
}

impl Ticket<'_> {
    /// Drive `call` unless a newer request for the same key arrives first.
    async fn run<T>(mut self, call: impl Future<Output = T>) -> Option<T> {
        tokio::select! {
            biased;
            _ = &mut self.cancelled => None,
            result = call => Some(result),
        }
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        let mut slots = self.owner.slots.lock().unwrap_or_else(|e| e.into_inner());
        if slots.get(&self.key).is_some_and(|(g, _)| *g == self.generation) {
            slots.remove(&self.key);
        }
    }
}

/// Clears `loading` however the operation ends, including when its future
/// is dropped.
struct LoadingGuard<'a> {
    store: &'a Store,
}

impl<'a> LoadingGuard<'a> {
    fn start(store: &'a Store) -> Self {
        store.dispatch(Action::SetLoading(true));
        LoadingGuard { store }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.dispatch(Action::SetLoading(false));
    }
}

/// Run one gateway call with the loading/error bracket. With a `key`, the
/// call can be superseded by a newer one for the same key.
pub(crate) async fn request<T>(
    store: &Store,
    inflight: &InFlight,
    key: Option<&str>,
    op: &'static str,
    call: impl Future<Output = Result<T, GatewayError>>,
) -> TzPlanResult<T> {
    let _loading = LoadingGuard::start(store);
    tracing::debug!(op, key = ?key, "starting");

    let result = match key {
        Some(key) => match inflight.begin(key).run(call).await {
            Some(result) => result.map_err(TzPlanError::from),
            None => Err(TzPlanError::Cancelled(format!("{} {}", op, key))),
        },
        None => call.await.map_err(TzPlanError::from),
    };

    match &result {
        Ok(_) => tracing::debug!(op, "done"),
        Err(e) if e.is_cancelled() => tracing::debug!(op, "superseded by a newer request"),
        Err(e) => {
            tracing::warn!(op, error = %e, "request failed");
            store.dispatch(Action::SetError(Some(e.to_string())));
        }
    }

    result
}
