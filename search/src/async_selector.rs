//! Tokio driver for [`SelectorState`]: debounce timer, dispatch, and
//! generation-checked resolution.

use std::sync::Arc;
use std::time::Duration;

use onboard_types::{SearchService, SelectOption};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::policy::SearchPolicy;
use crate::selector::{Resolution, SelectorState};

struct Shared {
    /// The state record; also the broadcast channel for renderers.
    state: watch::Sender<SelectorState>,
    service: Arc<dyn SearchService>,
}

impl Shared {
    /// Start a new generation and send its query without waiting for the
    /// answer. Earlier in-flight queries keep running.
    fn dispatch(self: &Arc<Self>) {
        let mut dispatch = None;
        self.state.send_modify(|s| dispatch = Some(s.dispatch()));
        let Some(dispatch) = dispatch else {
            return;
        };
        tracing::debug!(
            generation = dispatch.generation,
            query = %dispatch.query,
            "search dispatched"
        );

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let options = shared.service.search(&dispatch.query).await;
            shared.resolve(dispatch.generation, options);
        });
    }

    fn resolve(&self, generation: u64, options: Vec<SelectOption>) {
        let count = options.len();
        let mut resolution = None;
        self.state.send_if_modified(|s| {
            let r = s.resolve(generation, options);
            resolution = Some(r);
            r == Resolution::Accepted
        });
        match resolution {
            Some(Resolution::Accepted) => {
                tracing::debug!(generation, count, "search results accepted");
            }
            Some(Resolution::Stale { current }) => {
                tracing::trace!(generation, current, "stale search results dropped");
            }
            None => {}
        }
    }
}

/// A search-driven selector.
///
/// [`set_query`](Self::set_query) restarts the debounce timer; when it
/// expires the query is dispatched under a fresh generation. Must be used from
/// within a tokio runtime.
pub struct AsyncSearchSelector {
    shared: Arc<Shared>,
    debounce: Duration,
    /// The scheduled, not yet dispatched, query.
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncSearchSelector {
    pub fn new(service: Arc<dyn SearchService>, policy: &SearchPolicy) -> Self {
        let (state, _) = watch::channel(SelectorState::new());
        Self {
            shared: Arc::new(Shared { state, service }),
            debounce: policy.debounce(),
            pending: Mutex::new(None),
        }
    }

    /// Record `text` and schedule its dispatch after the debounce window,
    /// replacing any dispatch still waiting on the timer.
    pub async fn set_query(&self, text: &str) {
        // The old timer must be finished before the new query is recorded, or
        // it could fire in between and dispatch the new text early.
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.take() {
            previous.abort();
            // A timer already inside `dispatch` runs to completion.
            let _ = previous.await;
        }
        self.shared.state.send_modify(|s| s.set_query(text));

        let shared = Arc::clone(&self.shared);
        let debounce = self.debounce;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            shared.dispatch();
        }));
    }

    /// Select `value`, which need not be among the current options.
    pub fn select(&self, value: &str) {
        self.shared.state.send_modify(|s| s.select(value));
    }

    pub fn clear_selection(&self) {
        self.shared.state.send_modify(SelectorState::clear_selection);
    }

    pub fn open(&self) {
        self.shared.state.send_modify(|s| s.set_open(true));
    }

    pub fn close(&self) {
        self.shared.state.send_modify(|s| s.set_open(false));
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> SelectorState {
        SelectorState::clone(&self.shared.state.borrow())
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<SelectorState> {
        self.shared.state.subscribe()
    }

    /// Wait until no query is scheduled or in flight and return the state.
    pub async fn settled(&self) -> SelectorState {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(SelectorState::is_settled).await {
            Ok(state) => SelectorState::clone(&state),
            Err(_) => self.snapshot(),
        };
        settled
    }
}

impl Drop for AsyncSearchSelector {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.get_mut().take() {
            pending.abort();
        }
    }
}
