//! Release of in-flight markers when an operation future is dropped.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Mutex;

type Release<T> = Box<dyn FnOnce(&mut T) + Send>;

/// Undoes an in-flight marker unless [`disarm`](Self::disarm)ed.
///
/// Armed right after the marker is set and disarmed once the operation has
/// applied its outcome. If the owning future is dropped in between (timeout,
/// `select!`), `release` runs on the state instead.
pub(crate) struct InFlightGuard<T: Send + 'static> {
    state: Arc<Mutex<T>>,
    release: Option<Release<T>>,
}

impl<T: Send + 'static> InFlightGuard<T> {
    pub(crate) fn arm(
        state: Arc<Mutex<T>>,
        release: impl FnOnce(&mut T) + Send + 'static,
    ) -> Self {
        Self {
            state,
            release: Some(Box::new(release)),
        }
    }

    pub(crate) fn disarm(mut self) {
        self.release = None;
    }
}

impl<T: Send + 'static> Drop for InFlightGuard<T> {
    fn drop(&mut self) {
        let Some(release) = self.release.take() else {
            return;
        };
        match self.state.try_lock() {
            Ok(mut state) => release(&mut state),
            Err(_) => {
                // Someone holds the lock for a moment; finish on the runtime.
                let state = Arc::clone(&self.state);
                match Handle::try_current() {
                    Ok(handle) => {
                        handle.spawn(async move {
                            release(&mut *state.lock().await);
                        });
                    }
                    Err(_) => tracing::warn!("in-flight marker left set outside a runtime"),
                }
            }
        }
        tracing::debug!("abandoned operation released its slot");
    }
}
