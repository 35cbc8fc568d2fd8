//! Nullable submission service: counts calls and hands out a fixed receipt.

use async_trait::async_trait;
use onboard_types::{SubmissionError, SubmissionReceipt, SubmissionService};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub struct NullSubmission {
    reference: String,
    /// Number of leading calls that fail with this message.
    failures: Option<(usize, String)>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl NullSubmission {
    /// Accept every submission with `reference`.
    pub fn accepting(reference: &str) -> Self {
        Self {
            reference: reference.to_string(),
            failures: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Reject the first call with `message`, then accept with `reference`.
    pub fn failing_once(message: &str, reference: &str) -> Self {
        Self {
            reference: reference.to_string(),
            failures: Some((1, message.to_string())),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every call take `delay` (on the tokio clock) before resolving.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `complete` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<P: Sync> SubmissionService<P> for NullSubmission {
    async fn complete(&self, _payload: &P) -> Result<SubmissionReceipt, SubmissionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((count, message)) = &self.failures {
            if call < *count {
                return Err(SubmissionError(message.clone()));
            }
        }
        Ok(SubmissionReceipt {
            reference: self.reference.clone(),
            next: None,
        })
    }
}
