//! Drives one [`VerificationChannel`] against the code service.

use std::collections::BTreeMap;
use std::sync::Arc;

use onboard_forms::{schemas, FormValues, Schema};
use onboard_types::{ChannelKind, Clock, CodeService};
use tokio::sync::Mutex;

use crate::error::{Operation, VerificationError};
use crate::guard::InFlightGuard;
use crate::policy::VerificationPolicy;
use crate::state::{ChannelStatus, VerificationChannel};

/// Channel records shared by every controller of one orchestrator, behind a
/// single lock so the submission gate can read them all at once.
pub(crate) type ChannelBook = Arc<Mutex<Channels>>;

pub(crate) type Channels = BTreeMap<ChannelKind, VerificationChannel>;

/// Runs the send / verify / resend sub-flows of a single channel.
///
/// The channel lock is never held across a service call. Instead the channel
/// records which operation is in flight and refuses a second one with
/// [`VerificationError::Busy`].
pub struct ChannelController {
    kind: ChannelKind,
    book: ChannelBook,
    codes: Arc<dyn CodeService>,
    clock: Arc<dyn Clock>,
    policy: VerificationPolicy,
    target_schema: Schema,
}

impl ChannelController {
    /// A standalone controller that owns its channel.
    pub fn new(
        kind: ChannelKind,
        codes: Arc<dyn CodeService>,
        clock: Arc<dyn Clock>,
        policy: VerificationPolicy,
    ) -> Self {
        let mut channels = BTreeMap::new();
        channels.insert(kind, VerificationChannel::new(kind, policy.cooldown_secs));
        Self::attached(kind, Arc::new(Mutex::new(channels)), codes, clock, policy)
    }

    /// A controller whose channel lives in a shared book. The caller must have
    /// inserted the channel already.
    pub(crate) fn attached(
        kind: ChannelKind,
        book: ChannelBook,
        codes: Arc<dyn CodeService>,
        clock: Arc<dyn Clock>,
        policy: VerificationPolicy,
    ) -> Self {
        Self {
            kind,
            book,
            codes,
            clock,
            target_schema: schemas::channel_target(kind),
            policy,
        }
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn with_channel<R>(
        &self,
        f: impl FnOnce(&mut VerificationChannel) -> Result<R, VerificationError>,
    ) -> Result<R, VerificationError> {
        let mut book = self.book.lock().await;
        let channel = book
            .get_mut(&self.kind)
            .ok_or(VerificationError::UnknownChannel(self.kind))?;
        f(channel)
    }

    /// Frees the channel's in-flight slot if the operation is dropped before
    /// its outcome is applied.
    fn guard(&self, operation: Operation, epoch: u64) -> InFlightGuard<Channels> {
        let kind = self.kind;
        InFlightGuard::arm(Arc::clone(&self.book), move |book: &mut Channels| {
            if let Some(channel) = book.get_mut(&kind) {
                channel.abandon(operation, epoch);
            }
        })
    }

    /// Like [`with_channel`](Self::with_channel), disarming `guard` once the
    /// lock is held so the outcome is applied instead.
    async fn finish_with<R>(
        &self,
        guard: InFlightGuard<Channels>,
        f: impl FnOnce(&mut VerificationChannel) -> Result<R, VerificationError>,
    ) -> Result<R, VerificationError> {
        let mut book = self.book.lock().await;
        guard.disarm();
        let channel = book
            .get_mut(&self.kind)
            .ok_or(VerificationError::UnknownChannel(self.kind))?;
        f(channel)
    }

    /// A copy of the channel record for rendering.
    pub async fn snapshot(&self) -> Result<VerificationChannel, VerificationError> {
        self.with_channel(|ch| Ok(ch.clone())).await
    }

    pub async fn status(&self) -> Result<ChannelStatus, VerificationError> {
        self.with_channel(|ch| Ok(ch.status())).await
    }

    /// Record an edit of the phone number / email address.
    pub async fn set_target(&self, target: &str) -> Result<(), VerificationError> {
        let changed = self.with_channel(|ch| ch.set_target(target)).await?;
        if changed {
            tracing::debug!(kind = %self.kind, "target edited, channel reset");
        }
        Ok(())
    }

    /// Send the first code (or retry after a rejected one).
    pub async fn request_code(&self) -> Result<(), VerificationError> {
        self.send(Operation::RequestCode).await
    }

    /// Send a fresh code once the cooldown since the last send has elapsed.
    pub async fn resend(&self) -> Result<(), VerificationError> {
        self.send(Operation::Resend).await
    }

    async fn send(&self, operation: Operation) -> Result<(), VerificationError> {
        let now = self.clock.now();
        let ticket = self
            .with_channel(|ch| {
                ch.admit(operation, now)?;
                let mut values = FormValues::new();
                values.insert(self.kind.field_name().to_string(), ch.target().to_string());
                self.target_schema
                    .validate(&values)
                    .map_err(VerificationError::Validation)?;
                ch.begin_send(operation, now)
            })
            .await?;
        let guard = self.guard(operation, ticket.epoch());

        let outcome = self.codes.send_code(ticket.kind, &ticket.target).await;
        if let Err(e) = &outcome {
            tracing::warn!(kind = %self.kind, %operation, error = %e, "code delivery rejected");
        }

        let now = self.clock.now();
        self.finish_with(guard, |ch| ch.finish_send(ticket, outcome, now))
            .await?;
        tracing::debug!(kind = %self.kind, %operation, "code sent");
        Ok(())
    }

    /// Check the code the user entered.
    pub async fn submit_code(&self, input: &str) -> Result<(), VerificationError> {
        let now = self.clock.now();
        let code_length = self.policy.code_length;
        let ticket = self
            .with_channel(|ch| ch.begin_check(input, code_length, now))
            .await?;
        let guard = self.guard(Operation::SubmitCode, ticket.epoch());

        let outcome = self
            .codes
            .check_code(ticket.kind, &ticket.target, &ticket.code)
            .await;

        match self
            .finish_with(guard, |ch| ch.finish_check(ticket, outcome))
            .await
        {
            Ok(()) => {
                tracing::info!(kind = %self.kind, "channel verified");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(kind = %self.kind, error = %e, "code not accepted");
                Err(e)
            }
        }
    }
}
