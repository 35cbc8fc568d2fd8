//! Verification orchestrator: gates a final submission on every registered
//! channel being verified.

use std::collections::BTreeMap;
use std::sync::Arc;

use onboard_forms::{schemas, FieldError, FormPayload, Schema};
use onboard_types::{ChannelKind, Clock, CodeService, SubmissionReceipt, SubmissionService};
use tokio::sync::Mutex;

use crate::controller::{ChannelBook, ChannelController};
use crate::error::{Operation, VerificationError};
use crate::guard::InFlightGuard;
use crate::policy::VerificationPolicy;
use crate::state::VerificationChannel;

#[derive(Clone, Debug)]
enum Submission {
    Open,
    InFlight,
    Done(SubmissionReceipt),
}

/// Owns one controller per required channel and performs the gated
/// submission exactly once.
///
/// All channel records sit behind one lock shared with the controllers, so
/// the gate reads a consistent snapshot of every status.
pub struct VerificationOrchestrator<P> {
    book: ChannelBook,
    controllers: BTreeMap<ChannelKind, ChannelController>,
    codes: Arc<dyn CodeService>,
    clock: Arc<dyn Clock>,
    policy: VerificationPolicy,
    submitter: Arc<dyn SubmissionService<P>>,
    payload_schema: Option<Schema>,
    submission: Arc<Mutex<Submission>>,
}

impl<P> VerificationOrchestrator<P>
where
    P: FormPayload + Sync,
{
    pub fn new(
        codes: Arc<dyn CodeService>,
        clock: Arc<dyn Clock>,
        submitter: Arc<dyn SubmissionService<P>>,
        policy: VerificationPolicy,
    ) -> Self {
        Self {
            book: Arc::new(Mutex::new(BTreeMap::new())),
            controllers: BTreeMap::new(),
            codes,
            clock,
            policy,
            submitter,
            payload_schema: None,
            submission: Arc::new(Mutex::new(Submission::Open)),
        }
    }

    /// Validate the payload against `schema` before submitting it.
    pub fn with_payload_schema(mut self, schema: Schema) -> Self {
        self.payload_schema = Some(schema);
        self
    }

    /// Add a channel requirement and return its controller.
    pub fn register_channel(
        &mut self,
        kind: ChannelKind,
    ) -> Result<&ChannelController, VerificationError> {
        if matches!(self.submission.try_lock().as_deref(), Ok(Submission::Done(_))) {
            return Err(VerificationError::InvalidState {
                operation: Operation::Register,
                state: "submitted",
            });
        }
        if self.controllers.contains_key(&kind) {
            return Err(VerificationError::DuplicateChannel(kind));
        }

        self.book
            .try_lock()
            .map_err(|_| VerificationError::Busy(Operation::Register))?
            .insert(kind, VerificationChannel::new(kind, self.policy.cooldown_secs));

        let controller = ChannelController::attached(
            kind,
            self.book.clone(),
            self.codes.clone(),
            self.clock.clone(),
            self.policy.clone(),
        );
        tracing::debug!(%kind, "channel registered");
        let controller = self.controllers.entry(kind).or_insert(controller);
        Ok(&*controller)
    }

    pub fn channel(&self, kind: ChannelKind) -> Option<&ChannelController> {
        self.controllers.get(&kind)
    }

    pub fn registered(&self) -> impl Iterator<Item = ChannelKind> + '_ {
        self.controllers.keys().copied()
    }

    /// Registered channels that are not verified yet, in kind order.
    pub async fn unverified(&self) -> Vec<ChannelKind> {
        let book = self.book.lock().await;
        book.values()
            .filter(|ch| !ch.is_verified())
            .map(|ch| ch.kind())
            .collect()
    }

    /// Whether [`submit`](Self::submit) would pass the verification gate.
    pub async fn can_submit(&self) -> bool {
        self.unverified().await.is_empty()
    }

    /// The receipt of a completed submission, if any.
    pub async fn receipt(&self) -> Option<SubmissionReceipt> {
        match &*self.submission.lock().await {
            Submission::Done(receipt) => Some(receipt.clone()),
            _ => None,
        }
    }

    /// Submit once every registered channel is verified.
    ///
    /// After a successful submission further calls return the same receipt
    /// without contacting the service again.
    pub async fn submit(&self, payload: &P) -> Result<SubmissionReceipt, VerificationError> {
        {
            let mut submission = self.submission.lock().await;
            match &*submission {
                Submission::Done(receipt) => return Ok(receipt.clone()),
                Submission::InFlight => return Err(VerificationError::Busy(Operation::Submit)),
                Submission::Open => {}
            }

            let verified_targets = self.gate().await?;
            self.check_payload(payload, &verified_targets)?;
            *submission = Submission::InFlight;
        }
        let guard = InFlightGuard::arm(
            Arc::clone(&self.submission),
            |submission: &mut Submission| {
                if matches!(submission, Submission::InFlight) {
                    *submission = Submission::Open;
                }
            },
        );

        let outcome = self.submitter.complete(payload).await;

        let mut submission = self.submission.lock().await;
        guard.disarm();
        match outcome {
            Ok(receipt) => {
                tracing::info!(reference = %receipt.reference, "submission completed");
                *submission = Submission::Done(receipt.clone());
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(error = %e, "submission rejected");
                *submission = Submission::Open;
                Err(e.into())
            }
        }
    }

    /// One read of every channel under the book lock: either all verified
    /// (returning their targets) or the list of those that are not.
    async fn gate(&self) -> Result<BTreeMap<ChannelKind, String>, VerificationError> {
        let book = self.book.lock().await;
        let unverified: Vec<ChannelKind> = book
            .values()
            .filter(|ch| !ch.is_verified())
            .map(|ch| ch.kind())
            .collect();
        if !unverified.is_empty() {
            tracing::debug!(?unverified, "submission blocked on verification");
            return Err(VerificationError::IncompleteVerification(unverified));
        }
        Ok(book
            .values()
            .map(|ch| (ch.kind(), ch.target().to_string()))
            .collect())
    }

    fn check_payload(
        &self,
        payload: &P,
        verified_targets: &BTreeMap<ChannelKind, String>,
    ) -> Result<(), VerificationError> {
        let values = payload.to_values();
        let mut errors = match &self.payload_schema {
            Some(schema) => schema.validate(&values).err().unwrap_or_default(),
            None => Vec::new(),
        };

        for (kind, target) in verified_targets {
            let field = kind.field_name();
            if let Some(value) = values.get(field) {
                if value != target && !errors.iter().any(|e| e.field == field) {
                    errors.push(FieldError::new(
                        field,
                        format!("does not match the verified {kind}"),
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(VerificationError::Validation(errors))
        }
    }

    /// The signup flow: phone and email both required, payload checked with
    /// the signup schema.
    pub fn signup(
        codes: Arc<dyn CodeService>,
        clock: Arc<dyn Clock>,
        submitter: Arc<dyn SubmissionService<P>>,
        policy: VerificationPolicy,
    ) -> Result<Self, VerificationError> {
        let mut orchestrator =
            Self::new(codes, clock, submitter, policy).with_payload_schema(schemas::signup());
        orchestrator.register_channel(ChannelKind::Phone)?;
        orchestrator.register_channel(ChannelKind::Email)?;
        Ok(orchestrator)
    }
}
