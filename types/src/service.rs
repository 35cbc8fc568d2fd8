//! Contracts of the external services the flows depend on.
//!
//! Implementations live outside the core (real backends, the CLI's console
//! services, or the test doubles in `onboard-nullables`). None of these calls
//! is assumed to be cancellable, and calls on different channels may overlap.

use async_trait::async_trait;

use crate::{
    ChannelKind, DeliveryError, InvalidCodeError, OtpCode, SelectOption, SubmissionError,
    SubmissionReceipt,
};

/// Sends and checks one-time codes.
#[async_trait]
pub trait CodeService: Send + Sync {
    async fn send_code(&self, kind: ChannelKind, target: &str) -> Result<(), DeliveryError>;

    async fn check_code(
        &self,
        kind: ChannelKind,
        target: &str,
        code: &OtpCode,
    ) -> Result<(), InvalidCodeError>;
}

/// Resolves a search query to an ordered option list.
///
/// Must resolve for every query, including the empty string.
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, query: &str) -> Vec<SelectOption>;
}

/// Completes a flow once every gate has been passed (account creation,
/// onboarding, ...).
#[async_trait]
pub trait SubmissionService<P>: Send + Sync {
    async fn complete(&self, payload: &P) -> Result<SubmissionReceipt, SubmissionError>;
}
