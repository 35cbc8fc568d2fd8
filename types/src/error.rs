//! Errors reported by the external collaborator services.

use thiserror::Error;

use crate::ChannelKind;

/// The delivery service refused to send a code.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("could not deliver code over {kind}: {reason}")]
pub struct DeliveryError {
    pub kind: ChannelKind,
    pub reason: String,
}

impl DeliveryError {
    pub fn new(kind: ChannelKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// The verification service rejected a code.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind} code was rejected")]
pub struct InvalidCodeError {
    pub kind: ChannelKind,
}

/// The completion service rejected the final submission.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("submission rejected: {0}")]
pub struct SubmissionError(pub String);
