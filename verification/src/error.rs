use onboard_forms::FieldError;
use onboard_types::{ChannelKind, DeliveryError, InvalidCodeError, SubmissionError};
use std::fmt;
use thiserror::Error;

/// The user-triggered operations a flow can reject.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    RequestCode,
    SubmitCode,
    Resend,
    Identify,
    Challenge,
    Submit,
    Register,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::RequestCode => "request a code",
            Operation::SubmitCode => "submit a code",
            Operation::Resend => "resend a code",
            Operation::Identify => "identify",
            Operation::Challenge => "answer the challenge",
            Operation::Submit => "submit",
            Operation::Register => "register a channel",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// Local input failed its schema; no service was contacted.
    #[error("invalid input: {}", join(.0))]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    InvalidCode(#[from] InvalidCodeError),

    #[error("a new code can be sent in {remaining_secs}s")]
    Cooldown { remaining_secs: u64 },

    #[error("cannot {0}: a previous request is still outstanding")]
    Busy(Operation),

    #[error("verify {} before submitting", join(.0))]
    IncompleteVerification(Vec<ChannelKind>),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: Operation,
        state: &'static str,
    },

    #[error("{0} is verified and can no longer be changed")]
    TargetFrozen(ChannelKind),

    /// The channel's target was edited while a request for the old target was
    /// in flight; the outcome was dropped.
    #[error("{0} changed while the request was in flight")]
    Superseded(ChannelKind),

    #[error("{0} channel is already registered")]
    DuplicateChannel(ChannelKind),

    #[error("{0} channel is not registered")]
    UnknownChannel(ChannelKind),
}

impl VerificationError {
    pub(crate) fn field(field: &str, message: impl Into<String>) -> Self {
        VerificationError::Validation(vec![FieldError::new(field, message)])
    }

    /// Whether the user can carry on in the same flow by entering something
    /// else or asking again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VerificationError::Validation(_)
                | VerificationError::Delivery(_)
                | VerificationError::InvalidCode(_)
                | VerificationError::Cooldown { .. }
                | VerificationError::InvalidState { .. }
        )
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors_are_the_ones_the_user_can_act_on() {
        assert!(VerificationError::field("code", "too short").is_recoverable());
        assert!(VerificationError::InvalidCode(InvalidCodeError {
            kind: ChannelKind::Phone
        })
        .is_recoverable());
        assert!(VerificationError::Cooldown { remaining_secs: 3 }.is_recoverable());

        assert!(!VerificationError::Busy(Operation::Submit).is_recoverable());
        assert!(!VerificationError::TargetFrozen(ChannelKind::Email).is_recoverable());
        assert!(!VerificationError::Submission(SubmissionError("down".into())).is_recoverable());
    }
}
