//! State record and transitions of a single verification channel.
//!
//! The record is pure: operations are split into a `begin_*` step that
//! checks preconditions and hands out a ticket, and a `finish_*` step that
//! applies the service's answer. A controller calls the service in between.
//! Tickets carry the channel's epoch so that an answer for a target that has
//! since been edited is dropped instead of applied.

use onboard_types::{ChannelKind, DeliveryError, InvalidCodeError, OtpCode, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Operation, VerificationError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelStatus {
    /// No code outstanding for the current target.
    Idle,
    /// A code was delivered and can be submitted.
    CodeSent,
    /// Terminal: the target is proven and frozen.
    Verified,
    /// The last submitted code was rejected.
    Failed,
}

impl ChannelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelStatus::Idle => "idle",
            ChannelStatus::CodeSent => "code sent",
            ChannelStatus::Verified => "verified",
            ChannelStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission to call the delivery service for one target.
#[derive(Debug)]
pub struct SendTicket {
    pub kind: ChannelKind,
    pub target: String,
    pub operation: Operation,
    epoch: u64,
}

impl SendTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Permission to call the verify service with one code.
#[derive(Debug)]
pub struct CheckTicket {
    pub kind: ChannelKind,
    pub target: String,
    pub code: OtpCode,
    epoch: u64,
}

impl CheckTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// One phone or email channel.
#[derive(Clone, Debug)]
pub struct VerificationChannel {
    kind: ChannelKind,
    target: String,
    status: ChannelStatus,
    last_code: Option<OtpCode>,
    sent_at: Option<Timestamp>,
    cooldown_secs: u64,
    /// Bumped on every target edit.
    epoch: u64,
    in_flight: Option<Operation>,
}

impl VerificationChannel {
    pub fn new(kind: ChannelKind, cooldown_secs: u64) -> Self {
        Self {
            kind,
            target: String::new(),
            status: ChannelStatus::Idle,
            last_code: None,
            sent_at: None,
            cooldown_secs,
            epoch: 0,
            in_flight: None,
        }
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn status(&self) -> ChannelStatus {
        self.status
    }

    pub fn last_code(&self) -> Option<&OtpCode> {
        self.last_code.as_ref()
    }

    pub fn sent_at(&self) -> Option<Timestamp> {
        self.sent_at
    }

    pub fn cooldown_secs(&self) -> u64 {
        self.cooldown_secs
    }

    pub fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    pub fn is_verified(&self) -> bool {
        self.status == ChannelStatus::Verified
    }

    /// Seconds until a resend is allowed; zero when nothing was sent yet.
    pub fn cooldown_remaining(&self, now: Timestamp) -> u64 {
        self.sent_at
            .map(|sent| sent.remaining(self.cooldown_secs, now))
            .unwrap_or(0)
    }

    /// Edit the target. Any change before verification resets the channel to
    /// `Idle` and invalidates whatever was in flight for the old target.
    ///
    /// Returns whether anything changed.
    pub fn set_target(&mut self, target: &str) -> Result<bool, VerificationError> {
        if self.target == target {
            return Ok(false);
        }
        if self.is_verified() {
            return Err(VerificationError::TargetFrozen(self.kind));
        }
        self.target = target.to_string();
        self.status = ChannelStatus::Idle;
        self.last_code = None;
        self.sent_at = None;
        self.in_flight = None;
        self.epoch += 1;
        Ok(true)
    }

    fn invalid(&self, operation: Operation) -> VerificationError {
        VerificationError::InvalidState {
            operation,
            state: self.status.as_str(),
        }
    }

    /// Check whether `operation` may start now, without changing anything.
    pub fn admit(&self, operation: Operation, now: Timestamp) -> Result<(), VerificationError> {
        if self.in_flight.is_some() {
            return Err(VerificationError::Busy(operation));
        }
        match operation {
            Operation::RequestCode => match self.status {
                ChannelStatus::Idle | ChannelStatus::Failed => Ok(()),
                _ => Err(self.invalid(operation)),
            },
            Operation::Resend => match self.status {
                ChannelStatus::CodeSent | ChannelStatus::Failed => {
                    let remaining_secs = self.cooldown_remaining(now);
                    if remaining_secs > 0 {
                        Err(VerificationError::Cooldown { remaining_secs })
                    } else {
                        Ok(())
                    }
                }
                _ => Err(self.invalid(operation)),
            },
            Operation::SubmitCode => match self.status {
                ChannelStatus::CodeSent => Ok(()),
                _ => Err(self.invalid(operation)),
            },
            other => Err(self.invalid(other)),
        }
    }

    /// Start a send (`RequestCode` or `Resend`).
    pub fn begin_send(
        &mut self,
        operation: Operation,
        now: Timestamp,
    ) -> Result<SendTicket, VerificationError> {
        debug_assert!(matches!(
            operation,
            Operation::RequestCode | Operation::Resend
        ));
        self.admit(operation, now)?;
        self.in_flight = Some(operation);
        Ok(SendTicket {
            kind: self.kind,
            target: self.target.clone(),
            operation,
            epoch: self.epoch,
        })
    }

    /// Apply the delivery service's answer. A rejected send leaves the status
    /// untouched.
    pub fn finish_send(
        &mut self,
        ticket: SendTicket,
        outcome: Result<(), DeliveryError>,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        if ticket.epoch != self.epoch {
            return Err(VerificationError::Superseded(self.kind));
        }
        self.in_flight = None;
        outcome?;
        self.status = ChannelStatus::CodeSent;
        self.sent_at = Some(now);
        self.last_code = None;
        Ok(())
    }

    /// Start checking `input` against the service. Malformed input is
    /// rejected here and never reaches the service.
    pub fn begin_check(
        &mut self,
        input: &str,
        code_length: usize,
        now: Timestamp,
    ) -> Result<CheckTicket, VerificationError> {
        self.admit(Operation::SubmitCode, now)?;
        let code = OtpCode::parse(input, code_length)
            .map_err(|e| VerificationError::field("code", e.to_string()))?;
        self.in_flight = Some(Operation::SubmitCode);
        self.last_code = Some(code.clone());
        Ok(CheckTicket {
            kind: self.kind,
            target: self.target.clone(),
            code,
            epoch: self.epoch,
        })
    }

    /// Release the slot of an operation that will never finish, leaving the
    /// status as it was. No-op once the target has been edited since.
    pub fn abandon(&mut self, operation: Operation, epoch: u64) {
        if epoch != self.epoch || self.in_flight != Some(operation) {
            return;
        }
        self.in_flight = None;
        if operation == Operation::SubmitCode {
            self.last_code = None;
        }
    }

    /// Apply the verify service's answer. Either way the attempted code is
    /// discarded: a rejected code has to be re-entered, not resubmitted.
    pub fn finish_check(
        &mut self,
        ticket: CheckTicket,
        outcome: Result<(), InvalidCodeError>,
    ) -> Result<(), VerificationError> {
        if ticket.epoch != self.epoch {
            return Err(VerificationError::Superseded(self.kind));
        }
        self.in_flight = None;
        self.last_code = None;
        match outcome {
            Ok(()) => {
                self.status = ChannelStatus::Verified;
                Ok(())
            }
            Err(e) => {
                self.status = ChannelStatus::Failed;
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sent_channel(at: u64) -> VerificationChannel {
        let mut ch = VerificationChannel::new(ChannelKind::Phone, 30);
        ch.set_target("9876543210").unwrap();
        let ticket = ch
            .begin_send(Operation::RequestCode, Timestamp::new(at))
            .unwrap();
        ch.finish_send(ticket, Ok(()), Timestamp::new(at)).unwrap();
        ch
    }

    #[test]
    fn request_moves_idle_to_code_sent() {
        let ch = sent_channel(100);
        assert_eq!(ch.status(), ChannelStatus::CodeSent);
        assert_eq!(ch.sent_at(), Some(Timestamp::new(100)));
        assert_eq!(ch.in_flight(), None);
    }

    #[test]
    fn abandoned_check_frees_the_slot_and_keeps_code_sent() {
        let mut ch = sent_channel(0);
        let ticket = ch.begin_check("123456", 6, Timestamp::new(1)).unwrap();
        ch.abandon(Operation::SubmitCode, ticket.epoch());
        assert_eq!(ch.in_flight(), None);
        assert_eq!(ch.last_code(), None);
        assert_eq!(ch.status(), ChannelStatus::CodeSent);
        assert!(ch.begin_check("222222", 6, Timestamp::new(2)).is_ok());
    }

    #[test]
    fn abandon_for_an_old_target_touches_nothing() {
        let mut ch = VerificationChannel::new(ChannelKind::Phone, 30);
        ch.set_target("9876543210").unwrap();
        let stale = ch
            .begin_send(Operation::RequestCode, Timestamp::new(0))
            .unwrap();
        ch.set_target("9876543211").unwrap();
        let current = ch
            .begin_send(Operation::RequestCode, Timestamp::new(0))
            .unwrap();
        ch.abandon(Operation::RequestCode, stale.epoch());
        assert_eq!(ch.in_flight(), Some(Operation::RequestCode));
        ch.abandon(Operation::RequestCode, current.epoch());
        assert_eq!(ch.in_flight(), None);
    }

    #[test]
    fn delivery_failure_keeps_status() {
        let mut ch = VerificationChannel::new(ChannelKind::Email, 30);
        ch.set_target("a@b.co").unwrap();
        let ticket = ch
            .begin_send(Operation::RequestCode, Timestamp::new(0))
            .unwrap();
        let err = ch
            .finish_send(
                ticket,
                Err(DeliveryError::new(ChannelKind::Email, "bounced")),
                Timestamp::new(0),
            )
            .unwrap_err();
        assert!(matches!(err, VerificationError::Delivery(_)));
        assert_eq!(ch.status(), ChannelStatus::Idle);
        assert_eq!(ch.in_flight(), None);
    }

    #[test]
    fn second_operation_while_in_flight_is_busy() {
        let mut ch = VerificationChannel::new(ChannelKind::Phone, 30);
        ch.set_target("9876543210").unwrap();
        let _ticket = ch
            .begin_send(Operation::RequestCode, Timestamp::new(0))
            .unwrap();
        assert_eq!(
            ch.begin_send(Operation::RequestCode, Timestamp::new(0))
                .unwrap_err(),
            VerificationError::Busy(Operation::RequestCode)
        );
    }

    #[test]
    fn submit_code_only_from_code_sent() {
        let mut ch = VerificationChannel::new(ChannelKind::Phone, 30);
        ch.set_target("9876543210").unwrap();
        assert!(matches!(
            ch.begin_check("123456", 6, Timestamp::new(0)),
            Err(VerificationError::InvalidState {
                operation: Operation::SubmitCode,
                state: "idle"
            })
        ));
    }

    #[test]
    fn malformed_code_fails_before_in_flight() {
        let mut ch = sent_channel(0);
        let err = ch.begin_check("12", 6, Timestamp::new(1)).unwrap_err();
        assert!(matches!(err, VerificationError::Validation(_)));
        assert_eq!(ch.in_flight(), None);
        assert_eq!(ch.last_code(), None);
    }

    #[test]
    fn rejected_code_fails_and_is_discarded() {
        let mut ch = sent_channel(0);
        let ticket = ch.begin_check("111111", 6, Timestamp::new(1)).unwrap();
        assert!(ch.last_code().is_some());
        let err = ch
            .finish_check(ticket, Err(InvalidCodeError { kind: ChannelKind::Phone }))
            .unwrap_err();
        assert!(matches!(err, VerificationError::InvalidCode(_)));
        assert_eq!(ch.status(), ChannelStatus::Failed);
        assert_eq!(ch.last_code(), None);

        // Failed cannot take another code until one is resent.
        assert!(ch.begin_check("222222", 6, Timestamp::new(2)).is_err());
    }

    #[test]
    fn verified_freezes_target_and_clears_code() {
        let mut ch = sent_channel(0);
        let ticket = ch.begin_check("222222", 6, Timestamp::new(1)).unwrap();
        ch.finish_check(ticket, Ok(())).unwrap();
        assert!(ch.is_verified());
        assert_eq!(ch.last_code(), None);
        assert_eq!(
            ch.set_target("1111111111").unwrap_err(),
            VerificationError::TargetFrozen(ChannelKind::Phone)
        );
        // Setting the same value is not an edit.
        assert_eq!(ch.set_target("9876543210"), Ok(false));
    }

    #[test]
    fn resend_respects_cooldown() {
        let ch = sent_channel(100);
        assert_eq!(
            ch.admit(Operation::Resend, Timestamp::new(101)),
            Err(VerificationError::Cooldown { remaining_secs: 29 })
        );
        assert_eq!(ch.admit(Operation::Resend, Timestamp::new(131)), Ok(()));
    }

    #[test]
    fn resend_not_allowed_from_idle() {
        let mut ch = VerificationChannel::new(ChannelKind::Phone, 30);
        ch.set_target("9876543210").unwrap();
        assert!(matches!(
            ch.admit(Operation::Resend, Timestamp::new(0)),
            Err(VerificationError::InvalidState { .. })
        ));
    }

    #[test]
    fn editing_target_mid_flight_supersedes_answer() {
        let mut ch = VerificationChannel::new(ChannelKind::Phone, 30);
        ch.set_target("9876543210").unwrap();
        let ticket = ch
            .begin_send(Operation::RequestCode, Timestamp::new(0))
            .unwrap();
        ch.set_target("9999999999").unwrap();
        assert_eq!(ch.in_flight(), None);
        assert_eq!(
            ch.finish_send(ticket, Ok(()), Timestamp::new(1)),
            Err(VerificationError::Superseded(ChannelKind::Phone))
        );
        assert_eq!(ch.status(), ChannelStatus::Idle);
    }

    #[test]
    fn editing_target_after_send_resets_to_idle() {
        let mut ch = sent_channel(0);
        assert_eq!(ch.set_target("9999999999"), Ok(true));
        assert_eq!(ch.status(), ChannelStatus::Idle);
        assert_eq!(ch.sent_at(), None);
        assert!(matches!(
            ch.begin_check("222222", 6, Timestamp::new(5)),
            Err(VerificationError::InvalidState { .. })
        ));
    }
}
