//! Two-step login: identify (phone + society) → one-time-code challenge.

use std::sync::Arc;

use onboard_forms::schemas;
use onboard_types::{ChannelKind, Clock, CodeService, LoginIdentity, OtpCode, Timestamp};
use tokio::sync::Mutex;

use crate::error::{Operation, VerificationError};
use crate::guard::InFlightGuard;
use crate::policy::VerificationPolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginStep {
    Identify,
    Challenge,
    /// Terminal: control has been handed back to the caller.
    Complete,
}

impl LoginStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginStep::Identify => "identifying",
            LoginStep::Challenge => "awaiting the code",
            LoginStep::Complete => "logged in",
        }
    }
}

#[derive(Debug)]
struct LoginState {
    step: LoginStep,
    identity: Option<LoginIdentity>,
    /// The code currently being checked.
    attempt: Option<OtpCode>,
    sent_at: Option<Timestamp>,
    in_flight: Option<Operation>,
}

impl LoginState {
    fn admit(&self, operation: Operation, expected: LoginStep) -> Result<(), VerificationError> {
        if self.in_flight.is_some() {
            return Err(VerificationError::Busy(operation));
        }
        if self.step != expected {
            return Err(VerificationError::InvalidState {
                operation,
                state: self.step.as_str(),
            });
        }
        Ok(())
    }
}

/// The login variant of the verification machinery: one implicit phone
/// channel, and a rejected code keeps the flow in `Challenge` so the user can
/// simply type another one.
pub struct LoginChallengeFlow {
    state: Arc<Mutex<LoginState>>,
    codes: Arc<dyn CodeService>,
    clock: Arc<dyn Clock>,
    policy: VerificationPolicy,
}

impl LoginChallengeFlow {
    pub fn new(
        codes: Arc<dyn CodeService>,
        clock: Arc<dyn Clock>,
        policy: VerificationPolicy,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(LoginState {
                step: LoginStep::Identify,
                identity: None,
                attempt: None,
                sent_at: None,
                in_flight: None,
            })),
            codes,
            clock,
            policy,
        }
    }

    fn guard(&self, operation: Operation) -> InFlightGuard<LoginState> {
        InFlightGuard::arm(Arc::clone(&self.state), move |state: &mut LoginState| {
            if state.in_flight == Some(operation) {
                state.in_flight = None;
                state.attempt = None;
            }
        })
    }

    pub async fn step(&self) -> LoginStep {
        self.state.lock().await.step
    }

    pub async fn identity(&self) -> Option<LoginIdentity> {
        self.state.lock().await.identity.clone()
    }

    /// Seconds until [`resend`](Self::resend) is allowed.
    pub async fn cooldown_remaining(&self) -> u64 {
        let now = self.clock.now();
        let state = self.state.lock().await;
        state
            .sent_at
            .map(|sent| sent.remaining(self.policy.cooldown_secs, now))
            .unwrap_or(0)
    }

    /// Validate the identity and send a code to its phone.
    pub async fn identify(&self, identity: LoginIdentity) -> Result<(), VerificationError> {
        {
            let mut state = self.state.lock().await;
            state.admit(Operation::Identify, LoginStep::Identify)?;
            schemas::login_identity()
                .validate_payload(&identity)
                .map_err(VerificationError::Validation)?;
            state.in_flight = Some(Operation::Identify);
        }
        let guard = self.guard(Operation::Identify);

        let outcome = self.codes.send_code(ChannelKind::Phone, &identity.phone).await;

        let mut state = self.state.lock().await;
        guard.disarm();
        state.in_flight = None;
        if let Err(e) = outcome {
            tracing::warn!(error = %e, "login code delivery rejected");
            return Err(e.into());
        }
        state.step = LoginStep::Challenge;
        state.identity = Some(identity);
        state.sent_at = Some(self.clock.now());
        tracing::debug!("login code sent");
        Ok(())
    }

    /// Check the entered code. On success the flow completes and returns the
    /// identity captured in the identify step.
    pub async fn challenge(&self, input: &str) -> Result<LoginIdentity, VerificationError> {
        let (phone, code) = {
            let mut state = self.state.lock().await;
            state.admit(Operation::Challenge, LoginStep::Challenge)?;
            let code = OtpCode::parse(input, self.policy.code_length)
                .map_err(|e| VerificationError::field("code", e.to_string()))?;
            let phone = state
                .identity
                .as_ref()
                .map(|id| id.phone.clone())
                .ok_or(VerificationError::InvalidState {
                    operation: Operation::Challenge,
                    state: LoginStep::Identify.as_str(),
                })?;
            state.attempt = Some(code.clone());
            state.in_flight = Some(Operation::Challenge);
            (phone, code)
        };
        let guard = self.guard(Operation::Challenge);

        let outcome = self.codes.check_code(ChannelKind::Phone, &phone, &code).await;

        let mut state = self.state.lock().await;
        guard.disarm();
        state.in_flight = None;
        state.attempt = None;
        match outcome {
            Ok(()) => {
                state.step = LoginStep::Complete;
                tracing::info!("login challenge passed");
                state.identity.clone().ok_or(VerificationError::InvalidState {
                    operation: Operation::Challenge,
                    state: LoginStep::Identify.as_str(),
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "login code rejected");
                Err(e.into())
            }
        }
    }

    /// Send a new code to the identified phone, subject to the cooldown.
    pub async fn resend(&self) -> Result<(), VerificationError> {
        let now = self.clock.now();
        let phone = {
            let mut state = self.state.lock().await;
            state.admit(Operation::Resend, LoginStep::Challenge)?;
            let remaining_secs = state
                .sent_at
                .map(|sent| sent.remaining(self.policy.cooldown_secs, now))
                .unwrap_or(0);
            if remaining_secs > 0 {
                return Err(VerificationError::Cooldown { remaining_secs });
            }
            let phone = state
                .identity
                .as_ref()
                .map(|id| id.phone.clone())
                .ok_or(VerificationError::InvalidState {
                    operation: Operation::Resend,
                    state: LoginStep::Identify.as_str(),
                })?;
            state.in_flight = Some(Operation::Resend);
            phone
        };
        let guard = self.guard(Operation::Resend);

        let outcome = self.codes.send_code(ChannelKind::Phone, &phone).await;

        let mut state = self.state.lock().await;
        guard.disarm();
        state.in_flight = None;
        outcome?;
        state.sent_at = Some(self.clock.now());
        tracing::debug!("login code resent");
        Ok(())
    }
}
