//! Payloads the flows hand to external services, and what they get back.

use serde::{Deserialize, Serialize};

/// What the login flow captures in its identify step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginIdentity {
    pub phone: String,
    /// Value of the society picked in the society selector.
    pub society: String,
}

/// Account-creation payload submitted once both channels are verified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupPayload {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Society onboarding details.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OnboardingPayload {
    pub society_name: String,
    pub subdomain: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub zipcode: String,
}

/// Proof that the completion service accepted a submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Opaque reference assigned by the completion service.
    pub reference: String,
    /// Where the caller should go next (e.g. the onboarding page).
    #[serde(default)]
    pub next: Option<String>,
}
