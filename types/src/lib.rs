//! Fundamental types for the onboarding workspace.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! verification channels, one-time codes, selectable options, form payloads,
//! timestamps, and the contracts of the external services the flows talk to.

pub mod channel;
pub mod code;
pub mod error;
pub mod option;
pub mod payload;
pub mod service;
pub mod time;

pub use channel::ChannelKind;
pub use code::{CodeFormatError, OtpCode, DEFAULT_CODE_LENGTH};
pub use error::{DeliveryError, InvalidCodeError, SubmissionError};
pub use option::SelectOption;
pub use payload::{LoginIdentity, OnboardingPayload, SignupPayload, SubmissionReceipt};
pub use service::{CodeService, SearchService, SubmissionService};
pub use time::{Clock, SystemClock, Timestamp};
