//! Code verification for the signup and login flows.
//!
//! Layers, leaf first:
//! 1. [`VerificationChannel`]: the state record of one phone or email channel
//!    and its `Idle → CodeSent → Verified` machine (with `Failed` on a
//!    rejected code). Pure, no I/O.
//! 2. [`ChannelController`]: drives one channel against a
//!    [`CodeService`](onboard_types::CodeService), rejecting overlapping
//!    operations with `Busy`.
//! 3. [`VerificationOrchestrator`]: owns several controllers and performs the
//!    final submission only once every registered channel is verified.
//! 4. [`LoginChallengeFlow`]: the single-channel identify → challenge variant.
//!
//! Nothing here retries on its own; every retry is an explicit call.

pub mod controller;
pub mod error;
mod guard;
pub mod login;
pub mod orchestrator;
pub mod policy;
pub mod state;

pub use controller::ChannelController;
pub use error::{Operation, VerificationError};
pub use login::{LoginChallengeFlow, LoginStep};
pub use orchestrator::VerificationOrchestrator;
pub use policy::VerificationPolicy;
pub use state::{ChannelStatus, VerificationChannel};
