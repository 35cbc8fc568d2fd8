//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the flows (clock, code delivery, search,
//! final submission) is abstracted behind a trait in `onboard-types`. This
//! crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record every call for assertions
//!
//! Delays use `tokio::time`, so tests running with a paused clock control
//! exactly when each call resolves.

pub mod clock;
pub mod codes;
pub mod search;
pub mod submission;

pub use clock::NullClock;
pub use codes::NullCodeService;
pub use search::NullSearchService;
pub use submission::NullSubmission;
