//! Form validation for the onboarding flows.
//!
//! Validation is a pure function of a value map and an explicit [`Schema`];
//! there is no hidden field registry. [`FormState`] is the `{values, errors,
//! touched}` record a renderer keeps per form.

pub mod error;
pub mod location;
pub mod schema;
pub mod schemas;
pub mod state;

pub use error::FieldError;
pub use location::{LocationCascade, LocationError, LocationSource, LocationTable};
pub use schema::{FieldSpec, FormPayload, FormValues, Rule, Schema};
pub use state::FormState;
