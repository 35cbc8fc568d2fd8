use onboard_forms::FieldError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeamError {
    #[error("invalid team member: {}", join(.0))]
    Validation(Vec<FieldError>),

    #[error("no team member with id {0}")]
    NotFound(u64),
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
