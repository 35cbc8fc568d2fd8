//! Team members of a society: an in-memory roster with validated
//! create / update / delete and a free-text filter.

pub mod error;
pub mod roles;
pub mod roster;

pub use error::TeamError;
pub use roles::DEFAULT_ROLES;
pub use roster::{NewMember, TeamMember, TeamRoster};
