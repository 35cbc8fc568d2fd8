//! Tunables for code verification, loadable from the `[verification]` table
//! of the application config.

use onboard_types::DEFAULT_CODE_LENGTH;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationPolicy {
    /// Digits in a one-time code.
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Minimum seconds between two sends to the same target.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

fn default_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_cooldown_secs() -> u64 {
    30
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}
