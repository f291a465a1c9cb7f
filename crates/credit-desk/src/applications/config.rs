use super::identifier::{DEFAULT_ID_PREFIX, DEFAULT_MAX_ID_ATTEMPTS};
use super::lifecycle::TransitionPolicy;

/// Tunables for intake and review, normally loaded from the environment
/// by [`crate::config::AppConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    /// Prefix for generated application identifiers.
    pub id_prefix: String,
    /// Attempt budget for finding a free identifier.
    pub max_id_attempts: u32,
    /// Policy applied when a reviewer rewrites an application status.
    pub transition_policy: TransitionPolicy,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            max_id_attempts: DEFAULT_MAX_ID_ATTEMPTS,
            transition_policy: TransitionPolicy::Permissive,
        }
    }
}
