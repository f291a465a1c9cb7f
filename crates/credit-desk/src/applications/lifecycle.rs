use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::domain::ApplicationStatus;

/// Governs which status rewrites the review flow will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Any valid status may replace any other, including reopening a
    /// decided application.
    Permissive,
    /// Approved and rejected applications keep their decision; only a
    /// same-status rewrite is tolerated.
    Strict,
}

impl TransitionPolicy {
    pub const fn label(&self) -> &'static str {
        match self {
            TransitionPolicy::Permissive => "permissive",
            TransitionPolicy::Strict => "strict",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "permissive" => Some(TransitionPolicy::Permissive),
            "strict" => Some(TransitionPolicy::Strict),
            _ => None,
        }
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("invalid status value: {value}")]
    InvalidStatusValue { value: String },
    #[error("cannot move a {from} application to {requested}")]
    InvalidTransition {
        from: ApplicationStatus,
        requested: ApplicationStatus,
    },
}

/// Checks a requested status rewrite against the configured policy.
/// Permissive mode never objects. Strict mode pins decided applications
/// to their decision.
pub fn authorize_transition(
    policy: TransitionPolicy,
    current: ApplicationStatus,
    requested: ApplicationStatus,
) -> Result<(), LifecycleError> {
    if policy == TransitionPolicy::Strict && current.is_terminal() && requested != current {
        return Err(LifecycleError::InvalidTransition {
            from: current,
            requested,
        });
    }
    Ok(())
}
