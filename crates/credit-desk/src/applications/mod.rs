//! Credit application intake, review decisions, and applicant messaging.
//!
//! Identifier generation, the record store, the message thread store, and
//! the lifecycle policy compose into [`CreditApplicationService`]; the
//! HTTP surface over that service lives in [`router`].

pub mod config;
pub mod domain;
pub mod identifier;
pub mod lifecycle;
pub mod messages;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use config::IntakeConfig;
pub use domain::{ApplicantDetails, ApplicationId, ApplicationStatus};
pub use identifier::{
    ApplicationIdGenerator, IdentifierError, RandomSuffixSource, SeededSuffixSource, SuffixSource,
    DEFAULT_ID_PREFIX, DEFAULT_MAX_ID_ATTEMPTS, SUFFIX_SPACE,
};
pub use lifecycle::{authorize_transition, LifecycleError, TransitionPolicy};
pub use messages::{Message, MessageAuthor, MessageId, MessageRepository, NewMessage, ThreadError};
pub use repository::{ApplicationRecord, ApplicationRepository, RepositoryError};
pub use router::application_router;
pub use service::{ApplicationServiceError, CreditApplicationService};
