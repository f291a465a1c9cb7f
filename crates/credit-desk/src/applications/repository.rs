use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::{ApplicantDetails, ApplicationId, ApplicationStatus};

/// A credit application as held by the record store.
///
/// Serializes flat so applicant fields sit beside the identifier and
/// status in wire payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub application_id: ApplicationId,
    #[serde(flatten)]
    pub applicant: ApplicantDetails,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage boundary for application records.
///
/// Implementations must treat `insert` as the single uniqueness gate:
/// inserting an identifier that already exists fails with
/// [`RepositoryError::DuplicateIdentifier`] and leaves the store unchanged.
pub trait ApplicationRepository: Send + Sync {
    /// Adds a new record, rejecting identifiers already present.
    fn insert(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;

    /// Looks up one record. Unknown identifiers yield `Ok(None)`.
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;

    /// Returns every record, newest first. Records created at the same
    /// instant come back in identifier order so the listing is stable.
    fn list_all(&self) -> Result<Vec<ApplicationRecord>, RepositoryError>;

    /// Overwrites the status of an existing record, stamping `updated_at`
    /// with `now`, and returns the updated record.
    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, RepositoryError>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("identifier already present in the store")]
    DuplicateIdentifier,
    #[error("record not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}
