use chrono::Datelike;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};

use super::config::IntakeConfig;
use super::domain::{ApplicantDetails, ApplicationId, ApplicationStatus};
use super::identifier::{ApplicationIdGenerator, IdentifierError, RandomSuffixSource};
use super::lifecycle::{authorize_transition, LifecycleError, TransitionPolicy};
use super::messages::{Message, MessageAuthor, MessageRepository, NewMessage, ThreadError};
use super::repository::{ApplicationRecord, ApplicationRepository, RepositoryError};

/// Service composing the identifier generator, the record store, and the
/// message thread store.
pub struct CreditApplicationService<R, M> {
    repository: Arc<R>,
    messages: Arc<M>,
    ids: ApplicationIdGenerator,
    transitions: TransitionPolicy,
    clock: Arc<dyn Clock>,
}

impl<R, M> CreditApplicationService<R, M>
where
    R: ApplicationRepository + 'static,
    M: MessageRepository + 'static,
{
    pub fn new(repository: Arc<R>, messages: Arc<M>, config: IntakeConfig) -> Self {
        let ids = ApplicationIdGenerator::new(
            config.id_prefix,
            config.max_id_attempts,
            Box::new(RandomSuffixSource),
        );
        Self::with_parts(
            repository,
            messages,
            ids,
            config.transition_policy,
            Arc::new(SystemClock),
        )
    }

    /// Assembles a service from explicit parts, for callers that need a
    /// deterministic identifier source or clock.
    pub fn with_parts(
        repository: Arc<R>,
        messages: Arc<M>,
        ids: ApplicationIdGenerator,
        transitions: TransitionPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            messages,
            ids,
            transitions,
            clock,
        }
    }

    /// Accept a new application: mint an identifier, stamp creation and
    /// update times with the same instant, and store the record pending.
    pub fn create(
        &self,
        applicant: ApplicantDetails,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let now = self.clock.now();
        let year = now.year();

        for _ in 0..self.ids.max_attempts() {
            let application_id = self.ids.generate(self.repository.as_ref(), year)?;
            let record = ApplicationRecord {
                application_id,
                applicant: applicant.clone(),
                status: ApplicationStatus::Pending,
                created_at: now,
                updated_at: now,
            };
            match self.repository.insert(record.clone()) {
                Ok(()) => return Ok(record),
                Err(RepositoryError::DuplicateIdentifier) => continue,
                Err(err) => return Err(err.into()),
            }
        }

        Err(IdentifierError::SpaceExhausted {
            attempts: self.ids.max_attempts(),
        }
        .into())
    }

    /// Fetch one application for applicant-facing status checks.
    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// List every application for the review queue, newest first.
    pub fn list(&self) -> Result<Vec<ApplicationRecord>, ApplicationServiceError> {
        Ok(self.repository.list_all()?)
    }

    /// Rewrite the status of an application from its wire label. The
    /// label is validated before the store is touched.
    pub fn update_status(
        &self,
        application_id: &ApplicationId,
        status: &str,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let requested =
            ApplicationStatus::parse(status).ok_or_else(|| LifecycleError::InvalidStatusValue {
                value: status.to_string(),
            })?;

        if self.transitions == TransitionPolicy::Strict {
            let current = self
                .repository
                .fetch(application_id)?
                .ok_or(RepositoryError::NotFound)?;
            authorize_transition(self.transitions, current.status, requested)?;
        }

        let updated = self
            .repository
            .update_status(application_id, requested, self.clock.now())?;
        Ok(updated)
    }

    /// Append a message with the author taken from the wire payload.
    pub fn append_message(
        &self,
        application_id: &ApplicationId,
        body: &str,
        author: &str,
    ) -> Result<Message, ApplicationServiceError> {
        let author = MessageAuthor::parse(author).ok_or_else(|| ThreadError::InvalidAuthor {
            value: author.to_string(),
        })?;
        self.append_with_author(application_id, body, author)
    }

    /// Append a reply on behalf of the reviewing side. The author is
    /// fixed to admin regardless of what the caller supplied.
    pub fn append_admin_message(
        &self,
        application_id: &ApplicationId,
        body: &str,
    ) -> Result<Message, ApplicationServiceError> {
        self.append_with_author(application_id, body, MessageAuthor::Admin)
    }

    fn append_with_author(
        &self,
        application_id: &ApplicationId,
        body: &str,
        author: MessageAuthor,
    ) -> Result<Message, ApplicationServiceError> {
        if body.trim().is_empty() {
            return Err(ThreadError::EmptyBody.into());
        }
        if self.repository.fetch(application_id)?.is_none() {
            return Err(ThreadError::ApplicationNotFound {
                id: application_id.clone(),
            }
            .into());
        }

        let message = self.messages.append(NewMessage {
            application_id: application_id.clone(),
            body: body.to_string(),
            author,
            created_at: self.clock.now(),
        })?;
        Ok(message)
    }

    /// Return the thread for an application, oldest first. Unknown
    /// applications produce an empty thread, not an error.
    pub fn list_messages(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<Message>, ApplicationServiceError> {
        Ok(self.messages.list_for_application(application_id)?)
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Thread(#[from] ThreadError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
