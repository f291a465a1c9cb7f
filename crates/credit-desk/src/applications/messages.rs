use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::domain::ApplicationId;
use super::repository::RepositoryError;

/// Store-assigned sequence number for a message. Later appends always
/// receive larger values, which breaks ties between messages stamped
/// with the same timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who wrote a message in an application thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageAuthor {
    User,
    Admin,
}

impl MessageAuthor {
    pub const fn label(&self) -> &'static str {
        match self {
            MessageAuthor::User => "user",
            MessageAuthor::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(MessageAuthor::User),
            "admin" => Some(MessageAuthor::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for MessageAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A message about to be appended, before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub application_id: ApplicationId,
    pub body: String,
    pub author: MessageAuthor,
    pub created_at: DateTime<Utc>,
}

/// A stored thread message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub application_id: ApplicationId,
    pub body: String,
    pub author: MessageAuthor,
    pub created_at: DateTime<Utc>,
}

/// Storage boundary for application message threads.
pub trait MessageRepository: Send + Sync {
    /// Persists a message and returns it with its assigned id.
    fn append(&self, message: NewMessage) -> Result<Message, RepositoryError>;

    /// Returns the thread for one application, oldest first. Messages
    /// stamped with the same timestamp come back in append order. An
    /// unknown application yields an empty thread, not an error.
    fn list_for_application(&self, id: &ApplicationId) -> Result<Vec<Message>, RepositoryError>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThreadError {
    #[error("application {id} not found")]
    ApplicationNotFound { id: ApplicationId },
    #[error("invalid message author: {value}")]
    InvalidAuthor { value: String },
    #[error("message body must not be empty")]
    EmptyBody,
}
