use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use credit_desk::applications::{
    ApplicationId, ApplicationRecord, ApplicationRepository, ApplicationStatus, Message,
    MessageId, MessageRepository, NewMessage, RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local record store backing the HTTP service.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.application_id) {
            return Err(RepositoryError::DuplicateIdentifier);
        }
        guard.insert(record.application_id.clone(), record);
        Ok(())
    }

    fn fetch(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_all(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.application_id.0.cmp(&b.application_id.0))
        });
        Ok(records)
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.status = status;
        record.updated_at = now;
        Ok(record.clone())
    }
}

/// Process-local message store. The sequence counter lives inside the
/// same lock as the messages so ids and append order never diverge.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMessageStore {
    state: Arc<Mutex<MessageStoreState>>,
}

#[derive(Default)]
struct MessageStoreState {
    messages: Vec<Message>,
    next_id: u64,
}

impl MessageRepository for InMemoryMessageStore {
    fn append(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let mut state = self.state.lock().expect("message mutex poisoned");
        state.next_id += 1;
        let stored = Message {
            id: MessageId(state.next_id),
            application_id: message.application_id,
            body: message.body,
            author: message.author,
            created_at: message.created_at,
        };
        state.messages.push(stored.clone());
        Ok(stored)
    }

    fn list_for_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let state = self.state.lock().expect("message mutex poisoned");
        let mut thread: Vec<_> = state
            .messages
            .iter()
            .filter(|message| &message.application_id == id)
            .cloned()
            .collect();
        thread.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(thread)
    }
}
