use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::applications::domain::{ApplicantDetails, ApplicationId, ApplicationStatus};
use crate::applications::identifier::SuffixSource;
use crate::applications::messages::{Message, MessageId, MessageRepository, NewMessage};
use crate::applications::repository::{
    ApplicationRecord, ApplicationRepository, RepositoryError,
};
use crate::applications::{application_router, CreditApplicationService, IntakeConfig};
use crate::clock::Clock;

pub(super) fn applicant() -> ApplicantDetails {
    ApplicantDetails {
        first_name: "Maren".to_string(),
        last_name: "Holt".to_string(),
        email: "maren.holt@example.com".to_string(),
        country: "Norway".to_string(),
        city: "Bergen".to_string(),
        address: "Strandgaten 3".to_string(),
        amount: 12000,
        months: 24,
        income: 4200,
    }
}

pub(super) fn second_applicant() -> ApplicantDetails {
    ApplicantDetails {
        first_name: "Tomas".to_string(),
        last_name: "Lindqvist".to_string(),
        email: "tomas.lindqvist@example.com".to_string(),
        country: "Sweden".to_string(),
        city: "Uppsala".to_string(),
        address: "Kyrkogatan 12".to_string(),
        amount: 8000,
        months: 18,
        income: 3100,
    }
}

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn record_with_id(id: &str, at: DateTime<Utc>) -> ApplicationRecord {
    ApplicationRecord {
        application_id: ApplicationId(id.to_string()),
        applicant: applicant(),
        status: ApplicationStatus::Pending,
        created_at: at,
        updated_at: at,
    }
}

pub(super) fn assert_id_format(id: &ApplicationId, prefix: &str, year: i32) {
    let parts: Vec<&str> = id.0.split('-').collect();
    assert_eq!(parts.len(), 3, "unexpected identifier shape: {id}");
    assert_eq!(parts[0], prefix);
    assert_eq!(parts[1], year.to_string());
    assert_eq!(parts[2].len(), 3, "suffix must be zero padded: {id}");
    assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
}

pub(super) fn build_service() -> (
    CreditApplicationService<MemoryRepository, MemoryMessages>,
    Arc<MemoryRepository>,
    Arc<MemoryMessages>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let messages = Arc::new(MemoryMessages::default());
    let service = CreditApplicationService::new(
        repository.clone(),
        messages.clone(),
        IntakeConfig::default(),
    );
    (service, repository, messages)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.application_id) {
            return Err(RepositoryError::DuplicateIdentifier);
        }
        guard.insert(record.application_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
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

#[derive(Default)]
pub(super) struct MemoryMessages {
    state: Mutex<MessageState>,
}

#[derive(Default)]
struct MessageState {
    messages: Vec<Message>,
    next_id: u64,
}

impl MessageRepository for MemoryMessages {
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

    fn list_for_application(&self, id: &ApplicationId) -> Result<Vec<Message>, RepositoryError> {
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

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("record store offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("record store offline".to_string()))
    }

    fn list_all(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("record store offline".to_string()))
    }

    fn update_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
        _now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("record store offline".to_string()))
    }
}

/// Store whose next `conflicts` inserts fail as if a rival request won
/// the identifier between the free check and the write.
pub(super) struct ContestedRepository {
    pub(super) inner: MemoryRepository,
    conflicts: AtomicU32,
}

impl ContestedRepository {
    pub(super) fn losing(conflicts: u32) -> Self {
        Self {
            inner: MemoryRepository::default(),
            conflicts: AtomicU32::new(conflicts),
        }
    }
}

impl ApplicationRepository for ContestedRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts.store(remaining - 1, Ordering::SeqCst);
            return Err(RepositoryError::DuplicateIdentifier);
        }
        self.inner.insert(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list_all(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.list_all()
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.update_status(id, status, now)
    }
}

/// Replays a fixed sequence of suffix draws, cycling once exhausted.
pub(super) struct ScriptedSuffixes {
    draws: Mutex<VecDeque<u16>>,
}

impl ScriptedSuffixes {
    pub(super) fn cycling(draws: Vec<u16>) -> Self {
        Self {
            draws: Mutex::new(draws.into()),
        }
    }
}

impl SuffixSource for ScriptedSuffixes {
    fn draw(&self) -> u16 {
        let mut guard = self.draws.lock().expect("suffix mutex poisoned");
        let value = guard.pop_front().expect("scripted suffixes exhausted");
        guard.push_back(value);
        value
    }
}

/// Clock the tests move by hand.
pub(super) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(super) fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(super) fn advance_secs(&self, secs: i64) {
        let mut guard = self.now.lock().expect("clock mutex poisoned");
        *guard += chrono::Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn application_router_with_service(
    service: CreditApplicationService<MemoryRepository, MemoryMessages>,
) -> axum::Router {
    application_router(Arc::new(service))
}
