use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate};

use crate::catalog::domain::{Book, BookFormat, BookId, DomainId, Edition, EditionId};
use crate::config::default_conditions;
use crate::lending::conditions::ConditionRegistry;
use crate::lending::domain::{
    Account, AccountId, AccountType, BorrowRecord, BorrowStatus, BorrowedItem, LoanRequest,
    RecordId,
};
use crate::lending::eligibility::{EligibilityEngine, LendingPolicy};
use crate::lending::extension::ExtensionPolicy;
use crate::lending::repository::{
    BorrowRecordStore, DecisionObserver, EditionStore, LoanAuditEvent, ObserverError,
    RepositoryError,
};
use crate::lending::service::CirculationService;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
}

pub(super) fn days_ago(days: i64) -> NaiveDate {
    today() - Duration::days(days)
}

pub(super) fn policy() -> LendingPolicy {
    let registry =
        ConditionRegistry::from_conditions(default_conditions()).expect("stock seed is unique");
    LendingPolicy::from_registry(&registry).expect("stock seed is complete")
}

pub(super) fn engine() -> EligibilityEngine {
    EligibilityEngine::new(policy())
}

pub(super) fn engine_with(policy: LendingPolicy) -> EligibilityEngine {
    EligibilityEngine::new(policy)
}

pub(super) fn extension_policy() -> ExtensionPolicy {
    ExtensionPolicy::new(policy())
}

pub(super) fn reader(id: u32) -> Account {
    Account {
        id: AccountId(id),
        name: format!("Reader {id}"),
        account_type: AccountType::Reader,
    }
}

pub(super) fn librarian(id: u32) -> Account {
    Account {
        id: AccountId(id),
        name: format!("Librarian {id}"),
        account_type: AccountType::Librarian,
    }
}

pub(super) fn librarian_reader(id: u32) -> Account {
    Account {
        id: AccountId(id),
        name: format!("Dual {id}"),
        account_type: AccountType::LibrarianReader,
    }
}

pub(super) fn book(id: u32, domains: &[u32]) -> Book {
    Book {
        id: BookId(id),
        title: format!("Collected Works {id}"),
        authors: vec!["Ada Lovelace".to_string()],
        domains: domains.iter().map(|&domain| DomainId(domain)).collect(),
    }
}

pub(super) fn edition(id: u32, book_id: u32, borrowing: u32, reading: u32) -> Edition {
    Edition::new(
        EditionId(id),
        BookId(book_id),
        "Griffon House",
        1998,
        320,
        1,
        BookFormat::Paperback,
        borrowing,
        reading,
    )
}

/// A borrowable item for book `book_id` tagged with `domains`, with plenty of
/// shelf stock so stock rules stay out of the way unless a test wants them.
pub(super) fn item(edition_id: u32, book_id: u32, domains: &[u32]) -> BorrowedItem {
    BorrowedItem {
        edition: edition(edition_id, book_id, 5, 5),
        book: book(book_id, domains),
    }
}

pub(super) fn request(reader: Account, items: Vec<BorrowedItem>) -> LoanRequest {
    LoanRequest {
        reader,
        librarian: librarian(900),
        items,
        borrow_date: today(),
        desired_return_date: None,
    }
}

pub(super) fn record(
    id: u64,
    reader: Account,
    items: Vec<BorrowedItem>,
    borrow_date: NaiveDate,
) -> BorrowRecord {
    let original_return_date = borrow_date + Duration::days(14);
    BorrowRecord {
        id: RecordId(id),
        reader,
        librarian: librarian(900),
        items,
        borrow_date,
        original_return_date,
        actual_return_date: original_return_date,
        status: BorrowStatus::Borrowed,
    }
}

/// A past record holding `count` single-domain editions, dated `days_back`
/// days before the fixed test day.
pub(super) fn bulk_record(id: u64, reader: Account, count: u32, days_back: i64) -> BorrowRecord {
    let items = (0..count)
        .map(|offset| item(1000 + id as u32 * 100 + offset, 2000 + offset, &[40 + offset]))
        .collect();
    record(id, reader, items, days_ago(days_back))
}

#[derive(Default)]
pub(super) struct MemoryRecordStore {
    records: Mutex<HashMap<RecordId, BorrowRecord>>,
}

impl MemoryRecordStore {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("record mutex poisoned").len()
    }
}

impl BorrowRecordStore for MemoryRecordStore {
    fn insert(&self, record: BorrowRecord) -> Result<BorrowRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("record mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, record: BorrowRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("record mutex poisoned");
        guard.insert(record.id, record);
        Ok(())
    }

    fn fetch(&self, id: RecordId) -> Result<Option<BorrowRecord>, RepositoryError> {
        let guard = self.records.lock().expect("record mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn by_reader(&self, reader: AccountId) -> Result<Vec<BorrowRecord>, RepositoryError> {
        let guard = self.records.lock().expect("record mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.reader.id == reader)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryEditionStore {
    editions: Mutex<HashMap<EditionId, Edition>>,
}

impl MemoryEditionStore {
    pub(super) fn seed(&self, edition: Edition) {
        self.editions
            .lock()
            .expect("edition mutex poisoned")
            .insert(edition.id, edition);
    }

    pub(super) fn copies_for_borrowing(&self, id: EditionId) -> u32 {
        self.editions
            .lock()
            .expect("edition mutex poisoned")
            .get(&id)
            .expect("edition seeded")
            .copies_for_borrowing
    }
}

impl EditionStore for MemoryEditionStore {
    fn fetch(&self, id: EditionId) -> Result<Option<Edition>, RepositoryError> {
        let guard = self.editions.lock().expect("edition mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn update(&self, edition: Edition) -> Result<(), RepositoryError> {
        let mut guard = self.editions.lock().expect("edition mutex poisoned");
        guard.insert(edition.id, edition);
        Ok(())
    }
}

/// Edition store that refuses updates for one edition, for rollback tests.
pub(super) struct JammedEditionStore {
    pub(super) inner: MemoryEditionStore,
    pub(super) jammed: EditionId,
}

impl EditionStore for JammedEditionStore {
    fn fetch(&self, id: EditionId) -> Result<Option<Edition>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn update(&self, edition: Edition) -> Result<(), RepositoryError> {
        if edition.id == self.jammed {
            return Err(RepositoryError::Unavailable("shelf jammed".to_string()));
        }
        self.inner.update(edition)
    }
}

/// Record store that refuses inserts, for checkout rollback tests.
#[derive(Default)]
pub(super) struct ConflictRecordStore;

impl BorrowRecordStore for ConflictRecordStore {
    fn insert(&self, _record: BorrowRecord) -> Result<BorrowRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: BorrowRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: RecordId) -> Result<Option<BorrowRecord>, RepositoryError> {
        Ok(None)
    }

    fn by_reader(&self, _reader: AccountId) -> Result<Vec<BorrowRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub(super) struct MemoryObserver {
    events: Mutex<Vec<LoanAuditEvent>>,
}

impl MemoryObserver {
    pub(super) fn events(&self) -> Vec<LoanAuditEvent> {
        self.events.lock().expect("observer mutex poisoned").clone()
    }
}

impl DecisionObserver for MemoryObserver {
    fn publish(&self, event: LoanAuditEvent) -> Result<(), ObserverError> {
        self.events
            .lock()
            .expect("observer mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) fn build_service() -> (
    CirculationService<MemoryRecordStore, MemoryEditionStore, MemoryObserver>,
    Arc<MemoryRecordStore>,
    Arc<MemoryEditionStore>,
    Arc<MemoryObserver>,
) {
    let records = Arc::new(MemoryRecordStore::default());
    let editions = Arc::new(MemoryEditionStore::default());
    let observer = Arc::new(MemoryObserver::default());
    let service = CirculationService::new(
        records.clone(),
        editions.clone(),
        observer.clone(),
        policy(),
    );
    (service, records, editions, observer)
}
