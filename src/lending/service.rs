use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use crate::catalog::domain::EditionId;

use super::domain::{
    AccountId, BorrowRecord, BorrowStatus, LoanRequest, RecordId, ValidationError,
};
use super::eligibility::{EligibilityEngine, LendingPolicy, LoanDecision, RejectionReason};
use super::extension::ExtensionPolicy;
use super::inventory::{InventoryLedger, LedgerError};
use super::repository::{
    BorrowRecordStore, DecisionObserver, EditionStore, LoanAuditEvent, ObserverError,
    RepositoryError,
};

/// Bounded retries for transient stock-update conflicts before the failure is
/// surfaced to the caller.
const STOCK_CONFLICT_RETRIES: usize = 3;

static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_record_id() -> RecordId {
    RecordId(RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Service composing the eligibility engine, the extension budget, and the
/// inventory ledger over pluggable stores. Checkouts for one reader are
/// serialized so two racing requests cannot both slip under a quota.
pub struct CirculationService<R, E, O> {
    records: Arc<R>,
    ledger: InventoryLedger<E>,
    observer: Arc<O>,
    engine: EligibilityEngine,
    extensions: ExtensionPolicy,
    reader_locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl<R, E, O> CirculationService<R, E, O>
where
    R: BorrowRecordStore + 'static,
    E: EditionStore + 'static,
    O: DecisionObserver + 'static,
{
    pub fn new(records: Arc<R>, editions: Arc<E>, observer: Arc<O>, policy: LendingPolicy) -> Self {
        Self {
            records,
            ledger: InventoryLedger::new(editions),
            observer,
            engine: EligibilityEngine::new(policy.clone()),
            extensions: ExtensionPolicy::new(policy),
            reader_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &LendingPolicy {
        self.engine.policy()
    }

    fn reader_lock(&self, reader: AccountId) -> Result<Arc<Mutex<()>>, CirculationError> {
        let mut locks = self
            .reader_locks
            .lock()
            .map_err(|_| RepositoryError::Unavailable("reader lock table poisoned".to_string()))?;
        Ok(Arc::clone(locks.entry(reader).or_default()))
    }

    /// Run a checkout end to end: validate, evaluate against the reader's
    /// history, move stock, persist the record.
    pub fn checkout(
        &self,
        request: LoanRequest,
        today: NaiveDate,
    ) -> Result<BorrowRecord, CirculationError> {
        request.validate()?;

        let slot = self.reader_lock(request.reader.id)?;
        let _guard = slot
            .lock()
            .map_err(|_| RepositoryError::Unavailable("reader lock poisoned".to_string()))?;

        let history = self.records.by_reader(request.reader.id)?;
        match self.engine.evaluate(&request, &history, today) {
            LoanDecision::Rejected(reason) => {
                warn!(
                    reader = request.reader.id.0,
                    code = reason.code(),
                    "checkout rejected: {reason}"
                );
                self.observer.publish(LoanAuditEvent::CheckoutRejected {
                    reader: request.reader.id,
                    reason: reason.clone(),
                })?;
                Err(CirculationError::Rejected(reason))
            }
            LoanDecision::Approved => self.finalize_checkout(request, today),
        }
    }

    /// Stock moves first, the record is persisted second; any failure on the
    /// way restores every copy already taken so the two stay in step.
    fn finalize_checkout(
        &self,
        request: LoanRequest,
        today: NaiveDate,
    ) -> Result<BorrowRecord, CirculationError> {
        let mut taken: Vec<EditionId> = Vec::new();
        for item in &request.items {
            match self.checkout_with_retry(item.edition.id) {
                Ok(()) => taken.push(item.edition.id),
                Err(error) => {
                    self.restore_copies(&taken);
                    return Err(self.reject_from_ledger(&request, error));
                }
            }
        }

        let original_return_date = request
            .desired_return_date
            .unwrap_or_else(|| today + Duration::days(i64::from(self.policy().loan_period_days)));
        let record = BorrowRecord {
            id: next_record_id(),
            reader: request.reader,
            librarian: request.librarian,
            items: request.items,
            borrow_date: request.borrow_date,
            original_return_date,
            actual_return_date: original_return_date,
            status: BorrowStatus::Borrowed,
        };

        match self.records.insert(record) {
            Ok(stored) => {
                info!(
                    reader = stored.reader.id.0,
                    record = stored.id.0,
                    editions = stored.items.len(),
                    "checkout approved"
                );
                self.observer.publish(LoanAuditEvent::CheckoutApproved {
                    record: stored.id,
                    reader: stored.reader.id,
                    editions: stored.items.iter().map(|item| item.edition.id).collect(),
                })?;
                Ok(stored)
            }
            Err(error) => {
                self.restore_copies(&taken);
                Err(error.into())
            }
        }
    }

    /// Ledger rejections found after the pipeline (another checkout won the
    /// race) are reported with the same reasons the pipeline uses.
    fn reject_from_ledger(&self, request: &LoanRequest, error: LedgerError) -> CirculationError {
        let reason = match error {
            LedgerError::OutOfStock(edition) => RejectionReason::OutOfStock { edition },
            LedgerError::ReserveFloor(edition) => RejectionReason::LowStockReserve { edition },
            other => return other.into(),
        };
        warn!(
            reader = request.reader.id.0,
            code = reason.code(),
            "checkout rejected at the shelf: {reason}"
        );
        if let Err(error) = self.observer.publish(LoanAuditEvent::CheckoutRejected {
            reader: request.reader.id,
            reason: reason.clone(),
        }) {
            return error.into();
        }
        CirculationError::Rejected(reason)
    }

    fn checkout_with_retry(&self, id: EditionId) -> Result<(), LedgerError> {
        let mut attempt = 0;
        loop {
            match self.ledger.checkout_copy(id) {
                Err(LedgerError::Conflict(_)) if attempt < STOCK_CONFLICT_RETRIES => {
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Best-effort rollback of copies taken by a failed checkout.
    fn restore_copies(&self, taken: &[EditionId]) {
        for &id in taken {
            if let Err(error) = self.ledger.return_copy(id) {
                warn!(edition = id.0, "failed to restore copy after rollback: {error}");
            }
        }
    }

    /// Apply a return-date change, holding it to the rolling extension
    /// budget. The record keeps its items and stock untouched.
    pub fn extend(
        &self,
        updated: BorrowRecord,
        today: NaiveDate,
    ) -> Result<BorrowRecord, CirculationError> {
        updated.validate()?;

        let slot = self.reader_lock(updated.reader.id)?;
        let _guard = slot
            .lock()
            .map_err(|_| RepositoryError::Unavailable("reader lock poisoned".to_string()))?;

        if self.records.fetch(updated.id)?.is_none() {
            return Err(RepositoryError::NotFound.into());
        }

        let history = self.records.by_reader(updated.reader.id)?;
        match self.extensions.authorize(&updated, &history, today) {
            LoanDecision::Rejected(reason) => {
                warn!(
                    reader = updated.reader.id.0,
                    record = updated.id.0,
                    code = reason.code(),
                    "extension rejected: {reason}"
                );
                self.observer.publish(LoanAuditEvent::ExtensionRejected {
                    record: updated.id,
                    reader: updated.reader.id,
                    reason: reason.clone(),
                })?;
                Err(CirculationError::Rejected(reason))
            }
            LoanDecision::Approved => {
                let mut record = updated;
                record.status = BorrowStatus::Extended;
                self.records.update(record.clone())?;
                info!(
                    reader = record.reader.id.0,
                    record = record.id.0,
                    "extension approved"
                );
                self.observer.publish(LoanAuditEvent::ExtensionApproved {
                    record: record.id,
                    reader: record.reader.id,
                })?;
                Ok(record)
            }
        }
    }

    /// Close a loan and put its copies back on the shelf. Stock moves first
    /// and is re-taken if persisting the closed record fails.
    pub fn return_loan(
        &self,
        record_id: RecordId,
        returned_on: NaiveDate,
    ) -> Result<BorrowRecord, CirculationError> {
        let mut record = self
            .records
            .fetch(record_id)?
            .ok_or(RepositoryError::NotFound)?;

        let slot = self.reader_lock(record.reader.id)?;
        let _guard = slot
            .lock()
            .map_err(|_| RepositoryError::Unavailable("reader lock poisoned".to_string()))?;

        let mut restored: Vec<EditionId> = Vec::new();
        for item in &record.items {
            match self.ledger.return_copy(item.edition.id) {
                Ok(()) => restored.push(item.edition.id),
                Err(error) => {
                    self.retake_copies(&restored);
                    return Err(error.into());
                }
            }
        }

        record.status = BorrowStatus::Returned;
        // Dates on a record never decrease; an early return keeps the agreed
        // return date as the actual one.
        record.actual_return_date = returned_on.max(record.original_return_date);

        if let Err(error) = self.records.update(record.clone()) {
            self.retake_copies(&restored);
            return Err(error.into());
        }

        info!(
            reader = record.reader.id.0,
            record = record.id.0,
            "loan returned"
        );
        self.observer.publish(LoanAuditEvent::LoanReturned {
            record: record.id,
            reader: record.reader.id,
        })?;
        Ok(record)
    }

    /// Best-effort re-take of copies restored by a failed return.
    fn retake_copies(&self, restored: &[EditionId]) {
        for &id in restored {
            if let Err(error) = self.ledger.checkout_copy(id) {
                warn!(edition = id.0, "failed to re-take copy after rollback: {error}");
            }
        }
    }

    /// Pass-through history query.
    pub fn history(&self, reader: AccountId) -> Result<Vec<BorrowRecord>, CirculationError> {
        Ok(self.records.by_reader(reader)?)
    }
}

/// Error raised by the circulation service.
#[derive(Debug, thiserror::Error)]
pub enum CirculationError {
    #[error("loan refused: {0}")]
    Rejected(RejectionReason),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Observer(#[from] ObserverError),
}
