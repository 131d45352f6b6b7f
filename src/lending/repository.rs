use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::domain::{Edition, EditionId, SubjectDomain};
use crate::catalog::hierarchy::{DomainHierarchy, HierarchyError};

use super::domain::{AccountId, BorrowRecord, RecordId};
use super::eligibility::RejectionReason;

/// Error enumeration for store failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction over borrow records. History is append/mutate-only;
/// the engine never deletes a record.
pub trait BorrowRecordStore: Send + Sync {
    fn insert(&self, record: BorrowRecord) -> Result<BorrowRecord, RepositoryError>;
    fn update(&self, record: BorrowRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: RecordId) -> Result<Option<BorrowRecord>, RepositoryError>;
    fn by_reader(&self, reader: AccountId) -> Result<Vec<BorrowRecord>, RepositoryError>;
}

/// Storage abstraction for edition stock updates.
pub trait EditionStore: Send + Sync {
    fn fetch(&self, id: EditionId) -> Result<Option<Edition>, RepositoryError>;
    fn update(&self, edition: Edition) -> Result<(), RepositoryError>;
}

/// Supplies the full subject forest for hierarchy resolution.
pub trait DomainStore: Send + Sync {
    fn all(&self) -> Result<Vec<SubjectDomain>, RepositoryError>;
}

/// Sink the circulation service reports structured decisions to, decoupling
/// the policy logic from any concrete logging or alerting backend.
pub trait DecisionObserver: Send + Sync {
    fn publish(&self, event: LoanAuditEvent) -> Result<(), ObserverError>;
}

/// Audit event emitted for every decision the service takes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoanAuditEvent {
    CheckoutApproved {
        record: RecordId,
        reader: AccountId,
        editions: Vec<EditionId>,
    },
    CheckoutRejected {
        reader: AccountId,
        reason: RejectionReason,
    },
    ExtensionApproved {
        record: RecordId,
        reader: AccountId,
    },
    ExtensionRejected {
        record: RecordId,
        reader: AccountId,
        reason: RejectionReason,
    },
    LoanReturned {
        record: RecordId,
        reader: AccountId,
    },
}

/// Audit dispatch error.
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("audit sink unavailable: {0}")]
    Transport(String),
}

/// Observer that writes every audit event to the tracing log as structured
/// JSON, for deployments without a dedicated audit backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DecisionObserver for TracingObserver {
    fn publish(&self, event: LoanAuditEvent) -> Result<(), ObserverError> {
        let payload = serde_json::to_string(&event)
            .map_err(|error| ObserverError::Transport(error.to_string()))?;
        tracing::info!(target: "circulation::audit", %payload, "loan audit event");
        Ok(())
    }
}

/// Snapshot the stored subject forest into a query-ready hierarchy.
pub fn load_hierarchy<D>(store: &D) -> Result<DomainHierarchy, HierarchyLoadError>
where
    D: DomainStore + ?Sized,
{
    Ok(DomainHierarchy::from_nodes(store.all()?)?)
}

/// Failure to snapshot the subject forest: either the store was unreachable
/// or the stored forest itself is malformed.
#[derive(Debug, Error)]
pub enum HierarchyLoadError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}
