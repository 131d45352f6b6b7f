//! Lending workflow: the borrowing eligibility pipeline, the extension
//! budget, the inventory ledger, and the circulation service facade that
//! composes them over pluggable stores.

pub mod conditions;
pub mod domain;
pub mod eligibility;
pub mod extension;
pub mod inventory;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use conditions::{Condition, ConditionRegistry, MissingCondition, RegistryError};
pub use domain::{
    Account, AccountId, AccountType, BorrowRecord, BorrowStatus, BorrowedItem, LoanRequest,
    RecordId, ValidationError,
};
pub use eligibility::{
    EligibilityEngine, LendingPolicy, LoanDecision, RejectionReason, ScaledLimits,
};
pub use extension::ExtensionPolicy;
pub use inventory::{InventoryLedger, LedgerError};
pub use repository::{
    load_hierarchy, BorrowRecordStore, DecisionObserver, DomainStore, EditionStore,
    HierarchyLoadError, LoanAuditEvent, ObserverError, RepositoryError, TracingObserver,
};
pub use service::{CirculationError, CirculationService};
