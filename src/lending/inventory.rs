use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::catalog::domain::EditionId;

use super::eligibility::BORROW_RESERVE_FLOOR;
use super::repository::{EditionStore, RepositoryError};

/// Stock movement failures. `Conflict` is transient and may be retried;
/// everything else is a definitive answer for this checkout.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("edition {0:?} is not in the catalog")]
    UnknownEdition(EditionId),
    #[error("edition {0:?} has no borrowable copies left")]
    OutOfStock(EditionId),
    #[error("edition {0:?} is at its reading-room reserve floor")]
    ReserveFloor(EditionId),
    #[error("edition {0:?} already holds its full stock")]
    FullStock(EditionId),
    #[error("conflicting stock update for edition {0:?}")]
    Conflict(EditionId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Serializes stock movements per edition so two concurrent checkouts cannot
/// both pass the floor checks and then both take the last copy.
pub struct InventoryLedger<E> {
    editions: Arc<E>,
    locks: Mutex<HashMap<EditionId, Arc<Mutex<()>>>>,
}

impl<E: EditionStore> InventoryLedger<E> {
    pub fn new(editions: Arc<E>) -> Self {
        Self {
            editions,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, id: EditionId) -> Result<Arc<Mutex<()>>, LedgerError> {
        let mut locks = self.locks.lock().map_err(|_| LedgerError::Conflict(id))?;
        Ok(Arc::clone(locks.entry(id).or_default()))
    }

    /// Atomically re-validate the stock floor and take one borrowable copy.
    pub fn checkout_copy(&self, id: EditionId) -> Result<(), LedgerError> {
        let slot = self.lock_for(id)?;
        let _guard = slot.lock().map_err(|_| LedgerError::Conflict(id))?;

        let mut edition = self
            .editions
            .fetch(id)?
            .ok_or(LedgerError::UnknownEdition(id))?;
        if edition.copies_for_borrowing == 0 {
            return Err(LedgerError::OutOfStock(id));
        }
        let floor = BORROW_RESERVE_FLOOR * f64::from(edition.initial_stock());
        if f64::from(edition.copies_for_borrowing) < floor {
            return Err(LedgerError::ReserveFloor(id));
        }

        edition.copies_for_borrowing -= 1;
        self.editions.update(edition).map_err(|error| match error {
            RepositoryError::Conflict => LedgerError::Conflict(id),
            other => LedgerError::Repository(other),
        })
    }

    /// Put one borrowed copy back on the shelf. The total shelf count never
    /// exceeds the stock acquired at intake.
    pub fn return_copy(&self, id: EditionId) -> Result<(), LedgerError> {
        let slot = self.lock_for(id)?;
        let _guard = slot.lock().map_err(|_| LedgerError::Conflict(id))?;

        let mut edition = self
            .editions
            .fetch(id)?
            .ok_or(LedgerError::UnknownEdition(id))?;
        if edition.copies_for_borrowing + edition.copies_for_reading >= edition.initial_stock() {
            return Err(LedgerError::FullStock(id));
        }

        edition.copies_for_borrowing += 1;
        self.editions.update(edition).map_err(|error| match error {
            RepositoryError::Conflict => LedgerError::Conflict(id),
            other => LedgerError::Repository(other),
        })
    }
}
