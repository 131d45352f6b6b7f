use std::sync::Arc;
use std::thread;

use super::common::*;
use crate::catalog::domain::EditionId;
use crate::lending::inventory::{InventoryLedger, LedgerError};

fn ledger_with(editions: Vec<crate::catalog::domain::Edition>) -> InventoryLedger<MemoryEditionStore> {
    let store = MemoryEditionStore::default();
    for edition in editions {
        store.seed(edition);
    }
    InventoryLedger::new(Arc::new(store))
}

#[test]
fn checkout_takes_one_copy_at_a_time() {
    let store = Arc::new(MemoryEditionStore::default());
    store.seed(edition(1, 1, 2, 8));
    let ledger = InventoryLedger::new(store.clone());

    ledger.checkout_copy(EditionId(1)).expect("two copies left");
    assert_eq!(store.copies_for_borrowing(EditionId(1)), 1);

    ledger.checkout_copy(EditionId(1)).expect("last copy at the floor");
    assert_eq!(store.copies_for_borrowing(EditionId(1)), 0);

    assert!(matches!(
        ledger.checkout_copy(EditionId(1)),
        Err(LedgerError::OutOfStock(EditionId(1)))
    ));
}

#[test]
fn a_copy_below_the_reserve_floor_stays_on_the_shelf() {
    let ledger = ledger_with(vec![edition(1, 1, 1, 19)]);
    assert!(matches!(
        ledger.checkout_copy(EditionId(1)),
        Err(LedgerError::ReserveFloor(EditionId(1)))
    ));
}

#[test]
fn unknown_editions_are_reported_as_such() {
    let ledger = ledger_with(Vec::new());
    assert!(matches!(
        ledger.checkout_copy(EditionId(9)),
        Err(LedgerError::UnknownEdition(EditionId(9)))
    ));
}

#[test]
fn returning_a_copy_puts_it_back() {
    let store = Arc::new(MemoryEditionStore::default());
    store.seed(edition(1, 1, 2, 8));
    let ledger = InventoryLedger::new(store.clone());

    ledger.checkout_copy(EditionId(1)).expect("copy available");
    ledger.return_copy(EditionId(1)).expect("one copy is out");
    assert_eq!(store.copies_for_borrowing(EditionId(1)), 2);
}

#[test]
fn a_full_shelf_accepts_no_returns() {
    let ledger = ledger_with(vec![edition(1, 1, 3, 7)]);
    assert!(matches!(
        ledger.return_copy(EditionId(1)),
        Err(LedgerError::FullStock(EditionId(1)))
    ));
}

#[test]
fn concurrent_checkouts_of_the_last_copy_admit_exactly_one() {
    let store = Arc::new(MemoryEditionStore::default());
    store.seed(edition(1, 1, 1, 0));
    let ledger = Arc::new(InventoryLedger::new(store.clone()));

    let outcomes: Vec<Result<(), LedgerError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                scope.spawn(move || ledger.checkout_copy(EditionId(1)))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("checkout thread panicked"))
            .collect()
    });

    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(outcomes
        .iter()
        .filter(|outcome| outcome.is_err())
        .all(|outcome| matches!(outcome, Err(LedgerError::OutOfStock(EditionId(1))))));
    assert_eq!(store.copies_for_borrowing(EditionId(1)), 0);
}
