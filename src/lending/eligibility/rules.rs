use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::catalog::domain::{BookId, DomainId};
use crate::lending::domain::{BorrowRecord, BorrowedItem};

/// Total editions taken in records dated `cutoff` or later.
pub(crate) fn editions_borrowed_since(history: &[BorrowRecord], cutoff: NaiveDate) -> i32 {
    history
        .iter()
        .filter(|record| record.borrow_date >= cutoff)
        .map(|record| record.items.len() as i32)
        .sum()
}

/// Distinct domain tags across the requested titles.
pub(crate) fn distinct_domains(items: &[BorrowedItem]) -> usize {
    let mut domains = BTreeSet::new();
    for item in items {
        domains.extend(item.book.domains.iter().copied());
    }
    domains.len()
}

/// Domain occurrence counts over the windowed history, with the candidate
/// request counted as if it had already been added.
pub(crate) fn domain_occurrences(
    history: &[BorrowRecord],
    cutoff: NaiveDate,
    candidate: &[BorrowedItem],
) -> BTreeMap<DomainId, i32> {
    let mut occurrences = BTreeMap::new();
    let windowed = history
        .iter()
        .filter(|record| record.borrow_date >= cutoff)
        .flat_map(|record| record.items.iter());

    for item in windowed.chain(candidate.iter()) {
        for &domain in &item.book.domains {
            *occurrences.entry(domain).or_insert(0) += 1;
        }
    }
    occurrences
}

/// First requested book that also appears in a record dated `cutoff` or
/// later. Book identity is matched through the editions on each record.
pub(crate) fn repeated_book(
    history: &[BorrowRecord],
    cutoff: NaiveDate,
    candidate: &[BorrowedItem],
) -> Option<BookId> {
    let requested: BTreeSet<BookId> = candidate.iter().map(|item| item.book.id).collect();

    history
        .iter()
        .filter(|record| record.borrow_date >= cutoff)
        .flat_map(|record| record.items.iter())
        .map(|item| item.book.id)
        .find(|book| requested.contains(book))
}

/// Number of checkouts (records, not editions) dated `day` or later.
pub(crate) fn checkouts_on_or_after(history: &[BorrowRecord], day: NaiveDate) -> i32 {
    history
        .iter()
        .filter(|record| record.borrow_date >= day)
        .count() as i32
}
