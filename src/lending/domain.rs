use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::domain::{Book, BookId, Edition, EditionId};

/// Identifier wrapper for accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u32);

/// Identifier wrapper for borrow records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

/// Role attached to a library account. `LibrarianReader` holds both roles and
/// receives widened quotas over tightened windows in the eligibility rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Reader,
    Librarian,
    LibrarianReader,
}

impl AccountType {
    pub const fn label(self) -> &'static str {
        match self {
            AccountType::Reader => "reader",
            AccountType::Librarian => "librarian",
            AccountType::LibrarianReader => "librarian_reader",
        }
    }
}

/// A library account, reader or staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub account_type: AccountType,
}

/// Lifecycle of a borrow record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorrowStatus {
    Borrowed,
    Extended,
    Returned,
}

impl BorrowStatus {
    pub const fn label(self) -> &'static str {
        match self {
            BorrowStatus::Borrowed => "borrowed",
            BorrowStatus::Extended => "extended",
            BorrowStatus::Returned => "returned",
        }
    }
}

/// One edition leaving the shelf, snapshotted together with the catalog title
/// whose domain tags the lending rules aggregate over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowedItem {
    pub edition: Edition,
    pub book: Book,
}

/// A loan of one or more editions to a reader. Dates never decrease as the
/// loan moves from checkout through extension to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRecord {
    pub id: RecordId,
    pub reader: Account,
    pub librarian: Account,
    pub items: Vec<BorrowedItem>,
    pub borrow_date: NaiveDate,
    pub original_return_date: NaiveDate,
    pub actual_return_date: NaiveDate,
    pub status: BorrowStatus,
}

impl BorrowRecord {
    /// Structural checks: at least one edition, consistent item pairing, and
    /// chronological dates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_items(&self.items)?;
        if self.original_return_date < self.borrow_date {
            return Err(ValidationError::NonChronologicalDates {
                earlier: self.borrow_date,
                later: self.original_return_date,
            });
        }
        if self.actual_return_date < self.original_return_date {
            return Err(ValidationError::NonChronologicalDates {
                earlier: self.original_return_date,
                later: self.actual_return_date,
            });
        }
        Ok(())
    }

    /// Days of extension granted beyond the originally agreed return date.
    pub fn extension_days(&self) -> i64 {
        (self.actual_return_date - self.original_return_date).num_days()
    }
}

/// A proposed loan, before any policy has looked at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub reader: Account,
    pub librarian: Account,
    pub items: Vec<BorrowedItem>,
    pub borrow_date: NaiveDate,
    pub desired_return_date: Option<NaiveDate>,
}

impl LoanRequest {
    /// Structural checks performed at the service boundary; the eligibility
    /// pipeline assumes they have passed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_items(&self.items)?;
        if let Some(requested) = self.desired_return_date {
            if requested < self.borrow_date {
                return Err(ValidationError::NonChronologicalDates {
                    earlier: self.borrow_date,
                    later: requested,
                });
            }
        }
        Ok(())
    }
}

fn validate_items(items: &[BorrowedItem]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::NoEditions);
    }
    for item in items {
        if item.edition.book_id != item.book.id {
            return Err(ValidationError::ForeignEdition {
                edition: item.edition.id,
                book: item.book.id,
            });
        }
    }
    Ok(())
}

/// Malformed input caught at the boundary, before the policy pipeline runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a loan needs at least one edition")]
    NoEditions,
    #[error("edition {edition:?} is not an edition of book {book:?}")]
    ForeignEdition { edition: EditionId, book: BookId },
    #[error("date {later} precedes {earlier}")]
    NonChronologicalDates {
        earlier: NaiveDate,
        later: NaiveDate,
    },
}
