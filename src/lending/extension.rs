use chrono::{Months, NaiveDate};

use super::domain::BorrowRecord;
use super::eligibility::{LendingPolicy, LoanDecision, RejectionReason};

/// Window over which granted extension days accumulate against the budget.
const EXTENSION_WINDOW_MONTHS: u32 = 3;

/// Validates a proposed change to a loan's return date against the reader's
/// rolling extension budget. No stock effects.
pub struct ExtensionPolicy {
    policy: LendingPolicy,
}

impl ExtensionPolicy {
    pub fn new(policy: LendingPolicy) -> Self {
        Self { policy }
    }

    /// Sums extension days over the reader's records from the window,
    /// counting the record being updated at its proposed dates (its stored
    /// version is excluded by id so it is not double-counted).
    pub fn authorize(
        &self,
        updated: &BorrowRecord,
        history: &[BorrowRecord],
        today: NaiveDate,
    ) -> LoanDecision {
        let budget = self
            .policy
            .scaled_for(updated.reader.account_type)
            .extension_budget_days;

        let window_start = today - Months::new(EXTENSION_WINDOW_MONTHS);
        let extension_days: i64 = history
            .iter()
            .filter(|record| record.id != updated.id && record.borrow_date >= window_start)
            .chain(std::iter::once(updated))
            .map(BorrowRecord::extension_days)
            .sum();

        if extension_days > i64::from(budget) {
            return LoanDecision::Rejected(RejectionReason::ExtensionBudgetExceeded {
                extension_days,
                budget,
            });
        }
        LoanDecision::Approved
    }
}
