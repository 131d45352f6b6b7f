//! The borrowing eligibility pipeline. Rules run in a fixed order and the
//! first failure decides the rejection reason, so identical requests always
//! produce identical diagnostics.

mod config;
mod policy;
mod rules;

pub use config::{LendingPolicy, ScaledLimits};
pub use policy::{LoanDecision, RejectionReason};

use chrono::{Duration, Months, NaiveDate};

use crate::lending::domain::{AccountType, BorrowRecord, LoanRequest};

/// Fraction of the initial stock that must stay available once borrowing has
/// eaten into it, protecting reading-room availability.
pub(crate) const BORROW_RESERVE_FLOOR: f64 = 0.10;

/// Bulk checkouts of this many editions or more must span distinct domains.
const DIVERSITY_THRESHOLD: usize = 3;

/// Stateless evaluator applying the lending policy to a checkout request.
/// Each call is a pure function of the request, the policy snapshot, and the
/// reader's history; `today` anchors every rolling window.
pub struct EligibilityEngine {
    policy: LendingPolicy,
}

impl EligibilityEngine {
    pub fn new(policy: LendingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &LendingPolicy {
        &self.policy
    }

    pub fn evaluate(
        &self,
        request: &LoanRequest,
        history: &[BorrowRecord],
        today: NaiveDate,
    ) -> LoanDecision {
        // Shelf stock, per edition. A copy count exactly at the reserve floor
        // still passes; only dropping below it blocks the loan.
        for item in &request.items {
            let edition = &item.edition;
            if edition.copies_for_borrowing == 0 {
                return LoanDecision::Rejected(RejectionReason::OutOfStock {
                    edition: edition.id,
                });
            }
            let floor = BORROW_RESERVE_FLOOR * f64::from(edition.initial_stock());
            if f64::from(edition.copies_for_borrowing) < floor {
                return LoanDecision::Rejected(RejectionReason::LowStockReserve {
                    edition: edition.id,
                });
            }
        }

        let limits = self.policy.scaled_for(request.reader.account_type);
        let requested = request.items.len() as i32;

        let period_start = today - Duration::days(i64::from(limits.period_days));
        let borrowed = rules::editions_borrowed_since(history, period_start);
        if borrowed + requested > limits.max_editions_per_period {
            return LoanDecision::Rejected(RejectionReason::FrequencyCapExceeded {
                borrowed,
                requested,
                cap: limits.max_editions_per_period,
            });
        }

        if requested > limits.per_checkout_cap {
            return LoanDecision::Rejected(RejectionReason::TransactionCapExceeded {
                requested,
                cap: limits.per_checkout_cap,
            });
        }

        if request.items.len() >= DIVERSITY_THRESHOLD {
            let distinct = rules::distinct_domains(&request.items);
            if distinct < 2 {
                return LoanDecision::Rejected(RejectionReason::InsufficientDomainDiversity {
                    distinct,
                });
            }
        }

        let window_months = u32::try_from(self.policy.domain_window_months.max(0)).unwrap_or(0);
        let window_start = today - Months::new(window_months);
        let occurrences = rules::domain_occurrences(history, window_start, &request.items);
        for (domain, count) in occurrences {
            if count > limits.domain_borrow_cap {
                return LoanDecision::Rejected(RejectionReason::DomainFrequencyCapExceeded {
                    domain,
                    count,
                    cap: limits.domain_borrow_cap,
                });
            }
        }

        let cooldown_start = today - Duration::days(i64::from(limits.repeat_window_days));
        if let Some(book) = rules::repeated_book(history, cooldown_start, &request.items) {
            return LoanDecision::Rejected(RejectionReason::RepeatBookCooldown { book });
        }

        if request.reader.account_type == AccountType::Reader {
            let checkouts_today = rules::checkouts_on_or_after(history, today) + 1;
            if checkouts_today > self.policy.daily_reader_cap {
                return LoanDecision::Rejected(RejectionReason::DailyReaderCapExceeded {
                    cap: self.policy.daily_reader_cap,
                });
            }

            // Gated on the reader account like the daily cap above, even
            // though it counts against the staff allowance.
            if checkouts_today > self.policy.daily_issuance_cap {
                return LoanDecision::Rejected(RejectionReason::DailyIssuanceCapExceeded {
                    cap: self.policy.daily_issuance_cap,
                });
            }
        }

        LoanDecision::Approved
    }
}
