use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::domain::{BookId, DomainId, EditionId};

/// Outcome of an eligibility evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoanDecision {
    Approved,
    Rejected(RejectionReason),
}

impl LoanDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, LoanDecision::Approved)
    }

    pub fn summary(&self) -> String {
        match self {
            LoanDecision::Approved => "loan approved".to_string(),
            LoanDecision::Rejected(reason) => reason.to_string(),
        }
    }
}

/// Enumerates the policy grounds on which a checkout or extension is refused.
/// Each carries the figures behind the refusal so audit sinks can report them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectionReason {
    OutOfStock {
        edition: EditionId,
    },
    LowStockReserve {
        edition: EditionId,
    },
    FrequencyCapExceeded {
        borrowed: i32,
        requested: i32,
        cap: i32,
    },
    TransactionCapExceeded {
        requested: i32,
        cap: i32,
    },
    InsufficientDomainDiversity {
        distinct: usize,
    },
    DomainFrequencyCapExceeded {
        domain: DomainId,
        count: i32,
        cap: i32,
    },
    RepeatBookCooldown {
        book: BookId,
    },
    DailyReaderCapExceeded {
        cap: i32,
    },
    DailyIssuanceCapExceeded {
        cap: i32,
    },
    ExtensionBudgetExceeded {
        extension_days: i64,
        budget: i32,
    },
}

impl RejectionReason {
    /// Stable machine-readable code for structured logging and audit events.
    pub const fn code(&self) -> &'static str {
        match self {
            RejectionReason::OutOfStock { .. } => "out_of_stock",
            RejectionReason::LowStockReserve { .. } => "low_stock_reserve",
            RejectionReason::FrequencyCapExceeded { .. } => "frequency_cap_exceeded",
            RejectionReason::TransactionCapExceeded { .. } => "transaction_cap_exceeded",
            RejectionReason::InsufficientDomainDiversity { .. } => "insufficient_domain_diversity",
            RejectionReason::DomainFrequencyCapExceeded { .. } => "domain_frequency_cap_exceeded",
            RejectionReason::RepeatBookCooldown { .. } => "repeat_book_cooldown",
            RejectionReason::DailyReaderCapExceeded { .. } => "daily_reader_cap_exceeded",
            RejectionReason::DailyIssuanceCapExceeded { .. } => "daily_issuance_cap_exceeded",
            RejectionReason::ExtensionBudgetExceeded { .. } => "extension_budget_exceeded",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::OutOfStock { edition } => {
                write!(f, "edition {:?} has no borrowable copies left", edition)
            }
            RejectionReason::LowStockReserve { edition } => {
                write!(f, "edition {:?} is at its reading-room reserve floor", edition)
            }
            RejectionReason::FrequencyCapExceeded {
                borrowed,
                requested,
                cap,
            } => write!(
                f,
                "{} editions already borrowed this period, {} more would exceed the cap of {}",
                borrowed, requested, cap
            ),
            RejectionReason::TransactionCapExceeded { requested, cap } => {
                write!(f, "{} editions in one checkout, at most {} allowed", requested, cap)
            }
            RejectionReason::InsufficientDomainDiversity { distinct } => write!(
                f,
                "a bulk checkout must span at least 2 distinct domains, found {}",
                distinct
            ),
            RejectionReason::DomainFrequencyCapExceeded { domain, count, cap } => write!(
                f,
                "domain {:?} borrowed {} times this window, at most {} allowed",
                domain, count, cap
            ),
            RejectionReason::RepeatBookCooldown { book } => {
                write!(f, "book {:?} was already borrowed within the cooldown window", book)
            }
            RejectionReason::DailyReaderCapExceeded { cap } => {
                write!(f, "reader reached the daily checkout cap of {}", cap)
            }
            RejectionReason::DailyIssuanceCapExceeded { cap } => {
                write!(f, "staff reached the daily issuance cap of {}", cap)
            }
            RejectionReason::ExtensionBudgetExceeded {
                extension_days,
                budget,
            } => write!(
                f,
                "{} extension days over the last three months, at most {} allowed",
                extension_days, budget
            ),
        }
    }
}
