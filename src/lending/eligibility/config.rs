use serde::{Deserialize, Serialize};

use crate::lending::conditions::{names, ConditionRegistry, MissingCondition};
use crate::lending::domain::AccountType;

/// Immutable snapshot of every policy value the lending rules consume, taken
/// once from the registry so evaluation never reads a half-updated policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingPolicy {
    pub max_editions_per_period: i32,
    pub period_days: i32,
    pub per_checkout_cap: i32,
    pub domain_borrow_cap: i32,
    pub domain_window_months: i32,
    pub extension_budget_days: i32,
    pub repeat_window_days: i32,
    pub daily_reader_cap: i32,
    pub daily_issuance_cap: i32,
    pub loan_period_days: i32,
    pub max_domains_per_book: i32,
}

impl LendingPolicy {
    /// Resolves every required condition name; a missing name fails the whole
    /// snapshot rather than defaulting.
    pub fn from_registry(registry: &ConditionRegistry) -> Result<Self, MissingCondition> {
        Ok(Self {
            max_editions_per_period: registry.value(names::NMC)?,
            period_days: registry.value(names::PER)?,
            per_checkout_cap: registry.value(names::C)?,
            domain_borrow_cap: registry.value(names::D)?,
            domain_window_months: registry.value(names::L)?,
            extension_budget_days: registry.value(names::LIM)?,
            repeat_window_days: registry.value(names::DELTA)?,
            daily_reader_cap: registry.value(names::NCZ)?,
            daily_issuance_cap: registry.value(names::PERSIMP)?,
            loan_period_days: registry.value(names::TIMPIMP)?,
            max_domains_per_book: registry.value(names::DOMENII)?,
        })
    }

    /// Role-adjusted limits, computed once per request. A dual-role account
    /// gets its quotas doubled over halved windows; everyone else keeps the
    /// policy as written. The daily caps are never scaled.
    pub fn scaled_for(&self, account_type: AccountType) -> ScaledLimits {
        match account_type {
            AccountType::LibrarianReader => ScaledLimits {
                max_editions_per_period: self.max_editions_per_period * 2,
                per_checkout_cap: self.per_checkout_cap * 2,
                domain_borrow_cap: self.domain_borrow_cap * 2,
                extension_budget_days: self.extension_budget_days * 2,
                period_days: self.period_days / 2,
                repeat_window_days: self.repeat_window_days / 2,
            },
            AccountType::Reader | AccountType::Librarian => ScaledLimits {
                max_editions_per_period: self.max_editions_per_period,
                per_checkout_cap: self.per_checkout_cap,
                domain_borrow_cap: self.domain_borrow_cap,
                extension_budget_days: self.extension_budget_days,
                period_days: self.period_days,
                repeat_window_days: self.repeat_window_days,
            },
        }
    }
}

/// The subset of limits that vary with the account's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledLimits {
    pub max_editions_per_period: i32,
    pub period_days: i32,
    pub per_checkout_cap: i32,
    pub domain_borrow_cap: i32,
    pub extension_budget_days: i32,
    pub repeat_window_days: i32,
}
