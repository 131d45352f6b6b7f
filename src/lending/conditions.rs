//! Named integer policy parameters, seeded by administrators and read by the
//! lending rules. Lookups of unseeded names are an explicit error rather than
//! a silent default, so a misconfigured deployment fails loudly instead of
//! quietly deciding loans with zeroed thresholds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The condition names the lending rules consume.
pub mod names {
    pub const NMC: &str = "NMC";
    pub const PER: &str = "PER";
    pub const C: &str = "C";
    pub const D: &str = "D";
    pub const L: &str = "L";
    pub const LIM: &str = "LIM";
    pub const DELTA: &str = "DELTA";
    pub const NCZ: &str = "NCZ";
    pub const PERSIMP: &str = "PERSIMP";
    pub const TIMPIMP: &str = "TIMPIMP";
    pub const DOMENII: &str = "DOMENII";

    /// Every name that must be seeded before the engine is built.
    pub const REQUIRED: [&str; 11] = [
        NMC, PER, C, D, L, LIM, DELTA, NCZ, PERSIMP, TIMPIMP, DOMENII,
    ];
}

/// A named tunable with its administrator-facing description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    pub description: String,
    pub value: i32,
}

impl Condition {
    pub fn new(name: &str, description: &str, value: i32) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            value,
        }
    }
}

/// Error raised when a registry is seeded with conflicting data.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("condition {0} is already registered")]
    DuplicateName(String),
}

/// A required condition name that was never seeded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("condition {name} has not been seeded")]
pub struct MissingCondition {
    pub name: String,
}

/// Read-only lookup of conditions by unique name.
#[derive(Debug, Clone, Default)]
pub struct ConditionRegistry {
    conditions: BTreeMap<String, Condition>,
}

impl ConditionRegistry {
    pub fn from_conditions(
        conditions: impl IntoIterator<Item = Condition>,
    ) -> Result<Self, RegistryError> {
        let mut registry = BTreeMap::new();
        for condition in conditions {
            if registry.contains_key(&condition.name) {
                return Err(RegistryError::DuplicateName(condition.name));
            }
            registry.insert(condition.name.clone(), condition);
        }
        Ok(Self {
            conditions: registry,
        })
    }

    pub fn get(&self, name: &str) -> Result<&Condition, MissingCondition> {
        self.conditions.get(name).ok_or_else(|| MissingCondition {
            name: name.to_string(),
        })
    }

    pub fn value(&self, name: &str) -> Result<i32, MissingCondition> {
        self.get(name).map(|condition| condition.value)
    }

    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.values()
    }
}
