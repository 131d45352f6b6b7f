use std::env;
use std::fmt;

use crate::lending::conditions::Condition;

/// Distinguishes runtime behavior for different stages of an embedding
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for an embedding application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub conditions: Vec<Condition>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("CIRC_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("CIRC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            conditions: seeded_conditions()?,
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// The standing library policies with their stock values. Every name the
/// lending rules consume is present, so a registry seeded from this set never
/// reports a missing condition.
pub fn default_conditions() -> Vec<Condition> {
    vec![
        Condition::new(
            "NMC",
            "A reader may take at most [NMC] editions within a window of PER days.",
            9,
        ),
        Condition::new("PER", "Rolling window, in days, for the NMC cap.", 30),
        Condition::new("C", "A single checkout may carry at most [C] editions.", 3),
        Condition::new(
            "D",
            "A reader may take at most [D] books from one domain within L months.",
            9,
        ),
        Condition::new("L", "Rolling window, in months, for the D cap.", 2),
        Condition::new(
            "LIM",
            "Extensions granted over the last three months may not exceed [LIM] days.",
            28,
        ),
        Condition::new(
            "DELTA",
            "A reader may not borrow the same book again within [DELTA] days.",
            60,
        ),
        Condition::new("NCZ", "A reader may check out at most [NCZ] times per day.", 5),
        Condition::new(
            "PERSIMP",
            "Library staff may issue at most [PERSIMP] checkouts per day.",
            50,
        ),
        Condition::new("TIMPIMP", "Default loan period, in days.", 14),
        Condition::new(
            "DOMENII",
            "A book may be tagged with at most [DOMENII] domains.",
            5,
        ),
    ]
}

/// Default conditions with per-name overrides taken from `CIRC_POLICY_<NAME>`
/// environment variables.
fn seeded_conditions() -> Result<Vec<Condition>, ConfigError> {
    default_conditions()
        .into_iter()
        .map(|condition| {
            let key = format!("CIRC_POLICY_{}", condition.name);
            match env::var(&key) {
                Ok(raw) => {
                    let value = raw.trim().parse::<i32>().map_err(|source| {
                        ConfigError::InvalidPolicyValue {
                            name: condition.name.clone(),
                            source,
                        }
                    })?;
                    Ok(Condition { value, ..condition })
                }
                Err(_) => Ok(condition),
            }
        })
        .collect()
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPolicyValue {
        name: String,
        source: std::num::ParseIntError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPolicyValue { name, .. } => {
                write!(f, "CIRC_POLICY_{} must be a valid integer", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPolicyValue { source, .. } => Some(source),
        }
    }
}
