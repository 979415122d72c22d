//! Bus configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use cp_registry::{BusConfigBuilder, LookupPolicy};
//!
//! let config = BusConfigBuilder::new()
//!     .invoke_timeout_ms(250)
//!     .lookup_policy(LookupPolicy::Isolated)
//!     .build()
//!     .expect("Valid config");
//! ```

use crate::DEFAULT_INVOKE_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Upper bound for a per-subscriber dispatch deadline.
pub const MAX_INVOKE_TIMEOUT_MS: u64 = 300_000;

/// Errors from configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusConfigError {
    #[error("Invalid invoke timeout: {timeout_ms}ms (must be between 1 and {max}ms)")]
    InvalidTimeout { timeout_ms: u64, max: u64 },

    #[error("Config parse error: {0}")]
    Parse(String),
}

/// How a container resolves capability lookups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// The first lookup on an empty container, whatever capability it names,
    /// creates the default registry; wildcard lookups always return it.
    #[default]
    Compatible,
    /// Every capability gets its own registry; the wildcard resolves to the
    /// `Dispatch` registry.
    Isolated,
}

/// Configuration shared by containers and broadcasters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Per-subscriber deadline used by deadline-bounded broadcasts.
    pub invoke_timeout_ms: u64,
    /// Capability lookup policy for containers.
    pub lookup_policy: LookupPolicy,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            invoke_timeout_ms: DEFAULT_INVOKE_TIMEOUT_MS,
            lookup_policy: LookupPolicy::Compatible,
        }
    }
}

impl BusConfig {
    /// Parse a JSON document and validate it. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, BusConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BusConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration bounds.
    pub fn validate(&self) -> Result<(), BusConfigError> {
        if self.invoke_timeout_ms == 0 || self.invoke_timeout_ms > MAX_INVOKE_TIMEOUT_MS {
            return Err(BusConfigError::InvalidTimeout {
                timeout_ms: self.invoke_timeout_ms,
                max: MAX_INVOKE_TIMEOUT_MS,
            });
        }
        Ok(())
    }

    /// Per-subscriber deadline as a `Duration`.
    #[must_use]
    pub fn invoke_timeout(&self) -> Duration {
        Duration::from_millis(self.invoke_timeout_ms)
    }
}

/// Builder for `BusConfig` with validation
#[derive(Default)]
pub struct BusConfigBuilder {
    invoke_timeout_ms: Option<u64>,
    lookup_policy: Option<LookupPolicy>,
}

impl BusConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-subscriber deadline in milliseconds
    pub fn invoke_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.invoke_timeout_ms = Some(timeout_ms);
        self
    }

    /// Set the container lookup policy
    pub fn lookup_policy(mut self, policy: LookupPolicy) -> Self {
        self.lookup_policy = Some(policy);
        self
    }

    /// Build the config, validating all parameters
    pub fn build(self) -> Result<BusConfig, BusConfigError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Build without validation
    pub fn build_unchecked(self) -> BusConfig {
        let defaults = BusConfig::default();

        BusConfig {
            invoke_timeout_ms: self.invoke_timeout_ms.unwrap_or(defaults.invoke_timeout_ms),
            lookup_policy: self.lookup_policy.unwrap_or(defaults.lookup_policy),
        }
    }
}
