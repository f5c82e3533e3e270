//! Configuration management for Tradegate
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence)
//! 2. Environment variables (TRADEGATE_* prefix)
//! 3. tradegate.local.toml (gitignored, local overrides)
//! 4. tradegate.toml (git-tracked, project config)
//! 5. ~/.config/tradegate/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tradegate_abac::{PolicyEngine, TracingObserver, TradePolicy};

mod error;
mod identity;
mod loader;
mod paths;

pub use error::ConfigError;
pub use identity::load_identity;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Tradegate configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradegateConfig {
    pub policy: TradePolicy,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Attributes the identity report lists after the standard ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub extra_attributes: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            extra_attributes: vec!["app.accounting.role".to_string(), "department".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive. `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TradegateConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Checks values the policy engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let policy = &self.policy;
        let required = [
            ("policy.required_department", &policy.required_department),
            ("policy.department_attribute", &policy.department_attribute),
            ("policy.role_attribute", &policy.role_attribute),
            ("policy.approver_role", &policy.approver_role),
            ("policy.enrollment_attribute", &policy.enrollment_attribute),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!("{key} must not be empty")));
            }
        }
        if policy.approval_threshold.as_u64() == 0 {
            return Err(ConfigError::ValidationError(
                "policy.approval_threshold must be greater than zero".to_string(),
            ));
        }
        if let Some(blank) = self.report.extra_attributes.iter().find(|a| a.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "report.extra_attributes contains a blank name ({blank:?})"
            )));
        }
        Ok(())
    }

    /// Builds the trade approval engine for the configured policy, logging
    /// every decision through `tracing`.
    pub fn policy_engine(&self) -> PolicyEngine {
        PolicyEngine::from_policy(&self.policy).with_observer(Arc::new(TracingObserver))
    }

    /// Builds the membership-only engine used by department assertions.
    pub fn department_engine(&self) -> PolicyEngine {
        PolicyEngine::department_assertion(&self.policy).with_observer(Arc::new(TracingObserver))
    }
}
