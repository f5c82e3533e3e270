//! Error types for policy evaluation.
//!
//! A DENY is not an error: it is a successful [`crate::Decision`]. The
//! variants here mean the request could not be evaluated at all.

use thiserror::Error;

/// Error type for authorization operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// A required request parameter is missing or failed to parse.
    #[error("malformed request: parameter '{parameter}' {reason}")]
    MalformedRequest { parameter: String, reason: String },

    /// The caller's mandatory identity fields could not be obtained.
    #[error("identity resolution failed: {field} {reason}")]
    IdentityResolution { field: String, reason: String },

    /// A decision was handed to the trade processor that does not approve a trade.
    #[error("trade not approved: {reason}")]
    NotApproved { reason: String },
}

impl AuthzError {
    pub(crate) fn malformed(parameter: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn identity(field: &str, reason: impl Into<String>) -> Self {
        Self::IdentityResolution {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthzError>;
