//! Identity provider seam.
//!
//! The host supplies the caller's identity through [`IdentityProvider`]. The
//! core never parses certificates; it only consumes what the provider reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use tradegate_types::{CallerId, MembershipId};

use crate::attributes::{Attribute, AttributeStore, CredentialFields, IdentityContext};
use crate::error::{AuthzError, Result};

/// Error reported by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider has no value for a field it is expected to supply.
    #[error("{0} is not available")]
    Missing(String),

    /// The provider failed while reading the credential.
    #[error("failed to read {field}: {reason}")]
    Unavailable { field: String, reason: String },
}

/// Source of the current caller's identity.
///
/// Implemented by the host (a chaincode shim, a gateway, a test fixture).
pub trait IdentityProvider {
    /// Unique identifier of the caller. Mandatory.
    fn caller_id(&self) -> std::result::Result<CallerId, ProviderError>;

    /// Membership (organization) identifier of the caller. Mandatory.
    fn membership_id(&self) -> std::result::Result<MembershipId, ProviderError>;

    /// Every attribute carried by the caller's credential.
    fn attributes(&self) -> std::result::Result<Vec<Attribute>, ProviderError>;

    /// Auxiliary credential fields. Never used for validation.
    fn credential_fields(&self) -> std::result::Result<CredentialFields, ProviderError> {
        Ok(CredentialFields::default())
    }
}

impl IdentityContext {
    /// Snapshots the caller's identity from a provider.
    ///
    /// Only the caller id and membership id are mandatory. Attribute and
    /// credential failures are logged and leave those parts empty, so every
    /// attribute reads as unset.
    pub fn resolve(provider: &dyn IdentityProvider) -> Result<Self> {
        let caller_id = provider
            .caller_id()
            .map_err(|e| AuthzError::identity("caller id", e.to_string()))?;
        let membership_id = provider
            .membership_id()
            .map_err(|e| AuthzError::identity("membership id", e.to_string()))?;

        let attributes = match provider.attributes() {
            Ok(attrs) => AttributeStore::from_attributes(attrs),
            Err(e) => {
                warn!(caller = %caller_id, error = %e, "Attributes unavailable, treating all as unset");
                AttributeStore::new()
            }
        };

        let credential = match provider.credential_fields() {
            Ok(fields) => fields,
            Err(e) => {
                warn!(caller = %caller_id, error = %e, "Credential fields unavailable");
                CredentialFields::default()
            }
        };

        if let Some(subject) = credential.subject.as_deref() {
            debug!(caller = %caller_id, subject = %subject, "Resolved credential subject");
        }

        Ok(Self::new(caller_id, membership_id, attributes)?.with_credential(credential))
    }
}

// ============================================================================
// Static Provider
// ============================================================================

/// An identity described up front, e.g. loaded from a JSON or TOML file.
///
/// ```
/// use tradegate_abac::provider::StaticIdentityProvider;
/// use tradegate_abac::IdentityContext;
///
/// let identity: StaticIdentityProvider = serde_json::from_str(r#"{
///     "id": "x509::CN=alice::CN=ca.org1",
///     "mspid": "Org1MSP",
///     "attributes": { "department": "accounting" }
/// }"#)?;
///
/// let ctx = IdentityContext::resolve(&identity)?;
/// assert!(ctx.attributes().assert_value("department", "accounting"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticIdentityProvider {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub mspid: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl StaticIdentityProvider {
    pub fn new(id: &str, mspid: &str) -> Self {
        Self {
            id: id.to_string(),
            mspid: mspid.to_string(),
            ..Self::default()
        }
    }

    /// Adds an attribute (builder pattern).
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Sets the credential subject.
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn caller_id(&self) -> std::result::Result<CallerId, ProviderError> {
        if self.id.trim().is_empty() {
            return Err(ProviderError::Missing("id".to_string()));
        }
        Ok(CallerId::new(self.id.clone()))
    }

    fn membership_id(&self) -> std::result::Result<MembershipId, ProviderError> {
        if self.mspid.trim().is_empty() {
            return Err(ProviderError::Missing("mspid".to_string()));
        }
        Ok(MembershipId::new(self.mspid.clone()))
    }

    fn attributes(&self) -> std::result::Result<Vec<Attribute>, ProviderError> {
        Ok(self
            .attributes
            .iter()
            .map(|(name, value)| Attribute::present(name, value))
            .collect())
    }

    fn credential_fields(&self) -> std::result::Result<CredentialFields, ProviderError> {
        Ok(CredentialFields {
            subject: self.subject.clone(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Provider whose attribute and credential lookups always fail.
    struct FlakyProvider;

    impl IdentityProvider for FlakyProvider {
        fn caller_id(&self) -> std::result::Result<CallerId, ProviderError> {
            Ok(CallerId::new("x509::CN=carol"))
        }

        fn membership_id(&self) -> std::result::Result<MembershipId, ProviderError> {
            Ok(MembershipId::new("Org2MSP"))
        }

        fn attributes(&self) -> std::result::Result<Vec<Attribute>, ProviderError> {
            Err(ProviderError::Unavailable {
                field: "attributes".to_string(),
                reason: "credential has no attribute extension".to_string(),
            })
        }

        fn credential_fields(&self) -> std::result::Result<CredentialFields, ProviderError> {
            Err(ProviderError::Missing("certificate".to_string()))
        }
    }

    #[test]
    fn test_resolve_static_identity() {
        let provider = StaticIdentityProvider::new("x509::CN=alice", "Org1MSP")
            .with_attribute("department", "accounting")
            .with_subject("CN=alice,OU=client");

        let ctx = IdentityContext::resolve(&provider).unwrap();
        assert_eq!(ctx.caller_id().as_str(), "x509::CN=alice");
        assert_eq!(ctx.membership_id().as_str(), "Org1MSP");
        assert_eq!(ctx.attributes().lookup("department"), Some("accounting"));
        assert_eq!(ctx.credential().subject.as_deref(), Some("CN=alice,OU=client"));
    }

    #[test]
    fn test_resolve_fails_without_caller_id() {
        let provider = StaticIdentityProvider::new("", "Org1MSP");
        let err = IdentityContext::resolve(&provider).unwrap_err();
        assert_eq!(
            err,
            AuthzError::IdentityResolution {
                field: "caller id".to_string(),
                reason: "id is not available".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_fails_without_membership_id() {
        let provider = StaticIdentityProvider::new("x509::CN=alice", " ");
        let err = IdentityContext::resolve(&provider).unwrap_err();
        assert!(matches!(
            err,
            AuthzError::IdentityResolution { ref field, .. } if field == "membership id"
        ));
    }

    #[test]
    fn test_resolve_tolerates_attribute_failures() {
        let ctx = IdentityContext::resolve(&FlakyProvider).unwrap();
        assert!(ctx.attributes().is_empty());
        assert_eq!(ctx.credential(), &CredentialFields::default());
    }

    #[test]
    fn test_static_identity_deserializes() {
        let provider: StaticIdentityProvider = serde_json::from_value(serde_json::json!({
            "id": "x509::CN=dave",
            "mspid": "Org1MSP",
            "attributes": { "department": "sales", "role": "" }
        }))
        .unwrap();

        let ctx = IdentityContext::resolve(&provider).unwrap();
        assert!(ctx.attribute("role").present);
        assert_eq!(ctx.attribute("role").value, "");
        assert!(ctx.credential().subject.is_none());
    }
}
