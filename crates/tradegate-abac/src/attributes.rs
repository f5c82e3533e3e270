//! Attribute types for ABAC evaluation.
//!
//! Attributes are named facts taken from the caller's credential:
//! - **Attribute store**: immutable name → value snapshot, one per request
//! - **Caller info**: unique id, membership id, enrollment id
//! - **Identity context**: everything the rules may look at

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tradegate_types::{CallerId, MembershipId, NOT_SET};

use crate::error::{AuthzError, Result};

// ============================================================================
// Standard Attribute Names
// ============================================================================

/// Enrollment ID the identity provider registered the caller under.
pub const ENROLLMENT_ID: &str = "hf.EnrollmentID";
/// Organizational affiliation of the caller.
pub const AFFILIATION: &str = "hf.Affiliation";
/// Identity type (client, peer, admin, ...).
pub const USER_TYPE: &str = "hf.Type";

// ============================================================================
// Attribute
// ============================================================================

/// A single credential attribute as reported by the identity provider.
///
/// When `present` is false, `value` is empty and carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub present: bool,
}

impl Attribute {
    /// An attribute carried by the credential.
    pub fn present(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            present: true,
        }
    }

    /// An attribute the credential does not carry.
    pub fn absent(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: String::new(),
            present: false,
        }
    }
}

/// Borrowed result of an attribute lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeValue<'a> {
    pub value: &'a str,
    pub present: bool,
}

// ============================================================================
// Attribute Store
// ============================================================================

/// Immutable snapshot of the attributes present on the caller's credential.
///
/// Only present attributes are stored. A name missing from the map is unset,
/// which is not the same as being set to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeStore {
    values: BTreeMap<String, String>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute (builder pattern).
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }

    /// Builds a store from provider triples, dropping those not present.
    pub fn from_attributes(attributes: impl IntoIterator<Item = Attribute>) -> Self {
        let values = attributes
            .into_iter()
            .filter(|a| a.present)
            .map(|a| (a.name, a.value))
            .collect();
        Self { values }
    }

    /// Looks up an attribute. Never fails.
    ///
    /// Absent attributes return `present = false` and an empty value.
    pub fn get(&self, name: &str) -> AttributeValue<'_> {
        match self.values.get(name) {
            Some(value) => AttributeValue {
                value,
                present: true,
            },
            None => AttributeValue {
                value: "",
                present: false,
            },
        }
    }

    /// Returns the value if the attribute is present.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns the value, or `fallback` when the attribute is absent.
    pub fn get_or_default<'a>(&'a self, name: &str, fallback: &'a str) -> &'a str {
        self.lookup(name).unwrap_or(fallback)
    }

    /// Returns the value for display, or the `NOT SET` sentinel when absent.
    pub fn display(&self, name: &str) -> &str {
        self.get_or_default(name, NOT_SET)
    }

    /// Returns true only if the attribute is present and equals `expected`.
    pub fn assert_value(&self, name: &str, expected: &str) -> bool {
        self.lookup(name) == Some(expected)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates present attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for AttributeStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Credential Fields
// ============================================================================

/// Auxiliary fields read from the caller's credential.
///
/// The core never validates the credential; these are informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialFields {
    /// Raw subject of the credential, if the provider exposes one.
    pub subject: Option<String>,
}

// ============================================================================
// Caller Info
// ============================================================================

/// Identifying information about the caller, recorded on every decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerInfo {
    pub caller_id: CallerId,
    pub membership_id: MembershipId,
    /// Enrollment ID attribute, when the credential carries one.
    pub enrollment_id: Option<String>,
}

impl CallerInfo {
    /// The name decisions and approvals refer to the caller by.
    ///
    /// Prefers the enrollment ID and falls back to the unique caller id.
    pub fn display_name(&self) -> &str {
        self.enrollment_id
            .as_deref()
            .unwrap_or(self.caller_id.as_str())
    }
}

// ============================================================================
// Identity Context
// ============================================================================

/// Everything known about one caller for one authorization request.
///
/// Built once at request entry and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityContext {
    caller_id: CallerId,
    membership_id: MembershipId,
    attributes: AttributeStore,
    credential: CredentialFields,
}

impl IdentityContext {
    /// Creates a context from already-resolved identity fields.
    ///
    /// Fails with [`AuthzError::IdentityResolution`] when the caller id or
    /// membership id is blank, since both are mandatory.
    pub fn new(
        caller_id: impl Into<CallerId>,
        membership_id: impl Into<MembershipId>,
        attributes: AttributeStore,
    ) -> Result<Self> {
        let caller_id = caller_id.into();
        let membership_id = membership_id.into();

        if caller_id.is_blank() {
            return Err(AuthzError::identity("caller id", "is empty"));
        }
        if membership_id.is_blank() {
            return Err(AuthzError::identity("membership id", "is empty"));
        }

        Ok(Self {
            caller_id,
            membership_id,
            attributes,
            credential: CredentialFields::default(),
        })
    }

    /// Attaches auxiliary credential fields.
    pub fn with_credential(mut self, credential: CredentialFields) -> Self {
        self.credential = credential;
        self
    }

    pub fn caller_id(&self) -> &CallerId {
        &self.caller_id
    }

    pub fn membership_id(&self) -> &MembershipId {
        &self.membership_id
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn credential(&self) -> &CredentialFields {
        &self.credential
    }

    /// Shorthand for `self.attributes().get(name)`.
    pub fn attribute(&self, name: &str) -> AttributeValue<'_> {
        self.attributes.get(name)
    }

    /// Caller info for decision records, reading the enrollment ID from
    /// `enrollment_attribute`.
    pub fn caller_info(&self, enrollment_attribute: &str) -> CallerInfo {
        CallerInfo {
            caller_id: self.caller_id.clone(),
            membership_id: self.membership_id.clone(),
            enrollment_id: self
                .attributes
                .lookup(enrollment_attribute)
                .map(str::to_string),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
