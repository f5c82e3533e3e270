//! Read-only reports: the identity attribute dump and the decision formatter.
//!
//! Both keep their keys in a fixed order so serialized output is
//! deterministic. Unset attributes are rendered as `NOT SET`, never omitted.

use std::fmt::Display;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tradegate_types::NOT_SET;

use crate::attributes::{AFFILIATION, ENROLLMENT_ID, IdentityContext, USER_TYPE};
use crate::error::Result;
use crate::evaluator::Decision;
use crate::provider::IdentityProvider;

/// Report key for the caller's unique id.
pub const ID_KEY: &str = "id";
/// Report key for the caller's membership id.
pub const MSPID_KEY: &str = "MSPID";

/// Enrollment attributes every report includes after the two identifiers.
pub const STANDARD_ATTRIBUTES: [&str; 3] = [AFFILIATION, ENROLLMENT_ID, USER_TYPE];

// ============================================================================
// Identity Report
// ============================================================================

/// Ordered snapshot of a caller's identity attributes.
///
/// Serializes as a map whose key order is the order attributes were requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityReport {
    entries: Vec<(String, String)>,
}

impl IdentityReport {
    /// Builds a report from a resolved context.
    ///
    /// Keys: `id`, `MSPID`, the [`STANDARD_ATTRIBUTES`], then `extra` in the
    /// given order. A name requested twice is reported once, at its first
    /// position. Never fails: unset attributes read `NOT SET`.
    pub fn build<S: AsRef<str>>(context: &IdentityContext, extra: &[S]) -> Self {
        let mut report = Self {
            entries: Vec::with_capacity(2 + STANDARD_ATTRIBUTES.len() + extra.len()),
        };
        report.push(ID_KEY, context.caller_id().as_str());
        report.push(MSPID_KEY, context.membership_id().as_str());

        let attrs = context.attributes();
        let names = STANDARD_ATTRIBUTES
            .iter()
            .copied()
            .chain(extra.iter().map(AsRef::as_ref));
        for name in names {
            report.push(name, attrs.display(name));
        }
        report
    }

    /// Resolves the caller from a provider, then builds the report.
    ///
    /// Fails only when the caller id or membership id cannot be obtained.
    pub fn resolve<S: AsRef<str>>(provider: &dyn IdentityProvider, extra: &[S]) -> Result<Self> {
        let context = IdentityContext::resolve(provider)?;
        Ok(Self::build(&context, extra))
    }

    fn push(&mut self, key: &str, value: &str) {
        if self.entries.iter().any(|(k, _)| k == key) {
            return;
        }
        self.entries.push((key.to_string(), value.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Entries in report order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for IdentityReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Decision Formatter
// ============================================================================

/// Key/value rendering of a [`Decision`].
///
/// `Display` writes one `key: value` line per field.
#[derive(Debug, Clone, Copy)]
pub struct DecisionReport<'a> {
    decision: &'a Decision,
}

impl Decision {
    pub fn report(&self) -> DecisionReport<'_> {
        DecisionReport { decision: self }
    }
}

impl DecisionReport<'_> {
    /// Fields in fixed order. Optional fields absent from the decision read `NOT SET`.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let d = self.decision;
        vec![
            ("outcome", d.effect.to_string()),
            ("action", d.action.clone()),
            (
                "amount",
                d.amount.map_or_else(|| NOT_SET.to_string(), |a| a.to_string()),
            ),
            ("evaluated_by", d.evaluated_by.display_name().to_string()),
            ("caller_id", d.evaluated_by.caller_id.to_string()),
            ("msp_id", d.evaluated_by.membership_id.to_string()),
            (
                "matched_rule",
                d.matched_rule.clone().unwrap_or_else(|| NOT_SET.to_string()),
            ),
            ("reason", d.reason.clone()),
        ]
    }
}

impl Display for DecisionReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (key, value) in self.fields() {
            writeln!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}

impl Serialize for DecisionReport<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let fields = self.fields();
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (key, value) in &fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeStore;
    use crate::error::AuthzError;
    use crate::policy::TradePolicy;
    use crate::provider::StaticIdentityProvider;
    use crate::request::Request;
    use crate::PolicyEngine;

    fn bare_context() -> IdentityContext {
        IdentityContext::new("x509::CN=alice", "Org1MSP", AttributeStore::new()).unwrap()
    }

    #[test]
    fn test_report_with_no_attributes_uses_sentinels() {
        let extra = ["app.accounting.role", "department"];
        let report = IdentityReport::build(&bare_context(), &extra);

        let keys: Vec<&str> = report.entries().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "id",
                "MSPID",
                "hf.Affiliation",
                "hf.EnrollmentID",
                "hf.Type",
                "app.accounting.role",
                "department"
            ]
        );
        assert_eq!(report.get("id"), Some("x509::CN=alice"));
        assert_eq!(report.get("MSPID"), Some("Org1MSP"));
        for (key, value) in report.entries().skip(2) {
            assert_eq!(value, NOT_SET, "{key} should be NOT SET");
        }
    }

    #[test]
    fn test_report_distinguishes_empty_from_unset() {
        let ctx = IdentityContext::new(
            "x509::CN=alice",
            "Org1MSP",
            AttributeStore::new().with_attribute("department", ""),
        )
        .unwrap();
        let report = IdentityReport::build(&ctx, &["department", "role"]);

        assert_eq!(report.get("department"), Some(""));
        assert_eq!(report.get("role"), Some(NOT_SET));
    }

    #[test]
    fn test_report_deduplicates_requested_names() {
        let report = IdentityReport::build(&bare_context(), &["hf.Type", "department", "department"]);
        assert_eq!(report.len(), 6);
    }

    #[test]
    fn test_report_json_preserves_request_order() {
        let ctx = IdentityContext::new(
            "x509::CN=alice",
            "Org1MSP",
            AttributeStore::new()
                .with_attribute("zeta", "last-alphabetically")
                .with_attribute("alpha", "first-alphabetically"),
        )
        .unwrap();
        let report = IdentityReport::build(&ctx, &["zeta", "alpha"]);
        let json = serde_json::to_string(&report).unwrap();

        let zeta = json.find("\"zeta\"").unwrap();
        let alpha = json.find("\"alpha\"").unwrap();
        assert!(json.starts_with("{\"id\":"));
        assert!(zeta < alpha);
    }

    #[test]
    fn test_resolve_requires_identifiers() {
        let provider = StaticIdentityProvider::new("x509::CN=alice", "");
        let err = IdentityReport::resolve(&provider, &["department"]).unwrap_err();
        assert!(matches!(err, AuthzError::IdentityResolution { .. }));

        let provider = StaticIdentityProvider::new("x509::CN=alice", "Org1MSP");
        let report = IdentityReport::resolve(&provider, &["department"]).unwrap();
        assert_eq!(report.get("department"), Some(NOT_SET));
    }

    #[test]
    fn test_decision_report_fields() {
        let engine = PolicyEngine::from_policy(&TradePolicy::default());
        let ctx = IdentityContext::new(
            "x509::CN=alice",
            "Org1MSP",
            AttributeStore::new().with_attribute("department", "sales"),
        )
        .unwrap();
        let decision = engine.evaluate(&ctx, &Request::approve_trade("5000")).unwrap();
        let rendered = decision.report().to_string();

        assert!(rendered.starts_with("outcome: DENY\n"));
        assert!(rendered.contains("amount: 5000\n"));
        assert!(rendered.contains("evaluated_by: x509::CN=alice\n"));
        assert!(rendered.contains("matched_rule: department-membership\n"));
        assert!(rendered.contains("reason: caller department mismatch"));
    }

    #[test]
    fn test_decision_report_json_is_ordered_map() {
        let engine = PolicyEngine::from_policy(&TradePolicy::default());
        let ctx = IdentityContext::new(
            "x509::CN=alice",
            "Org1MSP",
            AttributeStore::new().with_attribute("department", "accounting"),
        )
        .unwrap();
        let decision = engine.evaluate(&ctx, &Request::approve_trade("10")).unwrap();
        let value = serde_json::to_value(decision.report()).unwrap();

        assert_eq!(value["outcome"], "ALLOW");
        assert_eq!(value["matched_rule"], NOT_SET);
        let json = serde_json::to_string(&decision.report()).unwrap();
        assert!(json.starts_with("{\"outcome\":"));
    }
}
