//! ABAC policy definitions.
//!
//! A rule set is an ordered list of declarative rules. Rules are evaluated by
//! priority (highest first) and the first rule that is unsatisfied denies the
//! request ("deny overrides"). Each rule reports one of three outcomes:
//! satisfied, unsatisfied (with a reason) or not applicable.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tradegate_types::{Amount, NOT_SET};

use crate::attributes::{ENROLLMENT_ID, IdentityContext};
use crate::request::APPROVE_TRADE;

// ============================================================================
// Effect
// ============================================================================

/// The effect of a decision: allow or deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Effect {
    /// Grant the request.
    Allow,
    /// Refuse the request.
    Deny,
}

impl Default for Effect {
    /// Defaults to `Deny` (safe default: deny unless explicitly allowed).
    fn default() -> Self {
        Self::Deny
    }
}

impl Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => f.write_str("ALLOW"),
            Self::Deny => f.write_str("DENY"),
        }
    }
}

// ============================================================================
// Rule Outcome
// ============================================================================

/// The outcome of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum RuleOutcome {
    /// The rule's condition holds.
    Satisfied,
    /// The rule's condition fails; the request must be denied.
    Unsatisfied(String),
    /// The rule does not constrain this request.
    NotApplicable,
}

impl RuleOutcome {
    pub fn is_unsatisfied(&self) -> bool {
        matches!(self, Self::Unsatisfied(_))
    }
}

// ============================================================================
// Rule Input
// ============================================================================

/// What a rule may look at: the caller and the parsed request.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub context: &'a IdentityContext,
    pub action: &'a str,
    pub amount: Option<Amount>,
}

// ============================================================================
// Rule Kind
// ============================================================================

/// The condition a rule checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleKind {
    /// The attribute must be present and equal `expected`.
    AttributeEquals { attribute: String, expected: String },

    /// The attribute must be present (any value, including empty).
    AttributePresent { attribute: String },

    /// Amounts at or above `threshold` additionally require the attribute to
    /// equal `expected`. Below the threshold, or without an amount, the rule
    /// does not apply.
    AmountThreshold {
        threshold: Amount,
        attribute: String,
        expected: String,
    },
}

impl RuleKind {
    fn evaluate(&self, input: &RuleInput<'_>) -> RuleOutcome {
        let attrs = input.context.attributes();

        match self {
            Self::AttributeEquals {
                attribute,
                expected,
            } => {
                if attrs.assert_value(attribute, expected) {
                    RuleOutcome::Satisfied
                } else {
                    RuleOutcome::Unsatisfied(format!(
                        "caller {attribute} mismatch, required={expected}, actual={}",
                        attrs.display(attribute)
                    ))
                }
            }

            Self::AttributePresent { attribute } => {
                if attrs.get(attribute).present {
                    RuleOutcome::Satisfied
                } else {
                    RuleOutcome::Unsatisfied(format!("caller {attribute} is {NOT_SET}"))
                }
            }

            Self::AmountThreshold {
                threshold,
                attribute,
                expected,
            } => match input.amount {
                None => RuleOutcome::NotApplicable,
                Some(amount) if amount < *threshold => RuleOutcome::NotApplicable,
                Some(_) if attrs.assert_value(attribute, expected) => RuleOutcome::Satisfied,
                Some(amount) => RuleOutcome::Unsatisfied(format!(
                    "caller has {attribute}='{}' but amount={amount} requires {attribute}='{expected}'",
                    attrs.display(attribute)
                )),
            },
        }
    }
}

// ============================================================================
// Rule
// ============================================================================

/// A single authorization rule.
///
/// Rules are stateless. A rule with a non-empty `actions` list only applies
/// to those actions and is not applicable to any other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable identifier, recorded on denials.
    pub id: String,
    /// Evaluation priority. Higher values are evaluated first.
    pub priority: u32,
    /// Actions the rule applies to. Empty means every action.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    /// The condition checked.
    #[serde(flatten)]
    pub kind: RuleKind,
}

impl Rule {
    pub fn new(id: &str, priority: u32, kind: RuleKind) -> Self {
        Self {
            id: id.to_string(),
            priority,
            actions: Vec::new(),
            kind,
        }
    }

    /// Restricts the rule to one action (builder pattern).
    pub fn for_action(mut self, action: &str) -> Self {
        self.actions.push(action.to_string());
        self
    }

    pub fn applies_to(&self, action: &str) -> bool {
        self.actions.is_empty() || self.actions.iter().any(|a| a == action)
    }

    /// Evaluates the rule. Pure: no side effects.
    pub fn evaluate(&self, input: &RuleInput<'_>) -> RuleOutcome {
        if !self.applies_to(input.action) {
            return RuleOutcome::NotApplicable;
        }
        self.kind.evaluate(input)
    }
}

// ============================================================================
// Trade Policy
// ============================================================================

/// Parameters of the reference trade approval policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradePolicy {
    /// Department every caller must belong to.
    pub required_department: String,
    /// Attribute holding the caller's department.
    pub department_attribute: String,
    /// Attribute holding the caller's role.
    pub role_attribute: String,
    /// Role required to approve trades at or above the threshold.
    pub approver_role: String,
    /// Trades at or above this amount need the approver role.
    pub approval_threshold: Amount,
    /// Attribute holding the caller's enrollment ID.
    pub enrollment_attribute: String,
}

impl Default for TradePolicy {
    fn default() -> Self {
        Self {
            required_department: "accounting".to_string(),
            department_attribute: "department".to_string(),
            role_attribute: "role".to_string(),
            approver_role: "manager".to_string(),
            approval_threshold: Amount::new(100_000),
            enrollment_attribute: ENROLLMENT_ID.to_string(),
        }
    }
}

// ============================================================================
// Rule Set
// ============================================================================

/// Rule id of the department membership rule.
pub const DEPARTMENT_MEMBERSHIP: &str = "department-membership";
/// Rule id of the approval threshold rule.
pub const APPROVAL_THRESHOLD: &str = "approval-threshold";

/// An ordered, read-only collection of rules.
///
/// Rules are kept sorted by priority (highest first); rules with equal
/// priority keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Rule>", into = "Vec<Rule>")]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut rules = rules;
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules }
    }

    /// Adds a rule (builder pattern).
    pub fn with_rule(self, rule: Rule) -> Self {
        let mut rules = self.rules;
        rules.push(rule);
        Self::new(rules)
    }

    /// Returns the trade approval rule set.
    ///
    /// Rules:
    /// 1. Every action requires membership of the configured department
    /// 2. Trades at or above the threshold require the approver role
    pub fn trade_approval(policy: &TradePolicy) -> Self {
        Self::department_assertion(policy).with_rule(
            Rule::new(
                APPROVAL_THRESHOLD,
                50,
                RuleKind::AmountThreshold {
                    threshold: policy.approval_threshold,
                    attribute: policy.role_attribute.clone(),
                    expected: policy.approver_role.clone(),
                },
            )
            .for_action(APPROVE_TRADE),
        )
    }

    /// Returns the membership-only rule set.
    pub fn department_assertion(policy: &TradePolicy) -> Self {
        Self::new(vec![Rule::new(
            DEPARTMENT_MEMBERSHIP,
            100,
            RuleKind::AttributeEquals {
                attribute: policy.department_attribute.clone(),
                expected: policy.required_department.clone(),
            },
        )])
    }

    /// Rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

impl From<RuleSet> for Vec<Rule> {
    fn from(set: RuleSet) -> Self {
        set.rules
    }
}

// ============================================================================
// Tests
// ============================================================================
