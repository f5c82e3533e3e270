//! ABAC policy evaluation engine.
//!
//! Evaluates requests against a rule set in priority order. The first
//! unsatisfied rule denies the request and is recorded on the decision. If no
//! rule is unsatisfied, the request is allowed.

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tradegate_types::Amount;

use crate::attributes::{CallerInfo, IdentityContext};
use crate::error::Result;
use crate::policy::{Effect, RuleInput, RuleOutcome, RuleSet, TradePolicy};
use crate::request::Request;

// ============================================================================
// Decision
// ============================================================================

/// The result of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the request is allowed or denied.
    pub effect: Effect,
    /// Human-readable explanation of the outcome.
    pub reason: String,
    /// The caller the request was evaluated for.
    pub evaluated_by: CallerInfo,
    /// The rule that denied the request, or `None` when allowed.
    pub matched_rule: Option<String>,
    /// The action that was evaluated.
    pub action: String,
    /// The parsed amount, when the request carried one.
    pub amount: Option<Amount>,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Allow
    }
}

/// One entry of [`PolicyEngine::explain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTrace {
    pub rule_id: String,
    #[serde(flatten)]
    pub outcome: RuleOutcome,
}

// ============================================================================
// Observers
// ============================================================================

/// Callback notified after every decision.
///
/// Observers receive shared references and cannot alter the decision.
pub trait DecisionObserver: Send + Sync + Debug {
    fn on_decision(&self, request: &Request, decision: &Decision);
}

/// Logs every decision through `tracing`.
///
/// ALLOW is logged at `info`, DENY at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DecisionObserver for TracingObserver {
    fn on_decision(&self, request: &Request, decision: &Decision) {
        let caller = decision.evaluated_by.display_name();
        let msp = decision.evaluated_by.membership_id.as_str();

        match decision.effect {
            Effect::Allow => info!(
                action = %request.action(),
                caller = %caller,
                msp = %msp,
                amount = ?decision.amount,
                "Request allowed"
            ),
            Effect::Deny => warn!(
                action = %request.action(),
                caller = %caller,
                msp = %msp,
                amount = ?decision.amount,
                rule = ?decision.matched_rule,
                reason = %decision.reason,
                "Request denied"
            ),
        }
    }
}

// ============================================================================
// Policy Engine
// ============================================================================

/// Stateless evaluator mapping (identity, request) to a [`Decision`].
///
/// Read-only after construction; share it across threads behind an `Arc`.
///
/// ```
/// use tradegate_abac::{AttributeStore, Effect, IdentityContext, PolicyEngine, Request, TradePolicy};
///
/// let engine = PolicyEngine::from_policy(&TradePolicy::default());
/// let ctx = IdentityContext::new(
///     "x509::CN=alice",
///     "Org1MSP",
///     AttributeStore::new().with_attribute("department", "accounting"),
/// )?;
///
/// let decision = engine.evaluate(&ctx, &Request::approve_trade("50000"))?;
/// assert_eq!(decision.effect, Effect::Allow);
/// # Ok::<(), tradegate_abac::AuthzError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    rules: RuleSet,
    department_attribute: String,
    enrollment_attribute: String,
    observers: Vec<Arc<dyn DecisionObserver>>,
}

impl PolicyEngine {
    /// Creates an engine over an arbitrary rule set, using the default
    /// department and enrollment attribute names for decision reasons.
    pub fn new(rules: RuleSet) -> Self {
        let defaults = TradePolicy::default();
        Self {
            rules,
            department_attribute: defaults.department_attribute,
            enrollment_attribute: defaults.enrollment_attribute,
            observers: Vec::new(),
        }
    }

    /// Creates an engine running the trade approval rules.
    pub fn from_policy(policy: &TradePolicy) -> Self {
        Self::with_policy_rules(policy, RuleSet::trade_approval(policy))
    }

    /// Creates an engine running only the department membership rule.
    pub fn department_assertion(policy: &TradePolicy) -> Self {
        Self::with_policy_rules(policy, RuleSet::department_assertion(policy))
    }

    fn with_policy_rules(policy: &TradePolicy, rules: RuleSet) -> Self {
        Self {
            rules,
            department_attribute: policy.department_attribute.clone(),
            enrollment_attribute: policy.enrollment_attribute.clone(),
            observers: Vec::new(),
        }
    }

    /// Registers an observer (builder pattern).
    pub fn with_observer(mut self, observer: Arc<dyn DecisionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evaluates a request.
    ///
    /// The amount is parsed before any rule runs. A malformed amount returns
    /// [`crate::AuthzError::MalformedRequest`] and no decision is produced.
    /// A denial is a successful return with `effect == Deny`.
    ///
    /// # Postcondition
    ///
    /// Same inputs always produce the same decision.
    pub fn evaluate(&self, context: &IdentityContext, request: &Request) -> Result<Decision> {
        let amount = request.amount()?;
        let input = RuleInput {
            context,
            action: request.action(),
            amount,
        };
        let evaluated_by = context.caller_info(&self.enrollment_attribute);

        for rule in self.rules.iter() {
            let outcome = rule.evaluate(&input);
            debug!(rule = %rule.id, outcome = ?outcome, "Evaluated rule");

            if let RuleOutcome::Unsatisfied(reason) = outcome {
                let decision = Decision {
                    effect: Effect::Deny,
                    reason,
                    evaluated_by,
                    matched_rule: Some(rule.id.clone()),
                    action: request.action().to_string(),
                    amount,
                };
                self.notify(request, &decision);
                return Ok(decision);
            }
        }

        let reason = match amount {
            Some(amount) => format!(
                "APPROVED - amount={amount} by {}",
                evaluated_by.display_name()
            ),
            None => format!(
                "GRANTED - action={} to {} from {}",
                request.action(),
                evaluated_by.display_name(),
                context.attributes().display(&self.department_attribute)
            ),
        };

        let decision = Decision {
            effect: Effect::Allow,
            reason,
            evaluated_by,
            matched_rule: None,
            action: request.action().to_string(),
            amount,
        };
        self.notify(request, &decision);
        Ok(decision)
    }

    /// Evaluates every rule without short-circuiting, for diagnostics.
    ///
    /// The first unsatisfied entry, if any, is the rule [`Self::evaluate`]
    /// would deny with. Observers are not notified.
    pub fn explain(&self, context: &IdentityContext, request: &Request) -> Result<Vec<RuleTrace>> {
        let input = RuleInput {
            context,
            action: request.action(),
            amount: request.amount()?,
        };

        Ok(self
            .rules
            .iter()
            .map(|rule| RuleTrace {
                rule_id: rule.id.clone(),
                outcome: rule.evaluate(&input),
            })
            .collect())
    }

    fn notify(&self, request: &Request, decision: &Decision) {
        for observer in &self.observers {
            observer.on_decision(request, decision);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
