//! Kani proofs for trade approval policy evaluation
//!
//! These proofs check correctness properties of the policy engine using
//! bounded model checking.
//!
//! Run with: `cargo kani --tests --harness verify_*`

#[cfg(kani)]
use crate::attributes::{AttributeStore, IdentityContext};
#[cfg(kani)]
use crate::evaluator::PolicyEngine;
#[cfg(kani)]
use crate::policy::{APPROVAL_THRESHOLD, DEPARTMENT_MEMBERSHIP, Effect, TradePolicy};
#[cfg(kani)]
use crate::request::Request;

/// Proof #1: Policy evaluation determinism
///
/// **Property**: Same inputs always produce the same decision
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_policy_evaluation_determinism() {
    let engine = PolicyEngine::from_policy(&TradePolicy::default());
    let ctx = IdentityContext::new(
        "x509::CN=alice",
        "Org1MSP",
        AttributeStore::new()
            .with_attribute("department", "accounting")
            .with_attribute("role", "analyst"),
    )
    .unwrap();
    let request = Request::approve_trade("150000");

    let decision1 = engine.evaluate(&ctx, &request).unwrap();
    let decision2 = engine.evaluate(&ctx, &request).unwrap();

    // Postcondition: Identical decisions
    assert_eq!(decision1, decision2);
}

/// Proof #2: Deny overrides, highest priority first
///
/// **Property**: When both rules fail, the membership rule is reported
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_membership_denial_reported_first() {
    let engine = PolicyEngine::from_policy(&TradePolicy::default());
    let ctx = IdentityContext::new(
        "x509::CN=mallory",
        "Org1MSP",
        AttributeStore::new().with_attribute("department", "sales"),
    )
    .unwrap();

    let decision = engine
        .evaluate(&ctx, &Request::approve_trade("999999"))
        .unwrap();

    assert_eq!(decision.effect, Effect::Deny);
    assert_eq!(decision.matched_rule.as_deref(), Some(DEPARTMENT_MEMBERSHIP));
}

/// Proof #3: Threshold band enforcement
///
/// **Property**: For any amount, a non-manager from accounting is allowed
/// exactly when the amount is below the threshold
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(25)]
fn verify_threshold_band() {
    let amount: u64 = kani::any();
    let policy = TradePolicy::default();
    let engine = PolicyEngine::from_policy(&policy);
    let ctx = IdentityContext::new(
        "x509::CN=alice",
        "Org1MSP",
        AttributeStore::new().with_attribute("department", "accounting"),
    )
    .unwrap();

    let decision = engine
        .evaluate(&ctx, &Request::approve_trade(&amount.to_string()))
        .unwrap();

    if amount < policy.approval_threshold.as_u64() {
        assert_eq!(decision.effect, Effect::Allow);
    } else {
        assert_eq!(decision.effect, Effect::Deny);
        assert_eq!(decision.matched_rule.as_deref(), Some(APPROVAL_THRESHOLD));
    }
}

/// Proof #4: Malformed amounts never become decisions
///
/// **Property**: A non-numeric amount is an error, never a (zero-amount) ALLOW
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_malformed_amount_rejected() {
    let engine = PolicyEngine::from_policy(&TradePolicy::default());
    let ctx = IdentityContext::new(
        "x509::CN=alice",
        "Org1MSP",
        AttributeStore::new().with_attribute("department", "accounting"),
    )
    .unwrap();

    let result = engine.evaluate(&ctx, &Request::approve_trade("abc"));
    assert!(result.is_err());
}
