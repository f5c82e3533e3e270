//! # tradegate-abac: Attribute-Based Access Control for trade approvals
//!
//! Decides whether an already-identified caller may perform an action, based
//! on attributes taken from the caller's credential.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  IdentityProvider (host)                     │
//! │  caller id, membership id, attributes        │
//! └─────────────────┬───────────────────────────┘
//!                   │  IdentityContext::resolve
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  PolicyEngine                                │
//! │  ├─ Parse request parameters                 │
//! │  ├─ Evaluate rules by priority               │
//! │  └─ First unsatisfied rule denies            │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Decision                                    │
//! │  - Effect (Allow/Deny)                       │
//! │  - Matched rule id                           │
//! │  - Human-readable reason                     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Standard Policy
//!
//! - Every action requires `department == accounting`
//! - Trades of 100000 or more additionally require `role == manager`
//!
//! A non-numeric amount is rejected as a malformed request. It is never
//! treated as zero.
//!
//! ## Examples
//!
//! ```
//! use tradegate_abac::{AttributeStore, Effect, IdentityContext, PolicyEngine, Request, TradePolicy};
//!
//! let engine = PolicyEngine::from_policy(&TradePolicy::default());
//! let ctx = IdentityContext::new(
//!     "x509::CN=alice::CN=ca.org1",
//!     "Org1MSP",
//!     AttributeStore::new()
//!         .with_attribute("department", "accounting")
//!         .with_attribute("role", "analyst"),
//! )?;
//!
//! let decision = engine.evaluate(&ctx, &Request::approve_trade("150000"))?;
//! assert_eq!(decision.effect, Effect::Deny);
//! assert!(decision.reason.contains("role='analyst'"));
//!
//! assert!(engine.evaluate(&ctx, &Request::approve_trade("abc")).is_err());
//! # Ok::<(), tradegate_abac::AuthzError>(())
//! ```

pub mod attributes;
pub mod error;
pub mod evaluator;
pub mod policy;
pub mod provider;
pub mod report;
pub mod request;
pub mod trade;

// Kani proofs for bounded model checking
#[cfg(any(test, kani))]
mod kani_proofs;

pub use attributes::{Attribute, AttributeStore, CallerInfo, CredentialFields, IdentityContext};
pub use error::{AuthzError, Result};
pub use evaluator::{Decision, DecisionObserver, PolicyEngine, RuleTrace, TracingObserver};
pub use policy::{Effect, Rule, RuleKind, RuleOutcome, RuleSet, TradePolicy};
pub use provider::{IdentityProvider, ProviderError, StaticIdentityProvider};
pub use report::{DecisionReport, IdentityReport};
pub use request::Request;
pub use trade::{TradeApproval, TradeProcessor};
