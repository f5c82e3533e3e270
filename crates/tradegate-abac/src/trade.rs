//! Post-approval trade processing.
//!
//! The engine only decides. Recording the effect of an ALLOW decision is this
//! separate, explicit step, run by the host after evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use tradegate_types::Amount;

use crate::error::{AuthzError, Result};
use crate::evaluator::Decision;
use crate::policy::Effect;

/// Record of an approved trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeApproval {
    pub amount: Amount,
    pub approved_by: String,
    pub recorded_at: DateTime<Utc>,
    /// `APPROVED - Trade value=<amount> by <caller>`.
    pub message: String,
}

/// Turns ALLOW decisions for trades into approval records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TradeProcessor;

impl TradeProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Processes an allowed trade decision.
    ///
    /// `recorded_at` comes from the host (e.g. the transaction timestamp).
    /// Fails with [`AuthzError::NotApproved`] for a DENY decision or a
    /// decision that carries no amount.
    pub fn process(&self, decision: &Decision, recorded_at: DateTime<Utc>) -> Result<TradeApproval> {
        if decision.effect != Effect::Allow {
            return Err(AuthzError::NotApproved {
                reason: format!("decision was {}: {}", decision.effect, decision.reason),
            });
        }
        let amount = decision.amount.ok_or_else(|| AuthzError::NotApproved {
            reason: format!("decision for action '{}' carries no amount", decision.action),
        })?;

        let approved_by = decision.evaluated_by.display_name().to_string();
        let message = format!("APPROVED - Trade value={amount} by {approved_by}");

        info!(
            amount = %amount,
            approved_by = %approved_by,
            msp = %decision.evaluated_by.membership_id,
            "Trade processed"
        );

        Ok(TradeApproval {
            amount,
            approved_by,
            recorded_at,
            message,
        })
    }
}
