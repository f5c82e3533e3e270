//! Trade approval command.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use chrono::Utc;
use tracing::debug;
use tradegate_abac::request::APPROVE_TRADE;
use tradegate_abac::{Request, TradeProcessor};
use tradegate_config::TradegateConfig;

use super::{decision_exit_code, print_decision, resolve_identity};
use crate::style::print_hint;

/// Evaluates an approve-trade request and processes the trade on ALLOW.
///
/// `args[0]` is the trade amount.
pub fn run(config: &TradegateConfig, identity: &Path, args: &[String], json: bool) -> Result<ExitCode> {
    let request = Request::from_args(APPROVE_TRADE, args)?;
    let context = resolve_identity(identity)?;
    debug!(caller = %context.caller_id(), action = APPROVE_TRADE, "Evaluating request");

    let decision = config.policy_engine().evaluate(&context, &request)?;

    let approval = if decision.is_allowed() {
        Some(TradeProcessor::new().process(&decision, Utc::now())?)
    } else {
        None
    };

    if json {
        let output = serde_json::json!({
            "decision": decision.report(),
            "approval": approval,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_decision(&decision);
        match &approval {
            Some(approval) => println!("{}", approval.message),
            None => print_hint(&format!(
                "Trades of {} or more require {}='{}'",
                config.policy.approval_threshold,
                config.policy.role_attribute,
                config.policy.approver_role
            )),
        }
    }

    Ok(decision_exit_code(&decision))
}
