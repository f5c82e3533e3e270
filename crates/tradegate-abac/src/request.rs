//! Authorization requests.
//!
//! A request names the action being authorized and carries its parameters in
//! raw form. Parameters are parsed by the engine, so a malformed parameter
//! surfaces as an error from evaluation instead of a decision.

use serde::{Deserialize, Serialize};
use tradegate_types::Amount;

use crate::error::{AuthzError, Result};

/// Approve a trade of a given value.
pub const APPROVE_TRADE: &str = "approve-trade";
/// Check that the caller belongs to the required department.
pub const ASSERT_DEPARTMENT: &str = "assert-department";

/// Name of the amount parameter, used in error messages.
pub const AMOUNT_PARAM: &str = "amount";

/// The action being authorized plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    amount: Option<String>,
}

impl Request {
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            amount: None,
        }
    }

    /// A trade approval request for a raw amount argument.
    pub fn approve_trade(amount: &str) -> Self {
        Self::new(APPROVE_TRADE).with_amount(amount)
    }

    /// Attaches a raw amount argument (builder pattern).
    pub fn with_amount(mut self, raw: &str) -> Self {
        self.amount = Some(raw.to_string());
        self
    }

    /// Builds a request from positional arguments, where `args[0]` is the amount.
    ///
    /// Fails with [`AuthzError::MalformedRequest`] when no argument is given.
    pub fn from_args(action: &str, args: &[String]) -> Result<Self> {
        let raw = args
            .first()
            .ok_or_else(|| AuthzError::malformed(AMOUNT_PARAM, "must be provided in args[0]"))?;
        Ok(Self::new(action).with_amount(raw))
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// The amount argument exactly as submitted.
    pub fn raw_amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    /// Parses the amount argument.
    ///
    /// `Ok(None)` means no amount was submitted. A submitted amount that is
    /// not a non-negative integer is [`AuthzError::MalformedRequest`]; it is
    /// never read as zero.
    pub fn amount(&self) -> Result<Option<Amount>> {
        self.amount
            .as_deref()
            .map(|raw| {
                raw.parse::<Amount>()
                    .map_err(|e| AuthzError::malformed(AMOUNT_PARAM, e.to_string()))
            })
            .transpose()
    }
}
