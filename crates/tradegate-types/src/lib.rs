//! # tradegate-types: Core types for `Tradegate`
//!
//! This crate contains shared types used across the `Tradegate` system:
//! - Caller identity ([`CallerId`], [`MembershipId`])
//! - Monetary amounts ([`Amount`], [`AmountParseError`])
//! - Report sentinels ([`NOT_SET`])

use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Rendered in place of an attribute the caller's credential does not carry.
///
/// Distinct from the empty string: an attribute may legitimately be set to `""`.
pub const NOT_SET: &str = "NOT SET";

// ============================================================================
// Caller Identity - Clone (owned strings from the identity provider)
// ============================================================================

/// Stable unique identifier of a caller, as issued by the identity provider.
///
/// For X.509 based providers this is typically the subject/issuer pair
/// (`x509::CN=alice,...::CN=ca,...`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(String);

impl CallerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the identifier is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for CallerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CallerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of the organization (membership service provider) a caller belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MembershipId(String);

impl MembershipId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the identifier is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for MembershipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MembershipId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MembershipId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// Amount - Copy (cheap 8-byte value)
// ============================================================================

/// A monetary amount in the smallest unit of its currency.
///
/// Amounts are unsigned: a trade value can never be negative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Parses a base-10 unsigned integer.
    ///
    /// Only ASCII digits are accepted: no sign, no whitespace, no separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AmountParseError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountParseError::NotANumber(s.to_string()));
        }
        s.parse::<u64>()
            .map(Amount)
            .map_err(|_| AmountParseError::Overflow(s.to_string()))
    }
}

/// Error returned when an amount argument cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    /// The argument was an empty string.
    Empty,
    /// The argument contained something other than ASCII digits.
    NotANumber(String),
    /// The argument does not fit in 64 bits.
    Overflow(String),
}

impl Display for AmountParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "amount is empty"),
            Self::NotANumber(raw) => {
                write!(f, "amount {raw:?} is not a non-negative integer")
            }
            Self::Overflow(raw) => write!(f, "amount {raw:?} exceeds {}", u64::MAX),
        }
    }
}

impl std::error::Error for AmountParseError {}
