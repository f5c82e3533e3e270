//! CLI command implementations.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tradegate_abac::{Decision, IdentityContext};

use crate::style::{print_failure, print_info_table, print_success};

pub mod approve_trade;
pub mod assert_department;
pub mod config;
pub mod report;
pub mod version;

/// Exit code for a DENY decision.
pub const EXIT_DENIED: u8 = 1;
/// Exit code for requests that could not be evaluated.
pub const EXIT_ERROR: u8 = 2;

/// Loads an identity file and resolves it into a context.
pub(crate) fn resolve_identity(path: &Path) -> Result<IdentityContext> {
    let provider = tradegate_config::load_identity(path)
        .with_context(|| format!("Failed to load identity from {}", path.display()))?;
    Ok(IdentityContext::resolve(&provider)?)
}

/// Prints a decision as a styled table.
pub(crate) fn print_decision(decision: &Decision) {
    if decision.is_allowed() {
        print_success(&format!("{} {}", decision.effect, decision.action));
    } else {
        print_failure(&format!("{} {}", decision.effect, decision.action));
    }
    print_info_table(&decision.report().fields());
}

pub(crate) fn decision_exit_code(decision: &Decision) -> ExitCode {
    if decision.is_allowed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_DENIED)
    }
}
