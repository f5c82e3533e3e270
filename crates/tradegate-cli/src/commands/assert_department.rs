//! Department assertion command.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use tradegate_abac::Request;
use tradegate_abac::request::ASSERT_DEPARTMENT;
use tradegate_config::TradegateConfig;

use super::{decision_exit_code, print_decision, resolve_identity};

pub fn run(config: &TradegateConfig, identity: &Path, json: bool) -> Result<ExitCode> {
    let context = resolve_identity(identity)?;
    let decision = config
        .department_engine()
        .evaluate(&context, &Request::new(ASSERT_DEPARTMENT))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&decision.report())?);
    } else {
        print_decision(&decision);
    }

    Ok(decision_exit_code(&decision))
}
