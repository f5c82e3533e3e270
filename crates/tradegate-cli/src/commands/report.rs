//! Identity report command.

use std::path::Path;

use anyhow::{Result, bail};
use tradegate_abac::IdentityReport;
use tradegate_config::TradegateConfig;

use crate::style::{print_header, print_info_table};

/// Prints the caller's identity attributes.
///
/// `extra` replaces the configured report attributes when non-empty.
pub fn run(config: &TradegateConfig, identity: &Path, extra: &[String], format: &str) -> Result<()> {
    let extra = if extra.is_empty() {
        config.report.extra_attributes.as_slice()
    } else {
        extra
    };

    let context = super::resolve_identity(identity)?;
    let report = IdentityReport::build(&context, extra);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => {
            print_header("Caller identity");
            let entries: Vec<(&str, &str)> = report.entries().collect();
            print_info_table(&entries);
        }
        other => bail!("Unknown report format '{other}' (expected json or text)"),
    }

    Ok(())
}
