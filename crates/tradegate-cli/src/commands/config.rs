//! Configuration management commands.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Result, bail};
use tradegate_config::TradegateConfig;

use crate::style::{print_error, print_header, print_info_table, print_success};

/// Show current configuration.
pub fn show(config: &TradegateConfig, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(config)?),
        "toml" => println!("{}", toml::to_string_pretty(config)?),
        "text" => {
            let policy = &config.policy;
            print_header("Policy");
            print_info_table(&[
                ("required_department", policy.required_department.clone()),
                ("department_attribute", policy.department_attribute.clone()),
                ("role_attribute", policy.role_attribute.clone()),
                ("approver_role", policy.approver_role.clone()),
                ("approval_threshold", policy.approval_threshold.to_string()),
                ("enrollment_attribute", policy.enrollment_attribute.clone()),
            ]);

            print_header("Report");
            print_info_table(&[(
                "extra_attributes",
                config.report.extra_attributes.join(", "),
            )]);

            print_header("Logging");
            print_info_table(&[("level", config.logging.level.as_str())]);
        }
        other => bail!("Unknown config format '{other}' (expected text, json or toml)"),
    }

    Ok(())
}

/// Reports whether the merged configuration loaded and validated.
pub fn validate(project: &Path, loaded: &Result<TradegateConfig>) -> ExitCode {
    println!("Validating configuration in {}...", project.display());

    match loaded {
        Ok(_) => {
            print_success("Configuration is valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_error(&format!("Configuration validation failed: {e:#}"));
            ExitCode::from(super::EXIT_ERROR)
        }
    }
}
