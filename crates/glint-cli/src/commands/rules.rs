//! `glint rules`

use std::process::ExitCode;

use anyhow::Context;
use glint_core::OutputFormat;
use glint_rules::RuleRegistry;

pub fn rules_command(format: OutputFormat) -> anyhow::Result<ExitCode> {
    let registry = RuleRegistry::with_builtin_rules();
    match format {
        OutputFormat::Text => print!("{}", registry.render_table()),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&registry.table())
                .context("Failed to serialize the rule table")?;
            println!("{json}");
        }
    }
    Ok(ExitCode::SUCCESS)
}
