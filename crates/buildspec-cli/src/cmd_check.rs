// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Report build spec keys that are no longer supported.

use buildspec::SpecStack;
use clap::Args;
use colored::Colorize;
use miette::Result;

#[cfg(test)]
#[path = "./cmd_check_test.rs"]
mod cmd_check_test;

/// Report keys that are no longer supported
#[derive(Debug, Args)]
pub struct CmdCheck {
    /// Print findings as JSON on stdout
    #[clap(long)]
    json: bool,
}

impl CmdCheck {
    pub async fn run(&mut self, spec: &SpecStack) -> Result<i32> {
        let findings = buildspec::check_migrations(spec);

        if self.json {
            let json = serde_json::to_string_pretty(&findings)
                .map_err(|e| miette::miette!("Failed to render findings: {e}"))?;
            println!("{json}");
        } else if findings.is_empty() {
            println!("✓ Build spec uses only supported keys");
        } else {
            eprintln!("{}", "Error: build spec uses keys that are no longer supported:".red());
            for finding in &findings {
                eprintln!();
                eprintln!("{}", finding.message);
            }
        }

        tracing::debug!(findings = findings.len(), "migration check complete");
        if findings.is_empty() { Ok(0) } else { Ok(1) }
    }
}
