// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `buildspec show` command.

use buildspec::SpecStack;
use clap::Args;
use colored::Colorize;
use miette::Result;
use serde::Serialize;
use serde_json::Value;

#[cfg(test)]
#[path = "./cmd_show_test.rs"]
mod cmd_show_test;

/// Display the loaded files and where a value comes from
#[derive(Debug, Args)]
pub struct CmdShow {
    /// Key path to resolve
    path: Option<String>,

    /// Output format: table, yaml, json
    #[clap(long, default_value = "table")]
    format: String,
}

/// Everything `show` prints, in precedence order.
#[derive(Debug, Serialize, PartialEq)]
pub struct ShowReport {
    pub layers: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedReport>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ResolvedReport {
    pub path: String,

    /// File that supplied the value, if any file defines the path.
    pub source: Option<String>,
    pub value: Option<Value>,

    /// Union of child keys across all files.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
}

impl CmdShow {
    pub async fn run(&mut self, spec: &SpecStack) -> Result<i32> {
        let report = build_report(spec, self.path.as_deref())?;

        match self.format.as_str() {
            "yaml" => {
                let yaml = serde_yaml::to_string(&report)
                    .map_err(|e| miette::miette!("Failed to render yaml: {e}"))?;
                print!("{yaml}");
            }
            "json" => {
                let json = serde_json::to_string_pretty(&report)
                    .map_err(|e| miette::miette!("Failed to render json: {e}"))?;
                println!("{json}");
            }
            _ => self.show_table(&report)?,
        }

        Ok(0)
    }

    fn show_table(&self, report: &ShowReport) -> Result<()> {
        println!("{}", "Build Spec Layers:".bold());
        println!();

        if report.layers.is_empty() {
            println!("  {}", "(no layers)".dimmed());
        } else {
            for (i, layer) in report.layers.iter().enumerate() {
                let marker = if i == 0 && report.layers.len() > 1 {
                    " [highest precedence]"
                } else {
                    ""
                };
                println!("  {}. {}{}", i + 1, layer.cyan(), marker.yellow());
            }
        }

        println!();
        println!("Total: {} layer(s)", report.layers.len());

        let Some(resolved) = &report.resolved else {
            return Ok(());
        };

        println!();
        println!("{} {}", "Value of".bold(), resolved.path.green());
        println!();
        match (&resolved.value, &resolved.source) {
            (Some(value), Some(source)) => {
                println!("  from {}", source.cyan());
                let rendered = serde_json::to_string_pretty(value)
                    .map_err(|e| miette::miette!("Failed to render value: {e}"))?;
                for line in rendered.lines() {
                    println!("  {line}");
                }
            }
            _ => println!("  {}", "(not defined in any layer)".dimmed()),
        }

        if !resolved.keys.is_empty() {
            println!();
            println!("{}", "Keys:".bold());
            for key in &resolved.keys {
                println!("  - {key}");
            }
        }

        Ok(())
    }
}

/// Collect the layers and, when `path` is given, the value it resolves to.
pub fn build_report(spec: &SpecStack, path: Option<&str>) -> Result<ShowReport> {
    let layers = spec
        .sources()
        .map(|source| source.display().to_string())
        .collect();

    let resolved = match path {
        None => None,
        Some(path) => {
            let found = spec.lookup(path)?;
            Some(ResolvedReport {
                path: path.to_string(),
                source: found.map(|r| r.layer.source().display().to_string()),
                value: found.map(|r| r.value.clone()),
                keys: spec.keys(path)?,
            })
        }
    };

    Ok(ShowReport { layers, resolved })
}
