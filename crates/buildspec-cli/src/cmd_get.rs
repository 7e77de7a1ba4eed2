// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `buildspec get` command.

use buildspec::SpecStack;
use clap::Args;
use miette::Result;
use serde_json::Value;

#[cfg(test)]
#[path = "./cmd_get_test.rs"]
mod cmd_get_test;

/// Print the value of a key
#[derive(Debug, Args)]
pub struct CmdGet {
    /// Key path to look up, e.g. zones.manatee.source
    path: String,

    /// Print nothing instead of failing when no file defines the key
    #[clap(long)]
    optional: bool,

    /// Print strings as JSON instead of raw text
    #[clap(long)]
    json: bool,
}

impl CmdGet {
    pub async fn run(&mut self, spec: &SpecStack) -> Result<i32> {
        let value = if self.optional {
            spec.get_optional(&self.path)?
        } else {
            Some(spec.get(&self.path)?)
        };

        if let Some(value) = value {
            println!("{}", render_value(value, self.json)?);
        }

        Ok(0)
    }
}

/// Strings print as-is unless `json` is set; everything else prints as JSON.
pub fn render_value(value: &Value, json: bool) -> Result<String> {
    match value {
        Value::String(s) if !json => Ok(s.clone()),
        other => serde_json::to_string_pretty(other)
            .map_err(|e| miette::miette!("Failed to render value: {e}")),
    }
}
