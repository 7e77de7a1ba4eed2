// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `buildspec keys` command.

use buildspec::SpecStack;
use clap::Args;
use miette::Result;

/// List the keys below a path across all files
#[derive(Debug, Args)]
pub struct CmdKeys {
    /// Key path of an object, e.g. zones [default: the top level]
    #[clap(default_value = "")]
    path: String,
}

impl CmdKeys {
    pub async fn run(&mut self, spec: &SpecStack) -> Result<i32> {
        for key in spec.keys(&self.path)? {
            println!("{key}");
        }
        Ok(0)
    }
}
