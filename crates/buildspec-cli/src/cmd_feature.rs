// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `buildspec feature` command.

use buildspec::SpecStack;
use clap::Args;
use miette::Result;

/// Report whether a feature is enabled
#[derive(Debug, Args)]
pub struct CmdFeature {
    /// Feature name as declared under "features"
    name: Option<String>,

    /// List every enabled feature instead
    #[clap(long, conflicts_with = "name")]
    enabled: bool,
}

impl CmdFeature {
    pub async fn run(&mut self, spec: &SpecStack) -> Result<i32> {
        if self.enabled {
            for name in spec.enabled_features()? {
                println!("{name}");
            }
            return Ok(0);
        }

        let Some(name) = &self.name else {
            return Err(miette::miette!(
                "Must provide a feature name, or --enabled to list them"
            ));
        };
        println!("{}", spec.feature(name)?);
        Ok(0)
    }
}
