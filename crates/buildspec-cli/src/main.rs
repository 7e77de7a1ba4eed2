// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! buildspec - query layered build specification files

use std::path::PathBuf;

use buildspec::{BUILD_SPEC_FILENAME, BUILD_SPEC_LOCAL_FILENAME, LayerSource, SpecStack};
use clap::{Parser, Subcommand};
use miette::Result;

mod cmd_check;
mod cmd_feature;
mod cmd_get;
mod cmd_keys;
mod cmd_show;

#[cfg(test)]
#[path = "./main_test.rs"]
mod main_test;

use cmd_check::CmdCheck;
use cmd_feature::CmdFeature;
use cmd_get::CmdGet;
use cmd_keys::CmdKeys;
use cmd_show::CmdShow;

/// Exit code used when the build specs themselves cannot be loaded.
const EXIT_LOAD_FAILED: i32 = 3;

#[derive(Parser)]
#[clap(
    name = "buildspec",
    about = "Query layered build specification files",
    version,
    long_about = "Look up values in build.spec, with build.spec.local overriding it key by key"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(flatten)]
    spec: SpecFlags,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

/// Which files make up the build spec stack.
#[derive(Parser, Clone, Debug)]
pub struct SpecFlags {
    /// Directory containing build.spec and build.spec.local
    #[clap(
        short = 'C',
        long,
        env = "BUILDSPEC_ROOT",
        default_value = ".",
        global = true
    )]
    pub root: PathBuf,

    /// Base build spec [default: ROOT/build.spec]
    #[clap(short, long, env = "BUILDSPEC_FILE", global = true)]
    pub file: Option<PathBuf>,

    /// Local override file [default: ROOT/build.spec.local]
    #[clap(long, env = "BUILDSPEC_LOCAL", global = true)]
    pub local: Option<PathBuf>,

    /// Ignore the local override file
    #[clap(long, global = true)]
    pub no_local: bool,

    /// Separator between keys in paths given on the command line
    #[clap(long, default_value_t = buildspec::DEFAULT_SEPARATOR, global = true)]
    pub separator: char,
}

impl SpecFlags {
    /// Files to load, base first.
    pub fn sources(&self) -> Vec<LayerSource> {
        let base = self
            .file
            .clone()
            .unwrap_or_else(|| self.root.join(BUILD_SPEC_FILENAME));
        let mut sources = vec![LayerSource::required(base)];
        if !self.no_local {
            let local = self
                .local
                .clone()
                .unwrap_or_else(|| self.root.join(BUILD_SPEC_LOCAL_FILENAME));
            sources.push(LayerSource::optional(local));
        }
        sources
    }

    pub async fn load(&self) -> buildspec::Result<SpecStack> {
        let spec = SpecStack::load_async(&self.sources()).await?;
        Ok(spec.with_separator(self.separator))
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print the value of a key
    Get(CmdGet),

    /// List the keys below a path across all files
    Keys(CmdKeys),

    /// Report whether a feature is enabled
    Feature(CmdFeature),

    /// Display the loaded files and where a value comes from
    Show(CmdShow),

    /// Report keys that are no longer supported
    Check(CmdCheck),
}

impl Opt {
    async fn run(self) -> Result<i32> {
        // Setup logging
        let log_level = match (self.logging.quiet, self.logging.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();

        self.execute().await
    }

    /// Load the build specs and run the chosen command.
    async fn execute(self) -> Result<i32> {
        let spec = match self.spec.load().await {
            Ok(spec) => spec,
            Err(err) => {
                eprintln!("{:?}", miette::Report::new(err));
                return Ok(EXIT_LOAD_FAILED);
            }
        };
        tracing::info!(
            layers = spec.len(),
            separator = %spec.separator(),
            "loaded build specs"
        );

        // Dispatch to command
        match self.cmd {
            Command::Get(mut cmd) => cmd.run(&spec).await,
            Command::Keys(mut cmd) => cmd.run(&spec).await,
            Command::Feature(mut cmd) => cmd.run(&spec).await,
            Command::Show(mut cmd) => cmd.run(&spec).await,
            Command::Check(mut cmd) => cmd.run(&spec).await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run().await?;
    std::process::exit(code);
}
