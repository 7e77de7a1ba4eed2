// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for build spec operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience Result type with buildspec Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or querying build specs.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// A required build spec could not be read
    #[error("Could not read build spec {path:?}")]
    #[diagnostic(
        code(buildspec::load_failed),
        help("Check that the file exists and is readable")
    )]
    LoadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// A build spec was read but is not valid JSON
    #[error("Could not parse build spec {path:?}: {error}")]
    #[diagnostic(
        code(buildspec::parse_failed),
        help("Build spec files must contain a single valid JSON document")
    )]
    ParseFailed {
        path: PathBuf,
        #[source]
        error: serde_json::Error,
    },

    /// No layer defines the requested key
    #[error("Could not find value \"{path}\" in build specs")]
    #[diagnostic(
        code(buildspec::not_found),
        help("Define the key in build.spec, or in build.spec.local to override it locally")
    )]
    NotFound { path: String },

    /// Malformed key path
    #[error("Invalid key path \"{path}\": {reason}")]
    #[diagnostic(code(buildspec::invalid_key_path))]
    InvalidKeyPath { path: String, reason: String },

    /// A value exists but does not have the expected shape
    #[error("Invalid value for \"{path}\": {reason}")]
    #[diagnostic(code(buildspec::invalid_value))]
    InvalidValue { path: String, reason: String },

    /// Feature is not declared under "features"
    #[error("Feature \"{0}\" not found in build specification")]
    #[diagnostic(
        code(buildspec::feature_not_found),
        help("Declare the feature under the \"features\" key with an \"enabled\" flag")
    )]
    FeatureNotFound(String),

    /// Environment variable required but not set
    #[error("Environment variable {0} was not set")]
    #[diagnostic(code(buildspec::env_not_set))]
    EnvNotSet(String),

    /// Environment variable holds something other than a boolean word
    #[error("Value \"{value}\" is not valid for environment variable {var}")]
    #[diagnostic(
        code(buildspec::invalid_env_value),
        help("Use one of: yes, y, 1, true, no, n, 0, false")
    )]
    InvalidEnvValue { var: String, value: String },
}
