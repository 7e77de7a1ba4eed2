// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Feature flags declared under the `features` key.
//!
//! ```json
//! {
//!     "features": {
//!         "debug-platform": { "enabled": false, "env": "DEBUG_BUILD" }
//!     }
//! }
//! ```
//!
//! The `enabled` flag is the default. When `env` names an environment
//! variable that is set to a non-empty value, that value wins.

use serde_json::Value;

use crate::{Error, KeyPath, Result, SpecStack};

#[cfg(test)]
#[path = "./feature_test.rs"]
mod feature_test;

const FEATURES_KEY: &str = "features";

const NAMES_TRUE: &[&str] = &["yes", "y", "1", "true"];
const NAMES_FALSE: &[&str] = &["no", "n", "0", "false"];

/// Interpret the value of environment variable `var` as a boolean.
///
/// An unset or empty value falls back to `value_if_missing`, failing with
/// [`Error::EnvNotSet`] when there is no fallback.
pub fn env_to_bool(
    var: &str,
    value: Option<&str>,
    value_if_missing: Option<bool>,
) -> Result<bool> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return value_if_missing.ok_or_else(|| Error::EnvNotSet(var.to_string()));
    };

    let value = value.trim().to_lowercase();
    if NAMES_TRUE.contains(&value.as_str()) {
        Ok(true)
    } else if NAMES_FALSE.contains(&value.as_str()) {
        Ok(false)
    } else {
        Err(Error::InvalidEnvValue {
            var: var.to_string(),
            value,
        })
    }
}

impl SpecStack {
    /// Whether the named feature is active, consulting the process
    /// environment for overrides.
    pub fn feature(&self, name: &str) -> Result<bool> {
        self.feature_with_env(name, |var| std::env::var(var).ok())
    }

    /// Whether the named feature is active, reading environment variables
    /// through `lookup`.
    pub fn feature_with_env<F>(&self, name: &str, lookup: F) -> Result<bool>
    where
        F: Fn(&str) -> Option<String>,
    {
        let features = KeyPath::from_segments([FEATURES_KEY]);
        if !self.child_keys(&features).iter().any(|k| k == name) {
            return Err(Error::FeatureNotFound(name.to_string()));
        }
        let feature = features.child(name);

        let enabled_path = feature.child("enabled");
        let enabled = match self.resolve(&enabled_path).map(|r| r.value) {
            Some(Value::Bool(enabled)) => *enabled,
            Some(other) => {
                return Err(Error::InvalidValue {
                    path: enabled_path.to_string(),
                    reason: format!("expected a boolean, found {other}"),
                });
            }
            None => {
                return Err(Error::NotFound {
                    path: enabled_path.to_string(),
                });
            }
        };

        let env_path = feature.child("env");
        let var = match self.resolve(&env_path).map(|r| r.value) {
            None | Some(Value::Null) => return Ok(enabled),
            Some(Value::String(var)) => var,
            Some(other) => {
                return Err(Error::InvalidValue {
                    path: env_path.to_string(),
                    reason: format!("expected an environment variable name, found {other}"),
                });
            }
        };

        let value = lookup(var);
        let active = env_to_bool(var, value.as_deref(), Some(enabled))?;
        tracing::debug!(feature = name, env = %var, default = enabled, active, "resolved feature");
        Ok(active)
    }

    /// Names of all declared features that are active, sorted.
    pub fn enabled_features(&self) -> Result<Vec<String>> {
        self.enabled_features_with_env(|var| std::env::var(var).ok())
    }

    /// [`SpecStack::enabled_features`] with an injected environment.
    pub fn enabled_features_with_env<F>(&self, lookup: F) -> Result<Vec<String>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut enabled = Vec::new();
        for name in self.child_keys(&KeyPath::from_segments([FEATURES_KEY])) {
            if self.feature_with_env(&name, &lookup)? {
                enabled.push(name);
            }
        }
        Ok(enabled)
    }
}
