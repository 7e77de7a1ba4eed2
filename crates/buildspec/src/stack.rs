// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! A merged, read-only view over a stack of build spec layers.

use std::collections::BTreeSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::path::DEFAULT_SEPARATOR;
use crate::{Error, KeyPath, Layer, Result};

#[cfg(test)]
#[path = "./stack_test.rs"]
mod stack_test;

/// A value found in the stack together with the layer that defined it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'a> {
    pub value: &'a Value,
    pub layer: &'a Layer,
}

/// Collects layers in load order and produces a [`SpecStack`].
#[derive(Debug, Clone)]
pub struct SpecStackBuilder {
    loaded: Vec<Layer>,
    separator: char,
}

impl Default for SpecStackBuilder {
    fn default() -> Self {
        Self {
            loaded: Vec::new(),
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl SpecStackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer that overrides every layer pushed before it.
    pub fn push(mut self, layer: Layer) -> Self {
        self.loaded.push(layer);
        self
    }

    /// Separator used when parsing string key paths.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn build(self) -> SpecStack {
        let mut layers = self.loaded;
        layers.reverse();
        SpecStack {
            layers,
            separator: self.separator,
        }
    }
}

/// Layered build specs, consulted in reverse of the order they were loaded.
///
/// Scalar lookups return the value from the first layer that defines the
/// full path and never merge nested objects. Key enumeration is the union
/// over every layer, which lets an override add an entry to a collection
/// without repeating the entries already present below it:
///
/// ```
/// # use buildspec::{Layer, SpecStack};
/// # use serde_json::json;
/// let stack = SpecStack::builder()
///     .push(Layer::new("build.spec", json!({"zones": {"sapi": {"jobname": "sapi"}}})))
///     .push(Layer::new("build.spec.local", json!({"zones": {"vmapi": {"jobname": "vmapi"}}})))
///     .build();
///
/// for zone in stack.keys("zones")? {
///     let jobname = stack.get(&format!("zones.{zone}.jobname"))?;
///     println!("{zone}: {jobname}");
/// }
/// # Ok::<(), buildspec::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SpecStack {
    /// Highest precedence first.
    layers: Vec<Layer>,
    separator: char,
}

impl Default for SpecStack {
    fn default() -> Self {
        SpecStackBuilder::default().build()
    }
}

impl SpecStack {
    pub fn builder() -> SpecStackBuilder {
        SpecStackBuilder::new()
    }

    /// Use `separator` when parsing string key paths.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Layers in precedence order, highest first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Source files in precedence order, highest first.
    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.layers.iter().map(Layer::source)
    }

    /// Parse a string key path with this stack's separator.
    pub fn key_path(&self, path: &str) -> Result<KeyPath> {
        KeyPath::parse_with(path, self.separator)
    }

    /// Find the first layer defining `path`.
    pub fn resolve(&self, path: &KeyPath) -> Option<Resolved<'_>> {
        let found = self.layers.iter().find_map(|layer| {
            layer
                .resolve(path)
                .map(|value| Resolved { value, layer })
        });
        if let Some(resolved) = &found {
            tracing::trace!(
                path = %path,
                source = %resolved.layer.source().display(),
                "resolved build spec value"
            );
        }
        found
    }

    /// Union of the child keys of every object found at `path`, sorted.
    pub fn child_keys(&self, path: &KeyPath) -> Vec<String> {
        let keys: BTreeSet<&str> = self
            .layers
            .iter()
            .filter_map(|layer| match layer.resolve(path) {
                Some(Value::Object(map)) => Some(map.keys().map(String::as_str)),
                _ => None,
            })
            .flatten()
            .collect();
        keys.into_iter().map(String::from).collect()
    }

    /// Value at `path` from the highest precedence layer defining it.
    ///
    /// Fails with [`Error::NotFound`] when no layer defines the path.
    pub fn get(&self, path: &str) -> Result<&Value> {
        let key_path = self.key_path(path)?;
        self.resolve(&key_path)
            .map(|resolved| resolved.value)
            .ok_or_else(|| Error::NotFound {
                path: path.to_string(),
            })
    }

    /// Like [`SpecStack::get`], but absence is `Ok(None)`.
    ///
    /// An explicit `null` in a layer is `Ok(Some(&Value::Null))`.
    pub fn get_optional(&self, path: &str) -> Result<Option<&Value>> {
        let key_path = self.key_path(path)?;
        Ok(self.resolve(&key_path).map(|resolved| resolved.value))
    }

    /// Deserialize the value at `path` into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.get(path)?;
        T::deserialize(value).map_err(|err| Error::InvalidValue {
            path: path.to_string(),
            reason: err.to_string(),
        })
    }

    /// Like [`SpecStack::get_optional`], also reporting which layer
    /// supplied the value.
    pub fn lookup(&self, path: &str) -> Result<Option<Resolved<'_>>> {
        let key_path = self.key_path(path)?;
        Ok(self.resolve(&key_path))
    }

    /// Sorted, deduplicated child keys of `path` across all layers.
    ///
    /// Layers where `path` is absent or is not an object are skipped.
    pub fn keys(&self, path: &str) -> Result<Vec<String>> {
        let key_path = self.key_path(path)?;
        Ok(self.child_keys(&key_path))
    }
}
