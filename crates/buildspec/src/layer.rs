// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! A single build spec document and the file it came from.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::KeyPath;

#[cfg(test)]
#[path = "./layer_test.rs"]
mod layer_test;

/// One parsed build spec file.
///
/// The document shape is not validated; any JSON value is accepted and
/// lookups simply fail to resolve through non-object nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    source: PathBuf,
    document: Value,
}

impl Layer {
    /// Create a layer from an already-parsed document.
    ///
    /// The source is used only for diagnostics and need not exist on disk.
    pub fn new<P: Into<PathBuf>>(source: P, document: Value) -> Self {
        Self {
            source: source.into(),
            document,
        }
    }

    /// Parse layer content read from `source`.
    ///
    /// Invalid UTF-8 is reported as a parse failure.
    pub fn from_slice<P: AsRef<Path>>(source: P, content: &[u8]) -> crate::Result<Self> {
        let source = source.as_ref();
        let document =
            serde_json::from_slice(content).map_err(|error| crate::Error::ParseFailed {
                path: source.to_path_buf(),
                error,
            })?;
        Ok(Self::new(source, document))
    }

    /// Where this layer was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The value at `path` in this layer alone.
    pub fn resolve(&self, path: &KeyPath) -> Option<&Value> {
        path.resolve(&self.document)
    }
}
