// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Key paths addressing nodes inside a build spec document.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::{Error, Result};

#[cfg(test)]
#[path = "./path_test.rs"]
mod path_test;

/// Separator used by `build.spec` key paths, as in `zones.manatee.source`.
pub const DEFAULT_SEPARATOR: char = '.';

/// A parsed key path.
///
/// The empty string parses to the root path, which addresses the whole
/// document. Every other path must consist of non-empty segments, so
/// `"a..b"`, `".a"` and `"a."` are all rejected.
///
/// Equality and hashing consider only the segments; the separator affects
/// display alone.
#[derive(Debug, Clone)]
pub struct KeyPath {
    segments: Vec<String>,
    separator: char,
}

impl KeyPath {
    /// The path addressing the document itself.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
            separator: DEFAULT_SEPARATOR,
        }
    }

    /// Parse a path using the default `.` separator.
    pub fn parse(path: &str) -> Result<Self> {
        Self::parse_with(path, DEFAULT_SEPARATOR)
    }

    /// Parse a path split on `separator`.
    ///
    /// Newer tooling uses `|` so that keys may themselves contain dots.
    pub fn parse_with(path: &str, separator: char) -> Result<Self> {
        if path.is_empty() {
            return Ok(Self {
                segments: Vec::new(),
                separator,
            });
        }

        let mut segments = Vec::new();
        for (index, segment) in path.split(separator).enumerate() {
            if segment.is_empty() {
                return Err(Error::InvalidKeyPath {
                    path: path.to_string(),
                    reason: format!("segment {} is empty", index + 1),
                });
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            segments,
            separator,
        })
    }

    /// Build a path from already-split keys.
    ///
    /// Keys are taken verbatim and may contain the separator.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            separator: DEFAULT_SEPARATOR,
        }
    }

    /// The path of a direct child of this node.
    pub fn child<S: Into<String>>(&self, key: S) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.into());
        Self {
            segments,
            separator: self.separator,
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Walk `document` one key at a time.
    ///
    /// Returns `None` when a key is absent or when an intermediate node is
    /// not an object. An explicit `null` at the end of the path is returned
    /// as `Some(&Value::Null)`.
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(document, |node, key| match node {
                Value::Object(map) => map.get(key),
                _ => None,
            })
    }
}

impl PartialEq for KeyPath {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for KeyPath {}

impl Hash for KeyPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments.hash(state);
    }
}

impl Default for KeyPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, "{}", self.separator)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for KeyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
