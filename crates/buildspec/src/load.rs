// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Loading build spec files into a [`SpecStack`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{BUILD_SPEC_FILENAME, BUILD_SPEC_LOCAL_FILENAME, Error, Layer, Result, SpecStack};

#[cfg(test)]
#[path = "./load_test.rs"]
mod load_test;

/// One file to load into a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSource {
    pub path: PathBuf,

    /// Skip the layer if the file does not exist.
    pub optional: bool,
}

impl LayerSource {
    pub fn required<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            optional: false,
        }
    }

    pub fn optional<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            optional: true,
        }
    }

    /// Turn the outcome of reading this file into a layer.
    ///
    /// Only a missing optional file is skipped; any other read error is
    /// fatal regardless of `optional`.
    fn parse_content(&self, content: std::io::Result<Vec<u8>>) -> Result<Option<Layer>> {
        match content {
            Ok(content) => {
                let layer = Layer::from_slice(&self.path, &content)?;
                tracing::debug!(path = %self.path.display(), "loaded build spec");
                Ok(Some(layer))
            }
            Err(error) if self.optional && error.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "optional build spec not found, skipping");
                Ok(None)
            }
            Err(error) => Err(Error::LoadFailed {
                path: self.path.clone(),
                error,
            }),
        }
    }
}

impl SpecStack {
    /// Load `sources` in order; the last one loaded is consulted first.
    ///
    /// Any failure aborts the whole load and no stack is returned.
    pub fn load(sources: &[LayerSource]) -> Result<Self> {
        let mut builder = SpecStack::builder();
        for source in sources {
            if let Some(layer) = source.parse_content(std::fs::read(&source.path))? {
                builder = builder.push(layer);
            }
        }
        Ok(builder.build())
    }

    /// Asynchronous [`SpecStack::load`].
    ///
    /// Each file is read to completion before the next is attempted.
    #[cfg(feature = "async")]
    pub async fn load_async(sources: &[LayerSource]) -> Result<Self> {
        let mut builder = SpecStack::builder();
        for source in sources {
            let content = tokio::fs::read(&source.path).await;
            if let Some(layer) = source.parse_content(content)? {
                builder = builder.push(layer);
            }
        }
        Ok(builder.build())
    }
}

/// The conventional pair of sources under `root`: `build.spec`, then an
/// optional `build.spec.local` that overrides it.
pub fn build_spec_sources<P: AsRef<Path>>(root: P) -> Vec<LayerSource> {
    let root = root.as_ref();
    vec![
        LayerSource::required(root.join(BUILD_SPEC_FILENAME)),
        LayerSource::optional(root.join(BUILD_SPEC_LOCAL_FILENAME)),
    ]
}

/// Load `build.spec` and `build.spec.local` from `root`.
pub fn load_build_specs<P: AsRef<Path>>(root: P) -> Result<SpecStack> {
    SpecStack::load(&build_spec_sources(root))
}

/// Load a single required build spec file.
pub fn load_build_spec<P: AsRef<Path>>(path: P) -> Result<SpecStack> {
    SpecStack::load(&[LayerSource::required(path.as_ref())])
}
