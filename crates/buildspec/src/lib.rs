// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! buildspec - Layered build specification files
//!
//! This crate loads a stack of JSON build specs (normally a checked-in
//! `build.spec` and an optional, uncommitted `build.spec.local`) and answers
//! key path queries against them.
//!
//! # Overview
//!
//! Files are consulted in reverse of the order in which they are loaded, so
//! the local file overrides the base file one key at a time. A lookup
//! returns the value from the first file that defines the full path; nested
//! objects are never merged. Enumerating the keys below a path returns the
//! union across all files, which lets the local file add new entries to a
//! collection without copying the rest of it.
//!
//! # Example
//!
//! ```json
//! // build.spec
//! {
//!     "bits-branch": "master",
//!     "zones": {
//!         "sapi": { "jobname": "sdc-sapi", "branch": "master" }
//!     }
//! }
//! ```
//!
//! ```json
//! // build.spec.local
//! {
//!     "zones": {
//!         "sapi": { "branch": "my-feature" }
//!     }
//! }
//! ```
//!
//! Here `zones.sapi.branch` resolves to `"my-feature"` while
//! `zones.sapi.jobname` still resolves to `"sdc-sapi"`.

pub mod error;
pub mod feature;
pub mod layer;
pub mod load;
pub mod migrate;
pub mod path;
pub mod stack;

pub use error::{Error, Result};
pub use feature::env_to_bool;
pub use layer::Layer;
pub use load::{LayerSource, build_spec_sources, load_build_spec, load_build_specs};
pub use migrate::{Finding, FindingKind, check_migrations};
pub use path::{DEFAULT_SEPARATOR, KeyPath};
pub use stack::{Resolved, SpecStack, SpecStackBuilder};

/// Well-known filename for the base build spec.
pub const BUILD_SPEC_FILENAME: &str = "build.spec";

/// Well-known filename for local overrides.
pub const BUILD_SPEC_LOCAL_FILENAME: &str = "build.spec.local";
