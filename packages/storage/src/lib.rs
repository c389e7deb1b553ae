#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! File-level plumbing shared by every pipeline stage.
//!
//! [`paths`] names the artifacts inside the data directory and [`io`]
//! opens them, transparently handling gzip by file extension. All outputs
//! are written through [`io::write_atomic`] so a failed run never leaves a
//! truncated artifact behind.

pub mod io;
pub mod paths;
