#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood boundary source types.
//!
//! Defines which feature properties carry the neighborhood and borough
//! names. Deserialized from the `[properties]` table of the pipeline
//! config file.

use serde::{Deserialize, Serialize};

/// Property names used to label each boundary feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborhoodFieldMapping {
    /// Property holding the neighborhood name.
    pub neighborhood: String,
    /// Property holding the borough name.
    pub borough: String,
}

impl Default for NeighborhoodFieldMapping {
    fn default() -> Self {
        Self {
            neighborhood: "neighborhood".to_string(),
            borough: "borough".to_string(),
        }
    }
}
