#![allow(clippy::module_name_repetitions)]
//! Canonical artifact names inside the data directory.
//!
//! Every stage reads and writes relative to one data directory (default
//! `data/`, overridable from the CLI or config file).

use std::path::{Path, PathBuf};

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Per-neighborhood centroid table.
pub const CENTROIDS_FILE: &str = "nbhd_centroids.csv.gz";

/// Deduplicated neighborhood border vertices.
pub const BORDERS_FILE: &str = "nbhd_borders.csv.gz";

/// Resolved-location cache (rounded coordinate to neighborhood).
pub const LOCATIONS_FILE: &str = "pd_locs.csv.gz";

/// Passengers by rounded pickup location, day of week, and hour.
pub const PICKUPS_HD_FILE: &str = "pickups_hd.csv.gz";

/// Passengers by hour and rounded pickup location.
pub const PICKUPS_HR_FILE: &str = "pickups_hr.csv.gz";

/// Per-date, per-taxi-type trip statistics.
pub const DATE_AVGS_FILE: &str = "date_avgs.csv.gz";

/// Passengers by neighborhood, date, and hour with calendar context.
pub const PICKUPS_HDL_FILE: &str = "pickups_hdl.csv.gz";

/// Path of the centroid table in `data_dir`.
#[must_use]
pub fn centroids_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CENTROIDS_FILE)
}

/// Path of the border table in `data_dir`.
#[must_use]
pub fn borders_path(data_dir: &Path) -> PathBuf {
    data_dir.join(BORDERS_FILE)
}

/// Path of the resolved-location cache in `data_dir`.
#[must_use]
pub fn locations_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOCATIONS_FILE)
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifacts_live_in_data_dir() {
        let dir = Path::new("out");
        assert_eq!(locations_path(dir), PathBuf::from("out/pd_locs.csv.gz"));
        assert_eq!(centroids_path(dir), PathBuf::from("out/nbhd_centroids.csv.gz"));
        assert_eq!(borders_path(dir), PathBuf::from("out/nbhd_borders.csv.gz"));
    }
}
