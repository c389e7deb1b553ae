//! Trip file discovery.
//!
//! Patterns are file-name prefixes with an optional trailing `*`
//! (`green*`, `yellow*`), matched against the entries of one directory.

use std::path::{Path, PathBuf};

use taxi_nbhd_trip_models::TaxiType;

use crate::TripError;

/// Default patterns: every green and yellow trip file.
pub const DEFAULT_PATTERNS: &[&str] = &["green*", "yellow*"];

/// A trip file and the fleet it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TripFile {
    /// Location on disk.
    pub path: PathBuf,
    /// Fleet inferred from the file name.
    pub taxi_type: TaxiType,
}

impl TripFile {
    /// Wraps `path`, inferring the fleet from its file name.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let taxi_type = path
            .file_name()
            .map_or(TaxiType::Yellow, |n| TaxiType::from_file_name(&n.to_string_lossy()));
        Self { path, taxi_type }
    }
}

/// Whether `name` matches a prefix pattern such as `green*`.
#[must_use]
pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    pattern
        .strip_suffix('*')
        .map_or_else(|| name == pattern, |prefix| name.starts_with(prefix))
}

/// Lists the regular files in `dir` matching any of `patterns`, grouped by
/// pattern order and sorted by name within each group.
///
/// # Errors
///
/// Returns [`TripError::Io`] if the directory cannot be read.
pub fn discover_trip_files<S: AsRef<str>>(
    dir: &Path,
    patterns: &[S],
) -> Result<Vec<TripFile>, TripError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    let mut files: Vec<TripFile> = Vec::new();
    for pattern in patterns {
        for name in &names {
            let path = dir.join(name);
            if matches_pattern(name, pattern.as_ref()) && !files.iter().any(|f| f.path == path) {
                files.push(TripFile::new(path));
            }
        }
    }

    log::info!("Found {} trip file(s) in {}", files.len(), dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_patterns_match() {
        assert!(matches_pattern("green_01_2015.gz", "green*"));
        assert!(!matches_pattern("yellow_01_2015.gz", "green*"));
        assert!(matches_pattern("exact.csv", "exact.csv"));
        assert!(!matches_pattern("exact.csv.gz", "exact.csv"));
    }

    #[test]
    fn discovers_files_in_pattern_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["yellow_02_2015.gz", "yellow_01_2015.gz", "green_01_2015.gz", "pd_locs.csv.gz"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("green_dir")).unwrap();

        let files = discover_trip_files(dir.path(), DEFAULT_PATTERNS).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["green_01_2015.gz", "yellow_01_2015.gz", "yellow_02_2015.gz"]
        );
        assert_eq!(files[0].taxi_type, TaxiType::Green);
        assert_eq!(files[1].taxi_type, TaxiType::Yellow);
    }

    #[test]
    fn overlapping_patterns_do_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("green_01.csv"), "").unwrap();
        let files = discover_trip_files(dir.path(), &["green*", "g*"]).unwrap();
        assert_eq!(files.len(), 1);
    }
}
