//! Gzip-aware file access and atomic writes.
//!
//! Whether a file is compressed is decided by its extension: anything
//! ending in `.gz` is read with a multi-member gzip decoder and written
//! with a gzip encoder.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

/// Whether `path` names a gzip-compressed file.
#[must_use]
pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Opens `path` for buffered reading, decompressing gzip input.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened.
pub fn open_reader(path: &Path) -> io::Result<Box<dyn Read>> {
    let file = BufReader::new(File::open(path)?);
    if is_gzip(path) {
        Ok(Box::new(MultiGzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Sibling temporary path used while `path` is being written.
#[must_use]
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "output".to_string(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Writes `path` atomically.
///
/// `write` receives a writer for a temporary sibling file (gzip-encoded
/// when `path` ends in `.gz`). Only after `write` succeeds and the data is
/// synced is the temporary renamed over `path`. On any failure the
/// temporary is removed and `path` is left untouched.
///
/// # Errors
///
/// Returns the closure's error, or an I/O error converted into `E` if
/// creating, flushing, syncing, or renaming the file fails.
pub fn write_atomic<E, F>(path: &Path, write: F) -> Result<(), E>
where
    E: From<io::Error>,
    F: FnOnce(&mut dyn Write) -> Result<(), E>,
{
    if let Some(parent) = path.parent() {
        crate::paths::ensure_dir(parent)?;
    }

    let tmp_path = temp_path_for(path);
    let result = write_file(&tmp_path, is_gzip(path), write)
        .and_then(|()| fs::rename(&tmp_path, path).map_err(E::from));

    if result.is_err() {
        if let Err(e) = fs::remove_file(&tmp_path) {
            log::debug!("Could not remove {}: {e}", tmp_path.display());
        }
    }

    result
}

fn write_file<E, F>(path: &Path, gzip: bool, write: F) -> Result<(), E>
where
    E: From<io::Error>,
    F: FnOnce(&mut dyn Write) -> Result<(), E>,
{
    let mut out = BufWriter::new(File::create(path)?);

    if gzip {
        let mut encoder = GzEncoder::new(&mut out, Compression::default());
        write(&mut encoder)?;
        encoder.finish()?;
    } else {
        write(&mut out)?;
    }

    let file = out.into_inner().map_err(io::IntoInnerError::into_error)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(path: &Path) -> String {
        let mut text = String::new();
        open_reader(path).unwrap().read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn detects_gzip_by_extension() {
        assert!(is_gzip(Path::new("pd_locs.csv.gz")));
        assert!(is_gzip(Path::new("yellow_01_2015.GZ")));
        assert!(!is_gzip(Path::new("pd_locs.csv")));
    }

    #[test]
    fn writes_and_reads_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.csv");
        write_atomic::<io::Error, _>(&path, |w| w.write_all(b"a,b\n1,2\n")).unwrap();
        assert_eq!(read_all(&path), "a,b\n1,2\n");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn writes_and_reads_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("packed.csv.gz");
        write_atomic::<io::Error, _>(&path, |w| w.write_all(b"hello")).unwrap();

        let raw = fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
        assert_eq!(read_all(&path), "hello");
    }

    #[test]
    fn failed_write_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        let result = write_atomic::<io::Error, _>(&path, |w| {
            w.write_all(b"partial")?;
            Err(io::Error::other("boom"))
        });
        assert!(result.is_err());
        assert!(!path.exists());
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn failed_write_keeps_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kept.csv");
        fs::write(&path, "old").unwrap();
        let result =
            write_atomic::<io::Error, _>(&path, |_| Err(io::Error::other("boom")));
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }
}
