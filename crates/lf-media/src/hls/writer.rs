//! Atomic manifest writes.

use std::io::Write;
use std::path::Path;

/// Replace `path` with `contents` atomically.
///
/// The text is written to a temporary file in the same directory, flushed,
/// then renamed over `path`, so readers see either the old file, no file, or
/// the complete new file.
pub fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} has no parent directory", path.display()),
        )
    })?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".manifest-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.m3u8");
        write_atomic(&path, "#EXTM3U\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "#EXTM3U\n");
    }

    #[test]
    fn replaces_existing_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.m3u8");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, "new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["manifest.m3u8"]);
    }

    #[test]
    fn fails_when_directory_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone/manifest.m3u8");
        assert!(write_atomic(&path, "#EXTM3U\n").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn fails_when_target_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.m3u8");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();
        assert!(write_atomic(&path, "#EXTM3U\n").is_err());
        assert!(path.is_dir());
    }
}
