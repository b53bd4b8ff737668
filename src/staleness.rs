// Timestamp-based staleness detection

use crate::config::BundleConfig;
use std::path::PathBuf;
use std::time::SystemTime;

/// Verdict of a staleness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// The bundle artifact does not exist yet
    MissingOutput,

    /// A source entry was modified after the bundle
    NewerEntry {
        path: PathBuf,
        modified: SystemTime,
        bundled: SystemTime,
    },

    /// No source entry is newer than the bundle
    UpToDate { bundled: SystemTime },
}

impl Staleness {
    /// Whether the bundle has to be regenerated
    pub fn is_stale(&self) -> bool {
        !matches!(self, Staleness::UpToDate { .. })
    }
}

/// Compare the bundle's mtime against the source directory's entries
///
/// Only immediate children of the source directory are inspected; nested
/// directories count by their own mtime. An entry is newer only when its
/// mtime is strictly greater than the bundle's, so equal timestamps are
/// up to date. Metadata follows symlinks.
///
/// # Errors
///
/// Returns any I/O error raised while reading the directory or metadata.
pub fn check(config: &BundleConfig) -> std::io::Result<Staleness> {
    let output = config.output_path();
    if !output.exists() {
        tracing::debug!(output = %output.display(), "Bundle missing");
        return Ok(Staleness::MissingOutput);
    }

    let bundled = std::fs::metadata(output)?.modified()?;

    for entry in std::fs::read_dir(config.source_dir())? {
        let path = entry?.path();
        let modified = std::fs::metadata(&path)?.modified()?;
        if modified > bundled {
            tracing::debug!(entry = %path.display(), "Source entry newer than bundle");
            return Ok(Staleness::NewerEntry {
                path,
                modified,
                bundled,
            });
        }
    }

    tracing::debug!(output = %output.display(), "Bundle up to date");
    Ok(Staleness::UpToDate { bundled })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use std::fs::File;
    use std::path::Path;
    use std::time::Duration;

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn setup() -> (tempfile::TempDir, BundleConfig) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        let mut settings = Settings::new();
        settings.insert("src".into(), "src".into());
        settings.insert("out".into(), "out/bundle.bndl".into());
        let config = BundleConfig::resolve(&settings, dir.path()).unwrap();
        (dir, config)
    }

    #[test]
    fn missing_output_is_stale() {
        let (_dir, config) = setup();
        let verdict = check(&config).unwrap();
        assert_eq!(verdict, Staleness::MissingOutput);
        assert!(verdict.is_stale());
    }

    #[test]
    fn empty_source_with_output_is_up_to_date() {
        let (_dir, config) = setup();
        std::fs::write(config.output_path(), b"bundle").unwrap();
        assert!(!check(&config).unwrap().is_stale());
    }

    #[test]
    fn equal_timestamps_are_up_to_date() {
        let (_dir, config) = setup();
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let entry = config.source_dir().join("a.txt");
        std::fs::write(&entry, b"a").unwrap();
        std::fs::write(config.output_path(), b"bundle").unwrap();
        set_mtime(&entry, t);
        set_mtime(config.output_path(), t);

        assert!(!check(&config).unwrap().is_stale());
    }

    #[test]
    fn newer_entry_is_stale() {
        let (_dir, config) = setup();
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let old = config.source_dir().join("old.txt");
        let new = config.source_dir().join("new.txt");
        std::fs::write(&old, b"o").unwrap();
        std::fs::write(&new, b"n").unwrap();
        std::fs::write(config.output_path(), b"bundle").unwrap();
        set_mtime(&old, t - Duration::from_secs(5));
        set_mtime(&new, t + Duration::from_secs(10));
        set_mtime(config.output_path(), t);

        match check(&config).unwrap() {
            Staleness::NewerEntry { path, .. } => assert_eq!(path, new),
            other => panic!("expected NewerEntry, got {other:?}"),
        }
    }

    #[test]
    fn nested_entries_are_not_scanned() {
        let (_dir, config) = setup();
        let nested_dir = config.source_dir().join("nested");
        std::fs::create_dir(&nested_dir).unwrap();
        let deep = nested_dir.join("deep.txt");
        std::fs::write(&deep, b"d").unwrap();
        std::fs::write(config.output_path(), b"bundle").unwrap();

        // Bundle sits after the directory's own mtime, the deep file after both
        let t = SystemTime::now() + Duration::from_secs(1_000);
        set_mtime(config.output_path(), t);
        set_mtime(&deep, t + Duration::from_secs(100));

        assert!(!check(&config).unwrap().is_stale());
    }
}
