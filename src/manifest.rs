// Plugin manifest parsing (bundle.toml)

use crate::config::Settings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default manifest file name
pub const MANIFEST_FILE: &str = "bundle.toml";

/// Parsed bundle.toml
///
/// ```toml
/// [bundle]
/// src = "assets"
/// out = "build/assets.bndl"
/// ```
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Settings handed to `configure`
    settings: Settings,

    /// Directory the manifest was read from
    base_dir: PathBuf,
}

/// On-disk shape; the table stays loosely typed so unknown keys pass
/// through and type errors surface as configuration errors
#[derive(Debug, Deserialize)]
struct RawManifest {
    bundle: Option<Settings>,
}

impl Manifest {
    /// Parse bundle.toml from a file path
    ///
    /// Relative paths in the manifest resolve against the manifest's directory.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::parse(&content, path, base_dir)
    }

    /// Parse bundle.toml from a string; relative paths resolve against `.`
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        Self::parse(content, Path::new("<string>"), PathBuf::from("."))
    }

    fn parse(content: &str, path: &Path, base_dir: PathBuf) -> Result<Self, ManifestError> {
        let raw: RawManifest = toml::from_str(content).map_err(|e| ManifestError::Toml {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let settings = raw.bundle.ok_or_else(|| ManifestError::MissingTable {
            path: path.to_path_buf(),
        })?;
        Ok(Self { settings, base_dir })
    }

    /// Settings from the `[bundle]` table
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// Errors while reading a manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read {path}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse {path}: {error}")]
    Toml { path: PathBuf, error: String },

    #[error("{path} has no [bundle] table")]
    MissingTable { path: PathBuf },
}
