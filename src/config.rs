// Settings resolution for the bundle plugin

use crate::error::PluginError;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};

/// Raw key/value settings handed over by the host
///
/// Recognized keys are `src`, `out` and the optional `bundler`;
/// everything else is ignored.
pub type Settings = serde_json::Map<String, Value>;

/// Bundler executable used when the settings don't name one
pub const DEFAULT_BUNDLER: &str = "nwgebndl";

/// Resolved configuration for one build cycle
///
/// Built only by [`BundleConfig::resolve`]; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleConfig {
    /// Absolute path of the directory whose contents get bundled
    source_dir: PathBuf,

    /// Absolute path of the bundle artifact
    output_path: PathBuf,

    /// Bundler program name or path
    bundler: String,
}

impl BundleConfig {
    /// Validate and resolve host settings
    ///
    /// Relative paths are resolved against `base_dir`. The output's parent
    /// directory is created when missing, before the source directory is
    /// checked.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `src` or `out` is absent or not a
    /// string, or when the source directory does not exist. Returns
    /// `PluginError::Io` if the output's parent directory cannot be created.
    pub fn resolve(settings: &Settings, base_dir: &Path) -> Result<Self, PluginError> {
        let src = string_setting(settings, "src")?.ok_or(PluginError::MissingSource)?;
        let out = string_setting(settings, "out")?.ok_or(PluginError::MissingOutput)?;

        let bundler = match string_setting(settings, "bundler")? {
            Some(name) if name.trim().is_empty() => {
                return Err(PluginError::InvalidSetting {
                    key: "bundler".to_string(),
                    found: "an empty string".to_string(),
                })
            }
            Some(name) => name.to_string(),
            None => DEFAULT_BUNDLER.to_string(),
        };

        let base_dir = if base_dir.is_absolute() {
            base_dir.to_path_buf()
        } else {
            std::env::current_dir()?.join(base_dir)
        };
        let source_dir = resolve_path(src, &base_dir);
        let output_path = resolve_path(out, &base_dir);

        if let Some(parent) = output_path.parent() {
            if !parent.exists() {
                tracing::debug!(dir = %parent.display(), "Creating output directory");
                std::fs::create_dir_all(parent)?;
            }
        }

        if !source_dir.exists() {
            return Err(PluginError::SourceNotFound(source_dir));
        }
        if !source_dir.is_dir() {
            return Err(PluginError::SourceNotDirectory(source_dir));
        }

        Ok(Self {
            source_dir,
            output_path,
            bundler,
        })
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn bundler(&self) -> &str {
        &self.bundler
    }
}

fn string_setting<'a>(settings: &'a Settings, key: &str) -> Result<Option<&'a str>, PluginError> {
    match settings.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(PluginError::InvalidSetting {
            key: key.to_string(),
            found: describe(other).to_string(),
        }),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}

/// Expand `~`, anchor at `base_dir` and normalize
fn resolve_path(raw: &str, base_dir: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    let path = Path::new(&*expanded);
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base_dir.join(path))
    }
}

/// Normalize an absolute path without requiring it to exist
///
/// Every prefix that exists on disk is canonicalized, so symlinks are
/// resolved before a following `..` is applied. Components past the last
/// existing one are kept lexically.
pub fn normalize(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if let Ok(canonical) = resolved.canonicalize() {
                    resolved = canonical;
                }
            }
        }
    }
    resolved
}
