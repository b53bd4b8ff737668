// Error types for the bundle plugin

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`PluginError`]
///
/// Hosts branch on this instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Settings were missing, malformed, or pointed at nothing
    Configuration,

    /// A phase was invoked before `configure` succeeded
    NotConfigured,

    /// The external bundler could not be run or reported failure
    Tool,

    /// Filesystem error while inspecting or deleting artifacts
    Io,
}

/// Unified error type for plugin phases
///
/// Each variant carries a human-readable message (its `Display`) and,
/// where one exists, a remediation hint available through [`PluginError::hint`].
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("No bundle source directory is defined.")]
    MissingSource,

    #[error("No output bundle is defined.")]
    MissingOutput,

    #[error("Setting '{key}' must be a path string, got {found}.")]
    InvalidSetting { key: String, found: String },

    #[error("Bundle source directory `{}` does not exist.", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Bundle source `{}` is not a directory.", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("Plugin has not been configured")]
    NotConfigured,

    #[error("Bundling failed: {0}")]
    Bundle(#[from] BundleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PluginError::MissingSource
            | PluginError::MissingOutput
            | PluginError::InvalidSetting { .. }
            | PluginError::SourceNotFound(_)
            | PluginError::SourceNotDirectory(_) => ErrorKind::Configuration,
            PluginError::NotConfigured => ErrorKind::NotConfigured,
            PluginError::Bundle(_) => ErrorKind::Tool,
            PluginError::Io(_) => ErrorKind::Io,
        }
    }

    /// Remediation hint shown next to the message, if any
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            PluginError::MissingSource => Some("Define it via the 'src' key."),
            PluginError::MissingOutput => Some("Define it via the 'out' key."),
            PluginError::InvalidSetting { .. } => Some("Quote the value as a string."),
            PluginError::SourceNotFound(_) => Some("Make sure you haven't made a typo."),
            PluginError::SourceNotDirectory(_) => {
                Some("Point 'src' at the directory holding the bundle contents.")
            }
            PluginError::NotConfigured => Some("Call `configure` before any other phase."),
            PluginError::Bundle(BundleError::NotFound(_)) => {
                Some("Install the bundler or put it on PATH.")
            }
            PluginError::Bundle(_) | PluginError::Io(_) => None,
        }
    }
}

/// Errors while running the external bundler
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("bundler '{0}' not found in PATH")]
    NotFound(String),

    #[error("failed to execute '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}
