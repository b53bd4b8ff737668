//! bndl-plug
//!
//! Build-step plugin that repacks a bundle with the external `nwgebndl`
//! tool whenever an entry of its source directory is newer than the bundle.
//!
//! # Modules
//! - **config**: settings validation and path resolution (`BundleConfig`)
//! - **staleness**: mtime comparison between bundle and source entries
//! - **lifecycle**: the `BuildStep` trait and the `BundlePlugin` implementation
//! - **bundle**: bundler invocation through a `CommandRunner`
//! - **host**: boolean phase contract and diagnostic sink for hosts
//! - **manifest**: `bundle.toml` loading for stand-alone use
//! - **cli**: command-line front end

pub mod bundle;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod manifest;
pub mod staleness;

pub use bundle::{CommandRunner, ProcessRunner};
pub use config::{BundleConfig, Settings};
pub use error::{BundleError, ErrorKind, PluginError};
pub use host::{DiagnosticSink, HostAdapter, TracingSink};
pub use lifecycle::{BuildStep, BundlePlugin, CycleOutcome, PhaseState};
pub use manifest::Manifest;
pub use staleness::Staleness;
