// Bundler invocation - runs the external packer on the resolved paths

pub mod runner;

pub use runner::{CommandRunner, ProcessRunner};

use crate::config::BundleConfig;
use crate::error::BundleError;
use std::ffi::OsString;

/// Subcommand the bundler expects before its two paths
pub const CREATE_SUBCOMMAND: &str = "create";

/// Arguments passed to the bundler: `create <source_dir> <output_path>`
///
/// Paths are passed as raw OS strings so non-UTF-8 names reach the bundler intact.
pub fn bundler_args(config: &BundleConfig) -> Vec<OsString> {
    vec![
        OsString::from(CREATE_SUBCOMMAND),
        config.source_dir().as_os_str().to_owned(),
        config.output_path().as_os_str().to_owned(),
    ]
}

/// Regenerate the bundle described by `config`
///
/// Blocks until the bundler exits. Failures are returned as-is; there is
/// no retry.
pub fn invoke(config: &BundleConfig, runner: &dyn CommandRunner) -> Result<(), BundleError> {
    let args = bundler_args(config);
    runner.run(config.bundler(), &args)?;
    tracing::info!(output = %config.output_path().display(), "Bundle created");
    Ok(())
}
