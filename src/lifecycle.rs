// Build-step lifecycle - configure, want_run, run, clean

use crate::bundle::{self, CommandRunner, ProcessRunner};
use crate::config::{BundleConfig, Settings};
use crate::error::PluginError;
use crate::staleness::{self, Staleness};
use std::path::PathBuf;

/// Phases a host drives a build step through
///
/// Hosts call `configure` once per cycle, then `want_run` any number of
/// times, `run` when a rebuild is wanted, and `clean` whenever stale output
/// should go away.
pub trait BuildStep {
    /// Validate settings and keep the resolved configuration
    ///
    /// A failed call leaves any earlier configuration in place.
    fn configure(&mut self, settings: &Settings) -> Result<&BundleConfig, PluginError>;

    /// Whether the output needs regenerating
    fn want_run(&mut self) -> Result<bool, PluginError>;

    /// Regenerate the output
    fn run(&mut self) -> Result<(), PluginError>;

    /// Remove the output if present
    ///
    /// Returns `true` when a file was deleted, `false` when there was none.
    fn clean(&mut self) -> Result<bool, PluginError>;

    /// Run when stale, or unconditionally when `force` is set
    fn cycle(&mut self, force: bool) -> Result<CycleOutcome, PluginError> {
        if !force && !self.want_run()? {
            return Ok(CycleOutcome::Skipped);
        }
        self.run()?;
        Ok(CycleOutcome::Ran)
    }
}

/// Result of [`BuildStep::cycle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Ran,
    Skipped,
}

/// Where a plugin instance is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    Unconfigured,
    Configured,
    Stale,
    UpToDate,
    Ran,
    Skipped,
    Cleaned,
}

/// The bundle build step
///
/// Owns its resolved [`BundleConfig`] and the runner used to launch the
/// bundler. Instances share nothing, so separate instances may be driven
/// from separate threads as long as their paths don't overlap.
pub struct BundlePlugin<R: CommandRunner = ProcessRunner> {
    runner: R,

    /// Directory relative settings resolve against; process cwd when unset
    base_dir: Option<PathBuf>,

    config: Option<BundleConfig>,

    state: PhaseState,

    last_check: Option<Staleness>,
}

impl BundlePlugin<ProcessRunner> {
    /// Create a plugin that launches the bundler as a child process
    pub fn new() -> Self {
        Self::with_runner(ProcessRunner::new())
    }
}

impl Default for BundlePlugin<ProcessRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> BundlePlugin<R> {
    /// Create a plugin that launches the bundler through `runner`
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            base_dir: None,
            config: None,
            state: PhaseState::Unconfigured,
            last_check: None,
        }
    }

    /// Resolve relative settings against `dir` instead of the process cwd
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> Option<&BundleConfig> {
        self.config.as_ref()
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Verdict of the most recent staleness check
    pub fn last_check(&self) -> Option<&Staleness> {
        self.last_check.as_ref()
    }

    /// Run the staleness check and return the full verdict
    pub fn check(&mut self) -> Result<&Staleness, PluginError> {
        let config = self.config.as_ref().ok_or(PluginError::NotConfigured)?;
        let verdict = staleness::check(config)?;
        self.state = if verdict.is_stale() {
            PhaseState::Stale
        } else {
            PhaseState::UpToDate
        };
        let verdict: &Staleness = self.last_check.insert(verdict);
        Ok(verdict)
    }

    fn configured(&self) -> Result<&BundleConfig, PluginError> {
        self.config.as_ref().ok_or(PluginError::NotConfigured)
    }
}

impl<R: CommandRunner> BuildStep for BundlePlugin<R> {
    fn configure(&mut self, settings: &Settings) -> Result<&BundleConfig, PluginError> {
        let base_dir = match &self.base_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let config = BundleConfig::resolve(settings, &base_dir)?;
        tracing::debug!(
            src = %config.source_dir().display(),
            out = %config.output_path().display(),
            "Configured bundle step"
        );
        self.state = PhaseState::Configured;
        self.last_check = None;
        let config: &BundleConfig = self.config.insert(config);
        Ok(config)
    }

    fn want_run(&mut self) -> Result<bool, PluginError> {
        Ok(self.check()?.is_stale())
    }

    fn run(&mut self) -> Result<(), PluginError> {
        let config = self.configured()?;
        bundle::invoke(config, &self.runner)?;
        self.state = PhaseState::Ran;
        Ok(())
    }

    fn clean(&mut self) -> Result<bool, PluginError> {
        let output = self.configured()?.output_path();
        let removed = match std::fs::remove_file(output) {
            Ok(()) => {
                tracing::info!(output = %output.display(), "Removed bundle");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };
        self.state = PhaseState::Cleaned;
        Ok(removed)
    }

    fn cycle(&mut self, force: bool) -> Result<CycleOutcome, PluginError> {
        if !force && !self.want_run()? {
            self.state = PhaseState::Skipped;
            tracing::info!("Bundle up to date, skipping");
            return Ok(CycleOutcome::Skipped);
        }
        self.run()?;
        Ok(CycleOutcome::Ran)
    }
}
