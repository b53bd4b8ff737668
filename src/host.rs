// Host boundary - boolean phase contract and diagnostic reporting

use crate::config::Settings;
use crate::error::PluginError;
use crate::lifecycle::BuildStep;

/// Channel through which the host shows diagnostics to the user
pub trait DiagnosticSink {
    /// Report a failure with an optional remediation hint
    fn error(&self, message: &str, hint: Option<&str>);
}

/// Sink that emits diagnostics as `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn error(&self, message: &str, hint: Option<&str>) {
        match hint {
            Some(hint) => tracing::error!(hint, "{}", message),
            None => tracing::error!("{}", message),
        }
    }
}

/// Adapts a [`BuildStep`] to hosts that expect `bool`-returning phases
///
/// Every error is reported to the sink (message plus hint) and turned into
/// `false`, which tells the host to abort the remaining phases.
pub struct HostAdapter<P: BuildStep, S: DiagnosticSink = TracingSink> {
    step: P,
    sink: S,
}

impl<P: BuildStep> HostAdapter<P, TracingSink> {
    pub fn new(step: P) -> Self {
        Self::with_sink(step, TracingSink)
    }
}

impl<P: BuildStep, S: DiagnosticSink> HostAdapter<P, S> {
    pub fn with_sink(step: P, sink: S) -> Self {
        Self { step, sink }
    }

    pub fn step(&self) -> &P {
        &self.step
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_inner(self) -> P {
        self.step
    }

    pub fn configure(&mut self, settings: &Settings) -> bool {
        let result = self.step.configure(settings).map(|_| ());
        self.report(result)
    }

    /// `true` when the output must be regenerated
    ///
    /// An error is reported and answered with `false`, the same answer as
    /// "up to date". Hosts that need to tell the two apart should call
    /// [`HostAdapter::try_want_run`].
    pub fn want_run(&mut self) -> bool {
        self.try_want_run().unwrap_or(false)
    }

    /// Staleness verdict, or `None` after reporting an error
    pub fn try_want_run(&mut self) -> Option<bool> {
        match self.step.want_run() {
            Ok(wanted) => Some(wanted),
            Err(e) => {
                self.report(Err(e));
                None
            }
        }
    }

    pub fn run(&mut self) -> bool {
        let result = self.step.run();
        self.report(result)
    }

    pub fn clean(&mut self) -> bool {
        let result = self.step.clean().map(|_| ());
        self.report(result)
    }

    fn report(&self, result: Result<(), PluginError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                self.sink.error(&e.to_string(), e.hint());
                false
            }
        }
    }
}
