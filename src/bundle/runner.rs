// External command execution for the bundler

use crate::error::BundleError;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use which::which;

/// Facility for running an external command to completion
///
/// The host normally provides this; [`ProcessRunner`] is the stand-alone
/// implementation. Tests substitute fakes.
pub trait CommandRunner {
    /// Run `program` with `args`, blocking until it exits
    ///
    /// # Errors
    ///
    /// Returns a [`BundleError`] if the program can't be found or started,
    /// or exits unsuccessfully.
    fn run(&self, program: &str, args: &[OsString]) -> Result<(), BundleError>;
}

/// Runs commands as child processes of the current process
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// Extra directory searched before PATH
    search_dir: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for programs in `dir` before falling back to PATH
    ///
    /// This is useful for testing or for bundlers shipped next to the project.
    pub fn with_search_dir(dir: PathBuf) -> Self {
        Self {
            search_dir: Some(dir),
        }
    }

    /// Locate `program` as an executable path
    fn locate(&self, program: &str) -> Result<PathBuf, BundleError> {
        if let Some(dir) = &self.search_dir {
            let candidate = dir.join(program);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        which(program).map_err(|_| BundleError::NotFound(program.to_string()))
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<(), BundleError> {
        let executable = self.locate(program)?;
        tracing::debug!(program = %executable.display(), ?args, "Running bundler");

        let output = Command::new(&executable)
            .args(args)
            .output()
            .map_err(|source| BundleError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!(program, "{}", stdout.trim_end());
        }

        if !output.status.success() {
            return Err(BundleError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!(program, "{}", stderr.trim_end());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_not_found() {
        let runner = ProcessRunner::new();
        let err = runner
            .run("bndl-plug-surely-not-installed", &[])
            .unwrap_err();
        assert!(matches!(err, BundleError::NotFound(_)));
    }

    #[test]
    fn search_dir_is_checked_before_path() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("local-bundler");
        std::fs::write(&local, b"").unwrap();

        let runner = ProcessRunner::with_search_dir(dir.path().to_path_buf());
        assert_eq!(runner.locate("local-bundler").unwrap(), local);
        assert!(matches!(
            runner.locate("bndl-plug-surely-not-installed"),
            Err(BundleError::NotFound(_))
        ));
    }

    // Scripts go through `sh` so nothing freshly written is exec'd directly
    #[cfg(unix)]
    #[test]
    fn exit_status_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-bundler.sh");
        std::fs::write(&script, "echo \"bad archive $2\" >&2\nexit 3\n").unwrap();

        let args: Vec<OsString> = vec![
            script.into_os_string(),
            "create".into(),
            "a".into(),
            "b".into(),
        ];
        match ProcessRunner::new().run("sh", &args).unwrap_err() {
            BundleError::Failed { stderr, status, .. } => {
                assert_eq!(stderr, "bad archive a");
                assert!(status.contains('3'));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn successful_run() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("ok-bundler.sh");
        std::fs::write(&script, "echo packing \"$2\"\ntouch \"$3\"\n").unwrap();

        let target = dir.path().join("made.bndl");
        let args: Vec<OsString> = vec![
            script.into_os_string(),
            "create".into(),
            "src".into(),
            target.clone().into_os_string(),
        ];
        ProcessRunner::new().run("sh", &args).unwrap();
        assert!(target.exists());
    }
}
