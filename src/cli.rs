// CLI commands for driving the bundle step stand-alone

use crate::{
    config::Settings,
    error::PluginError,
    lifecycle::{BuildStep, BundlePlugin, CycleOutcome},
    manifest::{Manifest, MANIFEST_FILE},
    staleness::Staleness,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Repack a bundle when its source directory changes
#[derive(Parser, Debug)]
#[command(name = "bndl-plug", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the bundle settings come from
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Manifest with a [bundle] table (default: ./bundle.toml)
    #[arg(short, long, conflicts_with_all = ["src", "out"])]
    pub manifest: Option<PathBuf>,

    /// Bundle source directory
    #[arg(long, requires = "out")]
    pub src: Option<String>,

    /// Output bundle path
    #[arg(long, requires = "src")]
    pub out: Option<String>,

    /// Bundler executable (default: nwgebndl)
    #[arg(long)]
    pub bundler: Option<String>,
}

impl SettingsArgs {
    /// Collect settings and the directory relative paths resolve against
    pub fn load(&self) -> Result<(Settings, PathBuf)> {
        let (mut settings, base_dir) = match (&self.src, &self.out) {
            (Some(src), Some(out)) => {
                let mut settings = Settings::new();
                settings.insert("src".to_string(), Value::String(src.clone()));
                settings.insert("out".to_string(), Value::String(out.clone()));
                (settings, PathBuf::from("."))
            }
            _ => {
                let path = self
                    .manifest
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(MANIFEST_FILE));
                let manifest = Manifest::from_file(&path)?;
                (manifest.settings().clone(), manifest.base_dir().to_path_buf())
            }
        };

        if let Some(bundler) = &self.bundler {
            settings.insert("bundler".to_string(), Value::String(bundler.clone()));
        }
        Ok((settings, base_dir))
    }
}

/// Bundle step subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Regenerate the bundle if any source entry is newer
    Build {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Rebuild even when the bundle is up to date
        #[arg(long)]
        force: bool,
    },

    /// Report whether the bundle needs regenerating
    Status {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Delete the bundle
    Clean {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

impl Commands {
    /// Execute the command
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Build { settings, force } => Self::build_cmd(&settings, force),
            Commands::Status { settings } => Self::status_cmd(&settings),
            Commands::Clean { settings } => Self::clean_cmd(&settings),
        }
    }

    fn build_cmd(args: &SettingsArgs, force: bool) -> Result<()> {
        let mut plugin = configured_plugin(args)?;
        match plugin.cycle(force).map_err(with_hint)? {
            CycleOutcome::Ran => {
                if let Some(config) = plugin.config() {
                    println!("✓ Bundled {}", config.output_path().display());
                }
            }
            CycleOutcome::Skipped => println!("Bundle is up to date"),
        }
        Ok(())
    }

    fn status_cmd(args: &SettingsArgs) -> Result<()> {
        let mut plugin = configured_plugin(args)?;
        match plugin.check().map_err(with_hint)? {
            Staleness::MissingOutput => println!("stale: bundle does not exist"),
            Staleness::NewerEntry {
                path,
                modified,
                bundled,
            } => println!(
                "stale: {} modified {} (bundle {})",
                path.display(),
                timestamp(*modified),
                timestamp(*bundled)
            ),
            Staleness::UpToDate { bundled } => {
                println!("up to date (bundled {})", timestamp(*bundled))
            }
        }
        Ok(())
    }

    fn clean_cmd(args: &SettingsArgs) -> Result<()> {
        let mut plugin = configured_plugin(args)?;
        let removed = plugin.clean().map_err(with_hint)?;
        if let Some(config) = plugin.config() {
            println!("{}", clean_message(removed, config.output_path()));
        }
        Ok(())
    }
}

fn configured_plugin(args: &SettingsArgs) -> Result<BundlePlugin> {
    let (settings, base_dir) = args.load().context("Failed to load bundle settings")?;
    let mut plugin = BundlePlugin::new().base_dir(base_dir);
    plugin.configure(&settings).map_err(with_hint)?;
    Ok(plugin)
}

/// Attach the error's remediation hint for display
fn with_hint(err: PluginError) -> anyhow::Error {
    match err.hint() {
        Some(hint) => anyhow::anyhow!("{err}\nhint: {hint}"),
        None => anyhow::Error::new(err),
    }
}

fn clean_message(removed: bool, output: &Path) -> String {
    if removed {
        format!("Removed {}", output.display())
    } else {
        format!("Nothing to clean at {}", output.display())
    }
}

fn timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_build_with_paths() {
        let cli = Cli::try_parse_from([
            "bndl-plug", "-v", "build", "--src", "assets", "--out", "b.bndl", "--force",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Build { settings, force } => {
                assert!(force);
                let (settings, _) = settings.load().unwrap();
                assert_eq!(settings["src"], "assets");
                assert_eq!(settings["out"], "b.bndl");
                assert!(settings.get("bundler").is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn src_requires_out() {
        assert!(Cli::try_parse_from(["bndl-plug", "status", "--src", "assets"]).is_err());
    }

    #[test]
    fn manifest_conflicts_with_paths() {
        let result = Cli::try_parse_from([
            "bndl-plug", "clean", "--manifest", "bundle.toml", "--src", "a", "--out", "b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn bundler_override_reaches_settings() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("bundle.toml");
        std::fs::write(&manifest, "[bundle]\nsrc = \"a\"\nout = \"b\"\n").unwrap();

        let args = SettingsArgs {
            manifest: Some(manifest),
            src: None,
            out: None,
            bundler: Some("packer".to_string()),
        };
        let (settings, base_dir) = args.load().unwrap();
        assert_eq!(settings["bundler"], "packer");
        assert_eq!(base_dir, dir.path());
    }

    #[test]
    fn hint_is_kept_in_error_chain() {
        let err = with_hint(PluginError::MissingSource);
        let rendered = format!("{err:#}");
        assert!(rendered.contains("Define it via the 'src' key."));
        assert!(rendered.contains("No bundle source directory is defined."));
    }

    #[test]
    fn clean_message_depends_on_removal() {
        let output = Path::new("/work/game.bndl");
        assert_eq!(clean_message(true, output), "Removed /work/game.bndl");
        assert_eq!(
            clean_message(false, output),
            "Nothing to clean at /work/game.bndl"
        );
    }
}
