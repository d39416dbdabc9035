use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

use super::HostBinaryBuilder;
use crate::config::Profile;
use crate::process::{run_inherited, ProcessResult};

/// Builds the embedding host crate with Cargo.
pub struct CargoHostBuilder {
    pub project_dir: PathBuf,
}

impl CargoHostBuilder {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    /// `cargo build` arguments for `profile`.
    pub fn build_args(profile: Profile) -> Vec<&'static str> {
        let mut args = vec!["build"];
        if profile == Profile::Release {
            args.push("--release");
        }
        args
    }
}

impl HostBinaryBuilder for CargoHostBuilder {
    fn check_env(&self) -> Result<()> {
        Command::new("cargo")
            .arg("--version")
            .output()
            .context("Cargo toolchain not found. Please install Rust and Cargo.")?;
        Ok(())
    }

    fn build(&self, profile: Profile) -> Result<ProcessResult> {
        run_inherited(
            Command::new("cargo")
                .args(Self::build_args(profile))
                .current_dir(&self.project_dir),
        )
    }
}
