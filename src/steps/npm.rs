use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

use super::DependencyInstaller;
use crate::checker::{self, PackageManifest};
use crate::process::{run_inherited, ProcessResult};

fn npm_cmd() -> &'static str {
    if cfg!(target_os = "windows") {
        "npm.cmd"
    } else {
        "npm"
    }
}

/// Installs the tool's npm dependencies.
///
/// Dependencies: Node.js and npm must be installed.
pub struct NpmInstaller {
    pub project_dir: PathBuf,
}

impl NpmInstaller {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }
}

impl DependencyInstaller for NpmInstaller {
    fn check_env(&self) -> Result<PackageManifest> {
        let manifest = checker::check_bundler_dependency(&self.project_dir)?;

        Command::new(npm_cmd())
            .arg("-v")
            .output()
            .context("npm not found. Please install Node.js and npm: https://nodejs.org/")?;
        Ok(manifest)
    }

    fn install(&self) -> Result<ProcessResult> {
        run_inherited(
            Command::new(npm_cmd())
                .arg("install")
                .current_dir(&self.project_dir),
        )
    }
}
