use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::BundlingEngine;
use crate::bundle::BundleSpec;
use crate::diagnostics::Diagnostic;
use crate::process::{run_with_diagnostics, ProcessResult};

/// esbuild as installed into the tool's `node_modules`.
pub struct EsbuildEngine {
    pub bin: PathBuf,
}

impl EsbuildEngine {
    /// Uses the project-local `node_modules/.bin/esbuild`.
    pub fn in_project(project_dir: &Path) -> Self {
        let name = if cfg!(target_os = "windows") {
            "esbuild.cmd"
        } else {
            "esbuild"
        };
        Self {
            bin: project_dir.join("node_modules").join(".bin").join(name),
        }
    }
}

impl BundlingEngine for EsbuildEngine {
    fn check_env(&self, _spec: &BundleSpec) -> Result<()> {
        if !self.bin.exists() {
            anyhow::bail!(
                "esbuild not found at {}. Declare esbuild in package.json and rerun npm install.",
                self.bin.display()
            );
        }
        Ok(())
    }

    fn bundle(
        &self,
        spec: &BundleSpec,
        report: &mut dyn FnMut(&Diagnostic),
    ) -> Result<ProcessResult> {
        let mut cmd = Command::new(&self.bin);
        cmd.args(spec.engine_args()).current_dir(&spec.working_dir);
        run_with_diagnostics(&mut cmd, report)
    }
}
