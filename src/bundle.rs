use colored::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::diagnostics::Diagnostic;
use crate::error::PipelineError;
use crate::steps::BundlingEngine;
use crate::transform::{wrap_initializer, InitializerSignature, InsertionPoints, LayoutCheck};

/// Execution wrapper the engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Iife,
}

/// Runtime conventions used to resolve built-in modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Node,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Iife => "iife",
        }
    }
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Node => "node",
        }
    }
}

/// Everything the bundling engine needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSpec {
    /// Directory the engine runs in; entry point and output are relative to it.
    pub working_dir: PathBuf,
    pub entry_point: PathBuf,
    pub output_file: PathBuf,
    pub format: Format,
    pub platform: Platform,
    pub strip_legal_comments: bool,
}

impl BundleSpec {
    pub fn new(
        working_dir: impl Into<PathBuf>,
        entry_point: impl Into<PathBuf>,
        output_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            entry_point: entry_point.into(),
            output_file: output_file.into(),
            format: Format::Iife,
            platform: Platform::Node,
            strip_legal_comments: true,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.working_dir.join(&self.output_file)
    }

    /// Command-line arguments for esbuild.
    pub fn engine_args(&self) -> Vec<String> {
        let mut args = vec![
            self.entry_point.display().to_string(),
            "--bundle".to_string(),
            format!("--format={}", self.format.as_str()),
            format!("--platform={}", self.platform.as_str()),
        ];
        if self.strip_legal_comments {
            args.push("--legal-comments=none".to_string());
        }
        args.push(format!("--outfile={}", self.output_file.display()));
        args
    }
}

/// Produces the embeddable initializer bundle.
///
/// # Flow
/// 1. Remove the previous artifact, if any.
/// 2. Run the bundling engine, streaming its diagnostics.
/// 3. Wrap the raw output into the initializer.
/// 4. Overwrite the artifact with the wrapped text.
#[derive(Debug, Clone)]
pub struct BundleTransformer {
    spec: BundleSpec,
    signature: InitializerSignature,
    points: InsertionPoints,
}

impl BundleTransformer {
    pub fn new(spec: BundleSpec) -> Self {
        Self {
            spec,
            signature: InitializerSignature::default(),
            points: InsertionPoints::default(),
        }
    }

    pub fn with_insertion_points(mut self, points: InsertionPoints) -> Self {
        self.points = points;
        self
    }

    pub fn generate<E>(&self, engine: &E) -> Result<PathBuf, PipelineError>
    where
        E: BundlingEngine + ?Sized,
    {
        let output = self.spec.output_path();

        if remove_stale_artifact(&output)? {
            println!(
                "{} Removed previous bundle at {}",
                "[INFO]".cyan(),
                output.display()
            );
        }

        engine
            .check_env(&self.spec)
            .map_err(PipelineError::bundle_generation)?;

        let mut report = |d: &Diagnostic| d.report();
        let result = engine
            .bundle(&self.spec, &mut report)
            .map_err(PipelineError::bundle_generation)?;

        let errors = result.errors().count();
        if errors > 0 {
            return Err(PipelineError::BundleGeneration {
                reason: format!("esbuild reported {errors} error(s)"),
            });
        }
        if !result.success {
            return Err(PipelineError::BundleGeneration {
                reason: "esbuild exited with a non-zero status".to_string(),
            });
        }

        let warnings = result.warnings().count();
        if warnings > 0 {
            println!(
                "{} esbuild finished with {} warning(s)",
                "[INFO]".cyan(),
                warnings
            );
        }

        let raw =
            fs::read_to_string(&output).map_err(|e| PipelineError::bundle_io(&output, e))?;

        let wrapped = wrap_initializer(&raw, &self.signature, self.points)?;
        match wrapped.layout {
            LayoutCheck::Agrees => {}
            LayoutCheck::Disagrees(bounds) => println!(
                "{} IIFE wrapper found at lines {}..{}, fixed offsets assume lines 3..{}",
                "[WARN]".yellow(),
                bounds.open + 1,
                bounds.close + 1,
                wrapped.segments - 3
            ),
            LayoutCheck::Unrecognized => println!(
                "{} IIFE wrapper not recognized in bundle output",
                "[WARN]".yellow()
            ),
        }

        fs::write(&output, wrapped.text).map_err(|e| PipelineError::bundle_io(&output, e))?;

        Ok(output)
    }
}

/// Deletes a previous bundle. Returns whether a file was removed.
pub fn remove_stale_artifact(path: &Path) -> Result<bool, PipelineError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PipelineError::bundle_io(path, e)),
    }
}
