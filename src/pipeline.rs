use colored::*;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::bundle::BundleTransformer;
use crate::checker::PackageManifest;
use crate::config::{PipelineConfig, Profile};
use crate::error::PipelineError;
use crate::steps::{
    BundlingEngine, CargoHostBuilder, DependencyInstaller, EsbuildEngine, HostBinaryBuilder,
    NpmInstaller,
};
use crate::transform::InsertionPoints;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// `name@version` of the bundled tool.
    pub package: String,
    pub bundle_path: PathBuf,
    pub host_output_dir: PathBuf,
    pub elapsed: Duration,
}

/// Sequences install → bundle → host build.
///
/// Each stage starts only after the previous one fully succeeded; the first
/// failure ends the run.
pub struct Pipeline<I, E, H> {
    config: PipelineConfig,
    installer: I,
    engine: E,
    host: H,
    transformer: BundleTransformer,
}

impl Pipeline<NpmInstaller, EsbuildEngine, CargoHostBuilder> {
    /// npm, the project-local esbuild, and Cargo, laid out per `config`.
    pub fn standard(config: PipelineConfig) -> Self {
        let installer = NpmInstaller::new(&config.tool_dir);
        let engine = EsbuildEngine::in_project(&config.tool_dir);
        let host = CargoHostBuilder::new(&config.host_dir);
        Self::new(config, installer, engine, host)
    }
}

impl<I, E, H> Pipeline<I, E, H>
where
    I: DependencyInstaller,
    E: BundlingEngine,
    H: HostBinaryBuilder,
{
    pub fn new(config: PipelineConfig, installer: I, engine: E, host: H) -> Self {
        let transformer = BundleTransformer::new(config.bundle_spec());
        Self {
            config,
            installer,
            engine,
            host,
            transformer,
        }
    }

    pub fn with_insertion_points(mut self, points: InsertionPoints) -> Self {
        self.transformer = self.transformer.with_insertion_points(points);
        self
    }

    /// Runs all three stages. `profile` only reaches the host build.
    pub fn run(&self, profile: Profile) -> Result<PipelineReport, PipelineError> {
        let start_time = Instant::now();

        let manifest = self.install_dependencies()?;
        let bundle_path = self.generate_bundle(&manifest)?;
        self.build_host(profile)?;

        Ok(PipelineReport {
            package: manifest.label(),
            bundle_path,
            host_output_dir: self.config.host_output_dir(profile),
            elapsed: start_time.elapsed(),
        })
    }

    fn install_dependencies(&self) -> Result<PackageManifest, PipelineError> {
        println!("{} Installing npm dependencies", "[BUILD]".green().bold());

        let manifest = self
            .installer
            .check_env()
            .map_err(PipelineError::dependency_install)?;

        let result = self
            .installer
            .install()
            .map_err(PipelineError::dependency_install)?;

        if !result.success {
            return Err(PipelineError::DependencyInstall {
                reason: "npm install exited with a non-zero status".to_string(),
            });
        }
        Ok(manifest)
    }

    fn generate_bundle(&self, manifest: &PackageManifest) -> Result<PathBuf, PipelineError> {
        println!(
            "{} Generating bundle for {}",
            "[BUILD]".green().bold(),
            manifest.label()
        );

        let path = self.transformer.generate(&self.engine)?;

        println!(
            "{} Bundle generated successfully at {}",
            "[INFO]".cyan(),
            path.display()
        );
        Ok(path)
    }

    fn build_host(&self, profile: Profile) -> Result<(), PipelineError> {
        println!(
            "{} Building host binary (profile={})",
            "[BUILD]".green().bold(),
            profile.dir_name()
        );

        self.host.check_env().map_err(PipelineError::host_build)?;

        let result = self
            .host
            .build(profile)
            .map_err(PipelineError::host_build)?;

        if !result.success {
            return Err(PipelineError::HostBuild {
                reason: "cargo build exited with a non-zero status".to_string(),
            });
        }
        Ok(())
    }
}
