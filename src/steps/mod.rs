use anyhow::Result;

use crate::bundle::BundleSpec;
use crate::checker::PackageManifest;
use crate::config::Profile;
use crate::diagnostics::Diagnostic;
use crate::process::ProcessResult;

pub mod cargo;
pub mod esbuild;
pub mod npm;

pub use cargo::CargoHostBuilder;
pub use esbuild::EsbuildEngine;
pub use npm::NpmInstaller;

/// Materializes the tool's declared dependencies on disk.
pub trait DependencyInstaller {
    /// Verify the package manager is usable before installing.
    ///
    /// # Behavior
    /// - Use lightweight commands like `-v` to check toolchain presence.
    /// - If checks fail, return an error with concrete installation guidance.
    /// - Returns the parsed project manifest for later stages.
    fn check_env(&self) -> Result<PackageManifest>;

    /// Run the install with inherited output streams.
    ///
    /// Spawn problems are errors; an unsuccessful install is reported through
    /// [`ProcessResult::success`].
    fn install(&self) -> Result<ProcessResult>;
}

/// External engine that flattens an entry point and its module graph into
/// one script.
pub trait BundlingEngine {
    fn check_env(&self, spec: &BundleSpec) -> Result<()>;

    /// Bundle according to `spec`, writing to [`BundleSpec::output_path`].
    ///
    /// Each diagnostic is passed to `report` as soon as the engine emits it,
    /// and is also collected into the returned result.
    fn bundle(
        &self,
        spec: &BundleSpec,
        report: &mut dyn FnMut(&Diagnostic),
    ) -> Result<ProcessResult>;
}

/// Native compiler that produces the embedding host binary.
pub trait HostBinaryBuilder {
    fn check_env(&self) -> Result<()>;

    /// Compile the host with the given optimization profile.
    ///
    /// # Side effects
    /// - Writes compiler artifacts under the host project.
    /// - Streams compiler output to stdout/stderr.
    fn build(&self, profile: Profile) -> Result<ProcessResult>;
}
