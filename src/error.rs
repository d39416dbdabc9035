use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of the embedding pipeline, one variant per stage.
///
/// Every variant aborts the run. The only tolerated failure anywhere in the
/// pipeline is a missing artifact during stale-bundle removal, which never
/// reaches this type.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Dependency installation failed: {reason}")]
    DependencyInstall { reason: String },

    #[error("Bundle generation failed: {reason}")]
    BundleGeneration { reason: String },

    #[error("Bundle I/O failed for {}: {source}", .path.display())]
    BundleIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Host binary build failed: {reason}")]
    HostBuild { reason: String },
}

impl PipelineError {
    pub fn dependency_install(err: anyhow::Error) -> Self {
        Self::DependencyInstall {
            reason: format!("{err:#}"),
        }
    }

    pub fn bundle_generation(err: anyhow::Error) -> Self {
        Self::BundleGeneration {
            reason: format!("{err:#}"),
        }
    }

    pub fn host_build(err: anyhow::Error) -> Self {
        Self::HostBuild {
            reason: format!("{err:#}"),
        }
    }

    pub fn bundle_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::BundleIo {
            path: path.into(),
            source,
        }
    }

    /// Short stage identifier printed in front of the final error line.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::DependencyInstall { .. } => "install",
            Self::BundleGeneration { .. } | Self::BundleIo { .. } => "bundle",
            Self::HostBuild { .. } => "host-build",
        }
    }
}
