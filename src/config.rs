use std::path::{Path, PathBuf};

use crate::bundle::BundleSpec;

/// Directory holding the linter distribution, relative to the repository root.
pub const TOOL_DIR: &str = "eslint";

/// Directory holding the embedding host crate, relative to the repository root.
pub const HOST_DIR: &str = "deno";

/// CLI entry script of the linter, relative to [`TOOL_DIR`].
pub const ENTRY_POINT: &str = "./bin/eslint.js";

/// Bundle artifact written into [`TOOL_DIR`] and embedded by the host.
pub const BUNDLE_FILENAME: &str = "eslint_bundle.js";

/// Compiler optimization profile for the host binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Debug,
    Release,
}

impl Profile {
    pub fn from_release_flag(release: bool) -> Self {
        if release {
            Profile::Release
        } else {
            Profile::Debug
        }
    }

    /// Cargo's output directory name for this profile.
    pub fn dir_name(self) -> &'static str {
        match self {
            Profile::Debug => "debug",
            Profile::Release => "release",
        }
    }
}

/// Fixed filesystem layout of one pipeline run.
///
/// There is no configuration file; every path derives from the repository
/// root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub root: PathBuf,
    pub tool_dir: PathBuf,
    pub host_dir: PathBuf,
    pub entry_point: PathBuf,
    pub bundle_filename: PathBuf,
}

impl PipelineConfig {
    /// Layout rooted at the directory containing this crate's manifest.
    pub fn load() -> Self {
        Self::from_root(Path::new(env!("CARGO_MANIFEST_DIR")))
    }

    pub fn from_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            tool_dir: root.join(TOOL_DIR),
            host_dir: root.join(HOST_DIR),
            entry_point: PathBuf::from(ENTRY_POINT),
            bundle_filename: PathBuf::from(BUNDLE_FILENAME),
        }
    }

    pub fn bundle_spec(&self) -> BundleSpec {
        BundleSpec::new(&self.tool_dir, &self.entry_point, &self.bundle_filename)
    }

    pub fn bundle_path(&self) -> PathBuf {
        self.tool_dir.join(&self.bundle_filename)
    }

    /// Where Cargo places the host binary for `profile`.
    pub fn host_output_dir(&self, profile: Profile) -> PathBuf {
        self.host_dir.join("target").join(profile.dir_name())
    }
}
