use anyhow::{Context, Result};
use colored::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const MANIFEST_FILE: &str = "package.json";

/// Bundling engine package the pipeline expects in the tool's manifest.
pub const BUNDLER_PACKAGE: &str = "esbuild";

/// The subset of `package.json` the pipeline looks at.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Version requirement for `package`, checking `dependencies` first.
    pub fn dependency(&self, package: &str) -> Option<&str> {
        self.dependencies
            .get(package)
            .or_else(|| self.dev_dependencies.get(package))
            .map(String::as_str)
    }

    /// `name@version` for progress messages.
    pub fn label(&self) -> String {
        match (self.name.as_deref(), self.version.as_deref()) {
            (Some(name), Some(version)) => format!("{name}@{version}"),
            (Some(name), None) => name.to_string(),
            _ => "unnamed package".to_string(),
        }
    }
}

/// Reads and parses `package.json` from `project_dir`.
pub fn load_manifest(project_dir: &Path) -> Result<PackageManifest> {
    let path = project_dir.join(MANIFEST_FILE);
    if !path.exists() {
        anyhow::bail!("Dependency manifest not found at {}", path.display());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let manifest: PackageManifest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(manifest)
}

/// Checks that the tool project can be installed and bundled.
///
/// # Behavior
/// - A missing or unreadable manifest is an error.
/// - A manifest without an esbuild dependency only prints a warning; the
///   engine may still be provided transitively.
pub fn check_bundler_dependency(project_dir: &Path) -> Result<PackageManifest> {
    let manifest = load_manifest(project_dir)?;

    match manifest.dependency(BUNDLER_PACKAGE) {
        Some(version) => println!(
            "{} Bundler dependency declared: {}@{}",
            "[INFO]".cyan(),
            BUNDLER_PACKAGE,
            version
        ),
        None => println!(
            "{} '{}' is not declared in {}; bundling relies on it being installed transitively.",
            "[WARN]".yellow(),
            BUNDLER_PACKAGE,
            MANIFEST_FILE
        ),
    }

    Ok(manifest)
}
