use anyhow::Result;
use std::cell::{Cell, RefCell};
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

use eslint_embed::bundle::{remove_stale_artifact, BundleSpec};
use eslint_embed::checker::PackageManifest;
use eslint_embed::config::{PipelineConfig, Profile};
use eslint_embed::diagnostics::Diagnostic;
use eslint_embed::process::ProcessResult;
use eslint_embed::steps::{BundlingEngine, DependencyInstaller, HostBinaryBuilder};
use eslint_embed::transform::InsertionPoints;
use eslint_embed::{Pipeline, PipelineError};

const RAW_BUNDLE: &str = "#!/usr/bin/env node\n\"use strict\";\n(() => {\n  var require_b = () => 1;\n  console.log(require_b(), __filename);\n})();\n";

const WRAPPED_BUNDLE: &str = "#!/usr/bin/env node\n\"use strict\";\n(() => {\nfunction initEslint(global, process, __filename, __dirname) {\n  var require_b = () => 1;\n  console.log(require_b(), __filename);\n}\n    \nglobalThis.initEslint = initEslint;\n})();\n";

type CallLog = Rc<RefCell<Vec<String>>>;

fn outcome(success: bool) -> ProcessResult {
    ProcessResult {
        success,
        diagnostics: Vec::new(),
    }
}

struct FakeInstaller {
    log: CallLog,
    success: bool,
}

impl DependencyInstaller for FakeInstaller {
    fn check_env(&self) -> Result<PackageManifest> {
        Ok(PackageManifest {
            name: Some("eslint".to_string()),
            version: Some("9.4.0".to_string()),
            ..Default::default()
        })
    }

    fn install(&self) -> Result<ProcessResult> {
        self.log.borrow_mut().push("install".to_string());
        Ok(outcome(self.success))
    }
}

struct FakeEngine {
    log: CallLog,
    success: bool,
    write_output: bool,
    diagnostics: Vec<Diagnostic>,
    stale_seen: Rc<Cell<Option<bool>>>,
}

impl BundlingEngine for FakeEngine {
    fn check_env(&self, _spec: &BundleSpec) -> Result<()> {
        Ok(())
    }

    fn bundle(
        &self,
        spec: &BundleSpec,
        report: &mut dyn FnMut(&Diagnostic),
    ) -> Result<ProcessResult> {
        self.log.borrow_mut().push("bundle".to_string());

        let out = spec.output_path();
        self.stale_seen.set(Some(out.exists()));
        if self.write_output {
            fs::write(&out, RAW_BUNDLE)?;
        }

        for d in &self.diagnostics {
            report(d);
        }

        Ok(ProcessResult {
            success: self.success,
            diagnostics: self.diagnostics.clone(),
        })
    }
}

struct FakeHost {
    log: CallLog,
    success: bool,
}

impl HostBinaryBuilder for FakeHost {
    fn check_env(&self) -> Result<()> {
        Ok(())
    }

    fn build(&self, profile: Profile) -> Result<ProcessResult> {
        self.log
            .borrow_mut()
            .push(format!("host:{}", profile.dir_name()));
        Ok(outcome(self.success))
    }
}

struct Harness {
    _root: TempDir,
    config: PipelineConfig,
    log: CallLog,
    stale_seen: Rc<Cell<Option<bool>>>,
    installer_ok: bool,
    engine_ok: bool,
    engine_writes: bool,
    host_ok: bool,
    diagnostics: Vec<Diagnostic>,
}

impl Harness {
    fn new() -> Result<Self> {
        let root = TempDir::new()?;
        let config = PipelineConfig::from_root(root.path());
        fs::create_dir_all(&config.tool_dir)?;
        fs::create_dir_all(&config.host_dir)?;
        Ok(Self {
            _root: root,
            config,
            log: CallLog::default(),
            stale_seen: Rc::default(),
            installer_ok: true,
            engine_ok: true,
            engine_writes: true,
            host_ok: true,
            diagnostics: Vec::new(),
        })
    }

    fn pipeline(&self) -> Pipeline<FakeInstaller, FakeEngine, FakeHost> {
        Pipeline::new(
            self.config.clone(),
            FakeInstaller {
                log: self.log.clone(),
                success: self.installer_ok,
            },
            FakeEngine {
                log: self.log.clone(),
                success: self.engine_ok,
                write_output: self.engine_writes,
                diagnostics: self.diagnostics.clone(),
                stale_seen: self.stale_seen.clone(),
            },
            FakeHost {
                log: self.log.clone(),
                success: self.host_ok,
            },
        )
    }

    fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

#[test]
fn stages_run_in_order_and_bundle_is_wrapped() -> Result<()> {
    let h = Harness::new()?;

    let report = h.pipeline().run(Profile::Debug)?;

    assert_eq!(h.calls(), ["install", "bundle", "host:debug"]);
    assert_eq!(report.bundle_path, h.config.bundle_path());
    assert_eq!(fs::read_to_string(&report.bundle_path)?, WRAPPED_BUNDLE);
    assert_eq!(
        report.host_output_dir,
        h.config.host_dir.join("target").join("debug")
    );
    Ok(())
}

#[test]
fn preflight_manifest_labels_the_report() -> Result<()> {
    let h = Harness::new()?;
    // Must not be read again after the installer's preflight.
    fs::write(h.config.tool_dir.join("package.json"), "{ not json")?;

    let report = h.pipeline().run(Profile::Debug)?;

    assert_eq!(report.package, "eslint@9.4.0");
    Ok(())
}

#[test]
fn release_profile_reaches_host_build() -> Result<()> {
    let h = Harness::new()?;

    h.pipeline().run(Profile::Release)?;

    assert_eq!(h.calls(), ["install", "bundle", "host:release"]);
    Ok(())
}

#[test]
fn install_failure_skips_bundle_and_host() -> Result<()> {
    let mut h = Harness::new()?;
    h.installer_ok = false;

    let err = h.pipeline().run(Profile::Debug).unwrap_err();

    assert!(matches!(err, PipelineError::DependencyInstall { .. }));
    assert_eq!(err.stage(), "install");
    assert_eq!(h.calls(), ["install"]);
    assert!(!h.config.bundle_path().exists());
    Ok(())
}

#[test]
fn engine_errors_skip_host_and_leave_output_untransformed() -> Result<()> {
    let mut h = Harness::new()?;
    h.engine_ok = false;
    h.diagnostics = vec![
        Diagnostic::warning("suspicious code"),
        Diagnostic::error(r#"Could not resolve "missing""#),
    ];

    let err = h.pipeline().run(Profile::Debug).unwrap_err();

    assert!(matches!(err, PipelineError::BundleGeneration { .. }));
    assert!(err.to_string().contains("1 error(s)"));
    assert_eq!(h.calls(), ["install", "bundle"]);
    assert_eq!(fs::read_to_string(h.config.bundle_path())?, RAW_BUNDLE);
    Ok(())
}

#[test]
fn engine_error_diagnostic_is_fatal_even_with_success_exit() -> Result<()> {
    let mut h = Harness::new()?;
    h.diagnostics = vec![Diagnostic::error("transform failed")];

    let err = h.pipeline().run(Profile::Debug).unwrap_err();

    assert!(matches!(err, PipelineError::BundleGeneration { .. }));
    assert_eq!(h.calls(), ["install", "bundle"]);
    Ok(())
}

#[test]
fn engine_nonzero_exit_without_diagnostics_is_fatal() -> Result<()> {
    let mut h = Harness::new()?;
    h.engine_ok = false;

    let err = h.pipeline().run(Profile::Debug).unwrap_err();

    assert!(err.to_string().contains("non-zero status"));
    assert_eq!(h.calls(), ["install", "bundle"]);
    Ok(())
}

#[test]
fn warnings_do_not_stop_the_pipeline() -> Result<()> {
    let mut h = Harness::new()?;
    h.diagnostics = vec![
        Diagnostic::warning("first"),
        Diagnostic::warning("second"),
    ];

    let report = h.pipeline().run(Profile::Debug)?;

    assert_eq!(h.calls(), ["install", "bundle", "host:debug"]);
    assert_eq!(fs::read_to_string(report.bundle_path)?, WRAPPED_BUNDLE);
    Ok(())
}

#[test]
fn missing_engine_output_is_an_io_failure() -> Result<()> {
    let mut h = Harness::new()?;
    h.engine_writes = false;

    let err = h.pipeline().run(Profile::Debug).unwrap_err();

    assert!(matches!(err, PipelineError::BundleIo { .. }));
    assert_eq!(err.stage(), "bundle");
    assert_eq!(h.calls(), ["install", "bundle"]);
    Ok(())
}

#[test]
fn host_failure_is_reported_as_host_build() -> Result<()> {
    let mut h = Harness::new()?;
    h.host_ok = false;

    let err = h.pipeline().run(Profile::Release).unwrap_err();

    assert!(matches!(err, PipelineError::HostBuild { .. }));
    assert_eq!(err.stage(), "host-build");
    assert!(err.to_string().starts_with("Host binary build failed"));
    Ok(())
}

#[test]
fn stale_artifact_is_removed_before_engine_runs() -> Result<()> {
    let h = Harness::new()?;
    fs::write(h.config.bundle_path(), "stale bundle from an earlier run")?;

    h.pipeline().run(Profile::Debug)?;

    assert_eq!(h.stale_seen.get(), Some(false));
    Ok(())
}

#[test]
fn rerun_produces_identical_bundle() -> Result<()> {
    let h = Harness::new()?;

    h.pipeline().run(Profile::Debug)?;
    let first = fs::read(h.config.bundle_path())?;
    h.pipeline().run(Profile::Debug)?;
    let second = fs::read(h.config.bundle_path())?;

    assert_eq!(first, second);
    assert_eq!(h.stale_seen.get(), Some(false));
    Ok(())
}

#[test]
fn removing_absent_artifact_is_a_no_op() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("eslint_bundle.js");

    assert!(!remove_stale_artifact(&path)?);

    fs::write(&path, "old")?;
    assert!(remove_stale_artifact(&path)?);
    assert!(!path.exists());
    Ok(())
}

#[test]
fn removing_a_directory_is_an_io_failure() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("eslint_bundle.js");
    fs::create_dir(&path)?;

    let err = remove_stale_artifact(&path).unwrap_err();

    assert!(matches!(err, PipelineError::BundleIo { .. }));
    Ok(())
}

#[test]
fn structural_insertion_points_agree_on_standard_layout() -> Result<()> {
    let h = Harness::new()?;

    h.pipeline()
        .with_insertion_points(InsertionPoints::Structural)
        .run(Profile::Debug)?;

    assert_eq!(fs::read_to_string(h.config.bundle_path())?, WRAPPED_BUNDLE);
    Ok(())
}
