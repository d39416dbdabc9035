use anyhow::{Context, Result};
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};

use crate::diagnostics::{Diagnostic, DiagnosticParser};

/// Outcome of one external tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    pub success: bool,
    /// Records in the order the tool emitted them.
    pub diagnostics: Vec<Diagnostic>,
}

impl ProcessResult {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Runs `cmd` with stdout and stderr inherited and waits for it to exit.
///
/// Spawn failures (tool missing from PATH, bad working directory) are
/// returned as errors; a non-zero exit is reported through `success`.
pub fn run_inherited(cmd: &mut Command) -> Result<ProcessResult> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let status = cmd
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to spawn {program}"))?;

    Ok(ProcessResult {
        success: status.success(),
        diagnostics: Vec::new(),
    })
}

/// Runs `cmd` with stdout inherited and stderr parsed into diagnostics.
///
/// # Behavior
/// - Each record is handed to `report` as soon as its block completes.
/// - Lines outside any record are echoed to stderr unchanged.
/// - Blocks until the child exits.
pub fn run_with_diagnostics(
    cmd: &mut Command,
    report: &mut dyn FnMut(&Diagnostic),
) -> Result<ProcessResult> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn {program}"))?;

    let stderr = child
        .stderr
        .take()
        .context("Child stderr was not captured")?;

    let mut parser = DiagnosticParser::default();
    let mut diagnostics = Vec::new();

    // Bytes, not `lines()`: engine output may carry non-UTF-8 file names.
    let mut reader = BufReader::new(stderr);
    let mut buf = Vec::new();
    let read_result = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e),
        }

        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(['\n', '\r']);
        let feed = parser.feed(line);
        if feed.passthrough {
            eprintln!("{line}");
        }
        if let Some(diagnostic) = feed.completed {
            report(&diagnostic);
            diagnostics.push(diagnostic);
        }
    };

    if let Some(diagnostic) = parser.finish() {
        report(&diagnostic);
        diagnostics.push(diagnostic);
    }

    // Close our end first so a child still writing to stderr cannot block.
    drop(reader);
    let status = child
        .wait()
        .with_context(|| format!("Failed to wait for {program}"))?;
    read_result.with_context(|| format!("Failed to read output of {program}"))?;

    Ok(ProcessResult {
        success: status.success(),
        diagnostics,
    })
}
