use colored::*;

/// Severity of a bundling engine message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One warning or error record emitted by the bundling engine.
///
/// esbuild prints each message as a header line (`▲ [WARNING] ...` or
/// `✘ [ERROR] ...`) followed by blank-separated, indented location and note
/// lines. The record ends at the next unindented line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Writes the record to stderr with the matching console tag.
    pub fn report(&self) {
        let tag = match self.severity {
            Severity::Warning => "[WARN]".yellow(),
            Severity::Error => "[ERROR]".red().bold(),
        };
        eprintln!("{} {}", tag, self.message);
        for note in &self.notes {
            eprintln!("  {note}");
        }
    }
}

/// Result of feeding one stderr line into [`DiagnosticParser`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Feed {
    /// A record that the line closed off.
    pub completed: Option<Diagnostic>,
    /// The line is not part of any record and should be echoed as-is.
    pub passthrough: bool,
}

/// Incremental parser for the engine's stderr stream.
///
/// Lines are fed one at a time as the child produces them, so records can be
/// reported while the engine is still running.
#[derive(Debug, Default)]
pub struct DiagnosticParser {
    current: Option<Diagnostic>,
}

impl DiagnosticParser {
    pub fn feed(&mut self, line: &str) -> Feed {
        if let Some(next) = parse_header(line) {
            return Feed {
                completed: self.current.replace(next),
                passthrough: false,
            };
        }

        if self.current.is_none() {
            return Feed {
                completed: None,
                passthrough: true,
            };
        }

        if line.trim().is_empty() {
            return Feed::default();
        }

        // Indented lines are locations, code frames and notes of the open record.
        if line.starts_with(char::is_whitespace) {
            if let Some(current) = self.current.as_mut() {
                current.notes.push(line.trim_end().to_string());
            }
            return Feed::default();
        }

        Feed {
            completed: self.current.take(),
            passthrough: true,
        }
    }

    /// Flushes the record still open when the stream ends.
    pub fn finish(&mut self) -> Option<Diagnostic> {
        self.current.take()
    }
}

fn parse_header(line: &str) -> Option<Diagnostic> {
    for (marker, severity) in [
        ("[ERROR]", Severity::Error),
        ("[WARNING]", Severity::Warning),
    ] {
        let Some(idx) = line.find(marker) else {
            continue;
        };
        // Only a status glyph may precede the marker.
        if line[..idx].trim().chars().count() > 1 {
            continue;
        }
        let message = line[idx + marker.len()..].trim();
        return Some(match severity {
            Severity::Error => Diagnostic::error(message),
            Severity::Warning => Diagnostic::warning(message),
        });
    }
    None
}
