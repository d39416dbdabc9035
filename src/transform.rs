//! Rewrites an esbuild IIFE bundle into a re-invocable initializer.
//!
//! The raw bundle runs once, reading `process`, `__filename` and friends from
//! whatever runtime evaluates it. The rewrite wraps the bundled body in a named
//! function taking those values as parameters and registers the function on
//! `globalThis`, so an embedding host can call it with its own values.
//!
//! All offsets operate on the text split by `\n`, so a file ending in a newline
//! contributes one trailing empty segment.

use crate::error::PipelineError;

/// Segments esbuild emits before bundled code starts.
pub const PREAMBLE_SEGMENTS: usize = 3;

/// Segments after bundled code: the closing wrapper line and the empty
/// segment left by the trailing newline.
pub const EPILOGUE_SEGMENTS: usize = 2;

const CLOSING_WRAPPER: &str = "})();";
const OPENING_WRAPPERS: &[&str] = &["(() => {", "(function() {", "(function () {"];

/// Name and parameter list of the generated initializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializerSignature {
    pub name: String,
    pub params: Vec<String>,
}

impl Default for InitializerSignature {
    fn default() -> Self {
        Self {
            name: "initEslint".to_string(),
            params: ["global", "process", "__filename", "__dirname"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl InitializerSignature {
    /// `function initEslint(global, process, __filename, __dirname) {`
    pub fn header(&self) -> String {
        format!("function {}({}) {{", self.name, self.params.join(", "))
    }

    /// Closing brace, a whitespace-only line of four spaces, then the global
    /// registration.
    ///
    /// Spliced in as a single segment so the footer counts once against the
    /// segment arithmetic.
    pub fn footer(&self) -> String {
        format!("}}\n    \nglobalThis.{0} = {0};", self.name)
    }
}

/// Where the header and footer are spliced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionPoints {
    /// Header at segment index 3, footer two segments before the end.
    #[default]
    FixedOffsets,
    /// Header after the detected IIFE opening line, footer before its
    /// closing line.
    Structural,
}

/// Zero-based segment indices of the IIFE opening and closing lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapperBounds {
    pub open: usize,
    pub close: usize,
}

/// How the detected wrapper relates to the fixed offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutCheck {
    Agrees,
    Disagrees(WrapperBounds),
    Unrecognized,
}

/// The rewritten bundle plus where the edits landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedBundle {
    pub text: String,
    /// Segment count after both insertions.
    pub segments: usize,
    pub header_index: usize,
    pub footer_index: usize,
    pub layout: LayoutCheck,
}

/// Locates the outermost IIFE wrapper lines.
pub fn detect_wrapper(segments: &[&str]) -> Option<WrapperBounds> {
    let open = segments
        .iter()
        .position(|s| OPENING_WRAPPERS.contains(&s.trim()))?;
    let close = segments.iter().rposition(|s| s.trim() == CLOSING_WRAPPER)?;
    (open < close).then_some(WrapperBounds { open, close })
}

/// Compares a detected wrapper with the positions the fixed offsets assume.
pub fn check_layout(segments: &[&str]) -> LayoutCheck {
    match detect_wrapper(segments) {
        None => LayoutCheck::Unrecognized,
        Some(bounds)
            if bounds.open + 1 == PREAMBLE_SEGMENTS
                && bounds.close + EPILOGUE_SEGMENTS == segments.len() =>
        {
            LayoutCheck::Agrees
        }
        Some(bounds) => LayoutCheck::Disagrees(bounds),
    }
}

/// Wraps the bundled body of `raw` into the initializer described by
/// `signature`.
///
/// With [`InsertionPoints::FixedOffsets`], a raw bundle of L segments yields
/// L + 2 segments: the header at index 3 and the footer at index L, directly
/// before the closing wrapper.
pub fn wrap_initializer(
    raw: &str,
    signature: &InitializerSignature,
    points: InsertionPoints,
) -> Result<WrappedBundle, PipelineError> {
    let segments: Vec<&str> = raw.split('\n').collect();
    let layout = check_layout(&segments);

    let (header_at, footer_before) = match points {
        InsertionPoints::FixedOffsets => {
            if segments.len() < PREAMBLE_SEGMENTS + EPILOGUE_SEGMENTS {
                return Err(PipelineError::BundleGeneration {
                    reason: format!(
                        "unexpected bundle layout: {} line(s), expected at least {}",
                        segments.len(),
                        PREAMBLE_SEGMENTS + EPILOGUE_SEGMENTS
                    ),
                });
            }
            (PREAMBLE_SEGMENTS, segments.len() - EPILOGUE_SEGMENTS)
        }
        InsertionPoints::Structural => {
            let bounds = detect_wrapper(&segments).ok_or_else(|| {
                PipelineError::BundleGeneration {
                    reason: "unexpected bundle layout: IIFE wrapper not found".to_string(),
                }
            })?;
            (bounds.open + 1, bounds.close)
        }
    };

    let header = signature.header();
    let footer = signature.footer();

    let mut out: Vec<&str> = Vec::with_capacity(segments.len() + 2);
    out.extend_from_slice(&segments[..header_at]);
    out.push(&header);
    out.extend_from_slice(&segments[header_at..footer_before]);
    out.push(&footer);
    out.extend_from_slice(&segments[footer_before..]);

    // The header shifted everything below it by one.
    let footer_index = footer_before + 1;

    Ok(WrappedBundle {
        text: out.join("\n"),
        segments: out.len(),
        header_index: header_at,
        footer_index,
        layout,
    })
}
