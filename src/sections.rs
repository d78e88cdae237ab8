//! Marker-based argument sectioning
//!
//! The driver does not own a flag schema for the tools it wraps. Instead the
//! raw argument vector is split by marker tokens (`@cargo`, `@run`, ...) and
//! every token after a marker is forwarded verbatim to that marker's tool.

use std::ffi::{OsStr, OsString};
use std::fmt;

/// Prefix shared by every marker token
pub const MARKER_PREFIX: char = '@';

/// Kind of section a marker opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Arguments for the toolchain (cargo)
    Build,
    /// Arguments for the packaging executable
    Run,
}

impl SectionKind {
    /// Map a marker token to its section kind.
    ///
    /// Returns `None` for ordinary tokens and for marker-shaped tokens
    /// that name no known section.
    pub fn from_marker(token: &OsStr) -> Option<Self> {
        let name = token.to_str()?.strip_prefix(MARKER_PREFIX)?;
        if name.eq_ignore_ascii_case("cargo") || name.eq_ignore_ascii_case("build") {
            Some(SectionKind::Build)
        } else if name.eq_ignore_ascii_case("run") || name.eq_ignore_ascii_case("pack") {
            Some(SectionKind::Run)
        } else {
            None
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Build => write!(f, "build"),
            SectionKind::Run => write!(f, "run"),
        }
    }
}

/// Check whether a token has the syntactic shape of a marker.
///
/// Markers are plain ASCII, so a token that is not valid UTF-8 never is one.
pub fn is_marker_shaped(token: &OsStr) -> bool {
    token
        .to_str()
        .map(|t| t.len() > MARKER_PREFIX.len_utf8() && t.starts_with(MARKER_PREFIX))
        .unwrap_or(false)
}

/// Non-fatal problem found while sectioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageWarning {
    /// Token appeared before any section was opened
    StrayToken(String),
    /// Marker-shaped token that names no known section
    UnknownMarker(String),
}

impl fmt::Display for UsageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageWarning::StrayToken(token) => {
                write!(f, "ignoring '{}': not inside any section", token)
            }
            UsageWarning::UnknownMarker(token) => {
                write!(f, "ignoring unknown section marker '{}'", token)
            }
        }
    }
}

/// Arguments grouped by section kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    build: Option<Vec<OsString>>,
    run: Option<Vec<OsString>>,
}

impl Sections {
    /// Arguments of the build section, if a build marker was seen
    pub fn build(&self) -> Option<&[OsString]> {
        self.build.as_deref()
    }

    /// Arguments of the run section, if a run marker was seen
    pub fn run(&self) -> Option<&[OsString]> {
        self.run.as_deref()
    }

    /// True when no marker opened any section
    pub fn is_empty(&self) -> bool {
        self.build.is_none() && self.run.is_none()
    }

    fn open(&mut self, kind: SectionKind) -> &mut Vec<OsString> {
        let slot = match kind {
            SectionKind::Build => &mut self.build,
            SectionKind::Run => &mut self.run,
        };
        slot.get_or_insert_with(Vec::new)
    }
}

/// Result of splitting an argument vector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitArgs {
    pub sections: Sections,
    pub warnings: Vec<UsageWarning>,
}

/// Split raw arguments into sections.
///
/// A repeated marker reopens its section and keeps appending to it, so the
/// arguments of one kind always come out in the order they were given.
pub fn split<I, S>(args: I) -> SplitArgs
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut out = SplitArgs::default();
    let mut current: Option<SectionKind> = None;

    for token in args {
        let token = token.into();

        if let Some(kind) = SectionKind::from_marker(&token) {
            out.sections.open(kind);
            current = Some(kind);
            continue;
        }

        if is_marker_shaped(&token) {
            out.warnings
                .push(UsageWarning::UnknownMarker(token.to_string_lossy().into_owned()));
            continue;
        }

        match current {
            Some(kind) => out.sections.open(kind).push(token),
            None => out
                .warnings
                .push(UsageWarning::StrayToken(token.to_string_lossy().into_owned())),
        }
    }

    out
}
