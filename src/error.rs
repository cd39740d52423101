//! Error types shared across the crate.

use std::fmt;
use std::path::PathBuf;

use crate::shape::Coord;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A malformed line in a shape text resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    pub content: String,
    pub reason: &'static str,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {} (found {:?})",
            self.line, self.reason, self.content
        )
    }
}

impl std::error::Error for ParseError {}

/// `unplace` touched cells that were not occupied, or not on the board.
///
/// This only happens when an unplace is not the exact inverse of an earlier
/// successful place, which is a bug in the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityError {
    pub cells: Vec<Coord>,
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unplace hit cells that were not occupied: {:?}", self.cells)
    }
}

impl std::error::Error for IntegrityError {}

#[derive(Debug)]
pub enum Error {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: ParseError,
    },
    Index {
        path: PathBuf,
        source: serde_json::Error,
    },
    Report {
        path: PathBuf,
        source: serde_json::Error,
    },
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidShape {
        name: String,
        reason: String,
    },
    InvalidColor(String),
    InvalidBoard {
        rows: usize,
        cols: usize,
    },
    DuplicateShape(String),
    UnknownShape(String),
    Integrity(IntegrityError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, .. } => write!(f, "failed to access {}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "failed to parse shape {}: {source}", path.display())
            }
            Self::Index { path, .. } => {
                write!(f, "failed to read catalog index {}", path.display())
            }
            Self::Report { path, .. } => {
                write!(f, "failed to encode or decode report {}", path.display())
            }
            Self::Config { path, .. } => write!(f, "failed to parse config {}", path.display()),
            Self::InvalidShape { name, reason } => write!(f, "invalid shape {name:?}: {reason}"),
            Self::InvalidColor(text) => {
                write!(f, "invalid colour {text:?}, expected hsl(H, S%, L%)")
            }
            Self::InvalidBoard { rows, cols } => {
                write!(f, "board must have at least one row and column, got {rows}x{cols}")
            }
            Self::DuplicateShape(name) => write!(f, "shape {name:?} is listed more than once"),
            Self::UnknownShape(name) => write!(f, "no shape named {name:?} in the catalog"),
            Self::Integrity(_) => write!(f, "board integrity check failed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Index { source, .. } | Self::Report { source, .. } => Some(source),
            Self::Config { source, .. } => Some(source),
            Self::Integrity(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IntegrityError> for Error {
    fn from(err: IntegrityError) -> Self {
        Self::Integrity(err)
    }
}
