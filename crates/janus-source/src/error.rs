//! Error types for migration sources.

use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;

/// The lookup that produced a [`SourceError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The first version of an empty source.
    First,
    /// A version strictly lower than the given one.
    Previous(u64),
    /// A version strictly greater than the given one.
    Next(u64),
    /// The UP body of a version.
    Up(u64),
    /// The DOWN body of a version.
    Down(u64),
    /// A version that the source does not contain.
    Version(u64),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "first version"),
            Self::Previous(v) => write!(f, "version before {v}"),
            Self::Next(v) => write!(f, "version after {v}"),
            Self::Up(v) => write!(f, "UP migration for version {v}"),
            Self::Down(v) => write!(f, "DOWN migration for version {v}"),
            Self::Version(v) => write!(f, "version {v}"),
        }
    }
}

/// Errors that can occur while opening or reading a migration source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Normal end of iteration, a missing direction, or an unknown version.
    ///
    /// Engines treat this as control flow, not as a failure.
    #[error("not found: {0}")]
    NotFound(Lookup),

    /// The migrations path does not exist.
    #[error("Migrations directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// The migrations path exists but is not a directory.
    #[error("Migrations path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The migrations directory could not be listed or resolved.
    #[error("Failed to read migrations directory '{path}': {source}")]
    ReadDir {
        /// Directory being scanned.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A migration file matched the filename grammar but could not be read.
    #[error("Failed to read migration file '{path}': {source}")]
    ReadFile {
        /// File being read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Two files encode the same version.
    #[error("Duplicate migration version {version}: '{first}' and '{second}'")]
    DuplicateVersion {
        /// The conflicting version.
        version: u64,
        /// File that claimed the version first.
        first: PathBuf,
        /// File that claimed it again.
        second: PathBuf,
    },

    /// The version token of a filename does not fit an unsigned 64-bit integer.
    #[error("Invalid version in migration filename '{filename}': {source}")]
    InvalidVersion {
        /// Offending filename.
        filename: String,
        /// Integer parse failure.
        source: ParseIntError,
    },

    /// A source URL without a `scheme://` prefix.
    #[error("Invalid source URL '{0}' (expected scheme://path)")]
    InvalidUrl(String),

    /// No opener is registered for the URL scheme.
    #[error("Unknown source scheme: {0}")]
    UnknownScheme(String),

    /// An opener is already registered for the scheme.
    #[error("Source scheme already registered: {0}")]
    SchemeAlreadyRegistered(String),

    /// A migration name that is empty or too long after sanitizing.
    #[error("Invalid migration name: {0}")]
    InvalidName(String),

    /// A new migration file would overwrite an existing one.
    #[error("Migration file already exists: {0}")]
    MigrationExists(PathBuf),

    /// No version follows the highest existing one.
    #[error("No version left after {0}")]
    VersionOverflow(u64),

    /// The system clock reports a time before the Unix epoch.
    #[error("System clock is before the Unix epoch ({0}s)")]
    ClockBeforeEpoch(i64),

    /// A generated path resolved outside the migrations directory.
    #[error("Path escapes migrations directory: {0}")]
    PathEscapesDirectory(PathBuf),

    /// IO error outside of the directory scan (creating migration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Returns whether this error is the not-found iteration signal.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for migration source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
