//! Creation of new single-file migrations.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::info;

use crate::error::{Result, SourceError};
use crate::filename::is_valid_filename;
use crate::parser::{DOWN_MARKER, UP_MARKER};

/// Longest migration name accepted after sanitizing.
pub const MAX_NAME_LEN: usize = 100;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_]").expect("name sanitizer pattern is valid"));

static VERSION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)_").expect("version prefix pattern is valid"));

/// How a new migration gets its version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionScheme {
    /// One more than the highest existing version.
    #[default]
    Sequential,
    /// Current Unix time in seconds.
    Timestamp,
}

/// Turns free text into a migration name: every character outside
/// `[A-Za-z0-9_]` becomes `_`, surrounding underscores are dropped, and the
/// result is lowercased.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    UNSAFE_CHARS
        .replace_all(name, "_")
        .trim_matches('_')
        .to_lowercase()
}

/// Formats a version the way generated filenames carry it.
#[must_use]
pub fn format_version(version: u64) -> String {
    format!("{version:06}")
}

/// Returns one more than the highest version prefix found in `dir`.
///
/// A missing directory counts as empty.
///
/// # Errors
///
/// Fails when `dir` exists but cannot be listed, and with
/// [`SourceError::VersionOverflow`] when the highest version is `u64::MAX`.
pub fn next_sequential_version(dir: &Path) -> Result<u64> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(1),
        Err(source) => {
            return Err(SourceError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut max_version = 0u64;
    for entry in entries {
        let entry = entry.map_err(|source| SourceError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let file_name = entry.file_name();
        let Some(caps) = file_name.to_str().and_then(|n| VERSION_PREFIX.captures(n)) else {
            continue;
        };
        if let Ok(version) = caps[1].parse::<u64>() {
            max_version = max_version.max(version);
        }
    }

    max_version
        .checked_add(1)
        .ok_or(SourceError::VersionOverflow(max_version))
}

/// Returns the Unix time of `now` in seconds as a version.
///
/// # Errors
///
/// [`SourceError::ClockBeforeEpoch`] for a time before 1970.
pub fn timestamp_version(now: DateTime<Utc>) -> Result<u64> {
    let seconds = now.timestamp();
    u64::try_from(seconds).map_err(|_| SourceError::ClockBeforeEpoch(seconds))
}

/// Renders the body of a new migration file.
#[must_use]
pub fn template(name: &str, created: DateTime<Utc>) -> String {
    format!(
        "-- Migration: {name}\n\
         -- Created: {created}\n\
         \n\
         {UP_MARKER}\n\
         -- Add the UP migration SQL here\n\
         \n\
         \n\
         {DOWN_MARKER}\n\
         -- Add the DOWN migration SQL here\n\
         \n",
        created = created.format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Writes a new migration named `name` into `dir` and returns its path.
///
/// The directory is created when missing. Existing files are never
/// overwritten.
///
/// # Errors
///
/// [`SourceError::InvalidName`] for a name that is empty or longer than
/// [`MAX_NAME_LEN`] once sanitized, [`SourceError::MigrationExists`] when the
/// target file exists, [`SourceError::PathEscapesDirectory`] if the target
/// resolves outside `dir`, the errors of [`next_sequential_version`] and
/// [`timestamp_version`], and IO errors.
pub fn create_migration(dir: &Path, name: &str, scheme: VersionScheme) -> Result<PathBuf> {
    let name = sanitize_name(name);
    if name.is_empty() {
        return Err(SourceError::InvalidName("name is empty".to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(SourceError::InvalidName(format!(
            "name too long (max {MAX_NAME_LEN} chars)"
        )));
    }

    fs::create_dir_all(dir)?;
    let root = fs::canonicalize(dir)?;

    let now = Utc::now();
    let version = match scheme {
        VersionScheme::Sequential => next_sequential_version(&root)?,
        VersionScheme::Timestamp => timestamp_version(now)?,
    };

    let filename = format!("{}_{name}.sql", format_version(version));
    debug_assert!(is_valid_filename(&filename));
    let path = root.join(&filename);
    if path.parent() != Some(root.as_path()) {
        return Err(SourceError::PathEscapesDirectory(path));
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::AlreadyExists => SourceError::MigrationExists(path.clone()),
        _ => SourceError::Io(e),
    })?;
    std::io::Write::write_all(&mut file, template(&name, now).as_bytes())?;

    info!(version, name = %name, path = %path.display(), "created migration");
    Ok(path)
}
