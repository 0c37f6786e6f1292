//! Version index built from a migrations directory.
//!
//! The index is built once and never changes afterwards. Navigation runs
//! against the sorted version list, never against directory-listing order.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::error::{Lookup, Result, SourceError};
use crate::filename::parse_filename;
use crate::parser::parse_content;

/// One versioned pair of UP/DOWN bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationUnit {
    /// Version parsed from the filename.
    pub version: u64,
    /// Display name parsed from the filename.
    pub name: String,
    /// Trimmed UP body, possibly empty.
    pub up: String,
    /// Trimmed DOWN body, possibly empty.
    pub down: String,
    /// Canonical path of the file the unit was read from.
    pub path: PathBuf,
}

impl MigrationUnit {
    /// Returns whether the unit has an UP body.
    #[must_use]
    pub fn has_up(&self) -> bool {
        !self.up.is_empty()
    }

    /// Returns whether the unit has a DOWN body.
    #[must_use]
    pub fn has_down(&self) -> bool {
        !self.down.is_empty()
    }
}

/// Migration units keyed by version, with the versions in ascending order.
#[derive(Debug, Clone, Default)]
pub struct VersionIndex {
    units: BTreeMap<u64, MigrationUnit>,
    versions: Vec<u64>,
}

impl VersionIndex {
    /// Scans `dir` and builds the index.
    ///
    /// Entries that do not follow the `{version}_{name}.sql` grammar, that
    /// are not regular files, or that resolve outside `dir` are skipped.
    ///
    /// # Errors
    ///
    /// Fails without returning a partial index when the directory cannot be
    /// read, a matching file cannot be read, a version token overflows, or
    /// two files share a version.
    pub fn build(dir: &Path) -> Result<Self> {
        let read_dir_err = |source| SourceError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let root = fs::canonicalize(dir).map_err(read_dir_err)?;
        let entries = fs::read_dir(&root).map_err(read_dir_err)?;

        let mut units: BTreeMap<u64, MigrationUnit> = BTreeMap::new();

        for entry in entries {
            let entry = entry.map_err(read_dir_err)?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                trace!(entry = ?entry.path(), "skipping non UTF-8 filename");
                continue;
            };

            let Some(parts) = parse_filename(file_name) else {
                trace!(file = file_name, "skipping non-migration entry");
                continue;
            };

            let Some(path) = resolve_within(&root, file_name) else {
                debug!(file = file_name, "skipping entry outside migrations directory");
                continue;
            };

            let version = parts.version()?;
            let content = fs::read_to_string(&path).map_err(|source| SourceError::ReadFile {
                path: path.clone(),
                source,
            })?;
            let (up, down) = parse_content(&content);

            match units.entry(version) {
                Entry::Occupied(existing) => {
                    return Err(SourceError::DuplicateVersion {
                        version,
                        first: existing.get().path.clone(),
                        second: path,
                    });
                }
                Entry::Vacant(slot) => {
                    debug!(
                        version,
                        name = parts.name(),
                        up = !up.is_empty(),
                        down = !down.is_empty(),
                        "loaded migration"
                    );
                    slot.insert(MigrationUnit {
                        version,
                        name: parts.name().to_string(),
                        up,
                        down,
                        path,
                    });
                }
            }
        }

        // BTreeMap keys iterate in ascending order.
        let versions: Vec<u64> = units.keys().copied().collect();

        info!(
            directory = %root.display(),
            migrations = versions.len(),
            "indexed migrations"
        );

        Ok(Self { units, versions })
    }

    /// All units keyed by version.
    #[must_use]
    pub const fn units(&self) -> &BTreeMap<u64, MigrationUnit> {
        &self.units
    }

    /// All versions in ascending order.
    #[must_use]
    pub fn versions(&self) -> &[u64] {
        &self.versions
    }

    /// The unit for `version`, if any.
    #[must_use]
    pub fn get(&self, version: u64) -> Option<&MigrationUnit> {
        self.units.get(&version)
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Returns whether the index holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Lowest version.
    ///
    /// # Errors
    ///
    /// [`SourceError::NotFound`] when the index is empty.
    pub fn first(&self) -> Result<u64> {
        self.versions
            .first()
            .copied()
            .ok_or(SourceError::NotFound(Lookup::First))
    }

    /// Highest version strictly below `version`.
    ///
    /// # Errors
    ///
    /// [`SourceError::NotFound`] when there is none.
    pub fn previous(&self, version: u64) -> Result<u64> {
        let idx = self.versions.partition_point(|&v| v < version);
        idx.checked_sub(1)
            .map(|i| self.versions[i])
            .ok_or(SourceError::NotFound(Lookup::Previous(version)))
    }

    /// Lowest version strictly above `version`.
    ///
    /// # Errors
    ///
    /// [`SourceError::NotFound`] when there is none.
    pub fn next(&self, version: u64) -> Result<u64> {
        let idx = self.versions.partition_point(|&v| v <= version);
        self.versions
            .get(idx)
            .copied()
            .ok_or(SourceError::NotFound(Lookup::Next(version)))
    }
}

/// Canonicalizes `root/file_name` and returns it only when it is a regular
/// file strictly inside `root`.
fn resolve_within(root: &Path, file_name: &str) -> Option<PathBuf> {
    let resolved = fs::canonicalize(root.join(file_name)).ok()?;
    if resolved == root || !resolved.starts_with(root) {
        return None;
    }
    if !resolved.is_file() {
        return None;
    }
    Some(resolved)
}
