//! Single-file migration source.
//!
//! Each `{version}_{name}.sql` file in a directory carries both the UP and
//! the DOWN SQL of its version. The directory is scanned once when the
//! source is opened; every lookup afterwards is served from memory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Lookup, Result, SourceError};
use crate::index::{MigrationUnit, VersionIndex};
use crate::source::{MigrationContent, MigrationSource};

/// URL scheme of the single-file source.
pub const SCHEME: &str = "singlefile";

/// A migration source backed by a directory of single-file migrations.
#[derive(Debug, Clone)]
pub struct SingleFileSource {
    path: PathBuf,
    index: VersionIndex,
}

impl SingleFileSource {
    /// Opens the migrations directory at `path` and indexes it.
    ///
    /// # Errors
    ///
    /// Fails when `path` does not exist, is not a directory, or the scan
    /// fails (unreadable file, duplicate or malformed version).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::DirectoryNotFound(path.to_path_buf()),
            _ => SourceError::ReadDir {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        if !metadata.is_dir() {
            return Err(SourceError::NotADirectory(path.to_path_buf()));
        }

        debug!(path = %path.display(), "opening single-file migration source");
        let index = VersionIndex::build(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            index,
        })
    }

    /// Opens a `singlefile://path` URL.
    ///
    /// # Errors
    ///
    /// [`SourceError::InvalidUrl`] when the URL does not use the
    /// `singlefile` scheme, otherwise the errors of [`SingleFileSource::open`].
    pub fn open_url(url: &str) -> Result<Self> {
        Self::open(Self::path_from_url(url)?)
    }

    /// Extracts the directory of a `singlefile://path` URL.
    ///
    /// # Errors
    ///
    /// [`SourceError::InvalidUrl`] when the URL does not use the
    /// `singlefile` scheme.
    pub fn path_from_url(url: &str) -> Result<&Path> {
        url.strip_prefix(SCHEME)
            .and_then(|rest| rest.strip_prefix("://"))
            .map(Path::new)
            .ok_or_else(|| SourceError::InvalidUrl(url.to_string()))
    }

    /// The directory this source was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All migrations keyed by version.
    #[must_use]
    pub const fn units(&self) -> &BTreeMap<u64, MigrationUnit> {
        self.index.units()
    }

    /// All versions in ascending order.
    #[must_use]
    pub fn versions(&self) -> &[u64] {
        self.index.versions()
    }

    /// The migration for `version`, if any.
    #[must_use]
    pub fn get(&self, version: u64) -> Option<&MigrationUnit> {
        self.index.get(version)
    }

    fn read(
        &self,
        version: u64,
        lookup: Lookup,
        body: impl Fn(&MigrationUnit) -> &str,
    ) -> Result<MigrationContent<'_>> {
        let unit = self.index.get(version).ok_or(SourceError::NotFound(lookup))?;
        let sql = body(unit);
        if sql.is_empty() {
            return Err(SourceError::NotFound(lookup));
        }
        Ok(MigrationContent {
            name: &unit.name,
            sql,
        })
    }
}

impl MigrationSource for SingleFileSource {
    fn first(&self) -> Result<u64> {
        self.index.first()
    }

    fn previous(&self, version: u64) -> Result<u64> {
        self.index.previous(version)
    }

    fn next(&self, version: u64) -> Result<u64> {
        self.index.next(version)
    }

    fn read_up(&self, version: u64) -> Result<MigrationContent<'_>> {
        self.read(version, Lookup::Up(version), |unit| unit.up.as_str())
    }

    fn read_down(&self, version: u64) -> Result<MigrationContent<'_>> {
        self.read(version, Lookup::Down(version), |unit| unit.down.as_str())
    }
}
