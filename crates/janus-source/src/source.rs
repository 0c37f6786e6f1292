//! The contract between migration sources and migration engines.
//!
//! An engine only needs ordered navigation over versions and the SQL body of
//! each direction. Any layout (one file per version, two files per version,
//! embedded strings) can implement [`MigrationSource`] without the engine
//! changing.

use std::io::Read;

use crate::error::Result;

/// The SQL body of one direction of a migration, with its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationContent<'a> {
    /// Display name of the migration.
    pub name: &'a str,
    /// SQL body, never empty.
    pub sql: &'a str,
}

impl<'a> MigrationContent<'a> {
    /// Returns a reader over the SQL body.
    #[must_use]
    pub fn reader(&self) -> impl Read + 'a {
        self.sql.as_bytes()
    }
}

/// An ordered source of reversible migrations.
///
/// Every lookup that runs off the end of the sequence, asks for an unknown
/// version, or asks for a direction the migration does not have returns
/// [`SourceError::NotFound`](crate::error::SourceError::NotFound).
pub trait MigrationSource: Send + Sync {
    /// Returns the lowest version.
    ///
    /// # Errors
    ///
    /// `NotFound` when the source is empty.
    fn first(&self) -> Result<u64>;

    /// Returns the highest version strictly lower than `version`.
    ///
    /// # Errors
    ///
    /// `NotFound` when there is none.
    fn previous(&self, version: u64) -> Result<u64>;

    /// Returns the lowest version strictly greater than `version`.
    ///
    /// # Errors
    ///
    /// `NotFound` when there is none.
    fn next(&self, version: u64) -> Result<u64>;

    /// Returns the UP body of `version`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the version is unknown or has no UP body.
    fn read_up(&self, version: u64) -> Result<MigrationContent<'_>>;

    /// Returns the DOWN body of `version`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the version is unknown or has no DOWN body.
    fn read_down(&self, version: u64) -> Result<MigrationContent<'_>>;

    /// Releases the source.
    ///
    /// # Errors
    ///
    /// Implementations holding external resources may fail to release them.
    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
