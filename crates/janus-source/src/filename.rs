//! Migration filename validation.
//!
//! A migration file is named `{version}_{name}.sql`: one or more ASCII digits,
//! an underscore, a non-empty name, and the `.sql` suffix. The name may not
//! contain dots or path separators.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SourceError};

/// Suffix every migration file carries.
pub const SQL_SUFFIX: &str = ".sql";

static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)_([^./\\]+)\.sql$").expect("migration filename pattern is valid")
});

/// The components of a valid migration filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilenameParts<'a> {
    filename: &'a str,
    version: &'a str,
    name: &'a str,
}

impl<'a> FilenameParts<'a> {
    /// The full filename these parts came from.
    #[must_use]
    pub const fn filename(&self) -> &'a str {
        self.filename
    }

    /// The raw digit token, leading zeros included.
    #[must_use]
    pub const fn version_token(&self) -> &'a str {
        self.version
    }

    /// The display name between the underscore and the suffix.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// Parses the version token.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidVersion`] when the token does not fit in a `u64`.
    pub fn version(&self) -> Result<u64> {
        self.version
            .parse()
            .map_err(|source| SourceError::InvalidVersion {
                filename: self.filename.to_string(),
                source,
            })
    }
}

/// Returns whether `filename` follows the `{version}_{name}.sql` grammar.
#[must_use]
pub fn is_valid_filename(filename: &str) -> bool {
    FILENAME_PATTERN.is_match(filename)
}

/// Splits a valid migration filename into its version token and name.
///
/// Returns `None` for anything outside the grammar.
#[must_use]
pub fn parse_filename(filename: &str) -> Option<FilenameParts<'_>> {
    let caps = FILENAME_PATTERN.captures(filename)?;
    Some(FilenameParts {
        filename,
        version: caps.get(1)?.as_str(),
        name: caps.get(2)?.as_str(),
    })
}
