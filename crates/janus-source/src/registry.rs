//! Registry mapping URL schemes to migration source openers.
//!
//! The registry is an ordinary value built at startup and passed to whoever
//! opens sources. Nothing registers itself behind the caller's back.
//!
//! ```rust
//! use janus_source::registry::SourceRegistry;
//!
//! let registry = SourceRegistry::with_defaults();
//! assert_eq!(registry.schemes(), vec!["singlefile"]);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::driver::{self, SingleFileSource};
use crate::error::{Result, SourceError};
use crate::source::MigrationSource;

/// Opens a source from the part of the URL after `scheme://`.
pub type Opener = Arc<dyn Fn(&str) -> Result<Box<dyn MigrationSource>> + Send + Sync>;

/// Known source schemes and how to open them.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    openers: HashMap<String, Opener>,
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

impl SourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in `singlefile` source.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.openers.insert(
            driver::SCHEME.to_string(),
            Arc::new(|path: &str| {
                SingleFileSource::open(path).map(|s| Box::new(s) as Box<dyn MigrationSource>)
            }),
        );
        registry
    }

    /// Registers an opener for `scheme`.
    ///
    /// # Errors
    ///
    /// [`SourceError::SchemeAlreadyRegistered`] when `scheme` is taken.
    pub fn register<F>(mut self, scheme: impl Into<String>, opener: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<Box<dyn MigrationSource>> + Send + Sync + 'static,
    {
        let scheme = scheme.into();
        if self.openers.contains_key(&scheme) {
            return Err(SourceError::SchemeAlreadyRegistered(scheme));
        }
        debug!(scheme = %scheme, "registered migration source");
        self.openers.insert(scheme, Arc::new(opener));
        Ok(self)
    }

    /// Returns whether `scheme` has an opener.
    #[must_use]
    pub fn contains(&self, scheme: &str) -> bool {
        self.openers.contains_key(scheme)
    }

    /// Registered schemes, sorted.
    #[must_use]
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.openers.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Opens the source a `scheme://location` URL points at.
    ///
    /// # Errors
    ///
    /// [`SourceError::InvalidUrl`] without a `://` separator,
    /// [`SourceError::UnknownScheme`] for an unregistered scheme, and any
    /// error the opener returns.
    pub fn open(&self, url: &str) -> Result<Box<dyn MigrationSource>> {
        let (scheme, location) = url
            .split_once("://")
            .ok_or_else(|| SourceError::InvalidUrl(url.to_string()))?;
        let opener = self
            .openers
            .get(scheme)
            .ok_or_else(|| SourceError::UnknownScheme(scheme.to_string()))?;
        debug!(scheme, location, "opening migration source");
        opener(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Lookup;
    use crate::source::MigrationContent;

    struct EmptySource;

    impl MigrationSource for EmptySource {
        fn first(&self) -> Result<u64> {
            Err(SourceError::NotFound(Lookup::First))
        }

        fn previous(&self, version: u64) -> Result<u64> {
            Err(SourceError::NotFound(Lookup::Previous(version)))
        }

        fn next(&self, version: u64) -> Result<u64> {
            Err(SourceError::NotFound(Lookup::Next(version)))
        }

        fn read_up(&self, version: u64) -> Result<MigrationContent<'_>> {
            Err(SourceError::NotFound(Lookup::Up(version)))
        }

        fn read_down(&self, version: u64) -> Result<MigrationContent<'_>> {
            Err(SourceError::NotFound(Lookup::Down(version)))
        }
    }

    fn open_err(registry: &SourceRegistry, url: &str) -> SourceError {
        match registry.open(url) {
            Ok(_) => panic!("expected opening {url} to fail"),
            Err(err) => err,
        }
    }

    #[test]
    fn test_defaults_open_singlefile() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("000001_init.sql"),
            "-- +migrate UP\nCREATE TABLE t;",
        )
        .unwrap();

        let registry = SourceRegistry::with_defaults();
        let source = registry
            .open(&format!("singlefile://{}", dir.path().display()))
            .unwrap();
        assert_eq!(source.first().unwrap(), 1);
        assert_eq!(source.read_up(1).unwrap().sql, "CREATE TABLE t;");
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = SourceRegistry::new();
        assert!(registry.schemes().is_empty());
        let err = open_err(&registry, "singlefile://migrations");
        assert!(matches!(err, SourceError::UnknownScheme(s) if s == "singlefile"));
    }

    #[test]
    fn test_invalid_url() {
        let registry = SourceRegistry::with_defaults();
        let err = open_err(&registry, "migrations");
        assert!(matches!(err, SourceError::InvalidUrl(_)));
    }

    #[test]
    fn test_register_custom_scheme() {
        let registry = SourceRegistry::with_defaults()
            .register("empty", |_| Ok(Box::new(EmptySource) as Box<dyn MigrationSource>))
            .unwrap();

        assert!(registry.contains("empty"));
        assert_eq!(registry.schemes(), vec!["empty", "singlefile"]);

        let source = registry.open("empty://anything").unwrap();
        assert!(source.first().unwrap_err().is_not_found());
    }

    #[test]
    fn test_register_duplicate_scheme() {
        let err = SourceRegistry::with_defaults()
            .register("singlefile", |_| {
                Ok(Box::new(EmptySource) as Box<dyn MigrationSource>)
            })
            .unwrap_err();
        assert!(matches!(err, SourceError::SchemeAlreadyRegistered(s) if s == "singlefile"));
    }

    #[test]
    fn test_opener_errors_propagate() {
        let registry = SourceRegistry::with_defaults();
        let err = open_err(&registry, "singlefile:///definitely/not/a/real/dir");
        assert!(matches!(err, SourceError::DirectoryNotFound(_)));
    }
}
