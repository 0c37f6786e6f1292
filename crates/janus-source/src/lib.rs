//! Single-file up/down SQL migrations for migration engines.
//!
//! `janus-source` turns a directory of versioned SQL files into an ordered
//! sequence of reversible migrations. Each file carries both directions:
//!
//! ```text
//! migrations/
//!   000001_create_users.sql
//!   000002_add_email.sql
//!   README.md              <- ignored
//! ```
//!
//! ```sql
//! -- +migrate UP
//! CREATE TABLE users (id INTEGER PRIMARY KEY);
//!
//! -- +migrate DOWN
//! DROP TABLE users;
//! ```
//!
//! # Architecture
//!
//! - **Filename** - validates `{version}_{name}.sql` and extracts its parts
//! - **Parser** - splits file content into UP and DOWN bodies
//! - **Index** - scans a directory once into a version-sorted index
//! - **Driver** - [`SingleFileSource`](driver::SingleFileSource), navigation over the index
//! - **Source** - the [`MigrationSource`](source::MigrationSource) contract engines consume
//! - **Registry** - maps URL schemes such as `singlefile://` to source openers
//! - **Plan** - works out which versions a goto has to run
//! - **Scaffold** - creates new migration files
//!
//! The SQL itself is never executed here; an engine drives the database.
//!
//! # Example
//!
//! ```rust,no_run
//! use janus_source::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let source = SingleFileSource::open("migrations")?;
//!
//! let mut version = source.first();
//! while let Ok(v) = version {
//!     let up = source.read_up(v)?;
//!     println!("{v} {}: {}", up.name, up.sql);
//!     version = source.next(v);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Create migrations/000001_create_users.sql
//! janus create create_users
//!
//! # List known versions
//! janus versions
//!
//! # Show the SQL a goto would run
//! janus plan --from 3 --to 1
//! ```

pub mod driver;
pub mod error;
pub mod filename;
pub mod index;
pub mod parser;
pub mod plan;
pub mod registry;
pub mod scaffold;
pub mod source;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::driver::SingleFileSource;
    pub use crate::error::{Lookup, Result, SourceError};
    pub use crate::index::{MigrationUnit, VersionIndex};
    pub use crate::plan::{count_between, plan_goto, Direction, MigrationPlan};
    pub use crate::registry::SourceRegistry;
    pub use crate::scaffold::{create_migration, VersionScheme};
    pub use crate::source::{MigrationContent, MigrationSource};
}
