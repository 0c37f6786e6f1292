//! Integration tests for the single-file migration source.
//!
//! These tests lay out migration directories on disk, open them through the
//! public API and walk them the way a migration engine would.

use std::fs;
use std::path::Path;

use janus_source::prelude::*;

const BOTH: &str = "-- +migrate UP\nCREATE TABLE t;\n-- +migrate DOWN\nDROP TABLE t;";

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn navigation_follows_version_order_not_creation_order() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["000002_b.sql", "000001_a.sql", "000003_c.sql"] {
        write(dir.path(), name, BOTH);
    }
    let source = SingleFileSource::open(dir.path()).unwrap();

    assert_eq!(source.first().unwrap(), 1);
    assert_eq!(source.next(1).unwrap(), 2);
    assert_eq!(source.next(2).unwrap(), 3);
    assert!(matches!(
        source.next(3),
        Err(SourceError::NotFound(Lookup::Next(3)))
    ));
    assert!(matches!(
        source.previous(1),
        Err(SourceError::NotFound(Lookup::Previous(1)))
    ));
    assert_eq!(source.previous(3).unwrap(), 2);
}

#[test]
fn engine_style_walk_up_then_down() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "000001_users.sql",
        "-- +migrate UP\nCREATE TABLE users (id INT);\n-- +migrate DOWN\nDROP TABLE users;",
    );
    write(
        dir.path(),
        "000002_posts.sql",
        "-- +migrate UP\nCREATE TABLE posts (id INT);\n-- +migrate DOWN\nDROP TABLE posts;",
    );

    let registry = SourceRegistry::with_defaults();
    let source = registry
        .open(&format!("singlefile://{}", dir.path().display()))
        .unwrap();

    let mut applied = Vec::new();
    let mut version = source.first();
    while let Ok(v) = version {
        applied.push(source.read_up(v).unwrap().sql.to_string());
        version = source.next(v);
    }
    assert_eq!(
        applied,
        vec!["CREATE TABLE users (id INT);", "CREATE TABLE posts (id INT);"]
    );

    let mut reverted = Vec::new();
    let mut version = Ok(2);
    while let Ok(v) = version {
        reverted.push(source.read_down(v).unwrap().sql.to_string());
        version = source.previous(v);
    }
    assert_eq!(reverted, vec!["DROP TABLE posts;", "DROP TABLE users;"]);

    source.close().unwrap();
}

// =============================================================================
// Directory contents
// =============================================================================

#[test]
fn unrelated_entries_are_silently_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "000001_x.sql", BOTH);
    write(dir.path(), "readme.md", "readme");
    write(dir.path(), "invalid.sql", "sql");
    write(dir.path(), "000002_.sql", "sql");
    fs::create_dir(dir.path().join("subdir")).unwrap();
    write(&dir.path().join("subdir"), "000003_nested.sql", BOTH);

    let source = SingleFileSource::open(dir.path()).unwrap();
    assert_eq!(source.versions(), &[1]);
    assert_eq!(source.units().len(), 1);
}

#[test]
fn duplicate_versions_abort_construction() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "000001_first.sql", BOTH);
    write(dir.path(), "000001_duplicate.sql", BOTH);
    write(dir.path(), "000002_other.sql", BOTH);

    let err = SingleFileSource::open(dir.path()).unwrap_err();
    assert!(!err.is_not_found());
    match err {
        SourceError::DuplicateVersion { version, .. } => assert_eq!(version, 1),
        other => panic!("expected duplicate version error, got {other}"),
    }
}

#[test]
fn one_directional_migrations() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "000001_down_only.sql",
        "-- +migrate DOWN\n\n   DROP TABLE users;   \n\n",
    );
    let source = SingleFileSource::open(dir.path()).unwrap();

    assert!(source.read_up(1).unwrap_err().is_not_found());
    let down = source.read_down(1).unwrap();
    assert_eq!(down.sql, "DROP TABLE users;");
    assert_eq!(down.name, "down_only");
}

#[test]
fn unreadable_content_aborts_construction() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "000001_ok.sql", BOTH);
    fs::write(dir.path().join("000002_binary.sql"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let err = SingleFileSource::open(dir.path()).unwrap_err();
    assert!(matches!(err, SourceError::ReadFile { .. }));
}

#[cfg(unix)]
#[test]
fn symlinks_escaping_the_directory_are_excluded() {
    let outside = tempfile::tempdir().unwrap();
    write(outside.path(), "000009_outside.sql", BOTH);

    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "000001_inside.sql", BOTH);
    std::os::unix::fs::symlink(
        outside.path().join("000009_outside.sql"),
        dir.path().join("000009_outside.sql"),
    )
    .unwrap();

    let source = SingleFileSource::open(dir.path()).unwrap();
    assert_eq!(source.versions(), &[1]);
    assert!(source.read_up(9).unwrap_err().is_not_found());
}

// =============================================================================
// Authoring and planning
// =============================================================================

#[test]
fn created_migrations_are_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    create_migration(dir.path(), "create users", VersionScheme::Sequential).unwrap();
    create_migration(dir.path(), "add email", VersionScheme::Sequential).unwrap();

    let source = SingleFileSource::open(dir.path()).unwrap();
    assert_eq!(source.versions(), &[1, 2]);
    assert_eq!(source.read_up(2).unwrap().name, "add_email");

    let plan = plan_goto(&source, Some(2), None).unwrap();
    assert_eq!(plan.direction, Direction::Down);
    assert_eq!(plan.steps, vec![2, 1]);
    assert_eq!(count_between(&source, 0, 2).unwrap(), 2);
}
