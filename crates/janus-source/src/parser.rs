//! Splits a migration file into its UP and DOWN bodies.
//!
//! ```text
//! -- optional commentary, ignored
//! -- +migrate UP
//! CREATE TABLE users (id INT);
//!
//! -- +migrate DOWN
//! DROP TABLE users;
//! ```
//!
//! Markers are matched against the start of the trimmed line, so
//! `-- +migrate UP extra text` also opens the UP section. Existing migration
//! files rely on this, so it is kept as is.

/// Line that opens the UP section.
pub const UP_MARKER: &str = "-- +migrate UP";

/// Line that opens the DOWN section.
pub const DOWN_MARKER: &str = "-- +migrate DOWN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Up,
    Down,
}

/// Extracts the `(up, down)` bodies from migration file content.
///
/// Lines before the first marker are dropped. Each body is trimmed at both
/// ends; blank lines and comments inside it are kept. A missing marker gives
/// an empty body.
#[must_use]
pub fn parse_content(content: &str) -> (String, String) {
    let mut up_lines = Vec::new();
    let mut down_lines = Vec::new();
    let mut section = Section::None;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with(UP_MARKER) {
            section = Section::Up;
            continue;
        }
        if trimmed.starts_with(DOWN_MARKER) {
            section = Section::Down;
            continue;
        }

        match section {
            Section::Up => up_lines.push(line),
            Section::Down => down_lines.push(line),
            Section::None => {}
        }
    }

    (
        up_lines.join("\n").trim().to_string(),
        down_lines.join("\n").trim().to_string(),
    )
}
