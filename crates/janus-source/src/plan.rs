//! Goto planning over any [`MigrationSource`].
//!
//! Works out which versions an engine has to apply or revert to move from the
//! current version to a target, using nothing but the source's navigation
//! primitives.

use std::fmt;

use crate::error::{Lookup, Result, SourceError};
use crate::source::MigrationSource;

/// Direction of a planned move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply UP bodies in ascending order.
    Up,
    /// Apply DOWN bodies in descending order.
    Down,
    /// Already at the target.
    None,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
            Self::None => write!(f, "NONE"),
        }
    }
}

/// Ordered versions to run to reach a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    /// Direction of every step.
    pub direction: Direction,
    /// Versions in execution order.
    pub steps: Vec<u64>,
}

impl MigrationPlan {
    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns whether there is nothing to run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Collects every version of `source` in ascending order.
///
/// # Errors
///
/// Any error other than the not-found that ends the walk.
pub fn collect_versions(source: &dyn MigrationSource) -> Result<Vec<u64>> {
    let mut versions = Vec::new();
    let mut current = source.first();
    loop {
        match current {
            Ok(version) => {
                versions.push(version);
                current = source.next(version);
            }
            Err(err) if err.is_not_found() => return Ok(versions),
            Err(err) => return Err(err),
        }
    }
}

/// Counts the versions `v` with `from < v <= to`.
///
/// # Errors
///
/// Any error other than the not-found that ends the walk.
pub fn count_between(source: &dyn MigrationSource, from: u64, to: u64) -> Result<usize> {
    Ok(collect_versions(source)?
        .into_iter()
        .filter(|&v| v > from && v <= to)
        .count())
}

/// Plans the move from `current` to `target`.
///
/// `None` on either side means no migration applied. Moving up applies every
/// version above `current` up to and including `target`; moving down reverts
/// every version above `target` up to and including `current`, highest first.
///
/// # Errors
///
/// [`SourceError::NotFound`] when `target` is not a version of `source`, and
/// any error the source reports while walking.
pub fn plan_goto(
    source: &dyn MigrationSource,
    current: Option<u64>,
    target: Option<u64>,
) -> Result<MigrationPlan> {
    let versions = collect_versions(source)?;
    if let Some(target) = target {
        if versions.binary_search(&target).is_err() {
            return Err(SourceError::NotFound(Lookup::Version(target)));
        }
    }

    let above = |bound: Option<u64>, v: u64| bound.is_none_or(|b| v > b);
    let at_most = |bound: Option<u64>, v: u64| bound.is_some_and(|b| v <= b);

    let (direction, steps) = match current.cmp(&target) {
        std::cmp::Ordering::Less => {
            let steps = versions
                .into_iter()
                .filter(|&v| above(current, v) && at_most(target, v))
                .collect();
            (Direction::Up, steps)
        }
        std::cmp::Ordering::Greater => {
            let steps = versions
                .into_iter()
                .rev()
                .filter(|&v| above(target, v) && at_most(current, v))
                .collect();
            (Direction::Down, steps)
        }
        std::cmp::Ordering::Equal => (Direction::None, Vec::new()),
    };

    Ok(MigrationPlan { direction, steps })
}
