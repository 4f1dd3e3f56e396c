//! Optimistic-concurrency version expectations.

use crate::error::{DomainError, DomainResult};

/// Optimistic concurrency expectation for a persisted entity.
///
/// A writer states the version it read; the store rejects the write outright
/// if the entity has moved on since. `Any` skips the check (idempotent
/// maintenance commands, migrations).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking.
    Any,
    /// Require the entity to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}
