use std::fmt;

use migrator_repository::{TargetStore, TargetStoreError};

/// How the executor keeps foreign-key enforcement from rejecting rows.
///
/// Resolved once per run from the target's capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionStrategy {
    /// Integrity enforcement is off for the session; rows go in dependency
    /// order and existing rows are conflict-skipped.
    DisabledConstraints,
    /// Enforcement cannot be turned off; target tables are truncated children
    /// first, then filled in dependency order.
    OrderedWithPreclear,
}

impl InsertionStrategy {
    /// Asks the target to disable integrity enforcement and picks the
    /// strategy from the answer.
    ///
    /// On `DisabledConstraints` the caller owns restoring enforcement.
    pub async fn resolve(target: &mut dyn TargetStore) -> Result<Self, TargetStoreError> {
        if target.set_integrity_enforcement(false).await? {
            Ok(Self::DisabledConstraints)
        } else {
            Ok(Self::OrderedWithPreclear)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DisabledConstraints => "disabled-constraints",
            Self::OrderedWithPreclear => "ordered-with-preclear",
        }
    }
}

impl fmt::Display for InsertionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
