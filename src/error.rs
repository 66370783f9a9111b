//! Error taxonomy for store operations.

use thiserror::Error;

/// Failure of a single store operation.
///
/// Every failure is scoped to the operation that raised it; the store is
/// left untouched and its invariants still hold afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("todo text must not be empty")]
    EmptyText,
    #[error("todo {0} not found")]
    NotFound(u64),
    #[error("todo {0} cannot reference itself")]
    SelfReference(u64),
    #[error("referenced todo {0} does not exist")]
    UnknownReference(u64),
}

impl StoreError {
    /// True for input-validation failures, as opposed to a missing target id.
    pub fn is_validation(&self) -> bool {
        !matches!(self, StoreError::NotFound(_))
    }
}
