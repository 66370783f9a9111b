//! Todo data structure.
//!
//! This module defines the core `Todo` struct, a single unit of work that
//! may reference other todos by id, and the `TodoPatch` record used for
//! partial updates.

use serde::{Deserialize, Serialize};

/// A unit of work with a completion flag and a list of referenced todos.
///
/// A todo cannot be toggled to completed while any referenced todo is
/// still open; see the store's `toggle` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Ids of todos this one depends on. Insertion order is preserved for
    /// display; duplicates are never stored.
    #[serde(default)]
    pub references: Vec<u64>,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
}

/// A partial update applied to an existing todo.
///
/// Setting `completed` here writes the flag directly and skips the
/// reference gate; it is the administrative counterpart of the store's
/// guarded `toggle`.
#[derive(Debug, Default, Clone)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub references: Option<Vec<u64>>,
}
