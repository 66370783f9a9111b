//! The todo store and its reference engine.
//!
//! This module provides the `Store` struct owning the todo collection,
//! along with pagination and shared display helpers. The store is the only
//! place where the reference rules are enforced:
//!
//! - references may only point at todos currently in the store,
//! - a todo never references itself,
//! - a todo can only be toggled to completed once every referenced todo is
//!   itself completed,
//! - deleting a todo scrubs its id from every other reference list.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::todo::{Todo, TodoPatch};

/// In-memory store for todos, persisted as a single JSON file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Store {
    pub todos: Vec<Todo>,
}

/// Outcome of a completion toggle.
///
/// `Blocked` is an expected result, not an error: the todo is left
/// untouched and the unmet reference ids are reported back so the caller
/// can tell the user what is still open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Completed,
    Reopened,
    Blocked(Vec<u64>),
}

impl Store {
    /// Load a store from a JSON file, starting empty if the file doesn't exist.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Store::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Error parsing DB, starting fresh: {e}");
                    Store::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading DB, starting fresh: {e}");
                Store::default()
            }
        }
    }

    /// Save the store to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        // Atomic-ish write via temp + rename.
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Next available id: one past the current maximum. Unique across all
    /// live todos; the top id may be reused after its holder is deleted.
    pub fn next_id(&self) -> u64 {
        self.todos.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Get a todo by id.
    pub fn get(&self, id: u64) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a todo by id.
    pub fn get_mut(&mut self, id: u64) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }

    /// Create a todo. Text is trimmed and must be non-empty; every
    /// reference must resolve to an existing todo or the whole create is
    /// rejected.
    pub fn create(&mut self, text: &str, references: &[u64]) -> Result<Todo, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }
        let id = self.next_id();
        let references = self.check_references(id, references)?;
        let now = Utc::now().timestamp();
        let todo = Todo {
            id,
            text: text.to_string(),
            completed: false,
            references,
            created_at_utc: now,
            updated_at_utc: now,
        };
        self.todos.push(todo.clone());
        Ok(todo)
    }

    /// Apply a partial update to an existing todo.
    ///
    /// Setting `completed` through the patch bypasses the reference gate;
    /// use `toggle` for the guarded transition. The whole patch is
    /// validated before anything is written, so a rejected update leaves
    /// the todo untouched.
    pub fn update(&mut self, id: u64, patch: TodoPatch) -> Result<Todo, StoreError> {
        if self.get(id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        let text = match patch.text {
            Some(s) => {
                let s = s.trim().to_string();
                if s.is_empty() {
                    return Err(StoreError::EmptyText);
                }
                Some(s)
            }
            None => None,
        };
        let references = match patch.references {
            Some(refs) => Some(self.check_references(id, &refs)?),
            None => None,
        };
        let Some(t) = self.get_mut(id) else {
            return Err(StoreError::NotFound(id));
        };
        if let Some(s) = text {
            t.text = s;
        }
        if let Some(c) = patch.completed {
            t.completed = c;
        }
        if let Some(r) = references {
            t.references = r;
        }
        t.updated_at_utc = Utc::now().timestamp();
        Ok(t.clone())
    }

    /// Toggle a todo's completion state.
    ///
    /// Completing requires every referenced todo to be done; a blocked
    /// attempt changes nothing and reports the unmet ids. Reopening is
    /// always allowed.
    pub fn toggle(&mut self, id: u64) -> Result<ToggleOutcome, StoreError> {
        let unmet = {
            let Some(t) = self.get(id) else {
                return Err(StoreError::NotFound(id));
            };
            if t.completed {
                Vec::new()
            } else {
                self.unmet_references(t)
            }
        };
        if !unmet.is_empty() {
            return Ok(ToggleOutcome::Blocked(unmet));
        }
        let Some(t) = self.get_mut(id) else {
            return Err(StoreError::NotFound(id));
        };
        t.completed = !t.completed;
        t.updated_at_utc = Utc::now().timestamp();
        Ok(if t.completed {
            ToggleOutcome::Completed
        } else {
            ToggleOutcome::Reopened
        })
    }

    /// Delete a todo and scrub its id from every remaining reference list.
    ///
    /// Only todos whose reference list actually changes get a fresh
    /// `updated_at_utc`; the rest keep their timestamps.
    pub fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        if self.get(id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        let now = Utc::now().timestamp();
        for t in self.todos.iter_mut() {
            let before = t.references.len();
            t.references.retain(|r| *r != id);
            if t.references.len() != before {
                t.updated_at_utc = now;
            }
        }
        self.todos.retain(|t| t.id != id);
        Ok(())
    }

    /// Ids in `todo.references` whose targets are not yet completed.
    pub fn unmet_references(&self, todo: &Todo) -> Vec<u64> {
        todo.references
            .iter()
            .copied()
            .filter(|r| self.get(*r).is_some_and(|t| !t.completed))
            .collect()
    }

    /// Ids of todos that reference `id` (reverse lookup for the detail view).
    pub fn dependents(&self, id: u64) -> Vec<u64> {
        self.todos
            .iter()
            .filter(|t| t.references.contains(&id))
            .map(|t| t.id)
            .collect()
    }

    /// Validate and normalise a reference list for the todo `id`.
    ///
    /// Self-references and unknown targets are rejected outright;
    /// duplicates are dropped while keeping first-seen order.
    fn check_references(&self, id: u64, candidates: &[u64]) -> Result<Vec<u64>, StoreError> {
        let mut out = Vec::new();
        for &r in candidates {
            if r == id {
                return Err(StoreError::SelfReference(id));
            }
            if self.get(r).is_none() {
                return Err(StoreError::UnknownReference(r));
            }
            if !out.contains(&r) {
                out.push(r);
            }
        }
        Ok(out)
    }
}

/// A clamped window into a filtered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub total_pages: usize,
    pub start: usize,
    pub end: usize,
}

/// Clamp `requested` into `[1, total_pages]` and compute the slice bounds.
///
/// `total_pages` is never zero: an empty listing still has one empty page.
pub fn paginate(total: usize, page_size: usize, requested: usize) -> Page {
    let page_size = page_size.max(1);
    let total_pages = std::cmp::max(1, total.div_ceil(page_size));
    let number = requested.clamp(1, total_pages);
    let start = std::cmp::min((number - 1) * page_size, total);
    let end = std::cmp::min(start + page_size, total);
    Page {
        number,
        total_pages,
        start,
        end,
    }
}

/// Render a reference list as "@2, @7", or "-" when empty.
pub fn format_refs(references: &[u64]) -> String {
    if references.is_empty() {
        "-".into()
    } else {
        references
            .iter()
            .map(|r| format!("@{r}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Format a completion flag for display.
pub fn format_state(completed: bool) -> &'static str {
    if completed {
        "Done"
    } else {
        "Open"
    }
}

/// Format a unix timestamp as UTC RFC 3339.
pub fn format_ts(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(|| "-".into())
}

/// Print todos in a formatted table.
pub fn print_table(todos: &[&Todo]) {
    // Header.
    println!("{:<5} {:<6} {:<18} {}", "ID", "State", "Refs", "Text");
    for t in todos {
        println!(
            "{:<5} {:<6} {:<18} {}",
            t.id,
            format_state(t.completed),
            truncate(&format_refs(&t.references), 18),
            t.text
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(texts: &[&str]) -> Store {
        let mut store = Store::default();
        for t in texts {
            store.create(t, &[]).unwrap();
        }
        store
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let mut store = Store::default();
        let a = store.create("first", &[]).unwrap();
        let b = store.create("second", &[]).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(!a.completed);
        assert!(a.references.is_empty());
        assert_eq!(a.created_at_utc, a.updated_at_utc);
    }

    #[test]
    fn test_create_trims_and_rejects_empty_text() {
        let mut store = Store::default();
        assert_eq!(store.create("", &[]), Err(StoreError::EmptyText));
        assert_eq!(store.create("   ", &[]), Err(StoreError::EmptyText));
        assert!(store.todos.is_empty());
        let t = store.create("  padded  ", &[]).unwrap();
        assert_eq!(t.text, "padded");
    }

    #[test]
    fn test_create_rejects_unknown_reference() {
        let mut store = Store::default();
        assert_eq!(
            store.create("task", &[1]),
            Err(StoreError::UnknownReference(1))
        );
        assert!(store.todos.is_empty());
        assert!(StoreError::UnknownReference(1).is_validation());
    }

    #[test]
    fn test_create_dedups_references() {
        let mut store = store_with(&["base"]);
        let t = store.create("dependent", &[1, 1]).unwrap();
        assert_eq!(t.references, vec![1]);
    }

    #[test]
    fn test_completion_gate() {
        let mut store = store_with(&["a", "b"]);
        store
            .update(
                1,
                TodoPatch {
                    references: Some(vec![2]),
                    ..Default::default()
                },
            )
            .unwrap();

        // Blocked while the referenced todo is open.
        assert_eq!(store.toggle(1), Ok(ToggleOutcome::Blocked(vec![2])));
        assert!(!store.get(1).unwrap().completed);

        // Complete the dependency, then the dependent.
        assert_eq!(store.toggle(2), Ok(ToggleOutcome::Completed));
        assert_eq!(store.toggle(1), Ok(ToggleOutcome::Completed));
        assert!(store.get(1).unwrap().completed);
    }

    #[test]
    fn test_blocked_toggle_leaves_timestamp_untouched() {
        let mut store = store_with(&["a", "b"]);
        store
            .update(
                1,
                TodoPatch {
                    references: Some(vec![2]),
                    ..Default::default()
                },
            )
            .unwrap();
        store.get_mut(1).unwrap().updated_at_utc = 0;
        assert!(matches!(store.toggle(1), Ok(ToggleOutcome::Blocked(_))));
        assert_eq!(store.get(1).unwrap().updated_at_utc, 0);
    }

    #[test]
    fn test_reopen_is_unguarded_and_not_retroactive() {
        let mut store = store_with(&["a", "b"]);
        store
            .update(
                1,
                TodoPatch {
                    references: Some(vec![2]),
                    ..Default::default()
                },
            )
            .unwrap();
        store.toggle(2).unwrap();
        store.toggle(1).unwrap();

        // Reopening the dependency always succeeds, and the dependent stays done.
        assert_eq!(store.toggle(2), Ok(ToggleOutcome::Reopened));
        assert!(store.get(1).unwrap().completed);

        // The dependent can still be reopened, but not re-completed now.
        assert_eq!(store.toggle(1), Ok(ToggleOutcome::Reopened));
        assert_eq!(store.toggle(1), Ok(ToggleOutcome::Blocked(vec![2])));
    }

    #[test]
    fn test_toggle_missing_id() {
        let mut store = Store::default();
        let err = store.toggle(999).unwrap_err();
        assert_eq!(err, StoreError::NotFound(999));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_update_text_trims_and_rejects_empty() {
        let mut store = store_with(&["original"]);
        let t = store
            .update(
                1,
                TodoPatch {
                    text: Some("  new text  ".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(t.text, "new text");

        assert_eq!(
            store.update(
                1,
                TodoPatch {
                    text: Some("   ".into()),
                    ..Default::default()
                }
            ),
            Err(StoreError::EmptyText)
        );
        assert_eq!(store.get(1).unwrap().text, "new text");
    }

    #[test]
    fn test_update_missing_id() {
        let mut store = Store::default();
        assert_eq!(
            store.update(
                999,
                TodoPatch {
                    text: Some("x".into()),
                    ..Default::default()
                }
            ),
            Err(StoreError::NotFound(999))
        );
    }

    #[test]
    fn test_update_rejects_invalid_references() {
        let mut store = store_with(&["a", "b"]);
        assert_eq!(
            store.update(
                1,
                TodoPatch {
                    references: Some(vec![1]),
                    ..Default::default()
                }
            ),
            Err(StoreError::SelfReference(1))
        );
        assert_eq!(
            store.update(
                1,
                TodoPatch {
                    references: Some(vec![2, 7]),
                    ..Default::default()
                }
            ),
            Err(StoreError::UnknownReference(7))
        );
        // A rejected update writes nothing.
        assert!(store.get(1).unwrap().references.is_empty());
    }

    #[test]
    fn test_update_completed_bypasses_gate() {
        let mut store = store_with(&["a", "b"]);
        store
            .update(
                1,
                TodoPatch {
                    references: Some(vec![2]),
                    ..Default::default()
                },
            )
            .unwrap();
        // The administrative override ignores the open dependency.
        let t = store
            .update(
                1,
                TodoPatch {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(t.completed);
    }

    #[test]
    fn test_delete_scrubs_references() {
        let mut store = store_with(&["a", "b", "c"]);
        store
            .update(
                1,
                TodoPatch {
                    references: Some(vec![2]),
                    ..Default::default()
                },
            )
            .unwrap();
        store.get_mut(1).unwrap().updated_at_utc = 0;
        store.get_mut(3).unwrap().updated_at_utc = 0;

        store.delete(2).unwrap();
        assert!(store.get(2).is_none());
        assert!(store.get(1).unwrap().references.is_empty());
        // Only the todo whose references changed gets a fresh timestamp.
        assert_ne!(store.get(1).unwrap().updated_at_utc, 0);
        assert_eq!(store.get(3).unwrap().updated_at_utc, 0);

        // No remaining todo references the deleted id.
        for t in &store.todos {
            assert!(!t.references.contains(&2));
        }

        // Deleting again is a not-found, not a crash.
        assert_eq!(store.delete(2), Err(StoreError::NotFound(2)));
    }

    #[test]
    fn test_next_id_after_delete_of_top_id() {
        let mut store = store_with(&["a", "b"]);
        store.delete(2).unwrap();
        let t = store.create("c", &[]).unwrap();
        assert_eq!(t.id, 2);
    }

    #[test]
    fn test_dependents() {
        let mut store = store_with(&["a", "b", "c"]);
        store
            .update(
                2,
                TodoPatch {
                    references: Some(vec![1]),
                    ..Default::default()
                },
            )
            .unwrap();
        store
            .update(
                3,
                TodoPatch {
                    references: Some(vec![1]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(store.dependents(1), vec![2, 3]);
        assert!(store.dependents(2).is_empty());
    }

    #[test]
    fn test_paginate_clamps_page_into_range() {
        let p = paginate(12, 5, 1);
        assert_eq!((p.number, p.total_pages, p.start, p.end), (1, 3, 0, 5));

        let p = paginate(12, 5, 3);
        assert_eq!((p.number, p.start, p.end), (3, 10, 12));

        // Out-of-range requests clamp to the nearest valid page.
        assert_eq!(paginate(12, 5, 99).number, 3);
        assert_eq!(paginate(12, 5, 0).number, 1);

        // An empty listing still has one empty page.
        let p = paginate(0, 5, 4);
        assert_eq!((p.number, p.total_pages, p.start, p.end), (1, 1, 0, 0));
    }

    #[test]
    fn test_format_refs() {
        assert_eq!(format_refs(&[]), "-");
        assert_eq!(format_refs(&[2, 7]), "@2, @7");
    }

    #[test]
    fn test_save_load_round_trip() {
        let path = std::env::temp_dir().join("reftask_store_roundtrip.json");
        let mut store = store_with(&["a", "b"]);
        store
            .update(
                2,
                TodoPatch {
                    references: Some(vec![1]),
                    ..Default::default()
                },
            )
            .unwrap();
        store.toggle(1).unwrap();
        store.save(&path).unwrap();

        let loaded = Store::load(&path);
        assert_eq!(loaded.todos.len(), 2);
        assert!(loaded.get(1).unwrap().completed);
        assert_eq!(loaded.get(2).unwrap().references, vec![1]);
        let _ = std::fs::remove_file(&path);
    }
}
