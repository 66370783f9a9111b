//! Command implementations for the CLI interface.
//!
//! Every subcommand loads the store, applies one operation and saves the
//! result. The reference and gating rules live in `store`; this layer only
//! maps outcomes onto printed messages and exit codes.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use std::path::Path;

use crate::fields::{SortKey, StatusFilter};
use crate::store::{format_refs, format_state, format_ts, paginate, print_table, Store, ToggleOutcome};
use crate::todo::{Todo, TodoPatch};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// Add a new todo.
    Add {
        /// What needs doing.
        text: String,
        /// Reference an existing todo by id. May be repeated or comma-separated.
        #[arg(long = "ref", value_delimiter = ',')]
        references: Vec<u64>,
    },

    /// List todos with filtering and pagination.
    List {
        /// Status filter: all | active | completed.
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        filter: StatusFilter,
        /// Page to show. Out-of-range values are clamped.
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Rows per page.
        #[arg(long, default_value_t = 5)]
        page_size: usize,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = SortKey::Id)]
        sort: SortKey,
    },

    /// View a single todo by id.
    View {
        /// Todo id to view.
        id: u64,
    },

    /// Update fields on a todo.
    Update {
        /// Todo id to update.
        id: u64,
        /// Replace the todo text.
        #[arg(long)]
        text: Option<String>,
        /// Replace the reference list. May be repeated or comma-separated.
        #[arg(long = "ref", value_delimiter = ',')]
        references: Option<Vec<u64>>,
        /// Drop all references.
        #[arg(long, conflicts_with = "references")]
        clear_refs: bool,
        /// Write the completion flag directly, skipping the reference gate.
        #[arg(long)]
        completed: Option<bool>,
    },

    /// Toggle completion. Completing is gated on all references being done.
    Toggle {
        /// Todo id to toggle.
        id: u64,
    },

    /// Delete a todo and scrub it from other todos' reference lists.
    Delete {
        /// Todo id to delete.
        id: u64,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal user interface.
pub fn cmd_ui(db_path: &Path) {
    if let Err(e) = run_tui(db_path) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Add a new todo to the store.
pub fn cmd_add(store: &mut Store, db_path: &Path, text: String, references: Vec<u64>) {
    let todo = match store.create(&text, &references) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = store.save(db_path) {
        eprintln!("Failed to save DB: {e}");
        std::process::exit(1);
    }
    println!("Added todo {}", todo.id);
}

/// List todos with filtering, sorting and pagination.
pub fn cmd_list(store: &Store, filter: StatusFilter, page: usize, page_size: usize, sort: SortKey) {
    let mut filtered: Vec<&Todo> = store.todos.iter().filter(|t| filter.matches(t)).collect();

    match sort {
        SortKey::Id => filtered.sort_by_key(|t| t.id),
        SortKey::Updated => filtered.sort_by_key(|t| (std::cmp::Reverse(t.updated_at_utc), t.id)),
        SortKey::Created => filtered.sort_by_key(|t| (std::cmp::Reverse(t.created_at_utc), t.id)),
    }

    let page = paginate(filtered.len(), page_size, page);
    print_table(&filtered[page.start..page.end]);
    println!(
        "{} todo(s), page {} / {}",
        filtered.len(),
        page.number,
        page.total_pages
    );
}

/// View detailed information about a specific todo.
pub fn cmd_view(store: &Store, id: u64) {
    let Some(todo) = store.get(id) else {
        eprintln!("Todo {} not found.", id);
        std::process::exit(1);
    };
    println!("ID:           {}", todo.id);
    println!("Text:         {}", todo.text);
    println!("State:        {}", format_state(todo.completed));
    println!("References:   {}", format_refs(&todo.references));
    println!("Created UTC:  {}", format_ts(todo.created_at_utc));
    println!("Updated UTC:  {}", format_ts(todo.updated_at_utc));

    if !todo.references.is_empty() {
        println!("Depends on:");
        for r in &todo.references {
            if let Some(dep) = store.get(*r) {
                println!("  {} - {} [{}]", dep.id, dep.text, format_state(dep.completed));
            }
        }
    }
    let dependents = store.dependents(id);
    if !dependents.is_empty() {
        println!("Referenced by:");
        for d in dependents {
            if let Some(dep) = store.get(d) {
                println!("  {} - {} [{}]", dep.id, dep.text, format_state(dep.completed));
            }
        }
    }
}

/// Update fields on an existing todo.
pub fn cmd_update(
    store: &mut Store,
    db_path: &Path,
    id: u64,
    text: Option<String>,
    references: Option<Vec<u64>>,
    clear_refs: bool,
    completed: Option<bool>,
) {
    let references = if clear_refs { Some(Vec::new()) } else { references };
    if text.is_none() && references.is_none() && completed.is_none() {
        eprintln!("Nothing to update. Pass --text, --ref, --clear-refs or --completed.");
        std::process::exit(1);
    }
    let patch = TodoPatch {
        text,
        completed,
        references,
    };
    if let Err(e) = store.update(id, patch) {
        eprintln!("{e}");
        std::process::exit(1);
    }
    if let Err(e) = store.save(db_path) {
        eprintln!("Failed to save DB: {e}");
        std::process::exit(1);
    }
    println!("Updated todo {}", id);
}

/// Toggle a todo's completion state, enforcing the reference gate.
///
/// A blocked completion is a normal outcome: it prints what is still open
/// and exits 0 without touching the store.
pub fn cmd_toggle(store: &mut Store, db_path: &Path, id: u64) {
    match store.toggle(id) {
        Ok(ToggleOutcome::Completed) => {
            if let Err(e) = store.save(db_path) {
                eprintln!("Failed to save DB: {e}");
                std::process::exit(1);
            }
            println!("Completed todo {}", id);
        }
        Ok(ToggleOutcome::Reopened) => {
            if let Err(e) = store.save(db_path) {
                eprintln!("Failed to save DB: {e}");
                std::process::exit(1);
            }
            println!("Reopened todo {}", id);
        }
        Ok(ToggleOutcome::Blocked(unmet)) => {
            println!(
                "Todo {} is blocked by {} incomplete reference(s): {}",
                id,
                unmet.len(),
                format_refs(&unmet)
            );
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Delete a todo and scrub its id from every remaining reference list.
pub fn cmd_delete(store: &mut Store, db_path: &Path, id: u64) {
    if let Err(e) = store.delete(id) {
        eprintln!("{e}");
        std::process::exit(1);
    }
    if let Err(e) = store.save(db_path) {
        eprintln!("Failed to save DB: {e}");
        std::process::exit(1);
    }
    println!("Deleted todo {}", id);
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;

    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
