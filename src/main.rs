//! # RT - Referenced Todos CLI
//!
//! A file-backed todo manager in which todos can reference other todos and
//! completion is gated: a todo cannot be marked done while any todo it
//! references is still open.
//!
//! ## Key Features
//!
//! - **Task References**: link a todo to the todos it depends on
//! - **Gated Completion**: completing is blocked until every referenced
//!   todo is done; reopening is always allowed
//! - **Cascading Cleanup**: deleting a todo removes it from every other
//!   todo's reference list in the same operation
//! - **Multiple Interfaces**: full CLI for automation + interactive TUI
//!   with filtering, pagination and a reference picker
//! - **Local File Storage**: a single JSON file, no daemon, no database
//!
//! ## Quick Start
//!
//! ```bash
//! # Add todos, the second depending on the first
//! rt add "write the report"
//! rt add "send the report" --ref 1
//!
//! # Blocked until todo 1 is done
//! rt toggle 2
//! rt toggle 1
//! rt toggle 2
//!
//! # List and inspect
//! rt list --filter active
//! rt view 2
//!
//! # Or drive everything from the TUI
//! rt ui
//! ```
//!
//! Data is stored in `~/.reftask/todos.json` by default; override with
//! `--db` or the `REFTASK_DB` environment variable.

use std::path::PathBuf;

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod error;
pub mod fields;
pub mod store;
pub mod todo;
pub mod tui {
    pub mod app;
    pub mod run;
    pub mod ui;
}

use cli::Cli;
use cmd::*;
use store::Store;

fn main() {
    let cli = Cli::parse();

    // Determine the database file: --db, then REFTASK_DB, then ~/.reftask/.
    let db_path = cli
        .db
        .clone()
        .or_else(|| std::env::var("REFTASK_DB").ok().map(PathBuf::from))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            let data_dir = PathBuf::from(home).join(".reftask");
            if let Err(e) = std::fs::create_dir_all(&data_dir) {
                eprintln!("Failed to create data directory {}: {}", data_dir.display(), e);
                std::process::exit(1);
            }
            data_dir.join("todos.json")
        });

    // Handle commands that don't need the store loaded first
    match &cli.command {
        Commands::Completions { shell } => {
            cmd_completions(*shell);
            return;
        }
        Commands::Ui => {
            cmd_ui(&db_path);
            return;
        }
        _ => {}
    }

    let mut store = Store::load(&db_path);

    match cli.command {
        Commands::Ui | Commands::Completions { .. } => unreachable!("handled above"),

        Commands::Add { text, references } => cmd_add(&mut store, &db_path, text, references),

        Commands::List {
            filter,
            page,
            page_size,
            sort,
        } => cmd_list(&store, filter, page, page_size, sort),

        Commands::View { id } => cmd_view(&store, id),

        Commands::Update {
            id,
            text,
            references,
            clear_refs,
            completed,
        } => cmd_update(&mut store, &db_path, id, text, references, clear_refs, completed),

        Commands::Toggle { id } => cmd_toggle(&mut store, &db_path, id),

        Commands::Delete { id } => cmd_delete(&mut store, &db_path, id),
    }
}
