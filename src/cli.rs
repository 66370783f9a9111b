use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed todo manager CLI.
/// Storage defaults to ~/.reftask/todos.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "rt", version, about = "Todo CLI with task references and gated completion")]
pub struct Cli {
    /// Path to the JSON database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
