// NOTE: Command Organization
//
// The lifecycle verbs (start, end, context, stats, weekly) stay flat because
// wrapper scripts call them on every launch. Writes that carry several
// arguments are grouped under `log`, `knowledge` and `pattern`.

mod commands;
mod enums;

pub use commands::*;
pub use enums::*;

use clap::Parser;

#[derive(Parser)]
#[command(name = "agmem")]
#[command(about = "Remember what AI coding assistants did, and hand it back next time", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory (defaults to $AGMEM_PATH, then the system data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}
