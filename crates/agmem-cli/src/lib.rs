// NOTE: one process per wrapper call
//
// Every invocation opens the store, performs one operation and exits.
// Wrappers run `start` before the assistant, `log ...` while it works and
// `end` after it exits; `context` is read before the next launch. Machine
// output goes to stdout, diagnostics to stderr.

mod args;
mod commands;
mod handlers;
mod logging;
mod output;

pub use args::{
    Cli, Commands, ConfigCommand, KnowledgeCommand, LogCommand, LogLevel, PatternCommand,
    SessionCommand,
};
pub use commands::run;
