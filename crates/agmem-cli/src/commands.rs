use super::args::{Cli, Commands, ConfigCommand, KnowledgeCommand, LogCommand, PatternCommand, SessionCommand};
use super::handlers;
use super::logging;
use agmem_core::resolve_workspace_path;
use agmem_runtime::Memory;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let data_dir = resolve_workspace_path(cli.data_dir.as_deref())?;
    tracing::debug!(data_dir = %data_dir.display(), "resolved data directory");

    dispatch(&data_dir, cli.command)
}

fn open(data_dir: &Path) -> Result<Memory> {
    Memory::open(data_dir)
        .with_context(|| format!("Failed to open store in {}", data_dir.display()))
}

fn dispatch(data_dir: &Path, command: Commands) -> Result<()> {
    // Config commands must work even when the store cannot be opened
    let memory = || open(data_dir);

    match command {
        Commands::Start { tool } => handlers::lifecycle::start(&memory()?, &tool),

        Commands::End {
            session_id,
            exit_code,
        } => handlers::lifecycle::end(&memory()?, &session_id, exit_code),

        Commands::Context {
            dir,
            branch,
            files,
            limit,
        } => handlers::context::handle(&memory()?, dir.as_deref(), branch, files, limit),

        Commands::Stats => handlers::stats::stats(&memory()?),

        Commands::Weekly { year, week, tool } => handlers::weekly::handle(&memory()?, year, week, &tool),

        Commands::Log { command } => match command {
            LogCommand::Context {
                session_id,
                context_type,
                data,
            } => handlers::log::context(&memory()?, &session_id, &context_type, &data),
            LogCommand::File {
                session_id,
                path,
                action,
                language,
                added,
                removed,
            } => handlers::log::file(
                &memory()?,
                &session_id,
                path,
                action.into(),
                language,
                added,
                removed,
            ),
            LogCommand::Command {
                session_id,
                command,
                exit_code,
                summary,
            } => handlers::log::command(&memory()?, &session_id, &command, exit_code, summary),
        },

        Commands::Knowledge { command } => match command {
            KnowledgeCommand::Add {
                category,
                title,
                description,
                context,
                session,
            } => handlers::knowledge::add(
                &memory()?,
                category,
                title,
                description,
                context.as_deref(),
                session,
            ),
            KnowledgeCommand::List { category, limit } => {
                handlers::knowledge::list(&memory()?, category.as_deref(), limit)
            }
        },

        Commands::Pattern { command } => match command {
            PatternCommand::Add {
                project_path,
                pattern_type,
                pattern,
                confidence,
            } => handlers::knowledge::add_pattern(
                &memory()?,
                &project_path,
                &pattern_type,
                &pattern,
                confidence,
            ),
        },

        Commands::Sessions { limit, stale } => handlers::stats::sessions(&memory()?, limit, stale),

        Commands::Session { command } => match command {
            SessionCommand::Show { session_id } => handlers::stats::session_show(&memory()?, &session_id),
        },

        Commands::Projects => handlers::stats::projects(&memory()?),
        Commands::Timeline { days } => handlers::stats::timeline(&memory()?, days),
        Commands::Files { limit } => handlers::stats::files(&memory()?, limit),
        Commands::Search { query } => handlers::stats::search(&memory()?, &query),

        Commands::Config { command } => match command {
            ConfigCommand::Show => handlers::config::show(data_dir),
            ConfigCommand::Init { force } => handlers::config::init(data_dir, force),
        },
    }
}
