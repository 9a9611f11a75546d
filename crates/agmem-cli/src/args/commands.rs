use super::FileActionArg;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Record a new session and print its id")]
    Start {
        /// Name of the assistant CLI (claude, codex, gemini, ...)
        tool: String,
    },

    #[command(about = "Finalize a session")]
    End {
        session_id: String,

        #[arg(default_value = "0", allow_negative_numbers = true)]
        exit_code: i32,
    },

    #[command(about = "Print the context bundle for a directory")]
    Context {
        /// Defaults to the current directory
        dir: Option<String>,

        #[arg(long)]
        branch: Option<String>,

        #[arg(long = "file")]
        files: Vec<String>,

        #[arg(long)]
        limit: Option<usize>,
    },

    #[command(about = "Print per-tool totals, 7-day activity and top projects")]
    Stats,

    #[command(about = "Compact one ISO week of sessions into weekly summaries")]
    Weekly {
        year: i32,
        week: u32,
        #[arg(default_value = "claude")]
        tool: String,
    },

    #[command(about = "Append an event to a session")]
    Log {
        #[command(subcommand)]
        command: LogCommand,
    },

    #[command(about = "Manage knowledge entries")]
    Knowledge {
        #[command(subcommand)]
        command: KnowledgeCommand,
    },

    #[command(about = "Record project patterns")]
    Pattern {
        #[command(subcommand)]
        command: PatternCommand,
    },

    #[command(about = "List recent sessions")]
    Sessions {
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Only sessions never ended and past the staleness window
        #[arg(long)]
        stale: bool,
    },

    #[command(about = "Inspect a single session")]
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },

    #[command(about = "List projects with session totals")]
    Projects,

    #[command(about = "Sessions per day and tool")]
    Timeline {
        #[arg(long, default_value = "30")]
        days: u32,
    },

    #[command(about = "Most frequently modified files")]
    Files {
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    #[command(about = "Search knowledge and context notes")]
    Search { query: String },

    #[command(about = "Show or initialize config.toml")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum LogCommand {
    #[command(about = "Append a context note (task, decision, error, ...)")]
    Context {
        session_id: String,
        context_type: String,
        /// JSON object
        data: String,
    },

    #[command(about = "Record a file action")]
    File {
        session_id: String,
        path: String,
        action: FileActionArg,

        #[arg(long)]
        language: Option<String>,

        #[arg(long, default_value = "0")]
        added: u64,

        #[arg(long, default_value = "0")]
        removed: u64,
    },

    #[command(about = "Record a command run during the session")]
    Command {
        session_id: String,
        command: String,

        #[arg(allow_negative_numbers = true)]
        exit_code: i32,

        #[arg(long)]
        summary: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum KnowledgeCommand {
    #[command(about = "Add an entry, or bump it if the title exists")]
    Add {
        category: String,
        title: String,
        description: String,

        /// JSON object
        #[arg(long)]
        context: Option<String>,

        #[arg(long)]
        session: Option<String>,
    },

    #[command(about = "List entries by frequency")]
    List {
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum PatternCommand {
    #[command(about = "Record a pattern for an existing project")]
    Add {
        project_path: String,
        pattern_type: String,
        pattern: String,

        #[arg(long, default_value = "0.5")]
        confidence: f64,
    },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    #[command(about = "Show a session together with its event logs")]
    Show { session_id: String },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Print the effective configuration")]
    Show,

    #[command(about = "Write config.toml with defaults")]
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
