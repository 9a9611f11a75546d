use clap::ValueEnum;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// File action accepted by `log file`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum FileActionArg {
    Create,
    Edit,
    Delete,
    Rename,
    Read,
}

impl From<FileActionArg> for agmem_types::FileActionKind {
    fn from(value: FileActionArg) -> Self {
        use agmem_types::FileActionKind;
        match value {
            FileActionArg::Create => FileActionKind::Create,
            FileActionArg::Edit => FileActionKind::Edit,
            FileActionArg::Delete => FileActionKind::Delete,
            FileActionArg::Rename => FileActionKind::Rename,
            FileActionArg::Read => FileActionKind::Read,
        }
    }
}
