pub mod config;
pub mod error;
pub mod services;
pub mod workspace;

pub use config::Config;
pub use error::{Error, Result};
pub use services::{
    ContextRetriever, FileChange, KnowledgeBase, PatternStore, ProjectSummary, SessionDetail,
    SessionRecorder, SessionView, StatsService, SummaryCompactor,
};
pub use workspace::Memory;

// Store types surfaced through the services
pub use agmem_index::EndOutcome;
