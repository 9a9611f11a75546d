pub mod compactor;
pub mod context;
pub mod knowledge;
pub mod pattern;
pub mod recorder;
pub mod stats;

pub use compactor::SummaryCompactor;
pub use context::ContextRetriever;
pub use knowledge::KnowledgeBase;
pub use pattern::PatternStore;
pub use recorder::{FileChange, SessionRecorder};
pub use stats::{ProjectSummary, SessionDetail, SessionView, StatsService};
