use agmem_core::{GitProbe, SystemGit};
use agmem_index::Database;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::services::{
    ContextRetriever, KnowledgeBase, PatternStore, SessionRecorder, StatsService,
    SummaryCompactor,
};
use crate::Result;

/// Open store plus the settings every service is built from
pub struct Memory {
    db: Database,
    db_path: PathBuf,
    config: Config,
    git: Box<dyn GitProbe>,
}

impl Memory {
    /// Load `<data_dir>/config.toml` (defaults when absent) and open the store
    pub fn open(data_dir: &Path) -> Result<Self> {
        let config = Config::load_from(&Config::default_path(data_dir))?;
        let git = Box::new(SystemGit::new(config.git_timeout()));
        Self::open_with(data_dir, config, git)
    }

    pub fn open_with(data_dir: &Path, config: Config, git: Box<dyn GitProbe>) -> Result<Self> {
        let db_path = config.db_path(data_dir);
        let options = config.open_options(data_dir)?;
        let db = Database::open_with(&db_path, &options)?;

        Ok(Self {
            db,
            db_path,
            config,
            git,
        })
    }

    pub fn in_memory(config: Config, git: Box<dyn GitProbe>) -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
            config,
            git,
        })
    }

    pub fn recorder(&self) -> SessionRecorder<'_> {
        SessionRecorder::new(&self.db, self.git.as_ref())
    }

    pub fn knowledge(&self) -> KnowledgeBase<'_> {
        KnowledgeBase::new(&self.db)
    }

    pub fn patterns(&self) -> PatternStore<'_> {
        PatternStore::new(&self.db)
    }

    pub fn context(&self) -> ContextRetriever<'_> {
        ContextRetriever::new(&self.db, &self.config)
    }

    pub fn compactor(&self) -> SummaryCompactor<'_> {
        SummaryCompactor::new(&self.db)
    }

    pub fn stats(&self) -> StatsService<'_> {
        StatsService::new(&self.db, &self.config)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
