// SQLite session store
// One file shared by every CLI process; each write is one IMMEDIATE transaction

mod db;
mod error;
mod queries;
mod records;
mod retry;
mod schema;

// Public API
pub use db::{Database, EndOutcome, OpenOptions};
pub use error::{Error, Result};
pub use records::{NewCommand, NewContextNote, NewFileAction, NewPattern, NewSession};
pub use retry::RetryPolicy;
pub use schema::SCHEMA_VERSION;
