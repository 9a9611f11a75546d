mod error;
pub mod git;
pub mod id;
pub mod path;

pub use error::{Error, Result};
pub use git::{GitProbe, NoGit, StaticGit, SystemGit};
pub use id::generate_session_id;
pub use path::{expand_tilde, normalize_path, resolve_workspace_path};
