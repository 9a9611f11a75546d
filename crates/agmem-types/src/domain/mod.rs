mod knowledge;
mod pattern;
mod project;
mod session;
mod summary;

pub use knowledge::*;
pub use pattern::*;
pub use project::*;
pub use session::*;
pub use summary::*;
