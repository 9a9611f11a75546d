mod event;
mod payload;

pub use event::*;
pub use payload::*;
