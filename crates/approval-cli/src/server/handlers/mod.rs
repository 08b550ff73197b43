//! API request handlers.

mod batch;
mod queue;
mod session;

pub use batch::*;
pub use queue::*;
pub use session::*;
