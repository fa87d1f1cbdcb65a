mod message;
#[allow(clippy::module_inception)]
mod session;

pub use message::{Message, MessageRole};
pub use session::{Session, SessionStatus};
