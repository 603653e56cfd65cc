pub mod file_store;
pub mod session;
pub mod session_manager;
pub mod session_store;
pub mod transform;

pub use file_store::FileSessionStore;
pub use session::{GenerateSummary, Session};
pub use session_manager::SessionManager;
pub use session_store::{InMemorySessionStore, LayeredSessionStore, SessionStore};
