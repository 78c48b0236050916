//! Authentication state.
//!
//! [`SessionManager`] replaces a process-wide auth store: it is constructed
//! explicitly and handed to whatever needs the session.

mod session;

pub use session::{SESSION_EXPIRED, SessionManager};
