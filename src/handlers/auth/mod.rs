pub mod session_handlers;

pub use session_handlers::{clear_session, create_session, delete_session, session_status};
