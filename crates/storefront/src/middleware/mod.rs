//! HTTP middleware: sessions and auth extractors.

pub mod auth;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_customer, set_current_customer};
pub use session::create_session_layer;
