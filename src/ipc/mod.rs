//! Line-oriented JSON request surface.
//!
//! Each request is one JSON object per line (`{id, method, params, session}`)
//! and gets exactly one JSON response line back. Login state lives in
//! [`AppState`] and is resolved per request from the `session` token.

mod error;
mod handlers;
mod router;
mod types;

pub use error::{err, ok};
pub use router::handle_request;
pub use types::{AppState, Request, Session};
