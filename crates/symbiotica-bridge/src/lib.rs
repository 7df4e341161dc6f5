//! Symbiotica Bridge - HTTP relay
//!
//! REST endpoints for a GPT-style assistant, each translated into calls
//! against the document API and, for summaries and article parsing, the
//! completion API.

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::BridgeError;
pub use server::{router, serve, ENDPOINTS};
pub use state::AppState;
