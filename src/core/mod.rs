//! Core types shared across the codebase.

mod kind;
mod state;

pub use kind::SourceKind;
pub use state::{is_shutdown, register_server, request_shutdown, setup_shutdown_handler};
