//! Core types, validation, error taxonomy, and configuration for Parley.
//!
//! Everything here is I/O free apart from the config loader: the provider
//! and store crates build on these types, and the CLI wires them together.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use error::{ConfigError, Error, UpstreamError, ValidationError};
pub use types::{ChatMessage, ChatRequest, ChatResponse, Role};
