//! LLM provider layer for Parley.
//!
//! # Architecture
//!
//! - [`registry`] — the closed set of providers, the model-identifier router,
//!   and the explicit provider → adapter binding
//! - [`traits::CompletionAdapter`] — trait that every vendor adapter implements
//! - [`openai`], [`azure`], [`anthropic`] — one adapter per vendor wire format
//! - [`gateway::CompletionGateway`] — the only thing callers talk to

pub mod anthropic;
pub mod azure;
pub mod gateway;
mod http;
pub mod openai;
pub mod registry;
pub mod traits;

// Re-export main types for convenience
pub use gateway::{seed_messages, CompletionGateway, SEED_MESSAGE};
pub use registry::{resolve, AdapterRegistry, ModelRouter, ProviderConfig, ProviderKind, PROVIDERS};
pub use traits::CompletionAdapter;
