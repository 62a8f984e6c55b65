//! Transcript persistence for Parley.
//!
//! - [`schema`] — table and index DDL, idempotent provisioning
//! - [`store::TranscriptStore`] — validated inserts and filtered, paginated queries
//! - [`error::StoreError`] — everything the store can fail with

pub mod error;
pub mod schema;
pub mod store;

pub use error::StoreError;
pub use schema::ensure_schema;
pub use store::TranscriptStore;
