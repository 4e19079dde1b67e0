//! SQLite backend for the rota scheduling store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Check-then-act sequences run
//! inside a single IMMEDIATE transaction on the store's sole connection,
//! which totally orders assignment admissions.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
