//! Core types and trait definitions for the rota scheduling store.
//!
//! This crate is deliberately free of database dependencies. Both storage
//! backends depend on it; it depends on nothing heavier than `chrono`.

pub mod assignment;
pub mod error;
pub mod rules;
pub mod shift;
pub mod span;
pub mod store;
pub mod worker;

pub use error::{Error, Result};
