//! Worker — a member of the roster.
//!
//! The read model never carries the password credential; backends keep the
//! salted hash internally and expose it to nothing but `authenticate`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque worker identifier, allocated by the storage backend.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WorkerId(pub i64);

impl fmt::Display for WorkerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// A worker as read back from a store — an independent copy, detached from
/// backend state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
  pub id:       WorkerId,
  /// Unique, matched case-sensitively.
  pub email:    String,
  pub name:     String,
  pub is_admin: bool,
}

/// Input for creating or updating a worker. The plaintext password is hashed
/// by the store before anything is persisted.
#[derive(Clone, Deserialize)]
pub struct NewWorker {
  pub email:    String,
  pub name:     String,
  pub is_admin: bool,
  pub password: String,
}
