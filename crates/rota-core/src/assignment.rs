//! Assignment — the link between one worker and one shift.
//!
//! Assignments are only ever created through a store's admission path, which
//! checks shift capacity and the same-day exclusivity rule atomically with
//! the insert.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{shift::ShiftId, worker::WorkerId};

/// Opaque assignment identifier, allocated by the storage backend.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AssignmentId(pub i64);

impl fmt::Display for AssignmentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
  pub id:        AssignmentId,
  pub worker_id: WorkerId,
  pub shift_id:  ShiftId,
}
