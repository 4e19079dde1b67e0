//! Shift — a block of working time with a headcount limit.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque shift identifier, allocated by the storage backend.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ShiftId(pub i64);

impl fmt::Display for ShiftId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// A shift as read back from a store. `end_time` is strictly after
/// `start_time`; request validation upstream enforces this before anything
/// reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
  pub id:         ShiftId,
  pub start_time: DateTime<Utc>,
  pub end_time:   DateTime<Utc>,
  /// Maximum number of concurrent assignments.
  pub capacity:   u32,
}

impl Shift {
  /// Overlap against the half-open window `[start, end)`. A shift ending
  /// exactly at `start`, or starting exactly at `end`, does not overlap.
  pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    self.start_time < end && self.end_time > start
  }
}

/// Input for creating or updating a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShift {
  pub start_time: DateTime<Utc>,
  pub end_time:   DateTime<Utc>,
  pub capacity:   u32,
}
